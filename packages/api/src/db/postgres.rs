//! PostgreSQL implementation of [`Repository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::repository::{Repository, RepositoryError, RepositoryResult};
use crate::models::{
    Car, CarRow, Codriver, NewCar, NewCodriver, NewRally, Permission, PermissionGrant, Profile,
    ProfileRow, Rally, RallyRow,
};

#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn affected(rows: u64) -> RepositoryResult<()> {
    if rows == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn get_profile(&self, user_id: Uuid) -> RepositoryResult<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM user_profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.to_profile()))
    }

    async fn upsert_profile(&self, user_id: Uuid, profile: &Profile) -> RepositoryResult<Profile> {
        let row: ProfileRow = sqlx::query_as(
            r#"
            INSERT INTO user_profiles (id, name, team, club, birth_date, driving_license_number,
                                       sports_license, email, phone, ice_contact_name, ice_contact_phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                team = EXCLUDED.team,
                club = EXCLUDED.club,
                birth_date = EXCLUDED.birth_date,
                driving_license_number = EXCLUDED.driving_license_number,
                sports_license = EXCLUDED.sports_license,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                ice_contact_name = EXCLUDED.ice_contact_name,
                ice_contact_phone = EXCLUDED.ice_contact_phone,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&profile.name)
        .bind(&profile.team)
        .bind(&profile.club)
        .bind(&profile.birth_date)
        .bind(&profile.driving_license_number)
        .bind(profile.sports_license)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.ice_contact.name)
        .bind(&profile.ice_contact.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.to_profile())
    }

    async fn list_codrivers(&self, user_id: Uuid) -> RepositoryResult<Vec<Codriver>> {
        let rows: Vec<Codriver> = sqlx::query_as(
            "SELECT * FROM codrivers WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn add_codriver(
        &self,
        user_id: Uuid,
        codriver: &NewCodriver,
    ) -> RepositoryResult<Codriver> {
        let row: Codriver = sqlx::query_as(
            r#"
            INSERT INTO codrivers (user_id, name, club, birth_date, driving_license_number,
                                   sports_license, email, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&codriver.name)
        .bind(&codriver.club)
        .bind(&codriver.birth_date)
        .bind(&codriver.driving_license_number)
        .bind(codriver.sports_license)
        .bind(&codriver.email)
        .bind(&codriver.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_codriver(
        &self,
        user_id: Uuid,
        id: Uuid,
        codriver: &NewCodriver,
    ) -> RepositoryResult<Codriver> {
        let row: Option<Codriver> = sqlx::query_as(
            r#"
            UPDATE codrivers SET
                name = $3,
                club = $4,
                birth_date = $5,
                driving_license_number = $6,
                sports_license = $7,
                email = $8,
                phone = $9,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&codriver.name)
        .bind(&codriver.club)
        .bind(&codriver.birth_date)
        .bind(&codriver.driving_license_number)
        .bind(codriver.sports_license)
        .bind(&codriver.email)
        .bind(&codriver.phone)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)
    }

    async fn delete_codriver(&self, user_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM codrivers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        affected(result.rows_affected())
    }

    async fn list_cars(&self, user_id: Uuid) -> RepositoryResult<Vec<Car>> {
        let rows: Vec<CarRow> =
            sqlx::query_as("SELECT * FROM cars WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(CarRow::to_car).collect())
    }

    async fn add_car(&self, user_id: Uuid, car: &NewCar) -> RepositoryResult<Car> {
        let row: CarRow = sqlx::query_as(
            r#"
            INSERT INTO cars (user_id, make, model, year, registration_number, vin,
                              engine_capacity, engine_type, engine_capacity_multiplier,
                              engine_capacity_with_multiplier, engine_fuel, drive, next_inspection,
                              insurance_policy_number, insurance_expiry_date, sport_car_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&car.make)
        .bind(&car.model)
        .bind(&car.year)
        .bind(&car.registration_number)
        .bind(&car.vin)
        .bind(&car.engine.capacity)
        .bind(&car.engine.kind)
        .bind(car.engine.capacity_multiplier)
        .bind(&car.engine.capacity_with_multiplier)
        .bind(&car.engine.fuel)
        .bind(&car.drive)
        .bind(&car.next_inspection)
        .bind(&car.insurance.policy_number)
        .bind(&car.insurance.expiry_date)
        .bind(&car.sport_car_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.to_car())
    }

    async fn update_car(&self, user_id: Uuid, id: Uuid, car: &NewCar) -> RepositoryResult<Car> {
        let row: Option<CarRow> = sqlx::query_as(
            r#"
            UPDATE cars SET
                make = $3,
                model = $4,
                year = $5,
                registration_number = $6,
                vin = $7,
                engine_capacity = $8,
                engine_type = $9,
                engine_capacity_multiplier = $10,
                engine_capacity_with_multiplier = $11,
                engine_fuel = $12,
                drive = $13,
                next_inspection = $14,
                insurance_policy_number = $15,
                insurance_expiry_date = $16,
                sport_car_type = $17,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&car.make)
        .bind(&car.model)
        .bind(&car.year)
        .bind(&car.registration_number)
        .bind(&car.vin)
        .bind(&car.engine.capacity)
        .bind(&car.engine.kind)
        .bind(car.engine.capacity_multiplier)
        .bind(&car.engine.capacity_with_multiplier)
        .bind(&car.engine.fuel)
        .bind(&car.drive)
        .bind(&car.next_inspection)
        .bind(&car.insurance.policy_number)
        .bind(&car.insurance.expiry_date)
        .bind(&car.sport_car_type)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.to_car()).ok_or(RepositoryError::NotFound)
    }

    async fn delete_car(&self, user_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        affected(result.rows_affected())
    }

    async fn list_permissions(&self, user_id: Uuid) -> RepositoryResult<Vec<PermissionGrant>> {
        let rows: Vec<(String, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT permission, created_at FROM user_permissions WHERE user_id = $1 ORDER BY permission",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(permission, created_at)| PermissionGrant {
                permission: permission.into(),
                created_at,
            })
            .collect())
    }

    async fn has_permission(
        &self,
        user_id: Uuid,
        permission: &Permission,
    ) -> RepositoryResult<bool> {
        let granted: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_permissions WHERE user_id = $1 AND permission = $2)",
        )
        .bind(user_id)
        .bind(permission.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(granted)
    }

    async fn create_rally(&self, created_by: Uuid, rally: &NewRally) -> RepositoryResult<Rally> {
        let row: RallyRow = sqlx::query_as(
            r#"
            INSERT INTO rallies (created_by, name, team_limit, date, location, website,
                                 organizer, registration, files, description, short_description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(created_by)
        .bind(&rally.name)
        .bind(rally.team_limit)
        .bind(rally.date)
        .bind(&rally.location)
        .bind(&rally.website)
        .bind(Json(&rally.organizer))
        .bind(Json(&rally.registration))
        .bind(Json(&rally.files))
        .bind(&rally.description)
        .bind(&rally.short_description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.to_rally())
    }

    async fn list_rallies(&self) -> RepositoryResult<Vec<Rally>> {
        let rows: Vec<RallyRow> =
            sqlx::query_as("SELECT * FROM rallies ORDER BY date ASC, created_at ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(RallyRow::to_rally).collect())
    }
}
