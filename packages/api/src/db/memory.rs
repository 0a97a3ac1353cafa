//! In-process [`Repository`] for tests and local runs without Postgres.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::{Repository, RepositoryError, RepositoryResult};
use crate::models::{
    Car, Codriver, NewCar, NewCodriver, NewRally, Permission, PermissionGrant, Profile, Rally,
};

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    codrivers: Vec<Codriver>,
    cars: Vec<Car>,
    permissions: BTreeMap<(Uuid, String), PermissionGrant>,
    rallies: Vec<Rally>,
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
    operations: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls served so far.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Insert a `user_permissions` row.
    pub async fn grant_permission(&self, user_id: Uuid, permission: impl Into<Permission>) {
        let permission = permission.into();
        let grant = PermissionGrant {
            created_at: Some(Utc::now()),
            ..PermissionGrant::new(permission.clone())
        };
        self.tables
            .write()
            .await
            .permissions
            .insert((user_id, permission.as_str().to_string()), grant);
    }

    fn touch(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Newest first, like `ORDER BY created_at DESC`.
fn newest_first<T>(rows: impl Iterator<Item = T>, created: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    // Stable sort: equal timestamps stay in reversed insertion order.
    rows.reverse();
    rows.sort_by_key(|row| std::cmp::Reverse(created(row)));
    rows
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_profile(&self, user_id: Uuid) -> RepositoryResult<Option<Profile>> {
        self.touch();
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, user_id: Uuid, profile: &Profile) -> RepositoryResult<Profile> {
        self.touch();
        self.tables
            .write()
            .await
            .profiles
            .insert(user_id, profile.clone());
        Ok(profile.clone())
    }

    async fn list_codrivers(&self, user_id: Uuid) -> RepositoryResult<Vec<Codriver>> {
        self.touch();
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.codrivers.iter().filter(|c| c.user_id == user_id).cloned(),
            |c| c.created_at,
        ))
    }

    async fn add_codriver(
        &self,
        user_id: Uuid,
        codriver: &NewCodriver,
    ) -> RepositoryResult<Codriver> {
        self.touch();
        let now = Utc::now();
        let row = Codriver {
            id: Uuid::new_v4(),
            user_id,
            name: codriver.name.clone(),
            club: codriver.club.clone(),
            birth_date: codriver.birth_date.clone(),
            driving_license_number: codriver.driving_license_number.clone(),
            sports_license: codriver.sports_license,
            email: codriver.email.clone(),
            phone: codriver.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.codrivers.push(row.clone());
        Ok(row)
    }

    async fn update_codriver(
        &self,
        user_id: Uuid,
        id: Uuid,
        codriver: &NewCodriver,
    ) -> RepositoryResult<Codriver> {
        self.touch();
        let mut tables = self.tables.write().await;
        let row = tables
            .codrivers
            .iter_mut()
            .find(|c| c.id == id && c.user_id == user_id)
            .ok_or(RepositoryError::NotFound)?;

        row.name = codriver.name.clone();
        row.club = codriver.club.clone();
        row.birth_date = codriver.birth_date.clone();
        row.driving_license_number = codriver.driving_license_number.clone();
        row.sports_license = codriver.sports_license;
        row.email = codriver.email.clone();
        row.phone = codriver.phone.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_codriver(&self, user_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        self.touch();
        let mut tables = self.tables.write().await;
        let before = tables.codrivers.len();
        tables
            .codrivers
            .retain(|c| !(c.id == id && c.user_id == user_id));
        if tables.codrivers.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_cars(&self, user_id: Uuid) -> RepositoryResult<Vec<Car>> {
        self.touch();
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.cars.iter().filter(|c| c.user_id == user_id).cloned(),
            |c| c.created_at,
        ))
    }

    async fn add_car(&self, user_id: Uuid, car: &NewCar) -> RepositoryResult<Car> {
        self.touch();
        let now = Utc::now();
        let row = Car {
            id: Uuid::new_v4(),
            user_id,
            fields: car.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.cars.push(row.clone());
        Ok(row)
    }

    async fn update_car(&self, user_id: Uuid, id: Uuid, car: &NewCar) -> RepositoryResult<Car> {
        self.touch();
        let mut tables = self.tables.write().await;
        let row = tables
            .cars
            .iter_mut()
            .find(|c| c.id == id && c.user_id == user_id)
            .ok_or(RepositoryError::NotFound)?;

        row.fields = car.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_car(&self, user_id: Uuid, id: Uuid) -> RepositoryResult<()> {
        self.touch();
        let mut tables = self.tables.write().await;
        let before = tables.cars.len();
        tables.cars.retain(|c| !(c.id == id && c.user_id == user_id));
        if tables.cars.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_permissions(&self, user_id: Uuid) -> RepositoryResult<Vec<PermissionGrant>> {
        self.touch();
        // BTreeMap keys are (user, permission), so the range is already sorted.
        Ok(self
            .tables
            .read()
            .await
            .permissions
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, grant)| grant.clone())
            .collect())
    }

    async fn has_permission(
        &self,
        user_id: Uuid,
        permission: &Permission,
    ) -> RepositoryResult<bool> {
        self.touch();
        Ok(self
            .tables
            .read()
            .await
            .permissions
            .contains_key(&(user_id, permission.as_str().to_string())))
    }

    async fn create_rally(&self, created_by: Uuid, rally: &NewRally) -> RepositoryResult<Rally> {
        self.touch();
        let row = Rally {
            id: Uuid::new_v4(),
            created_by,
            fields: rally.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.rallies.push(row.clone());
        Ok(row)
    }

    async fn list_rallies(&self) -> RepositoryResult<Vec<Rally>> {
        self.touch();
        let mut rallies = self.tables.read().await.rallies.clone();
        rallies.sort_by_key(|r| (r.fields.date, r.created_at));
        Ok(rallies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codriver(name: &str) -> NewCodriver {
        NewCodriver {
            name: name.into(),
            email: format!("{name}@example.com"),
            phone: "600".into(),
            ..NewCodriver::default()
        }
    }

    #[tokio::test]
    async fn test_rows_are_scoped_to_owner() {
        let repo = MemoryRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let row = repo.add_codriver(alice, &codriver("piotr")).await.unwrap();

        assert!(matches!(
            repo.update_codriver(bob, row.id, &codriver("x")).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.delete_codriver(bob, row.id).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(repo.list_codrivers(bob).await.unwrap().is_empty());
        assert_eq!(repo.list_codrivers(alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_newest_first() {
        let repo = MemoryRepository::new();
        let user = Uuid::new_v4();
        repo.add_codriver(user, &codriver("first")).await.unwrap();
        repo.add_codriver(user, &codriver("second")).await.unwrap();

        let names: Vec<String> = repo
            .list_codrivers(user)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_permissions_sorted_and_checked() {
        let repo = MemoryRepository::new();
        let user = Uuid::new_v4();
        repo.grant_permission(user, Permission::CreateRally).await;
        repo.grant_permission(user, Permission::Admin).await;
        repo.grant_permission(Uuid::new_v4(), "judge").await;

        let names: Vec<String> = repo
            .list_permissions(user)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.permission.to_string())
            .collect();
        assert_eq!(names, vec!["admin", "create_rally"]);
        assert!(repo.has_permission(user, &Permission::CreateRally).await.unwrap());
        assert!(!repo
            .has_permission(Uuid::new_v4(), &Permission::CreateRally)
            .await
            .unwrap());
    }
}
