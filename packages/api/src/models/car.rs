//! # Car model — `cars` table, many rows per user
//!
//! The client groups engine and insurance data into nested objects while the
//! table stores them as flat `engine_*` / `insurance_*` columns. [`CarRow`]
//! is the flat row, [`Car`] the nested camelCase record, and [`NewCar`] the
//! validated editable subset shared by `add-car` and `update-car`.
//!
//! `year` and `engine.capacity` are text (the forms send strings, numbers are
//! accepted and stringified); `engine.capacityMultiplier` is numeric and also
//! accepts a numeric string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "server")]
use sqlx::FromRow;

use super::fields::{lenient_f64, lenient_string, optional, present, require_id};
use crate::error::ApiError;

/// Engine block of a car.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Engine {
    #[serde(deserialize_with = "lenient_string")]
    pub capacity: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub capacity_multiplier: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub capacity_with_multiplier: Option<String>,
    pub fuel: Option<String>,
}

/// Insurance block of a car.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insurance {
    pub policy_number: Option<String>,
    pub expiry_date: Option<String>,
}

/// A car belonging to the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: NewCar,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable car fields, validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: Option<String>,
    pub registration_number: String,
    pub vin: Option<String>,
    pub engine: Engine,
    pub drive: Option<String>,
    pub next_inspection: Option<String>,
    pub insurance: Insurance,
    pub sport_car_type: Option<String>,
}

/// Body of `update-car` as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarUpdate {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: NewCar,
}

/// Request body of `add-car` / `update-car`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarInput {
    pub id: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub year: Option<String>,
    pub registration_number: Option<String>,
    pub vin: Option<String>,
    pub engine: Option<Engine>,
    pub drive: Option<String>,
    pub next_inspection: Option<String>,
    pub insurance: Option<Insurance>,
    pub sport_car_type: Option<String>,
}

impl CarInput {
    pub fn validate(self) -> Result<NewCar, ApiError> {
        if !present(&self.make) || !present(&self.model) || !present(&self.registration_number) {
            return Err(ApiError::bad_request(
                "Missing required fields: make, model, registrationNumber",
            ));
        }
        let engine = self.engine.unwrap_or_default();
        let insurance = self.insurance.unwrap_or_default();

        Ok(NewCar {
            make: self.make.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            year: optional(self.year),
            registration_number: self.registration_number.unwrap_or_default(),
            vin: optional(self.vin),
            engine: Engine {
                capacity: optional(engine.capacity),
                kind: optional(engine.kind),
                capacity_multiplier: engine.capacity_multiplier,
                capacity_with_multiplier: optional(engine.capacity_with_multiplier),
                fuel: optional(engine.fuel),
            },
            drive: optional(self.drive),
            next_inspection: optional(self.next_inspection),
            insurance: Insurance {
                policy_number: optional(insurance.policy_number),
                expiry_date: optional(insurance.expiry_date),
            },
            sport_car_type: optional(self.sport_car_type),
        })
    }

    pub fn validate_update(mut self) -> Result<(Uuid, NewCar), ApiError> {
        let id = require_id(self.id.take())?;
        Ok((id, self.validate()?))
    }
}

/// Flat `cars` row.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct CarRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub make: String,
    pub model: String,
    pub year: Option<String>,
    pub registration_number: String,
    pub vin: Option<String>,
    pub engine_capacity: Option<String>,
    pub engine_type: Option<String>,
    pub engine_capacity_multiplier: Option<f64>,
    pub engine_capacity_with_multiplier: Option<String>,
    pub engine_fuel: Option<String>,
    pub drive: Option<String>,
    pub next_inspection: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub insurance_expiry_date: Option<String>,
    pub sport_car_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "server")]
impl CarRow {
    pub fn to_car(&self) -> Car {
        Car {
            id: self.id,
            user_id: self.user_id,
            fields: NewCar {
                make: self.make.clone(),
                model: self.model.clone(),
                year: self.year.clone(),
                registration_number: self.registration_number.clone(),
                vin: self.vin.clone(),
                engine: Engine {
                    capacity: self.engine_capacity.clone(),
                    kind: self.engine_type.clone(),
                    capacity_multiplier: self.engine_capacity_multiplier,
                    capacity_with_multiplier: self.engine_capacity_with_multiplier.clone(),
                    fuel: self.engine_fuel.clone(),
                },
                drive: self.drive.clone(),
                next_inspection: self.next_inspection.clone(),
                insurance: Insurance {
                    policy_number: self.insurance_policy_number.clone(),
                    expiry_date: self.insurance_expiry_date.clone(),
                },
                sport_car_type: self.sport_car_type.clone(),
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        let input: CarInput = serde_json::from_str(r#"{"make": "Subaru", "model": "Impreza"}"#).unwrap();
        assert_eq!(
            input.validate(),
            Err(ApiError::bad_request(
                "Missing required fields: make, model, registrationNumber"
            ))
        );
    }

    #[test]
    fn test_nested_blocks_and_lenient_numbers() {
        let input: CarInput = serde_json::from_str(
            r#"{
                "make": "Subaru",
                "model": "Impreza",
                "year": 2004,
                "registrationNumber": "RZ 12345",
                "engine": {"capacity": "1994", "type": "turbo", "capacityMultiplier": "1.7", "fuel": ""},
                "insurance": {"policyNumber": "PL-1"}
            }"#,
        )
        .unwrap();

        let car = input.validate().unwrap();
        assert_eq!(car.year.as_deref(), Some("2004"));
        assert_eq!(car.engine.kind.as_deref(), Some("turbo"));
        assert_eq!(car.engine.capacity_multiplier, Some(1.7));
        assert_eq!(car.engine.fuel, None);
        assert_eq!(car.insurance.policy_number.as_deref(), Some("PL-1"));
        assert_eq!(car.insurance.expiry_date, None);
    }

    #[test]
    fn test_record_serialises_flat_with_nested_blocks() {
        let car = Car {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            fields: NewCar {
                make: "Fiat".into(),
                model: "126p".into(),
                registration_number: "KR 1".into(),
                ..NewCar::default()
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&car).unwrap();
        assert_eq!(value["make"], "Fiat");
        assert_eq!(value["registrationNumber"], "KR 1");
        assert!(value["engine"].get("type").is_some());
        assert!(value.get("fields").is_none());
        assert!(value.get("userId").is_some());
    }
}
