//! # Codriver model — `codrivers` table, many rows per user
//!
//! - [`Codriver`]: the stored record as returned to the client.
//! - [`NewCodriver`]: the validated editable fields. It is also what the
//!   client sends to `add-codriver`; `update-codriver` sends a
//!   [`CodriverUpdate`] (the same fields plus `id`).
//! - [`CodriverInput`]: permissive request body; [`validate`](CodriverInput::validate)
//!   and [`validate_update`](CodriverInput::validate_update) enforce the
//!   required `name`, `email`, `phone` (and `id` for updates, checked first).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "server")]
use sqlx::FromRow;

use super::fields::{optional, present, require_id};
use crate::error::ApiError;

/// A codriver belonging to the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "server", derive(FromRow))]
pub struct Codriver {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub club: Option<String>,
    pub birth_date: Option<String>,
    pub driving_license_number: Option<String>,
    pub sports_license: bool,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable codriver fields, validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCodriver {
    pub name: String,
    pub club: Option<String>,
    pub birth_date: Option<String>,
    pub driving_license_number: Option<String>,
    pub sports_license: bool,
    pub email: String,
    pub phone: String,
}

/// Body of `update-codriver` as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodriverUpdate {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: NewCodriver,
}

/// Request body of `add-codriver` / `update-codriver`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodriverInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub club: Option<String>,
    pub birth_date: Option<String>,
    pub driving_license_number: Option<String>,
    pub sports_license: Option<bool>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CodriverInput {
    pub fn validate(self) -> Result<NewCodriver, ApiError> {
        if !present(&self.name) || !present(&self.email) || !present(&self.phone) {
            return Err(ApiError::bad_request(
                "Missing required fields: name, email, phone",
            ));
        }
        Ok(NewCodriver {
            name: self.name.unwrap_or_default(),
            club: optional(self.club),
            birth_date: optional(self.birth_date),
            driving_license_number: optional(self.driving_license_number),
            sports_license: self.sports_license.unwrap_or(false),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
        })
    }

    pub fn validate_update(mut self) -> Result<(Uuid, NewCodriver), ApiError> {
        let id = require_id(self.id.take())?;
        Ok((id, self.validate()?))
    }
}
