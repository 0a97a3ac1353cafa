//! # Driver profile — one row per user in `user_profiles`
//!
//! ## [`Profile`]
//!
//! The camelCase shape exchanged with the client, both as the body of
//! `update-profile` and as the `data` of `get-profile`. The user id is never
//! part of it: the row is keyed on the authenticated caller.
//!
//! ## [`ProfileInput`]
//!
//! The permissive deserialisation target for request bodies. Every field is
//! optional so that a missing field produces the domain error
//! ("Name and email are required") instead of a serde message.
//! [`ProfileInput::validate`] turns it into a [`Profile`], mapping blank
//! optional strings to `None` and a missing `sportsLicense` to `false`.
//!
//! ## [`ProfileRow`] (server only)
//!
//! The snake_case database row; [`ProfileRow::to_profile`] projects it back.

use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use chrono::{DateTime, Utc};
#[cfg(feature = "server")]
use sqlx::FromRow;
#[cfg(feature = "server")]
use uuid::Uuid;

use super::fields::{optional, present};
use crate::error::ApiError;

/// In-case-of-emergency contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceContact {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Driver profile as seen by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub team: Option<String>,
    pub club: Option<String>,
    /// Free-form, the client uses `DD.MM.YYYY`.
    pub birth_date: Option<String>,
    pub driving_license_number: Option<String>,
    pub sports_license: bool,
    pub email: String,
    pub phone: Option<String>,
    pub ice_contact: IceContact,
}

/// Request body of `update-profile`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileInput {
    pub name: Option<String>,
    pub team: Option<String>,
    pub club: Option<String>,
    pub birth_date: Option<String>,
    pub driving_license_number: Option<String>,
    pub sports_license: Option<bool>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ice_contact: Option<IceContact>,
}

impl ProfileInput {
    pub fn validate(self) -> Result<Profile, ApiError> {
        if !present(&self.name) || !present(&self.email) {
            return Err(ApiError::bad_request("Name and email are required"));
        }
        let ice = self.ice_contact.unwrap_or_default();

        Ok(Profile {
            name: self.name.unwrap_or_default(),
            team: optional(self.team),
            club: optional(self.club),
            birth_date: optional(self.birth_date),
            driving_license_number: optional(self.driving_license_number),
            sports_license: self.sports_license.unwrap_or(false),
            email: self.email.unwrap_or_default(),
            phone: optional(self.phone),
            ice_contact: IceContact {
                name: optional(ice.name),
                phone: optional(ice.phone),
            },
        })
    }
}

/// Full `user_profiles` row.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub name: String,
    pub team: Option<String>,
    pub club: Option<String>,
    pub birth_date: Option<String>,
    pub driving_license_number: Option<String>,
    pub sports_license: bool,
    pub email: String,
    pub phone: Option<String>,
    pub ice_contact_name: Option<String>,
    pub ice_contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "server")]
impl ProfileRow {
    pub fn to_profile(&self) -> Profile {
        Profile {
            name: self.name.clone(),
            team: self.team.clone(),
            club: self.club.clone(),
            birth_date: self.birth_date.clone(),
            driving_license_number: self.driving_license_number.clone(),
            sports_license: self.sports_license,
            email: self.email.clone(),
            phone: self.phone.clone(),
            ice_contact: IceContact {
                name: self.ice_contact_name.clone(),
                phone: self.ice_contact_phone.clone(),
            },
        }
    }
}
