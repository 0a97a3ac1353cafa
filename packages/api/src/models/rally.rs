//! # Rally model — `rallies` table
//!
//! Rallies are created by users holding the `create_rally` permission and are
//! listed publicly by `get-rallies`.
//!
//! | Type | Role |
//! |------|------|
//! | [`RallyInput`] | permissive request body of `create-rally` |
//! | [`NewRally`] | validated rally, dates normalised to UTC |
//! | [`Rally`] | stored record (`id`, `createdBy`, `createdAt` added) |
//! | `RallyRow` | server-only row; nested blocks live in `jsonb` columns |
//!
//! Validation rules:
//!
//! - `name`, `date`, `organizer.name`, `registration.opens`,
//!   `registration.closes`, `registration.currency`, `description` and
//!   `shortDescription` must be non-blank.
//! - `teamLimit`, when present, is a positive integer.
//! - `registration.fee` is present and not negative.
//! - `registration.paymentMethods` holds at least one entry.
//! - `website`, `organizer.website` and every file `url` parse as absolute
//!   URLs when present; `organizer.contactEmail` looks like an address.
//! - Dates are RFC 3339 timestamps, `YYYY-MM-DDTHH:MM` or plain `YYYY-MM-DD`
//!   (midnight UTC).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

#[cfg(feature = "server")]
use sqlx::{types::Json, FromRow};

use super::fields::{lenient_f64, optional, present};
use crate::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    pub name: String,
    pub website: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub opens: DateTime<Utc>,
    pub closes: DateTime<Utc>,
    pub fee: f64,
    pub currency: String,
    pub payment_methods: Vec<String>,
}

/// An attached document, e.g. the supplementary regulations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyFile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRally {
    pub name: String,
    pub team_limit: Option<i32>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub organizer: Organizer,
    pub registration: Registration,
    pub files: Vec<RallyFile>,
    pub description: String,
    pub short_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rally {
    pub id: Uuid,
    pub created_by: Uuid,
    #[serde(flatten)]
    pub fields: NewRally,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizerInput {
    pub name: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationInput {
    pub opens: Option<String>,
    pub closes: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub fee: Option<f64>,
    pub currency: Option<String>,
    pub payment_methods: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RallyFileInput {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// Request body of `create-rally`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RallyInput {
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub team_limit: Option<f64>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub organizer: OrganizerInput,
    pub registration: RegistrationInput,
    pub files: Vec<RallyFileInput>,
    pub description: Option<String>,
    pub short_description: Option<String>,
}

impl RallyInput {
    pub fn validate(self) -> Result<NewRally, ApiError> {
        let name = required(self.name, "name")?;
        let team_limit = self.team_limit.map(team_limit).transpose()?;
        let date = parse_date(&required(self.date, "date")?, "date")?;
        let website = optional_url(self.website, "website")?;

        let organizer = Organizer {
            name: required(self.organizer.name, "organizer.name")?,
            website: optional_url(self.organizer.website, "organizer.website")?,
            contact_email: optional_email(self.organizer.contact_email)?,
        };

        let registration = self.registration;
        let opens = required(registration.opens, "registration.opens")?;
        let closes = required(registration.closes, "registration.closes")?;
        let fee = registration
            .fee
            .ok_or_else(|| ApiError::bad_request("Missing required field: registration.fee"))?;
        if !fee.is_finite() || fee < 0.0 {
            return Err(ApiError::bad_request("registration.fee must not be negative"));
        }
        let currency = required(registration.currency, "registration.currency")?;
        let payment_methods: Vec<String> = registration
            .payment_methods
            .into_iter()
            .filter(|method| !method.trim().is_empty())
            .collect();
        if payment_methods.is_empty() {
            return Err(ApiError::bad_request(
                "At least one payment method is required",
            ));
        }

        let files = self
            .files
            .into_iter()
            .map(RallyFileInput::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewRally {
            name,
            team_limit,
            date,
            location: optional(self.location),
            website,
            organizer,
            registration: Registration {
                opens: parse_date(&opens, "registration.opens")?,
                closes: parse_date(&closes, "registration.closes")?,
                fee,
                currency,
                payment_methods,
            },
            files,
            description: required(self.description, "description")?,
            short_description: required(self.short_description, "shortDescription")?,
        })
    }
}

impl RallyFileInput {
    fn validate(self) -> Result<RallyFile, ApiError> {
        let url = optional_url(self.url, "files.url")?
            .ok_or_else(|| ApiError::bad_request("Missing required field: files.url"))?;
        Ok(RallyFile {
            name: required(self.name, "files.name")?,
            kind: optional(self.kind).unwrap_or_else(|| "other".to_string()),
            url,
            description: optional(self.description),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    if present(&value) {
        Ok(value.unwrap_or_default())
    } else {
        Err(ApiError::bad_request(format!("Missing required field: {field}")))
    }
}

fn team_limit(value: f64) -> Result<i32, ApiError> {
    if value.fract() != 0.0 || value < 1.0 || value > f64::from(i32::MAX) {
        return Err(ApiError::bad_request("teamLimit must be a positive integer"));
    }
    Ok(value as i32)
}

fn optional_url(value: Option<String>, field: &str) -> Result<Option<String>, ApiError> {
    match optional(value) {
        None => Ok(None),
        Some(raw) => Url::parse(raw.trim())
            .map(|_| Some(raw.trim().to_string()))
            .map_err(|_| ApiError::bad_request(format!("Invalid URL in {field}: {raw}"))),
    }
}

fn optional_email(value: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(email) = optional(value) else {
        return Ok(None);
    };
    let email = email.trim().to_string();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        })
        && !email.contains(char::is_whitespace);
    if valid {
        Ok(Some(email))
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid email in organizer.contactEmail: {email}"
        )))
    }
}

/// Parse a date field into UTC.
pub fn parse_date(raw: &str, field: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Ok(parsed.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| ApiError::bad_request(format!("Invalid date in {field}: {raw}")))
}

/// `rallies` row.
#[cfg(feature = "server")]
#[derive(Debug, Clone, FromRow)]
pub struct RallyRow {
    pub id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    pub team_limit: Option<i32>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub organizer: Json<Organizer>,
    pub registration: Json<Registration>,
    pub files: Json<Vec<RallyFile>>,
    pub description: String,
    pub short_description: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(feature = "server")]
impl RallyRow {
    pub fn to_rally(&self) -> Rally {
        Rally {
            id: self.id,
            created_by: self.created_by,
            fields: NewRally {
                name: self.name.clone(),
                team_limit: self.team_limit,
                date: self.date,
                location: self.location.clone(),
                website: self.website.clone(),
                organizer: self.organizer.0.clone(),
                registration: self.registration.0.clone(),
                files: self.files.0.clone(),
                description: self.description.clone(),
                short_description: self.short_description.clone(),
            },
            created_at: self.created_at,
        }
    }
}
