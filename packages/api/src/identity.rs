//! # Identity provider wire types (GoTrue-compatible REST)
//!
//! Shared by the server-side token verifier, which reads [`ProviderUser`] from
//! `GET /auth/v1/user`, and by the client, which additionally receives
//! [`ProviderSession`] from the token and sign-up endpoints.
//!
//! Only the fields the application reads are modelled; everything else in the
//! provider's payload is ignored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Map<String, serde_json::Value>,
}

impl ProviderUser {
    pub fn email_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    /// `user_metadata.name`, then `user_metadata.full_name`, then `""`.
    pub fn display_name(&self) -> String {
        ["name", "full_name"]
            .iter()
            .find_map(|key| {
                self.user_metadata
                    .get(*key)
                    .and_then(|value| value.as_str())
                    .filter(|name| !name.is_empty())
            })
            .unwrap_or_default()
            .to_string()
    }
}

/// Token pair plus user, as returned by `POST /token` and `POST /signup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: ProviderUser,
}

/// Error payload. GoTrue versions disagree on the field name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProviderErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}
