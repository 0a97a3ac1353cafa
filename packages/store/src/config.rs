//! # Client configuration — `rallyhq.toml`
//!
//! Defines the TOML file a RallyHQ client reads at start-up (filename:
//! [`ClientConfig::filename`] = `"rallyhq.toml"`). It names the project the
//! client talks to and the storage keys the session layer owns.
//!
//! ## Structure
//!
//! ```toml
//! [identity]
//! url = "https://project.supabase.co"   # project base URL
//! anon_key = "public-anon-key"          # sent as `apikey`
//!
//! [storage]
//! refresh_token_key = "rallyhq_refresh_token"
//! provider_key_prefix = "sb-"
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`ClientConfig`] | Top-level config with TOML (de)serialisation and the derived endpoint URLs. |
//! | [`IdentityConfig`] | Project URL and public API key. |
//! | [`StorageKeys`] | The application-owned refresh-token key and the identity provider's key prefix. |
//!
//! Every section defaults, so a missing or empty file points at a local
//! development stack (`http://localhost:54321`).

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `rallyhq.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub storage: StorageKeys,
}

/// Identity provider / project endpoint configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Project base URL, without trailing slash.
    #[serde(default = "default_url")]
    pub url: String,
    /// Public (anonymous) API key.
    #[serde(default)]
    pub anon_key: String,
}

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            anon_key: String::new(),
        }
    }
}

/// Storage keys owned or cleaned up by the session layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Key under which the application persists its refresh token.
    #[serde(default = "default_refresh_token_key")]
    pub refresh_token_key: String,
    /// Prefix of keys written by the identity provider's own SDK.
    #[serde(default = "default_provider_key_prefix")]
    pub provider_key_prefix: String,
}

fn default_refresh_token_key() -> String {
    "rallyhq_refresh_token".to_string()
}

fn default_provider_key_prefix() -> String {
    "sb-".to_string()
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            refresh_token_key: default_refresh_token_key(),
            provider_key_prefix: default_provider_key_prefix(),
        }
    }
}

impl ClientConfig {
    /// Create a config for the given project URL and public key.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            identity: IdentityConfig {
                url: url.into(),
                anon_key: anon_key.into(),
            },
            storage: StorageKeys::default(),
        }
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "rallyhq.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Base URL of the identity provider's REST API.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.identity.url.trim_end_matches('/'))
    }

    /// Base URL of the rally functions.
    pub fn functions_url(&self) -> String {
        format!("{}/functions/v1", self.identity.url.trim_end_matches('/'))
    }

    /// Key under which the provider session is mirrored, in the provider
    /// SDK's own format: `sb-<project-ref>-auth-token`.
    pub fn provider_session_key(&self) -> String {
        let host = self
            .identity
            .url
            .split_once("://")
            .map_or(self.identity.url.as_str(), |(_, rest)| rest);
        let project_ref = host
            .split(['/', ':', '.'])
            .next()
            .filter(|label| !label.is_empty())
            .unwrap_or("local");
        format!("{}{}-auth-token", self.storage.provider_key_prefix, project_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ClientConfig::from_toml("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.storage.refresh_token_key, "rallyhq_refresh_token");
        assert_eq!(config.storage.provider_key_prefix, "sb-");
        assert_eq!(config.auth_url(), "http://localhost:54321/auth/v1");
        assert_eq!(config.provider_session_key(), "sb-localhost-auth-token");
    }

    #[test]
    fn test_partial_sections() {
        let config = ClientConfig::from_toml(
            r#"
            [identity]
            url = "https://abc.supabase.co/"
            anon_key = "anon"

            [storage]
            refresh_token_key = "custom_key"
            "#,
        )
        .unwrap();

        assert_eq!(config.identity.anon_key, "anon");
        assert_eq!(config.functions_url(), "https://abc.supabase.co/functions/v1");
        assert_eq!(config.storage.refresh_token_key, "custom_key");
        assert_eq!(config.storage.provider_key_prefix, "sb-");
        assert_eq!(config.provider_session_key(), "sb-abc-auth-token");

        let reparsed = ClientConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }
}
