//! Resolves a bearer token to a user by asking the identity provider.
//!
//! There is no local JWT decoding: a token is valid exactly when
//! `GET {auth_url}/user` answers with a user for it.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use uuid::Uuid;

use crate::identity::ProviderUser;
use crate::settings::Identity;

/// The caller behind a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub email_confirmed: bool,
}

impl From<ProviderUser> for VerifiedUser {
    fn from(user: ProviderUser) -> Self {
        Self {
            id: user.id,
            email_confirmed: user.email_confirmed(),
            email: user.email,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("token rejected by identity provider ({0})")]
    Rejected(StatusCode),

    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, VerifyError>;
}

pub type SharedVerifier = Arc<dyn IdentityVerifier>;

/// [`IdentityVerifier`] backed by a GoTrue-compatible `/user` endpoint.
pub struct GoTrueVerifier {
    client: Client,
    user_url: String,
    service_key: String,
}

impl GoTrueVerifier {
    pub fn new(identity: &Identity) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(identity.timeout()).build()?;
        Ok(Self {
            client,
            user_url: format!("{}/user", identity.auth_url()),
            service_key: identity.service_key.clone(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoTrueVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, VerifyError> {
        let response = self
            .client
            .get(&self.user_url)
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Rejected(status));
        }

        let user: ProviderUser = response.json().await?;
        Ok(user.into())
    }
}
