//! # Identity provider client
//!
//! [`IdentityProvider`] is the seam between the session manager and the
//! hosted identity service. [`GoTrueClient`] implements it over the
//! GoTrue-compatible REST API under `{project_url}/auth/v1`, sending the
//! public key as `apikey` on every call.
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | [`refresh_session`](IdentityProvider::refresh_session) | `POST /token?grant_type=refresh_token` |
//! | [`sign_in_with_password`](IdentityProvider::sign_in_with_password) | `POST /token?grant_type=password` |
//! | [`sign_up`](IdentityProvider::sign_up) | `POST /signup` |
//! | [`sign_out`](IdentityProvider::sign_out) | `POST /logout` |
//! | [`get_user`](IdentityProvider::get_user) | `GET /user` |
//! | [`update_user`](IdentityProvider::update_user) | `PUT /user` |
//! | [`recover`](IdentityProvider::recover) | `POST /recover` |
//!
//! No retries; every failure is returned to the caller as a [`ProviderError`].

use api::identity::{ProviderErrorBody, ProviderSession, ProviderUser};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use store::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProviderError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Session-change notifications, named after the provider SDK's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

/// `POST /signup` answers with a session when confirmation is disabled and
/// with the bare user when an email confirmation is pending.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(ProviderSession),
    User(ProviderUser),
}

/// Body of `PUT /user`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError>;

    /// `metadata` lands in `user_metadata`; `redirect_to` is the
    /// confirmation-link target.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
        redirect_to: Option<&str>,
    ) -> Result<SignUpResponse, ProviderError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError>;

    async fn update_user(
        &self,
        access_token: &str,
        update: &UserUpdate,
    ) -> Result<ProviderUser, ProviderError>;

    /// Send a password-reset email.
    async fn recover(&self, email: &str, redirect_to: Option<&str>) -> Result<(), ProviderError>;
}

#[derive(Debug, Clone)]
pub struct GoTrueClient {
    http: Client,
    auth_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            auth_url: config.auth_url(),
            anon_key: config.identity.anon_key.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.auth_url, path))
            .header("apikey", &self.anon_key)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, ProviderError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ProviderErrorBody = response.json().await.unwrap_or_default();
        let message = body.into_message().unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("identity provider error")
                .to_string()
        });
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ProviderError> {
        Ok(Self::send(builder).await?.json().await?)
    }
}

impl IdentityProvider for GoTrueClient {
    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        Self::json(
            self.request(reqwest::Method::POST, "/token")
                .query(&[("grant_type", "refresh_token")])
                .json(&serde_json::json!({ "refresh_token": refresh_token })),
        )
        .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        Self::json(
            self.request(reqwest::Method::POST, "/token")
                .query(&[("grant_type", "password")])
                .json(&serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
        redirect_to: Option<&str>,
    ) -> Result<SignUpResponse, ProviderError> {
        let mut builder = self.request(reqwest::Method::POST, "/signup");
        if let Some(redirect_to) = redirect_to {
            builder = builder.query(&[("redirect_to", redirect_to)]);
        }
        Self::json(builder.json(&serde_json::json!({
            "email": email,
            "password": password,
            "data": metadata,
        })))
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        Self::send(
            self.request(reqwest::Method::POST, "/logout")
                .bearer_auth(access_token),
        )
        .await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        Self::json(
            self.request(reqwest::Method::GET, "/user")
                .bearer_auth(access_token),
        )
        .await
    }

    async fn update_user(
        &self,
        access_token: &str,
        update: &UserUpdate,
    ) -> Result<ProviderUser, ProviderError> {
        Self::json(
            self.request(reqwest::Method::PUT, "/user")
                .bearer_auth(access_token)
                .json(update),
        )
        .await
    }

    async fn recover(&self, email: &str, redirect_to: Option<&str>) -> Result<(), ProviderError> {
        let mut builder = self.request(reqwest::Method::POST, "/recover");
        if let Some(redirect_to) = redirect_to {
            builder = builder.query(&[("redirect_to", redirect_to)]);
        }
        Self::send(builder.json(&serde_json::json!({ "email": email }))).await?;
        Ok(())
    }
}
