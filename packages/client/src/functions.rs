//! # Functions client
//!
//! Typed calls to the rally functions under `{project_url}/functions/v1`.
//! Every protected call sends the public key as `apikey` and `Authorization`
//! and the user token in `x-access-token`, matching what the server's gate
//! accepts. The token is confirmed with the identity provider first; a
//! rejection there, or a 401 from any function, forces a local logout
//! through the [`SessionManager`] before the error is returned.

use std::sync::Arc;

use api::models::{
    Car, CarUpdate, Codriver, CodriverUpdate, NewCar, NewCodriver, NewRally, Permission,
    PermissionGrant, Profile, Rally,
};
use api::{Deleted, Envelope, ErrorBody};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use store::{ClientConfig, KeyValueStore};
use uuid::Uuid;

use crate::manager::{SessionError, SessionManager};
use crate::provider::{IdentityProvider, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("session expired")]
    Unauthorized,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct FunctionsClient<S, P> {
    http: Client,
    base_url: String,
    anon_key: String,
    session: Arc<SessionManager<S, P>>,
}

impl<S: KeyValueStore, P: IdentityProvider> FunctionsClient<S, P> {
    pub fn new(config: &ClientConfig, session: Arc<SessionManager<S, P>>) -> Self {
        Self {
            http: Client::new(),
            base_url: config.functions_url(),
            anon_key: config.identity.anon_key.clone(),
            session,
        }
    }

    pub fn session(&self) -> &SessionManager<S, P> {
        &self.session
    }

    pub async fn get_profile(&self) -> Result<Option<Profile>, ClientError> {
        self.call(Method::GET, "get-profile", None::<&()>).await
    }

    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile, ClientError> {
        self.call(Method::POST, "update-profile", Some(profile)).await
    }

    pub async fn get_codrivers(&self) -> Result<Vec<Codriver>, ClientError> {
        self.call(Method::GET, "get-codrivers", None::<&()>).await
    }

    pub async fn add_codriver(&self, codriver: &NewCodriver) -> Result<Codriver, ClientError> {
        self.call(Method::POST, "add-codriver", Some(codriver)).await
    }

    pub async fn update_codriver(&self, update: &CodriverUpdate) -> Result<Codriver, ClientError> {
        self.call(Method::POST, "update-codriver", Some(update)).await
    }

    pub async fn delete_codriver(&self, id: Uuid) -> Result<Deleted, ClientError> {
        self.call(Method::POST, "delete-codriver", Some(&IdBody { id }))
            .await
    }

    pub async fn get_cars(&self) -> Result<Vec<Car>, ClientError> {
        self.call(Method::GET, "get-cars", None::<&()>).await
    }

    pub async fn add_car(&self, car: &NewCar) -> Result<Car, ClientError> {
        self.call(Method::POST, "add-car", Some(car)).await
    }

    pub async fn update_car(&self, update: &CarUpdate) -> Result<Car, ClientError> {
        self.call(Method::POST, "update-car", Some(update)).await
    }

    pub async fn delete_car(&self, id: Uuid) -> Result<Deleted, ClientError> {
        self.call(Method::POST, "delete-car", Some(&IdBody { id }))
            .await
    }

    pub async fn get_permissions(&self) -> Result<Vec<PermissionGrant>, ClientError> {
        self.call(Method::GET, "get-permissions", None::<&()>).await
    }

    /// Any failure, including not being signed in, reads as "not allowed".
    pub async fn has_create_rally_permission(&self) -> bool {
        match self.get_permissions().await {
            Ok(grants) => api::models::has_permission(&grants, &Permission::CreateRally),
            Err(e) => {
                tracing::debug!(error = %e, "permission query failed");
                false
            }
        }
    }

    pub async fn create_rally(&self, rally: &NewRally) -> Result<Rally, ClientError> {
        self.call(Method::POST, "create-rally", Some(rally)).await
    }

    /// Public listing; sent without a user token.
    pub async fn get_rallies(&self) -> Result<Vec<Rally>, ClientError> {
        let request = self
            .request(Method::GET, "get-rallies")
            .bearer_auth(&self.anon_key);
        Self::read(request.send().await?).await
    }

    fn request(&self, method: Method, function: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.base_url, function))
            .header("apikey", &self.anon_key)
    }

    async fn call<B, T>(
        &self,
        method: Method,
        function: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self
            .session
            .validated_access_token()
            .await
            .map_err(|e| match e {
                SessionError::NotAuthenticated => ClientError::NotAuthenticated,
                SessionError::Provider(ProviderError::Http(e)) => ClientError::Http(e),
                _ => ClientError::Unauthorized,
            })?;

        let mut request = self
            .request(method, function)
            .bearer_auth(&self.anon_key)
            .header("x-access-token", format!("Bearer {token}"));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(function, "function rejected the session token");
            self.session.force_logout();
            return Err(ClientError::Unauthorized);
        }
        Self::read(response).await
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            let envelope: Envelope<T> = response.json().await?;
            return Ok(envelope.data);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Serialize)]
struct IdBody {
    id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::tests::{provider_session, FakeProvider};
    use crate::provider::AuthEvent;
    use store::MemoryStore;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn signed_in(server: &MockServer) -> FunctionsClient<MemoryStore, FakeProvider> {
        let config = ClientConfig::new(server.uri(), "anon-key");
        let manager = SessionManager::new(&config, MemoryStore::new(), FakeProvider::default());
        let session = provider_session("r1");
        *manager.provider().user.lock().unwrap() = Some(session.user.clone());
        manager.on_session_change(AuthEvent::SignedIn, Some(&session));
        FunctionsClient::new(&config, Arc::new(manager))
    }

    #[tokio::test]
    async fn test_sends_tokens_and_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/functions/v1/get-profile"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(header("x-access-token", "Bearer r1-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": null})))
            .mount(&server)
            .await;

        let client = signed_in(&server).await;
        assert_eq!(client.get_profile().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unauthorized_forces_logout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/functions/v1/get-cars"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Invalid or expired token"})),
            )
            .mount(&server)
            .await;

        let client = signed_in(&server).await;
        assert!(matches!(client.get_cars().await, Err(ClientError::Unauthorized)));
        assert!(!client.session().snapshot().is_authenticated());
        assert!(client.session().storage().is_empty());
        assert!(matches!(client.get_cars().await, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path("/functions/v1/delete-car"))
            .and(body_json(serde_json::json!({"id": id})))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "Car not found or access denied"})),
            )
            .mount(&server)
            .await;

        let client = signed_in(&server).await;
        match client.delete_car(id).await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Car not found or access denied");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permission_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/functions/v1/get-permissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"permission": "admin", "createdAt": "2024-03-01T10:00:00Z"}]
            })))
            .mount(&server)
            .await;

        let client = signed_in(&server).await;
        assert!(!client.has_create_rally_permission().await);
        server.reset().await;

        Mock::given(method("GET"))
            .and(path("/functions/v1/get-permissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"permission": "create_rally", "createdAt": "2024-03-01T10:00:00Z"}]
            })))
            .mount(&server)
            .await;
        assert!(client.has_create_rally_permission().await);

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/functions/v1/get-permissions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        assert!(!client.has_create_rally_permission().await);
    }

    #[tokio::test]
    async fn test_provider_rejection_skips_the_function() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/functions/v1/get-codrivers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .expect(0)
            .mount(&server)
            .await;

        let client = signed_in(&server).await;
        *client.session().provider().user.lock().unwrap() = None;

        assert!(matches!(client.get_codrivers().await, Err(ClientError::Unauthorized)));
        assert!(!client.session().snapshot().is_authenticated());
    }
}
