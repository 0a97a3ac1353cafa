use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::{router, AppState};
use crate::auth::{IdentityVerifier, VerifiedUser, VerifyError};
use crate::db::MemoryRepository;
use crate::models::Permission;

/// Accepts a fixed set of tokens.
struct FakeVerifier {
    users: HashMap<String, VerifiedUser>,
}

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, VerifyError> {
        self.users
            .get(token)
            .cloned()
            .ok_or(VerifyError::Rejected(StatusCode::UNAUTHORIZED))
    }
}

struct TestApp {
    app: Router,
    repo: Arc<MemoryRepository>,
    alice: Uuid,
    bob: Uuid,
}

fn user(id: Uuid) -> VerifiedUser {
    VerifiedUser {
        id,
        email: Some(format!("{id}@example.com")),
        email_confirmed: true,
    }
}

fn test_app() -> TestApp {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let verifier = FakeVerifier {
        users: HashMap::from([
            ("alice-token".to_string(), user(alice)),
            ("bob-token".to_string(), user(bob)),
        ]),
    };
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::new(repo.clone(), Arc::new(verifier));

    TestApp {
        app: router(state),
        repo,
        alice,
        bob,
    }
}

impl TestApp {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }
}

fn car_body(registration: &str) -> Value {
    json!({
        "make": "Subaru",
        "model": "Impreza",
        "year": "2004",
        "registrationNumber": registration,
        "engine": {"capacity": "1994", "type": "turbo", "capacityMultiplier": 1.7},
        "insurance": {"policyNumber": "PL-1", "expiryDate": "2025-12-31"}
    })
}

fn codriver_body() -> Value {
    json!({"name": "Piotr", "email": "piotr@example.com", "phone": "+48 600 000 000"})
}

fn rally_body() -> Value {
    json!({
        "name": "Rajd Rzeszowski",
        "date": "2025-08-07",
        "organizer": {"name": "Automobilklub Rzeszowski"},
        "registration": {
            "opens": "2025-06-01",
            "closes": "2025-07-20",
            "fee": 1200,
            "currency": "PLN",
            "paymentMethods": ["bank_transfer"]
        },
        "description": "Runda RSMP",
        "shortDescription": "RSMP"
    })
}

const PROTECTED: &[(&str, &str)] = &[
    ("GET", "/functions/v1/get-profile"),
    ("POST", "/functions/v1/update-profile"),
    ("GET", "/functions/v1/get-codrivers"),
    ("POST", "/functions/v1/add-codriver"),
    ("POST", "/functions/v1/update-codriver"),
    ("POST", "/functions/v1/delete-codriver"),
    ("GET", "/functions/v1/get-cars"),
    ("POST", "/functions/v1/add-car"),
    ("POST", "/functions/v1/update-car"),
    ("POST", "/functions/v1/delete-car"),
    ("GET", "/functions/v1/get-permissions"),
    ("POST", "/functions/v1/create-rally"),
];

#[tokio::test]
async fn test_protected_functions_reject_missing_and_invalid_tokens() {
    let t = test_app();

    for (method, uri) in PROTECTED {
        let method = Method::from_bytes(method.as_bytes()).unwrap();
        let body = (method == Method::POST).then(|| json!({}));

        let (status, body_json) = t.call(method.clone(), uri, None, body.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} without token");
        assert!(body_json["error"].is_string());

        let (status, _) = t.call(method, uri, Some("forged"), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} with invalid token");
    }

    assert_eq!(t.repo.operations(), 0);
}

#[tokio::test]
async fn test_access_token_header_takes_precedence() {
    let t = test_app();
    let request = Request::builder()
        .uri("/functions/v1/get-profile")
        .header("authorization", "Bearer public-anon-key")
        .header("x-access-token", "alice-token")
        .body(Body::empty())
        .unwrap();

    let (status, body) = t.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_profile_update_then_get_round_trips() {
    let t = test_app();
    let (status, updated) = t
        .post(
            "/functions/v1/update-profile",
            "alice-token",
            json!({
                "name": "Jan Kowalski",
                "team": "",
                "club": "AK Rzeszów",
                "birthDate": "01.02.1990",
                "drivingLicenseNumber": "ABC123",
                "sportsLicense": true,
                "email": "jan@example.com",
                "iceContact": {"name": "Anna", "phone": "600100200"}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["team"], Value::Null);

    let (status, fetched) = t.get("/functions/v1/get-profile", "alice-token").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (_, other) = t.get("/functions/v1/get-profile", "bob-token").await;
    assert_eq!(other["data"], Value::Null);
}

#[tokio::test]
async fn test_profile_requires_name_and_email() {
    let t = test_app();
    let (status, body) = t
        .post("/functions/v1/update-profile", "alice-token", json!({"name": "Jan"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and email are required");
}

#[tokio::test]
async fn test_codriver_lifecycle_and_ownership() {
    let t = test_app();
    let (status, created) = t
        .post("/functions/v1/add-codriver", "alice-token", codriver_body())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["userId"], t.alice.to_string());

    let mut update = codriver_body();
    update["id"] = json!(id);
    update["club"] = json!("AK Krosno");

    let (status, body) = t
        .post("/functions/v1/update-codriver", "bob-token", update.clone())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Codriver not found or access denied");

    let (status, _) = t
        .post("/functions/v1/delete-codriver", "bob-token", json!({"id": id}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = t
        .post("/functions/v1/update-codriver", "alice-token", update)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = t.get("/functions/v1/get-codrivers", "alice-token").await;
    assert_eq!(listed["data"][0], updated["data"]);

    let (status, deleted) = t
        .post("/functions/v1/delete-codriver", "alice-token", json!({"id": id}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"], json!({"success": true, "id": id}));
}

#[tokio::test]
async fn test_update_requires_id() {
    let t = test_app();
    let (status, body) = t
        .post("/functions/v1/update-car", "alice-token", car_body("RZ 1"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: id");
}

#[tokio::test]
async fn test_car_update_then_get_round_trips() {
    let t = test_app();
    let (_, created) = t.post("/functions/v1/add-car", "alice-token", car_body("RZ 1")).await;
    let id = created["data"]["id"].clone();

    let mut update = car_body("RZ 2");
    update["id"] = id;
    update["engine"]["capacityMultiplier"] = json!("1.5");
    let (status, updated) = t.post("/functions/v1/update-car", "alice-token", update).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["engine"]["capacityMultiplier"], 1.5);

    let (_, listed) = t.get("/functions/v1/get-cars", "alice-token").await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0], updated["data"]);
}

#[tokio::test]
async fn test_cars_of_other_users_are_not_found() {
    let t = test_app();
    let (_, created) = t.post("/functions/v1/add-car", "alice-token", car_body("RZ 1")).await;
    let id = created["data"]["id"].clone();

    let mut update = car_body("KR 666");
    update["id"] = id.clone();
    let (status, body) = t.post("/functions/v1/update-car", "bob-token", update).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Car not found or access denied");

    let (status, body) = t
        .post("/functions/v1/delete-car", "bob-token", json!({"id": id}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Car not found or access denied");

    let (_, listed) = t.get("/functions/v1/get-cars", "alice-token").await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0], created["data"]);
    assert_eq!(listed["data"][0]["userId"], t.alice.to_string());

    let (_, listed) = t.get("/functions/v1/get-cars", "bob-token").await;
    assert!(listed["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_two_cars_are_deleted_independently() {
    let t = test_app();
    let (status, first) = t.post("/functions/v1/add-car", "alice-token", car_body("RZ 1")).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) = t.post("/functions/v1/add-car", "alice-token", car_body("RZ 2")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(first["data"]["id"], second["data"]["id"]);

    let (_, listed) = t.get("/functions/v1/get-cars", "alice-token").await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);

    let (status, _) = t
        .post("/functions/v1/delete-car", "alice-token", json!({"id": first["data"]["id"]}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = t.get("/functions/v1/get-cars", "alice-token").await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["id"], second["data"]["id"]);

    let (status, _) = t
        .post("/functions/v1/delete-car", "alice-token", json!({"id": second["data"]["id"]}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = t.get("/functions/v1/get-cars", "alice-token").await;
    assert!(listed["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rally_requires_permission() {
    let t = test_app();

    let (status, body) = t
        .post("/functions/v1/create-rally", "alice-token", rally_body())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Missing required permission: create_rally");

    let (_, grants) = t.get("/functions/v1/get-permissions", "alice-token").await;
    assert_eq!(grants["data"], json!([]));

    t.repo.grant_permission(t.alice, Permission::CreateRally).await;

    let (status, created) = t
        .post("/functions/v1/create-rally", "alice-token", rally_body())
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["createdBy"], t.alice.to_string());

    let (status, listed) = t
        .call(Method::GET, "/functions/v1/get-rallies", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"][0]["name"], "Rajd Rzeszowski");

    let (status, _) = t
        .post("/functions/v1/create-rally", "bob-token", rally_body())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_permissions_are_sorted() {
    let t = test_app();
    t.repo.grant_permission(t.bob, Permission::CreateRally).await;
    t.repo.grant_permission(t.bob, Permission::Admin).await;

    let (status, body) = t.get("/functions/v1/get-permissions", "bob-token").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["permission"], "admin");
    assert_eq!(body["data"][1]["permission"], "create_rally");
}

#[tokio::test]
async fn test_options_answers_before_auth() {
    let t = test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/functions/v1/add-car")
        .body(Body::empty())
        .unwrap();

    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");

    let list = |name: &str| -> Vec<String> {
        headers[name]
            .to_str()
            .unwrap()
            .split(',')
            .map(|item| item.trim().to_ascii_lowercase())
            .collect()
    };
    assert_eq!(
        list("access-control-allow-headers"),
        vec!["authorization", "x-client-info", "apikey", "content-type", "x-access-token"]
    );
    assert_eq!(list("access-control-allow-methods"), vec!["get", "post", "options"]);
    assert_eq!(t.repo.operations(), 0);
}

#[tokio::test]
async fn test_wrong_method_and_malformed_body() {
    let t = test_app();

    let (status, body) = t
        .call(Method::GET, "/functions/v1/add-car", Some("alice-token"), None)
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/functions/v1/add-car")
        .header("authorization", "Bearer alice-token")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = t.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_health_is_public() {
    let t = test_app();
    let (status, body) = t.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
