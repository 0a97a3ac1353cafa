//! Per-request authorization: `NoToken -> TokenPresent -> Verified | Invalid`.
//!
//! [`AuthUser`] is the axum extractor every protected handler takes. Both
//! failure states end the request with 401 before the handler body runs, so
//! no repository call happens for an unauthenticated request.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::verifier::{SharedVerifier, VerifiedUser};
use crate::db::Repository;
use crate::error::ApiError;
use crate::models::Permission;

/// Header carrying the user token when `Authorization` holds the public key.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Token from `x-access-token` if present, otherwise from `Authorization: Bearer`.
/// `x-access-token` may carry the token bare or with the `Bearer ` scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = header_str(headers, ACCESS_TOKEN_HEADER) {
        return Some(strip_scheme(token).unwrap_or(token).trim()).filter(|t| !t.is_empty());
    }

    header_str(headers, AUTHORIZATION.as_str())
        .and_then(strip_scheme)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn strip_scheme(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
}

/// Authenticated caller of a protected function.
#[derive(Debug, Clone)]
pub struct AuthUser(pub VerifiedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SharedVerifier: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let verifier = SharedVerifier::from_ref(state);
        match verifier.verify(token).await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "token verified");
                Ok(AuthUser(user))
            }
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed");
                Err(ApiError::unauthorized("Invalid or expired token"))
            }
        }
    }
}

/// Fail with 403 unless the caller holds `permission`. Re-queried every call.
pub async fn require_permission(
    repository: &dyn Repository,
    user: &VerifiedUser,
    permission: Permission,
) -> Result<(), ApiError> {
    let granted = repository
        .has_permission(user.id, &permission)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user.id, "permission lookup failed");
            ApiError::internal("Failed to check permissions")
        })?;

    if granted {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Missing required permission: {permission}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer user-jwt"));
        assert_eq!(bearer_token(&headers), Some("user-jwt"));
    }

    #[test]
    fn test_access_token_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer anon-key"));
        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static("user-jwt"));
        assert_eq!(bearer_token(&headers), Some("user-jwt"));

        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static("Bearer user-jwt"));
        assert_eq!(bearer_token(&headers), Some("user-jwt"));

        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static(""));
        assert_eq!(bearer_token(&headers), Some("anon-key"));
    }
}
