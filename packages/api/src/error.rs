//! # Error taxonomy shared by every rally function
//!
//! [`ApiError`] is the single error type handlers return. Each variant fixes the
//! HTTP status; the `Display` text is the human-readable string that ends up in
//! the `{"error": "..."}` envelope. Nothing else about an error reaches the
//! caller: internal failures are logged where they happen and surface with a
//! fixed message.
//!
//! | Variant | Status | Raised for |
//! |---------|--------|------------|
//! | `BadRequest` | 400 | malformed JSON, missing required fields, invalid ids |
//! | `Unauthorized` | 401 | no bearer token, token rejected by the identity provider |
//! | `Forbidden` | 403 | authenticated caller lacks a permission grant |
//! | `NotFound` | 404 | row absent **or** owned by someone else |
//! | `MethodNotAllowed` | 405 | wrong HTTP method on a known route |
//! | `Internal` | 500 | database or configuration failures |

/// Errors returned by the rally functions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed => 405,
            Self::Internal(_) => 500,
        }
    }
}

#[cfg(feature = "server")]
mod response {
    use axum::extract::rejection::JsonRejection;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    use super::ApiError;
    use crate::envelope::ErrorBody;

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ErrorBody::new(self.to_string()))).into_response()
        }
    }

    impl From<JsonRejection> for ApiError {
        fn from(rejection: JsonRejection) -> Self {
            ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
        }
    }
}
