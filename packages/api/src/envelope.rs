//! Response envelopes: `{"data": ...}` on success, `{"error": "..."}` on failure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Failed response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Payload of the delete functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deleted {
    pub success: bool,
    pub id: Uuid,
}

impl Deleted {
    pub fn new(id: Uuid) -> Self {
        Self { success: true, id }
    }
}
