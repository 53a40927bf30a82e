pub mod health_check;
pub mod pages;
pub mod todos;
pub mod users;

use axum::body::Bytes;
use serde_json::Value;

use crate::errors::ApiError;

/// Parses a request body as JSON. A body that is empty or only whitespace
/// yields `None`, which some handlers give a meaning of their own.
pub(crate) fn json_body(body: &Bytes) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(|e| {
        tracing::warn!("Malformed JSON body: {}", e);
        ApiError::Validation("Malformed JSON body".into())
    })
}

/// Like [`json_body`], but an absent body is a validation error.
pub(crate) fn required_json_body(body: &Bytes) -> Result<Value, ApiError> {
    json_body(body)?.ok_or_else(|| ApiError::Validation("Request body is required".into()))
}
