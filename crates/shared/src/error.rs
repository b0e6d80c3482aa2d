use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Conflict,
    #[default]
    Internal,
}

/// JSON error body of the `/items` API. Only `message` is guaranteed by older
/// backends, so `code` falls back to `internal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: ErrorCode,
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ApiException {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiException {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(main_id: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("Control not found: {main_id}"))
    }

    pub fn duplicate(main_id: &str) -> Self {
        Self::new(
            ErrorCode::Conflict,
            format!("Duplicate mainID found: {main_id}"),
        )
    }

    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::new(
            ErrorCode::Validation,
            format!("Missing required fields: {}", fields.join(", ")),
        )
    }
}

impl From<ApiException> for ApiError {
    fn from(value: ApiException) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}
