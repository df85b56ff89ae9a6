//! Errors raised while talking to the library backend

use serde_json::Value;
use thiserror::Error;

/// Failure of one backend call.
///
/// Views treat every variant the same way; the distinction exists for logs
/// and for front ends that want to report something more specific.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("validation error: {message}")]
    Validation {
        details: Vec<Value>,
        message: String,
    },

    #[error("backend responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(details: Vec<Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    /// Create an error for any other non-success status
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Decode a non-success response. The backend reports
    /// `{"detail": "..."}` for missing resources and
    /// `{"detail": [...]}` for rejected payloads.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|mut value| value.get_mut("detail").map(Value::take));

        let message = match &detail {
            Some(Value::String(message)) => message.clone(),
            _ if body.trim().is_empty() => format!("HTTP {status}"),
            _ => body.trim().to_string(),
        };

        match (status, detail) {
            (404, _) => Self::not_found(message),
            (422, Some(Value::Array(details))) => {
                Self::validation(details, "request validation failed")
            }
            (422, _) => Self::validation(Vec::new(), message),
            _ => Self::status(status, message),
        }
    }

    /// HTTP status behind the error, when the backend answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Validation { .. } => Some(422),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}
