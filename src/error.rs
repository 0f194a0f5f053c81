// Client error types
use std::collections::HashMap;
use thiserror::Error;

use crate::storage::StorageError;

/// Field name → server validation message, as returned in a 400 envelope
pub type FieldErrors = HashMap<String, String>;

/// Errors surfaced by the client runtime
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend answered with a non-2xx status
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Http {
        status: u16,
        message: Option<String>,
        field_errors: Option<FieldErrors>,
    },

    /// Backend answered 2xx but the envelope reported `success: false`
    #[error("request rejected: {message}")]
    Rejected {
        message: String,
        field_errors: Option<FieldErrors>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("realtime error: {0}")]
    Realtime(String),

    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    #[error("pipeline stage timed out: {0}")]
    Timeout(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// HTTP status code, if the error came from a backend response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server supplied message, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Http { message, .. } => message.as_deref(),
            ClientError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Per-field validation errors carried by a 400 response
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Http { field_errors, .. } | ClientError::Rejected { field_errors, .. } => {
                field_errors.as_ref().filter(|fields| !fields.is_empty())
            }
            _ => None,
        }
    }

    /// Stable error code for logging and CLI output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Http { status, .. } => match status {
                400 => "BAD_REQUEST",
                401 => "UNAUTHORIZED",
                402 => "PLAN_LIMIT_EXCEEDED",
                403 => "FORBIDDEN",
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                429 => "TOO_MANY_REQUESTS",
                500 => "INTERNAL_SERVER_ERROR",
                502 => "BAD_GATEWAY",
                503 => "SERVICE_UNAVAILABLE",
                _ => "HTTP_ERROR",
            },
            ClientError::Rejected { .. } => "REJECTED",
            ClientError::Transport(_) => "TRANSPORT",
            ClientError::Decode(_) => "INVALID_RESPONSE",
            ClientError::Url(_) => "INVALID_URL",
            ClientError::Storage(_) => "STORAGE",
            ClientError::Realtime(_) => "REALTIME",
            ClientError::Unauthenticated(_) => "UNAUTHENTICATED",
            ClientError::Timeout(_) => "TIMEOUT",
            ClientError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    pub fn http(status: u16, message: Option<String>, field_errors: Option<FieldErrors>) -> Self {
        ClientError::Http {
            status,
            message,
            field_errors,
        }
    }

    pub fn realtime(message: impl Into<String>) -> Self {
        ClientError::Realtime(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ClientError::Unauthenticated(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ClientError::InvalidInput(message.into())
    }
}
