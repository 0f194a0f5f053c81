use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, FieldErrors};

/// Envelope exactly as the backend sends it:
/// `{ "success": bool, "message": string?, "data": any, "timestamp": string }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// What a response actually means once `success` and `data` are read together
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Ok(T),
    /// 400-style failure carrying field name → message pairs
    ValidationError(FieldErrors),
    OtherError(String),
}

/// Typed envelope handed back by the resource clients
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub outcome: ApiOutcome<T>,
    pub message: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
}

const DEFAULT_FAILURE: &str = "Request failed";

impl RawEnvelope {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClientError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Field map carried in `data`, if `data` looks like one
    pub fn field_errors(&self) -> Option<FieldErrors> {
        field_map(&self.data)
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Interpret a raw envelope. Only a successful envelope decodes `data` as `T`.
    pub fn from_raw(raw: RawEnvelope) -> Result<Self, ClientError> {
        let timestamp = raw.parsed_timestamp();
        let outcome = if raw.success {
            ApiOutcome::Ok(serde_json::from_value(raw.data)?)
        } else if let Some(fields) = field_map(&raw.data) {
            ApiOutcome::ValidationError(fields)
        } else {
            ApiOutcome::OtherError(
                raw.message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FAILURE.to_string()),
            )
        };

        Ok(Self {
            outcome,
            message: raw.message,
            timestamp,
        })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClientError> {
        Self::from_raw(RawEnvelope::from_slice(bytes)?)
    }
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ApiOutcome::Ok(_))
    }

    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            ApiOutcome::Ok(data) => Some(data),
            _ => None,
        }
    }

    /// Collapse into a `Result`, turning failure outcomes into `ClientError::Rejected`
    pub fn into_result(self) -> Result<T, ClientError> {
        match self.outcome {
            ApiOutcome::Ok(data) => Ok(data),
            ApiOutcome::ValidationError(fields) => Err(ClientError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "Validation failed".to_string()),
                field_errors: Some(fields),
            }),
            ApiOutcome::OtherError(message) => Err(ClientError::Rejected {
                message,
                field_errors: None,
            }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        let outcome = match self.outcome {
            ApiOutcome::Ok(data) => ApiOutcome::Ok(f(data)),
            ApiOutcome::ValidationError(fields) => ApiOutcome::ValidationError(fields),
            ApiOutcome::OtherError(message) => ApiOutcome::OtherError(message),
        };
        Envelope {
            outcome,
            message: self.message,
            timestamp: self.timestamp,
        }
    }
}

/// Build the error for a non-2xx response from whatever body came back.
///
/// The body is usually an envelope, but proxies and the servlet container can
/// answer with plain text or nothing at all.
pub fn error_from_body(status: u16, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<RawEnvelope>(body) {
        Ok(raw) => {
            let field_errors = raw.field_errors();
            ClientError::http(status, raw.message.filter(|m| !m.is_empty()), field_errors)
        }
        Err(_) => ClientError::http(status, None, None),
    }
}

/// A non-empty JSON object whose values are all strings
fn field_map(data: &Value) -> Option<FieldErrors> {
    let object = data.as_object()?;
    if object.is_empty() {
        return None;
    }

    object
        .iter()
        .map(|(field, message)| message.as_str().map(|m| (field.clone(), m.to_string())))
        .collect()
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    value
        .parse::<NaiveDateTime>()
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}
