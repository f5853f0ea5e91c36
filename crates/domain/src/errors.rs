//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::DEFAULT_ERROR_MESSAGE;

/// A non-success response reported by the backend.
///
/// Built once per failed call from the response status, the `{code, message,
/// details}` body and the `X-Request-ID` header, then handed to the caller
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ClientError {
    /// HTTP status code of the failed response.
    pub status: u16,
    /// Server supplied message, or the generic fallback.
    pub message: String,
    /// Machine readable category such as `AUTH_INVALID_CREDENTIALS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Opaque server structure, copied through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Correlation id from the `X-Request-ID` response header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ClientError {
    /// Error with the generic message and nothing else attached.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            message: DEFAULT_ERROR_MESSAGE.to_string(),
            code: None,
            details: None,
            request_id: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Whether the backend rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Best known correlation id for support references.
    ///
    /// Prefers the response header, then `details.requestId`, then
    /// `details.context.requestId`.
    pub fn trace_id(&self) -> Option<&str> {
        if let Some(id) = self.request_id.as_deref().filter(|id| !id.is_empty()) {
            return Some(id);
        }
        let details = self.details.as_ref()?;
        details
            .get("requestId")
            .and_then(Value::as_str)
            .or_else(|| details.pointer("/context/requestId").and_then(Value::as_str))
            .filter(|id| !id.is_empty())
    }
}

/// Main error type for Portico
///
/// `Clone` so that every caller joined on one in-flight fetch receives the
/// same failure.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PorticoError {
    #[error(transparent)]
    Api(ClientError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PorticoError {
    /// The backend error, when this failure came from a non-2xx response.
    pub fn as_client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.as_client_error().is_some_and(ClientError::is_unauthorized)
    }
}

impl From<ClientError> for PorticoError {
    fn from(value: ClientError) -> Self {
        Self::Api(value)
    }
}

/// Result type alias for Portico operations
pub type Result<T> = std::result::Result<T, PorticoError>;

/// Render an error for display next to a form or banner.
///
/// Backend errors carry a `(ref: <id>)` suffix when a correlation id is
/// known. `fallback` replaces an empty message.
pub fn format_api_error(error: &PorticoError, fallback: &str) -> String {
    match error {
        PorticoError::Api(err) => {
            let message = if err.message.is_empty() { fallback } else { err.message.as_str() };
            match err.trace_id() {
                Some(id) => format!("{message} (ref: {id})"),
                None => message.to_string(),
            }
        }
        other => {
            let message = other.to_string();
            if message.is_empty() {
                fallback.to_string()
            } else {
                message
            }
        }
    }
}
