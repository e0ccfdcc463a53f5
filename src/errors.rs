//! Error Types
//!
//! Failures surfaced by the session monitor and the server commands behind it.

use wasm_bindgen::JsValue;

/// Failure of a request to the server
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Failure to start or drive the session countdown
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no browser window available")]
    NoWindow,

    #[error("element '{id}' not found")]
    MissingElement { id: String },

    #[error("invalid session timeout configuration: {message}")]
    InvalidConfig { message: String },

    #[error("session timeout has not been started")]
    NotStarted,
}

impl From<SessionError> for JsValue {
    fn from(err: SessionError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
