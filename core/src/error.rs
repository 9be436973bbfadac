//! Error types for the JSON REST client.
//!
//! # Design
//! Construction errors (`InvalidMethod`, `InvalidUrl`, `NoRuntime`) are
//! returned synchronously before any I/O. The rest describe how a submitted
//! request failed, so callers can branch on connection vs. protocol vs.
//! parse failures instead of reading a log line.

/// Errors produced while building, sending, or parsing a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Dispatching needs a tokio runtime to spawn the request task on.
    #[error("no async runtime available to run the request")]
    NoRuntime,

    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport could not obtain a response (DNS, TCP, TLS, body read).
    #[error("connection error: {0}")]
    Connection(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    Protocol { status: u16, body: String },

    /// A 2xx body was not valid JSON.
    #[error("invalid JSON in response: {0}")]
    Parse(String),
}

impl RequestError {
    pub fn is_connection(&self) -> bool {
        matches!(self, RequestError::Connection(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, RequestError::Protocol { .. })
    }

    /// HTTP status for protocol errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}
