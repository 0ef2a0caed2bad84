//! Error types for the Pipedrive API client.
//!
//! # Design
//! Every failure falls into one of four classes, each with its own type so a
//! caller can match on exactly the class it cares about:
//!
//! - `ValidationError`: required fields missing; raised before any I/O.
//! - `TransportError`: the transport could not produce a response. The
//!   underlying error is kept as-is and can be downcast.
//! - `ApiError`: the server answered with a non-2xx status (or a 2xx with
//!   `success: false`).
//! - `DecodeError`: the body did not match the expected envelope or shape.
//!
//! Nothing here is logged or retried; every error goes straight back to the
//! caller.

use std::fmt;

use thiserror::Error;

/// Top-level error returned by every client operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Required or conditionally-required fields were not supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {operation} request: {}", .violations.join("; "))]
pub struct ValidationError {
    pub operation: &'static str,
    pub violations: Vec<String>,
}

/// The transport failed before a response was received.
#[derive(Debug, Error)]
#[error("transport error: {source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Borrow the collaborator's original error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.source
    }
}

/// The server rejected the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ApiError {
    pub status: u16,
    /// The envelope's `error` field, when the body carried one.
    pub message: Option<String>,
    /// The envelope's `error_info` field, when the body carried one.
    pub error_info: Option<String>,
    /// Raw response body, kept for diagnostics.
    pub body: String,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error (HTTP {})", self.status)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(info) = &self.error_info {
            write!(f, " ({info})")?;
        }
        Ok(())
    }
}

/// The response body did not match the expected shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A 2xx response without the `data` payload the operation requires.
    #[error("response envelope has no data")]
    MissingData,

    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed pagination in {field}: {source}")]
    Pagination {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
