//! Error taxonomy: remote failures (transport or service envelope) and the
//! handful of local precondition failures the fetchers and aggregator raise.

use std::collections::BTreeMap;
use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single failed request. Surfaced to the caller unmodified; never retried here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// The service answered with an `error` envelope.
    #[error("VK API: method: {method} | params: {params:?} | code: {code} | msg: {message}")]
    Service {
        code: i64,
        message: String,
        method: String,
        params: BTreeMap<String, String>,
    },

    /// The transport completed but signalled a non-success HTTP status.
    #[error("VK API: method: {method} | HTTP status {status}")]
    Status { status: u16, method: String },

    /// The request never produced a response (connect, TLS, timeout, body read).
    #[error("VK API: method: {method} | transport failure: {reason}")]
    Transport { method: String, reason: String },

    /// A response body that carries neither `response` nor `error`.
    #[error("VK API: method: {method} | malformed response: {reason}")]
    Malformed { method: String, reason: String },
}

/// Library error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A username/domain could not be resolved to a canonical id.
    #[error("user name {0} doesn't exist")]
    UnresolvedIdentifier(String),

    /// Aggregation invoked with zero collections.
    #[error("aggregation requires at least one collection")]
    EmptyInput,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
