//! Error types for mail-retrieval

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to select {folder}: {reason}")]
    Select { folder: String, reason: String },

    #[error("Failed to fetch message {id}: {reason}")]
    Fetch { id: u32, reason: String },

    #[error("Email parsing error: {0}")]
    Parse(#[from] ParseError),
}

/// Reasons a FETCH response could not be turned into an
/// [`Email`](crate::Email).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A required field was never written by any fragment.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("malformed MIME message: {0}")]
    Mime(String),

    #[error("malformed INTERNALDATE {value:?}: {reason}")]
    InternalDate { value: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
