//! Unified error types for icondex.
//!
//! Internal layers return these as `Result` values. The public favicon entry
//! points collapse them into their always-succeeds contract, so these only
//! surface through cache maintenance tools.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for icondex.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// No cache record found for the given domain.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Cache store cannot be reached at all.
    #[error("CACHE_ERROR: store unavailable: {0}")]
    CacheUnavailable(String),

    /// A fetch did not produce a usable response.
    #[error("FETCH_FAILED: {0}")]
    FetchFailed(String),

    /// SSRF blocked - private/internal address not allowed.
    #[error("SSRF_BLOCKED: {0}")]
    SsrfBlocked(String),

    /// Web app manifest could not be parsed.
    #[error("MANIFEST_INVALID: {0}")]
    ManifestInvalid(String),

    /// HTTP client could not be constructed.
    #[error("CLIENT_BUILD: {0}")]
    ClientBuild(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::CacheUnavailable(msg) => (-32002, msg.clone()),
            Error::FetchFailed(msg) => (-32008, msg.clone()),
            Error::SsrfBlocked(msg) => (-32004, msg.clone()),
            Error::ManifestInvalid(msg) => (-32000, msg.clone()),
            Error::ClientBuild(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
