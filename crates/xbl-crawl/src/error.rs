//! Error types for xbl-crawl.
//!
//! The remote lookups each have their own classification enum so that the
//! scheduler has to handle every outcome explicitly. Only [`PersistenceError`]
//! is allowed to escape the crawl loop.

use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a remote call that says nothing about the node itself.
#[derive(Debug, Error)]
pub enum TransientError {
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a status that has no specific meaning.
    #[error("unexpected status: {0}")]
    Status(StatusCode),

    /// The response body did not have the expected shape.
    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Classified failure of a gamertag → XUID lookup.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No account matches the gamertag, or the lookup was forbidden.
    #[error("no matching account")]
    NotFound,

    /// The service refused the lookup because the quota is exhausted.
    #[error("rate limited")]
    RateLimited,

    /// Network or protocol failure.
    #[error(transparent)]
    Transient(#[from] TransientError),
}

/// Classified failure of a friends-list lookup.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The service refused the lookup because the quota is exhausted.
    #[error("rate limited")]
    RateLimited,

    /// The account exists but its friends list is private.
    #[error("friends list is not accessible")]
    Unreachable,

    /// Network or protocol failure.
    #[error(transparent)]
    Transient(#[from] TransientError),
}

/// The output file could not be written.
#[derive(Debug, Error)]
#[error("failed to write discovered gamertags to {}: {source}", path.display())]
pub struct PersistenceError {
    /// Destination that failed
    pub path: PathBuf,
    /// Underlying IO error
    #[source]
    pub source: io::Error,
}

impl PersistenceError {
    /// Wrap an IO error raised while writing `path`.
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// The error type for xbl-crawl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Discovered gamertags could not be persisted.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A specialized Result type for xbl-crawl operations.
pub type Result<T> = std::result::Result<T, Error>;
