//! Domain types for the friends-graph crawl.
//!
//! This module contains the identifiers the crawler moves around and the
//! tagged outcome produced by expanding a single node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable name of an Xbox Live account.
///
/// Gamertags are compared exactly (case-sensitive) and are the key used to
/// deduplicate nodes across a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gamertag(pub String);

impl Gamertag {
    /// Create a new gamertag
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Borrow the gamertag as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Gamertag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Gamertag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Gamertag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Stable account identifier assigned by Xbox Live.
///
/// Only used to look up a friends list right after resolving a gamertag;
/// it is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Xuid(pub String);

impl Xuid {
    /// Create a new XUID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the XUID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Xuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of expanding one gamertag (resolve, then fetch friends).
///
/// Produced once per dequeue and consumed by the scheduler; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// The node was expanded; these are its direct connections in the order
    /// the remote service returned them.
    Connections(Vec<Gamertag>),

    /// The remote quota is exhausted. The whole run must stop.
    RateLimited,

    /// The node does not exist or its friends list is not accessible.
    NotFound,

    /// Network or protocol failure; the node is dropped for this run.
    TransientFailure,
}

impl Expansion {
    /// Short lowercase label used in log fields.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Expansion::Connections(_) => "connections",
            Expansion::RateLimited => "rate_limited",
            Expansion::NotFound => "not_found",
            Expansion::TransientFailure => "transient_failure",
        }
    }
}
