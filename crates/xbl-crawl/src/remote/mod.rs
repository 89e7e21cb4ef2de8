//! Remote lookups used to expand a node of the friends graph.
//!
//! The crawler only talks to the remote service through two traits:
//!
//! - [`IdentityResolver`]: gamertag → XUID
//! - [`ConnectionFetcher`]: XUID → friend gamertags
//!
//! [`XblClient`] implements both against the OpenXBL REST API. Tests plug in
//! scripted implementations instead.
//!
//! Both operations are read-only and idempotent, so retrying them is always
//! safe. Each classifies its failures so the scheduler can decide between
//! skipping a node and aborting the run.

use crate::domain::{Gamertag, Xuid};
use crate::error::{FetchError, ResolveError};
use async_trait::async_trait;
use std::sync::Arc;

pub mod xbl;

pub use xbl::XblClient;

/// Maps a gamertag to the remote service's stable identifier.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Look up the XUID of `gamertag`.
    ///
    /// # Errors
    ///
    /// - `ResolveError::NotFound` if no account matches or the lookup is forbidden
    /// - `ResolveError::RateLimited` if the quota is exhausted
    /// - `ResolveError::Transient` for anything else
    async fn resolve(&self, gamertag: &Gamertag) -> Result<Xuid, ResolveError>;
}

/// Lists the direct connections of an account.
#[async_trait]
pub trait ConnectionFetcher: Send + Sync {
    /// Fetch the gamertags of every friend of `xuid`.
    ///
    /// # Errors
    ///
    /// - `FetchError::RateLimited` if the quota is exhausted
    /// - `FetchError::Unreachable` if the friends list is private
    /// - `FetchError::Transient` for anything else
    async fn fetch_connections(&self, xuid: &Xuid) -> Result<Vec<Gamertag>, FetchError>;
}

#[async_trait]
impl<T: IdentityResolver + ?Sized> IdentityResolver for Arc<T> {
    async fn resolve(&self, gamertag: &Gamertag) -> Result<Xuid, ResolveError> {
        (**self).resolve(gamertag).await
    }
}

#[async_trait]
impl<T: ConnectionFetcher + ?Sized> ConnectionFetcher for Arc<T> {
    async fn fetch_connections(&self, xuid: &Xuid) -> Result<Vec<Gamertag>, FetchError> {
        (**self).fetch_connections(xuid).await
    }
}
