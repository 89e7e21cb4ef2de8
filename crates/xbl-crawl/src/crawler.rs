//! Breadth-first crawl of the friends graph.
//!
//! [`Crawler`] drives one node at a time through
//! `Queued → Resolving → Expanding → {Recorded | Skipped | Aborted}`:
//!
//! 1. Pop the head of the [`Frontier`]; skip it if already visited.
//! 2. Resolve the gamertag and fetch its friends ([`Crawler::expand`]).
//! 3. On success, mark it visited, persist the friends through the
//!    [`ResultSink`], append them to the frontier tail and pause for the
//!    configured request delay.
//! 4. On `NotFound`/`TransientFailure`, drop the node for this run. It is not
//!    marked visited, so it is expanded again if another friends list
//!    rediscovers it.
//! 5. On `RateLimited`, stop the whole run. The service gives no reliable
//!    reset signal, so there is no backoff.
//!
//! Everything happens in sequence on the caller's task; the next dequeue never
//! starts before the previous node's writes and delay have completed.
//!
//! # Example
//!
//! ```no_run
//! use xbl_crawl::config::{ApiKey, CrawlConfig, Settings};
//! use xbl_crawl::crawler::Crawler;
//! use xbl_crawl::domain::Gamertag;
//! use xbl_crawl::frontier::Frontier;
//! use xbl_crawl::remote::XblClient;
//! use xbl_crawl::sink::LineFileSink;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new(ApiKey::load(".env".as_ref())?, CrawlConfig::default());
//!     let client = XblClient::new(&settings)?;
//!     let sink = LineFileSink::new(&settings.crawl.output_file);
//!
//!     let mut crawler = Crawler::new(client.clone(), client, sink)
//!         .with_request_delay(settings.crawl.request_delay());
//!     let mut frontier = Frontier::new(Gamertag::new("Major Nelson"));
//!     let report = crawler.run(&mut frontier).await?;
//!     println!("expanded {} gamertags", report.expanded);
//!     Ok(())
//! }
//! ```

use crate::config::DEFAULT_REQUEST_DELAY_SECS;
use crate::domain::{Expansion, Gamertag};
use crate::error::{FetchError, PersistenceError, ResolveError};
use crate::frontier::Frontier;
use crate::remote::{ConnectionFetcher, IdentityResolver};
use crate::sink::ResultSink;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Why a popped gamertag was not expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Expanded earlier in this run.
    AlreadyVisited,
    /// Unknown account, hidden account or private friends list.
    NotFound,
    /// Network or protocol failure.
    TransientFailure,
}

/// What a single scheduler step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The frontier was empty; nothing happened.
    Drained,

    /// The gamertag was expanded and its friends recorded.
    Expanded {
        /// Expanded node
        gamertag: Gamertag,
        /// Number of friends recorded and enqueued
        connections: usize,
    },

    /// The gamertag was dropped.
    Skipped {
        /// Dropped node
        gamertag: Gamertag,
        /// Why it was dropped
        reason: SkipReason,
    },

    /// The remote quota is exhausted; the run must stop.
    Aborted {
        /// Node whose lookup hit the limit
        gamertag: Gamertag,
    },
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// Every reachable node was expanded or dropped.
    Exhausted,

    /// The run stopped on a rate limit.
    RateLimited {
        /// Node whose lookup hit the limit
        gamertag: Gamertag,
    },
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    /// How the run ended
    pub outcome: CrawlOutcome,
    /// Gamertags successfully expanded
    pub expanded: usize,
    /// Lines appended to the sink
    pub recorded: usize,
    /// Pops dropped as not found or after a transient failure
    pub skipped: usize,
    /// Pops dropped because the gamertag was already expanded
    pub duplicates: usize,
    /// Frontier entries left unprocessed
    pub remaining: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run ended
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Wall-clock duration of the run
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Whether the run explored everything it could reach.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.outcome == CrawlOutcome::Exhausted
    }
}

/// Breadth-first scheduler over the remote friends graph.
pub struct Crawler {
    resolver: Box<dyn IdentityResolver>,
    fetcher: Box<dyn ConnectionFetcher>,
    sink: Box<dyn ResultSink>,
    request_delay: Duration,
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("resolver", &"<dyn IdentityResolver>")
            .field("fetcher", &"<dyn ConnectionFetcher>")
            .field("sink", &"<dyn ResultSink>")
            .field("request_delay", &self.request_delay)
            .finish()
    }
}

impl Crawler {
    /// Create a crawler with the default request delay.
    pub fn new(
        resolver: impl IdentityResolver + 'static,
        fetcher: impl ConnectionFetcher + 'static,
        sink: impl ResultSink + 'static,
    ) -> Self {
        Self {
            resolver: Box::new(resolver),
            fetcher: Box::new(fetcher),
            sink: Box::new(sink),
            request_delay: Duration::from_secs(DEFAULT_REQUEST_DELAY_SECS),
        }
    }

    /// Set the pause applied after each successful expansion. Zero disables
    /// it.
    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Pause applied after each successful expansion
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    /// Resolve `gamertag` and fetch its friends, folding both lookups into a
    /// single outcome.
    ///
    /// A private friends list counts as `NotFound`.
    pub async fn expand(&self, gamertag: &Gamertag) -> Expansion {
        let xuid = match self.resolver.resolve(gamertag).await {
            Ok(xuid) => xuid,
            Err(ResolveError::RateLimited) => return Expansion::RateLimited,
            Err(ResolveError::NotFound) => return Expansion::NotFound,
            Err(ResolveError::Transient(_)) => return Expansion::TransientFailure,
        };

        match self.fetcher.fetch_connections(&xuid).await {
            Ok(friends) => Expansion::Connections(friends),
            Err(FetchError::RateLimited) => Expansion::RateLimited,
            Err(FetchError::Unreachable) => Expansion::NotFound,
            Err(FetchError::Transient(_)) => Expansion::TransientFailure,
        }
    }

    /// Process the head of `frontier`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if discovered gamertags could not be
    /// recorded. This is the only failure that escapes the scheduler.
    pub async fn step(&mut self, frontier: &mut Frontier) -> Result<Step, PersistenceError> {
        let Some(gamertag) = frontier.pop() else {
            return Ok(Step::Drained);
        };

        if frontier.is_visited(&gamertag) {
            tracing::debug!(gamertag = %gamertag, "Already expanded, skipping");
            return Ok(Step::Skipped {
                gamertag,
                reason: SkipReason::AlreadyVisited,
            });
        }

        let expansion = self.expand(&gamertag).await;
        let outcome = expansion.label();
        match expansion {
            Expansion::Connections(friends) => {
                frontier.mark_visited(gamertag.clone());
                self.sink.record_discovered(&friends).await?;

                let connections = friends.len();
                tracing::info!("{gamertag} -> {connections} friends found");

                frontier.extend(friends);
                self.pause().await;

                Ok(Step::Expanded {
                    gamertag,
                    connections,
                })
            }
            Expansion::RateLimited => {
                tracing::error!(gamertag = %gamertag, outcome, "Rate limit exceeded! Try again in 1 hour.");
                Ok(Step::Aborted { gamertag })
            }
            Expansion::NotFound => {
                tracing::warn!(
                    outcome,
                    "Failed to retrieve friends for {gamertag}: account not found or private, skipping"
                );
                Ok(Step::Skipped {
                    gamertag,
                    reason: SkipReason::NotFound,
                })
            }
            Expansion::TransientFailure => {
                tracing::warn!(
                    outcome,
                    "Failed to retrieve friends for {gamertag}; it will be retried if rediscovered"
                );
                Ok(Step::Skipped {
                    gamertag,
                    reason: SkipReason::TransientFailure,
                })
            }
        }
    }

    /// Step until the frontier drains or a rate limit aborts the run.
    ///
    /// The frontier is left as the run ended, so callers can inspect what was
    /// visited and what remained queued.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if discovered gamertags could not be
    /// recorded; the run stops immediately.
    pub async fn run(&mut self, frontier: &mut Frontier) -> Result<CrawlReport, PersistenceError> {
        let started_at = Utc::now();
        let mut expanded = 0;
        let mut recorded = 0;
        let mut skipped = 0;
        let mut duplicates = 0;

        let outcome = loop {
            match self.step(frontier).await? {
                Step::Drained => break CrawlOutcome::Exhausted,
                Step::Expanded { connections, .. } => {
                    expanded += 1;
                    recorded += connections;
                }
                Step::Skipped {
                    reason: SkipReason::AlreadyVisited,
                    ..
                } => duplicates += 1,
                Step::Skipped { .. } => skipped += 1,
                Step::Aborted { gamertag } => break CrawlOutcome::RateLimited { gamertag },
            }
        };

        Ok(CrawlReport {
            outcome,
            expanded,
            recorded,
            skipped,
            duplicates,
            remaining: frontier.len(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }
}
