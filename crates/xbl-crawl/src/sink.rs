//! Durable record of discovered gamertags.
//!
//! The sink is a dumb, append-only recorder: every batch handed to it is
//! written as-is, one gamertag per line. Deduplication is the scheduler's job.
//!
//! # Durability
//!
//! [`LineFileSink`] flushes and `fsync`s every batch before returning, so a
//! successful [`ResultSink::record_discovered`] means the batch survives a
//! crash. Nothing is ever truncated; re-running a crawl appends to the same
//! file.
//!
//! # Test Utilities
//!
//! [`MemorySink`] keeps batches in memory. It is available in this crate's
//! tests and to downstream crates through the `test-util` feature.

use crate::domain::Gamertag;
use crate::error::PersistenceError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Destination for gamertags discovered during a crawl.
#[async_trait]
pub trait ResultSink: Send {
    /// Append a batch of freshly discovered gamertags.
    ///
    /// An empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the batch could not be committed.
    async fn record_discovered(&mut self, gamertags: &[Gamertag]) -> Result<(), PersistenceError>;
}

/// Appends gamertags to a UTF-8 text file, one per line.
#[derive(Debug, Clone)]
pub struct LineFileSink {
    path: PathBuf,
    parent_ready: bool,
}

impl LineFileSink {
    /// Create a sink writing to `path`. Nothing touches the disk until the
    /// first non-empty batch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            parent_ready: false,
        }
    }

    /// The output file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&mut self) -> std::io::Result<()> {
        if self.parent_ready {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        self.parent_ready = true;
        Ok(())
    }

    async fn append(&mut self, gamertags: &[Gamertag]) -> std::io::Result<()> {
        self.ensure_parent().await?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let mut writer = BufWriter::new(file);

        for tag in gamertags {
            writer.write_all(tag.as_str().as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }

        writer.flush().await?;
        writer.into_inner().sync_data().await
    }
}

#[async_trait]
impl ResultSink for LineFileSink {
    async fn record_discovered(&mut self, gamertags: &[Gamertag]) -> Result<(), PersistenceError> {
        if gamertags.is_empty() {
            return Ok(());
        }

        self.append(gamertags)
            .await
            .map_err(|e| PersistenceError::new(&self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            count = gamertags.len(),
            "Recorded discovered gamertags"
        );
        Ok(())
    }
}

/// In-memory sink for tests.
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to the crawler.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: std::sync::Arc<std::sync::Mutex<Vec<Gamertag>>>,
}

#[cfg(any(test, feature = "test-util"))]
impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in write order
    #[must_use]
    pub fn recorded(&self) -> Vec<Gamertag> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Number of lines recorded so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl ResultSink for MemorySink {
    async fn record_discovered(&mut self, gamertags: &[Gamertag]) -> Result<(), PersistenceError> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .extend_from_slice(gamertags);
        Ok(())
    }
}
