//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Mutex;
use xbl_crawl::domain::{Gamertag, Xuid};
use xbl_crawl::error::{FetchError, ResolveError};
use xbl_crawl::remote::{ConnectionFetcher, IdentityResolver};

/// Path of the compiled binary under test
pub fn xbl_crawl_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_xbl-crawl"))
}

/// Run the binary in `dir` with a clean credential environment.
///
/// `OPENXBL_API_KEY` is removed unless passed in `envs`, and stdin is closed.
pub fn run_xbl_crawl_in_dir(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut command = Command::new(xbl_crawl_binary());
    command
        .args(args)
        .current_dir(dir)
        .env_remove("OPENXBL_API_KEY")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .stdin(Stdio::null());
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().expect("Failed to execute xbl-crawl binary")
}

/// Friends graph served from memory.
///
/// XUIDs are `x:<gamertag>`. Accounts missing from the graph are not found;
/// accounts marked private resolve but refuse their friends list. After
/// `quota` successful searches every further search is rate limited, the way
/// the real service answers once an API key's hourly allowance is spent.
#[derive(Default)]
pub struct RemoteGraph {
    friends: HashMap<Gamertag, Vec<Gamertag>>,
    private: HashSet<Gamertag>,
    quota: Option<usize>,
    searches: Mutex<usize>,
    expansions: Mutex<Vec<Gamertag>>,
}

impl RemoteGraph {
    /// Build from `(gamertag, friends)` pairs.
    pub fn from_edges(edges: &[(&str, &[&str])]) -> Self {
        let friends = edges
            .iter()
            .map(|(tag, friends)| {
                (
                    Gamertag::new(*tag),
                    friends.iter().map(|f| Gamertag::new(*f)).collect(),
                )
            })
            .collect();
        Self {
            friends,
            ..Self::default()
        }
    }

    /// Refuse the friends list of `tag`.
    pub fn with_private(mut self, tag: &str) -> Self {
        self.private.insert(Gamertag::new(tag));
        self
    }

    /// Rate limit every search after the first `quota`.
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Gamertags whose friends list was served, in order.
    pub fn expansions(&self) -> Vec<Gamertag> {
        self.expansions.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityResolver for RemoteGraph {
    async fn resolve(&self, gamertag: &Gamertag) -> Result<Xuid, ResolveError> {
        let mut searches = self.searches.lock().unwrap();
        if self.quota.is_some_and(|quota| *searches >= quota) {
            return Err(ResolveError::RateLimited);
        }
        *searches += 1;

        if self.friends.contains_key(gamertag) {
            Ok(Xuid::new(format!("x:{gamertag}")))
        } else {
            Err(ResolveError::NotFound)
        }
    }
}

#[async_trait]
impl ConnectionFetcher for RemoteGraph {
    async fn fetch_connections(&self, xuid: &Xuid) -> Result<Vec<Gamertag>, FetchError> {
        let gamertag = Gamertag::new(xuid.as_str().trim_start_matches("x:"));
        if self.private.contains(&gamertag) {
            return Err(FetchError::Unreachable);
        }
        self.expansions.lock().unwrap().push(gamertag.clone());
        Ok(self.friends.get(&gamertag).cloned().unwrap_or_default())
    }
}
