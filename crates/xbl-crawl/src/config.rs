//! Configuration management for xbl-crawl.
//!
//! Settings are built once at startup and handed to the components that need
//! them. There are two sources:
//!
//! - The OpenXBL credential, read from `OPENXBL_API_KEY` in the process
//!   environment or, failing that, from a `.env` file.
//! - Tunables for the crawl (`xbl-crawl.yaml`), all of which have defaults.
//!
//! # Example
//!
//! ```yaml
//! base-url: https://xbl.io/api/v2
//! request-delay-secs: 10
//! request-timeout-secs: 30
//! output-file: output/gamertags.txt
//! ```

use crate::error::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Environment variable holding the OpenXBL credential
pub const API_KEY_VAR: &str = "OPENXBL_API_KEY";

/// Environment file consulted when the credential is not exported
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "xbl-crawl.yaml";

/// OpenXBL API root
pub const DEFAULT_BASE_URL: &str = "https://xbl.io/api/v2";

/// Pause after each successful expansion
pub const DEFAULT_REQUEST_DELAY_SECS: u64 = 10;

/// Per-request transport timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where discovered gamertags are appended
pub const DEFAULT_OUTPUT_FILE: &str = "output/gamertags.txt";

/// OpenXBL credential.
///
/// The value never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a credential value
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw credential, for building request headers
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Load the credential from the process environment, falling back to
    /// `env_file`.
    ///
    /// The environment file is parsed without touching the process
    /// environment. A missing file is not an error on its own.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the credential is absent or blank in both
    /// places, or if the environment file exists but cannot be parsed.
    pub fn load(env_file: &Path) -> Result<Self> {
        Self::from_sources(std::env::var(API_KEY_VAR).ok(), env_file)
    }

    fn from_sources(process_value: Option<String>, env_file: &Path) -> Result<Self> {
        let value = match process_value.filter(|v| !v.trim().is_empty()) {
            Some(value) => Some(value),
            None => read_env_file(env_file, API_KEY_VAR)?,
        };

        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self(v.trim().to_string()))
            .ok_or_else(|| {
                Error::Config(format!(
                    "{API_KEY_VAR} is not set; export it or add it to {}",
                    env_file.display()
                ))
            })
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

fn read_env_file(path: &Path, key: &str) -> Result<Option<String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return Ok(None),
        Err(e) => {
            return Err(Error::Config(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };

    for entry in entries {
        let (name, value) =
            entry.map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
        if name == key {
            return Ok(Some(value));
        }
    }

    Ok(None)
}

/// Tunables for a crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CrawlConfig {
    /// OpenXBL API root, without a trailing slash
    pub base_url: String,

    /// Seconds to wait after each successful expansion
    pub request_delay_secs: u64,

    /// Transport timeout for each request, in seconds
    pub request_timeout_secs: u64,

    /// Append-only output file
    pub output_file: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay_secs: DEFAULT_REQUEST_DELAY_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl CrawlConfig {
    /// Load configuration from a YAML file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicitly requested file, or `xbl-crawl.yaml` from
    /// `working_dir` when present, or fall back to defaults.
    ///
    /// # Errors
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub async fn discover(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path).await;
        }

        let candidate = working_dir.join(DEFAULT_CONFIG_FILE);
        if fs::try_exists(&candidate).await? {
            tracing::debug!(path = %candidate.display(), "Loading crawl configuration");
            Self::load(&candidate).await
        } else {
            Ok(Self::default())
        }
    }

    /// Check that the values can drive a crawl.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base-url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base-url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base-url '{}' cannot carry a path",
                self.base_url
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request-timeout-secs must be greater than 0".to_string(),
            ));
        }

        if self.output_file.as_os_str().is_empty() {
            return Err(Error::Config("output-file cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Pause applied after each successful expansion
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    /// Per-request transport timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Everything a crawl needs from the outside world, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// OpenXBL credential
    pub api_key: ApiKey,

    /// Crawl tunables
    pub crawl: CrawlConfig,
}

impl Settings {
    /// Bundle a credential with crawl tunables
    pub fn new(api_key: ApiKey, crawl: CrawlConfig) -> Self {
        Self { api_key, crawl }
    }
}
