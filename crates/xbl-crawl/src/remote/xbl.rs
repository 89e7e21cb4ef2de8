//! OpenXBL implementation of the remote lookups.
//!
//! Two endpoints are used:
//!
//! - `GET {base}/search/{gamertag}` returns `{"people": [{"xuid": ...}, ...]}`
//! - `GET {base}/friends/{xuid}` returns `{"people": [{"gamertag": ...}, ...]}`
//!
//! Both authenticate with the `X-Authorization` header.
//!
//! # Status codes
//!
//! The service does not follow HTTP conventions for throttling. The search
//! endpoint answers `400 Bad Request` once the quota is exhausted, while the
//! friends endpoint answers `429 Too Many Requests`. `403 Forbidden` means the
//! account is hidden (search) or its friends list is private (friends).

use super::{ConnectionFetcher, IdentityResolver};
use crate::config::Settings;
use crate::domain::{Gamertag, Xuid};
use crate::error::{Error, FetchError, ResolveError, Result, TransientError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;

/// Header carrying the OpenXBL credential
pub const AUTH_HEADER: &str = "X-Authorization";

const SEARCH_ROUTE: &str = "search";
const FRIENDS_ROUTE: &str = "friends";

/// HTTP client for the OpenXBL API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct XblClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for XblClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XblClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl XblClient {
    /// Build a client from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the base URL is unusable and `Error::Http`
    /// if the TLS backend cannot be initialized.
    pub fn new(settings: &Settings) -> Result<Self> {
        let base_url = Url::parse(&settings.crawl.base_url).map_err(|e| {
            Error::Config(format!("invalid base-url '{}': {e}", settings.crawl.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base-url '{base_url}' cannot carry a path"
            )));
        }

        let http = Client::builder()
            .timeout(settings.crawl.request_timeout())
            .user_agent(concat!("xbl-crawl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.api_key.expose().to_string(),
        })
    }

    /// `{base}/{route}/{value}`, with `value` percent-encoded as one segment.
    fn endpoint(&self, route: &str, value: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(route).push(value);
        }
        url
    }

    async fn get(&self, url: Url) -> std::result::Result<Response, reqwest::Error> {
        self.http
            .get(url)
            .header(AUTH_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
    }

    async fn lookup_xuid(&self, gamertag: &Gamertag) -> std::result::Result<Xuid, ResolveError> {
        let url = self.endpoint(SEARCH_ROUTE, gamertag.as_str());
        let response = self.get(url).await.map_err(TransientError::from)?;
        let status = response.status();
        tracing::debug!(gamertag = %gamertag, %status, "Search response");

        if let Some(err) = classify_search_status(status) {
            return Err(err);
        }

        let body = response.bytes().await.map_err(TransientError::from)?;
        parse_search_body(&body)
    }

    async fn lookup_friends(&self, xuid: &Xuid) -> std::result::Result<Vec<Gamertag>, FetchError> {
        let url = self.endpoint(FRIENDS_ROUTE, xuid.as_str());
        let response = self.get(url).await.map_err(TransientError::from)?;
        let status = response.status();
        tracing::debug!(xuid = %xuid, %status, "Friends response");

        if let Some(err) = classify_friends_status(status) {
            return Err(err);
        }

        let body = response.bytes().await.map_err(TransientError::from)?;
        parse_friends_body(&body)
    }
}

#[async_trait]
impl IdentityResolver for XblClient {
    async fn resolve(&self, gamertag: &Gamertag) -> std::result::Result<Xuid, ResolveError> {
        let result = self.lookup_xuid(gamertag).await;
        if let Err(ResolveError::Transient(cause)) = &result {
            tracing::warn!(gamertag = %gamertag, error = %cause, "Error retrieving XUID");
        }
        result
    }
}

#[async_trait]
impl ConnectionFetcher for XblClient {
    async fn fetch_connections(
        &self,
        xuid: &Xuid,
    ) -> std::result::Result<Vec<Gamertag>, FetchError> {
        let result = self.lookup_friends(xuid).await;
        if let Err(FetchError::Transient(cause)) = &result {
            tracing::warn!(xuid = %xuid, error = %cause, "Error retrieving friends");
        }
        result
    }
}

/// Map a search response status to a failure, or `None` on success.
pub(crate) fn classify_search_status(status: StatusCode) -> Option<ResolveError> {
    match status {
        s if s.is_success() => None,
        StatusCode::BAD_REQUEST => Some(ResolveError::RateLimited),
        StatusCode::FORBIDDEN => Some(ResolveError::NotFound),
        s => Some(ResolveError::Transient(TransientError::Status(s))),
    }
}

/// Map a friends response status to a failure, or `None` on success.
pub(crate) fn classify_friends_status(status: StatusCode) -> Option<FetchError> {
    match status {
        s if s.is_success() => None,
        StatusCode::TOO_MANY_REQUESTS => Some(FetchError::RateLimited),
        StatusCode::FORBIDDEN => Some(FetchError::Unreachable),
        s => Some(FetchError::Transient(TransientError::Status(s))),
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    people: Option<Vec<SearchPerson>>,
}

#[derive(Debug, Deserialize)]
struct SearchPerson {
    xuid: RawXuid,
}

/// XUIDs arrive as strings from OpenXBL, but numbers are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawXuid {
    Text(String),
    Number(u64),
}

impl From<RawXuid> for Xuid {
    fn from(raw: RawXuid) -> Self {
        match raw {
            RawXuid::Text(s) => Xuid(s),
            RawXuid::Number(n) => Xuid(n.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FriendsResponse {
    #[serde(default)]
    people: Option<Vec<Friend>>,
}

#[derive(Debug, Deserialize)]
struct Friend {
    #[serde(default)]
    gamertag: Option<String>,
}

/// Extract the XUID of the first matching account.
pub(crate) fn parse_search_body(body: &[u8]) -> std::result::Result<Xuid, ResolveError> {
    let response: SearchResponse = serde_json::from_slice(body).map_err(TransientError::from)?;
    response
        .people
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|person| Xuid::from(person.xuid))
        .ok_or(ResolveError::NotFound)
}

/// Extract every friend gamertag, skipping records without a usable one.
///
/// Gamertags containing control characters are dropped; the output file
/// holds exactly one gamertag per line.
pub(crate) fn parse_friends_body(body: &[u8]) -> std::result::Result<Vec<Gamertag>, FetchError> {
    let response: FriendsResponse = serde_json::from_slice(body).map_err(TransientError::from)?;
    Ok(response
        .people
        .unwrap_or_default()
        .into_iter()
        .filter_map(|friend| friend.gamertag)
        .filter(|tag| !tag.is_empty() && !tag.chars().any(char::is_control))
        .map(Gamertag::from)
        .collect())
}
