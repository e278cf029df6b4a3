//! Shared HTTP plumbing: client construction, endpoint URLs, JSON fetching.

use std::time::Duration;

use filebot_shared::{FileBotError, Result, Session};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// User-Agent string for service requests.
const USER_AGENT: &str = concat!("FileBot/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration shared by every service client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Build a reqwest client with appropriate settings.
pub(crate) fn build_client(opts: &ClientOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(opts.timeout())
        .build()
        .map_err(|e| FileBotError::unavailable(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// A service root that endpoint paths are joined onto.
///
/// The base always ends in `/` so `api` + `nodes/` yields `api/nodes/`
/// rather than replacing the last segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBase(Url);

impl ServiceBase {
    pub fn parse(base: &str) -> Result<Self> {
        let mut raw = base.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)
            .map_err(|e| FileBotError::config(format!("invalid service URL '{base}': {e}")))?;
        if url.cannot_be_a_base() {
            return Err(FileBotError::config(format!(
                "service URL '{base}' cannot carry endpoint paths"
            )));
        }
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// `{base}/{endpoint}?k=v&...` with every value URL-encoded.
    pub fn endpoint(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .0
            .join(endpoint)
            .map_err(|e| FileBotError::config(format!("bad endpoint '{endpoint}': {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Attach the session's bearer credential, if any.
pub(crate) fn authorize(request: RequestBuilder, session: &Session) -> RequestBuilder {
    match session.bearer() {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Send a request and decode a JSON body.
///
/// Transport errors, non-success statuses, and malformed bodies all map to
/// [`FileBotError::ServiceUnavailable`].
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder, url: &Url) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| FileBotError::unavailable(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FileBotError::unavailable(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| FileBotError::unavailable(format!("{url}: failed to read body: {e}")))?;

    debug!(%url, bytes = body.len(), "response received");

    serde_json::from_str(&body)
        .map_err(|e| FileBotError::unavailable(format!("{url}: malformed JSON: {e}")))
}
