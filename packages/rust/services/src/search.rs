//! Full-Text Search Service client.

use async_trait::async_trait;
use filebot_shared::{Result, SearchHit, Session};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::SearchIndex;
use crate::http::{self, ClientOptions, ServiceBase};

/// `GET {base}/search/?q=Q` response body.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// HTTP client for the Full-Text Search Service.
#[derive(Debug, Clone)]
pub struct SearchClient {
    base: ServiceBase,
    client: Client,
}

impl SearchClient {
    pub fn new(base: ServiceBase, opts: &ClientOptions) -> Result<Self> {
        Ok(Self {
            base,
            client: http::build_client(opts)?,
        })
    }
}

#[async_trait]
impl SearchIndex for SearchClient {
    /// Hits come back in server relevance order and are not re-sorted.
    #[instrument(skip_all, fields(query = %query))]
    async fn search(&self, session: &Session, query: &str) -> Result<Vec<SearchHit>> {
        let url = self.base.endpoint("search/", &[("q", query)])?;
        let request = http::authorize(self.client.get(url.clone()), session);
        let body: SearchResponse = http::send_json(request, &url).await?;

        debug!(hits = body.results.len(), "search completed");
        Ok(body.results)
    }
}
