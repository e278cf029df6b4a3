//! Node Directory Service client: list the children of a path.

use async_trait::async_trait;
use filebot_shared::{DirectoryEntry, Result, Session};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::NodeDirectory;
use crate::http::{self, ClientOptions, ServiceBase};

/// `GET {base}/nodes/?path=P` response body.
#[derive(Debug, Deserialize)]
struct NodesResponse {
    #[serde(default)]
    items: Vec<DirectoryEntry>,
}

/// HTTP client for the Node Directory Service.
#[derive(Debug, Clone)]
pub struct NodeDirectoryClient {
    base: ServiceBase,
    client: Client,
}

impl NodeDirectoryClient {
    pub fn new(base: ServiceBase, opts: &ClientOptions) -> Result<Self> {
        Ok(Self {
            base,
            client: http::build_client(opts)?,
        })
    }
}

#[async_trait]
impl NodeDirectory for NodeDirectoryClient {
    /// The path is sent as typed; `""` lists the root.
    #[instrument(skip_all, fields(path = %path))]
    async fn list_children(&self, session: &Session, path: &str) -> Result<Vec<DirectoryEntry>> {
        let url = self.base.endpoint("nodes/", &[("path", path)])?;
        let request = http::authorize(self.client.get(url.clone()), session);
        let body: NodesResponse = http::send_json(request, &url).await?;

        debug!(children = body.items.len(), "directory listed");
        Ok(body.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filebot_shared::{FileBotError, NodeKind};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> NodeDirectoryClient {
        let base = ServiceBase::parse(&format!("{}/api", server.uri())).unwrap();
        NodeDirectoryClient::new(base, &ClientOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn lists_children_in_server_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/nodes/"))
            .and(query_param("path", "projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"path": "projects/zeta", "name": "zeta", "type": "folder"},
                    {"path": "projects/alpha.md", "name": "alpha.md", "type": "file"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = client
            .list_children(&Session::anonymous(), "projects")
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "zeta");
        assert_eq!(items[0].kind, NodeKind::Folder);
        assert_eq!(items[1].path, "projects/alpha.md");
    }

    #[tokio::test]
    async fn root_is_requested_with_empty_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/nodes/"))
            .and(query_param("path", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"path": "docs", "name": "docs", "type": "folder"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = client.list_children(&Session::anonymous(), "").await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn missing_items_is_empty_listing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/nodes/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = client
            .list_children(&Session::anonymous(), "nothing-here")
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn sends_bearer_when_session_has_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/nodes/"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"path": "private", "name": "private", "type": "folder"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let items = client
            .list_children(&Session::new("1", "abc123"), "")
            .await
            .unwrap();
        assert_eq!(items[0].name, "private");
    }

    #[tokio::test]
    async fn malformed_json_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/nodes/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .list_children(&Session::anonymous(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, FileBotError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/nodes/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .list_children(&Session::anonymous(), "x")
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("500"));
    }
}
