//! File endpoints: download-link construction and inline preview.

use async_trait::async_trait;
use filebot_shared::{DownloadLink, FilePreview, Result, Session};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::FileSource;
use crate::http::{self, ClientOptions, ServiceBase};

/// MIME type assumed for images when the service omits one.
const FALLBACK_IMAGE_MIME: &str = "application/octet-stream";

/// `GET {base}/file/?path=P` response body.
#[derive(Debug, Deserialize)]
struct FileResponse {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

impl FileResponse {
    fn classify(self) -> FilePreview {
        let content = self.content.filter(|c| !c.is_empty());
        match (self.kind.as_str(), content) {
            ("image", Some(data)) => FilePreview::Image {
                name: self.name,
                mime: self
                    .mime
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string()),
                data,
            },
            ("pdf", Some(data)) => FilePreview::Pdf {
                name: self.name,
                data,
            },
            (_, Some(content)) => FilePreview::Text {
                name: self.name,
                content,
            },
            (_, None) => FilePreview::Empty { note: self.note },
        }
    }
}

/// Last `/`-separated segment of a path, used as the download filename.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(path)
}

/// HTTP client for the download and preview endpoints.
#[derive(Debug, Clone)]
pub struct FileClient {
    base: ServiceBase,
    client: Client,
}

impl FileClient {
    pub fn new(base: ServiceBase, opts: &ClientOptions) -> Result<Self> {
        Ok(Self {
            base,
            client: http::build_client(opts)?,
        })
    }
}

#[async_trait]
impl FileSource for FileClient {
    fn download_link(&self, path: &str) -> Result<DownloadLink> {
        let url = self.base.endpoint("download/", &[("path", path)])?;
        Ok(DownloadLink {
            name: file_name(path).to_string(),
            url: url.to_string(),
        })
    }

    #[instrument(skip_all, fields(path = %path))]
    async fn preview(&self, session: &Session, path: &str) -> Result<FilePreview> {
        let url = self.base.endpoint("file/", &[("path", path)])?;
        let request = http::authorize(self.client.get(url.clone()), session);
        let body: FileResponse = http::send_json(request, &url).await?;

        debug!(kind = %body.kind, "file fetched for preview");
        Ok(body.classify())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(uri: &str) -> FileClient {
        let base = ServiceBase::parse(&format!("{uri}/api")).unwrap();
        FileClient::new(base, &ClientOptions::default()).unwrap()
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name("reports/2024/q3 summary.pdf"), "q3 summary.pdf");
        assert_eq!(file_name("top.txt"), "top.txt");
        assert_eq!(file_name("folder/"), "folder");
    }

    #[test]
    fn download_link_encodes_path() {
        let client = client_for("http://127.0.0.1:8000");
        let link = client.download_link("reports/q3 & q4.pdf").unwrap();
        assert_eq!(link.name, "q3 & q4.pdf");
        assert_eq!(
            link.url,
            "http://127.0.0.1:8000/api/download/?path=reports%2Fq3+%26+q4.pdf"
        );
    }

    async fn preview_with(body: serde_json::Value) -> FilePreview {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/"))
            .and(query_param("path", "some/file"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        client_for(&server.uri())
            .preview(&Session::anonymous(), "some/file")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn classifies_image() {
        let preview = preview_with(serde_json::json!({
            "type": "image", "name": "cat.png", "mime": "image/png", "content": "iVBORw0KGgo="
        }))
        .await;
        assert_eq!(
            preview,
            FilePreview::Image {
                name: "cat.png".into(),
                mime: "image/png".into(),
                data: "iVBORw0KGgo=".into(),
            }
        );
    }

    #[tokio::test]
    async fn classifies_pdf() {
        let preview = preview_with(serde_json::json!({
            "type": "pdf", "name": "q3-summary.pdf", "content": "JVBERi0xLjQ="
        }))
        .await;
        assert!(matches!(preview, FilePreview::Pdf { ref name, .. } if name == "q3-summary.pdf"));
    }

    #[tokio::test]
    async fn classifies_text() {
        let preview = preview_with(serde_json::json!({
            "type": "text", "name": "notes.txt", "content": "buy milk"
        }))
        .await;
        assert_eq!(
            preview,
            FilePreview::Text {
                name: "notes.txt".into(),
                content: "buy milk".into(),
            }
        );
    }

    #[tokio::test]
    async fn empty_content_keeps_note() {
        let preview = preview_with(serde_json::json!({
            "type": "text", "name": "blank.txt", "content": "", "note": "File is empty."
        }))
        .await;
        assert_eq!(
            preview,
            FilePreview::Empty {
                note: Some("File is empty.".into())
            }
        );
    }

    #[tokio::test]
    async fn preview_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server.uri())
            .preview(&Session::anonymous(), "gone.txt")
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn preview_malformed_json_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/file/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server.uri())
            .preview(&Session::anonymous(), "notes.txt")
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
