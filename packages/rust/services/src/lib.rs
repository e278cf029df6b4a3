//! Clients for the remote services a FileBot conversation talks to.
//!
//! This crate provides:
//! - [`NodeDirectory`] / [`NodeDirectoryClient`]: list the children of a path
//! - [`SearchIndex`] / [`SearchClient`]: full-text search over the file store
//! - [`FileSource`] / [`FileClient`]: download links and inline previews
//! - [`AnswerService`] / [`AnswerClient`]: the chat backend behind the proxy agent
//!
//! The traits are the seams the engine depends on; the HTTP clients are the
//! production implementations. Every remote failure surfaces as
//! [`FileBotError::ServiceUnavailable`](filebot_shared::FileBotError).

mod answer;
mod files;
mod http;
mod nodes;
mod search;

use async_trait::async_trait;
use filebot_shared::{DirectoryEntry, DownloadLink, FilePreview, Result, SearchHit, Session};

pub use answer::{AnswerClient, HistoryMessage};
pub use files::{FileClient, file_name};
pub use http::{ClientOptions, DEFAULT_TIMEOUT_SECS, ServiceBase};
pub use nodes::NodeDirectoryClient;
pub use search::SearchClient;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Lists the children of a path in the remote file store.
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    /// Children of `path` in server order. An empty folder is `Ok(vec![])`.
    async fn list_children(&self, session: &Session, path: &str) -> Result<Vec<DirectoryEntry>>;
}

/// Full-text search over the remote file store.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Hits in server relevance order. Zero hits is `Ok(vec![])`.
    async fn search(&self, session: &Session, query: &str) -> Result<Vec<SearchHit>>;
}

/// Access to individual files.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Build the download link for `path` without fetching anything.
    fn download_link(&self, path: &str) -> Result<DownloadLink>;

    /// Fetch and classify `path` for inline display.
    async fn preview(&self, session: &Session, path: &str) -> Result<FilePreview>;
}

/// The chat backend that generates replies.
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Forward one message and return the reply text (possibly empty).
    async fn reply(&self, session: &Session, message: &str) -> Result<String>;

    /// The stored conversation for the session's user, oldest first.
    async fn history(&self, session: &Session) -> Result<Vec<HistoryMessage>>;
}
