//! In-memory service fakes for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use filebot_services::{AnswerService, FileSource, HistoryMessage, NodeDirectory, SearchIndex};
use filebot_shared::{
    DirectoryEntry, DownloadLink, FileBotError, FilePreview, NodeKind, Result, SearchHit, Session,
};

pub(crate) fn entry(path: &str, folder: bool) -> DirectoryEntry {
    DirectoryEntry {
        path: path.into(),
        name: path.rsplit('/').next().unwrap_or(path).into(),
        kind: if folder { NodeKind::Folder } else { NodeKind::File },
    }
}

pub(crate) fn hit(path: &str, snippet: Option<&str>) -> SearchHit {
    SearchHit {
        path: path.into(),
        name: path.rsplit('/').next().unwrap_or(path).into(),
        kind: NodeKind::File,
        matched_content: snippet.map(String::from),
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct FakeDirectory {
    listings: HashMap<String, Vec<DirectoryEntry>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub(crate) fn with(mut self, path: &str, entries: Vec<DirectoryEntry>) -> Self {
        self.listings.insert(path.into(), entries);
        self
    }

    pub(crate) fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.into());
        self
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NodeDirectory for FakeDirectory {
    async fn list_children(&self, _session: &Session, path: &str) -> Result<Vec<DirectoryEntry>> {
        self.calls.lock().unwrap().push(path.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(path) {
            return Err(FileBotError::unavailable("fake directory down"));
        }
        Ok(self.listings.get(path).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct FakeSearch {
    results: HashMap<String, Vec<SearchHit>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub(crate) fn with(mut self, query: &str, hits: Vec<SearchHit>) -> Self {
        self.results.insert(query.into(), hits);
        self
    }

    pub(crate) fn failing(mut self, query: &str) -> Self {
        self.failing.insert(query.into());
        self
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchIndex for FakeSearch {
    async fn search(&self, _session: &Session, query: &str) -> Result<Vec<SearchHit>> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(query) {
            return Err(FileBotError::unavailable("fake search down"));
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct FakeFiles {
    previews: Mutex<HashMap<String, FilePreview>>,
    preview_calls: Mutex<usize>,
}

impl FakeFiles {
    pub(crate) fn set_preview(&self, path: &str, preview: FilePreview) {
        self.previews.lock().unwrap().insert(path.into(), preview);
    }

    pub(crate) fn preview_count(&self) -> usize {
        *self.preview_calls.lock().unwrap()
    }
}

#[async_trait]
impl FileSource for FakeFiles {
    fn download_link(&self, path: &str) -> Result<DownloadLink> {
        Ok(DownloadLink {
            name: filebot_services::file_name(path).to_string(),
            url: format!("fake://download/{path}"),
        })
    }

    async fn preview(&self, _session: &Session, path: &str) -> Result<FilePreview> {
        *self.preview_calls.lock().unwrap() += 1;
        self.previews
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| FileBotError::unavailable(format!("no such file: {path}")))
    }
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct FakeAnswers {
    reply: Option<String>,
    history: Vec<HistoryMessage>,
    down: bool,
    messages: Mutex<Vec<String>>,
}

impl FakeAnswers {
    pub(crate) fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub(crate) fn with_history(mut self, history: &[(&str, &str)]) -> Self {
        self.history = history
            .iter()
            .map(|(role, content)| HistoryMessage {
                role: (*role).into(),
                content: (*content).into(),
            })
            .collect();
        self
    }

    pub(crate) fn down(mut self) -> Self {
        self.down = true;
        self
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerService for FakeAnswers {
    async fn reply(&self, _session: &Session, message: &str) -> Result<String> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.down {
            return Err(FileBotError::unavailable("fake backend down"));
        }
        Ok(self.reply.clone().unwrap_or_default())
    }

    async fn history(&self, _session: &Session) -> Result<Vec<HistoryMessage>> {
        if self.down {
            return Err(FileBotError::unavailable("fake backend down"));
        }
        Ok(self.history.clone())
    }
}
