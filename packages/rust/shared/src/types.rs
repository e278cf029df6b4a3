//! Core domain types for FileBot conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{FileBotError, Result};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The authenticated caller, passed explicitly into every engine operation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Remote user identifier, when known.
    pub user_id: Option<String>,
    /// Bearer credential, when the user is signed in.
    pub token: Option<String>,
}

impl Session {
    /// A session with no user and no credential.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a session from a user id and a bearer credential.
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            token: Some(token.into()),
        }
    }

    /// The bearer credential, if present and non-empty.
    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ConversationId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for conversation identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    /// Generate a new time-sortable conversation identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// One line of user input plus the lowercase form used for canned matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    raw: String,
    lowercase: String,
}

impl Query {
    /// Accept a raw input line. Whitespace-only input is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(FileBotError::invalid_input("query is blank"));
        }
        Ok(Self {
            raw: raw.to_string(),
            lowercase: raw.to_lowercase(),
        })
    }

    /// The input exactly as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lowercased input; only canned matching looks at this.
    pub fn lowercase(&self) -> &str {
        &self.lowercase
    }
}

// ---------------------------------------------------------------------------
// Nodes and hits
// ---------------------------------------------------------------------------

/// Whether a node has children or is a downloadable leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

// Anything the service does not call a folder is opened as a file.
impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.eq_ignore_ascii_case("folder") {
            Ok(Self::Folder)
        } else {
            Ok(Self::File)
        }
    }
}

/// A child returned by the Node Directory Service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Unique, `/`-delimited, case-sensitive path.
    pub path: String,
    /// Display name.
    pub name: String,
    /// Folder or file.
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

/// A result returned by the Full-Text Search Service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Server-provided snippet around the match, possibly annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_content: Option<String>,
}

/// What the user picked from a result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub path: String,
    pub kind: NodeKind,
}

impl Selection {
    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Folder,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::File,
        }
    }
}

/// One row of a result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultItem {
    Entry(DirectoryEntry),
    Hit(SearchHit),
}

impl ResultItem {
    pub fn path(&self) -> &str {
        match self {
            Self::Entry(e) => &e.path,
            Self::Hit(h) => &h.path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Entry(e) => &e.name,
            Self::Hit(h) => &h.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Entry(e) => e.kind,
            Self::Hit(h) => h.kind,
        }
    }

    /// Matched snippet, for search hits that carry one.
    pub fn matched_content(&self) -> Option<&str> {
        match self {
            Self::Entry(_) => None,
            Self::Hit(h) => h.matched_content.as_deref(),
        }
    }

    /// The selection the user makes by picking this row.
    pub fn selection(&self) -> Selection {
        Selection {
            path: self.path().to_string(),
            kind: self.kind(),
        }
    }
}

impl From<DirectoryEntry> for ResultItem {
    fn from(entry: DirectoryEntry) -> Self {
        Self::Entry(entry)
    }
}

impl From<SearchHit> for ResultItem {
    fn from(hit: SearchHit) -> Self {
        Self::Hit(hit)
    }
}

/// A captioned, non-empty, ordered list of results.
///
/// The only constructor rejects empty input, so a rendered result list
/// always has at least one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultList {
    caption: String,
    items: Vec<ResultItem>,
}

impl ResultList {
    /// Returns `None` when `items` is empty.
    pub fn new<I, T>(caption: impl Into<String>, items: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<ResultItem>,
    {
        let items: Vec<ResultItem> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return None;
        }
        Some(Self {
            caption: caption.into(),
            items,
        })
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ResultItem> {
        self.items.get(index)
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// A link to a file the presentation layer may download. Never fetched by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    /// Suggested filename (last path segment).
    pub name: String,
    pub url: String,
}

/// Classified content returned by the file preview endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePreview {
    Image {
        name: String,
        mime: String,
        /// Base64 payload.
        data: String,
    },
    Pdf {
        name: String,
        data: String,
    },
    Text {
        name: String,
        content: String,
    },
    Empty {
        note: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Turns
// ---------------------------------------------------------------------------

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

/// The renderable payload of a turn. Renderers match exhaustively on this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnContent {
    Text { text: String },
    Results { list: ResultList },
    Download { link: DownloadLink },
    Image { name: String, mime: String, data: String },
    Pdf { name: String, data: String },
}

/// One immutable entry in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub content: TurnContent,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn new(speaker: Speaker, content: TurnContent) -> Self {
        Self {
            speaker,
            content,
            at: Utc::now(),
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, TurnContent::Text { text: text.into() })
    }

    pub fn agent_text(text: impl Into<String>) -> Self {
        Self::new(Speaker::Agent, TurnContent::Text { text: text.into() })
    }

    pub fn agent_results(list: ResultList) -> Self {
        Self::new(Speaker::Agent, TurnContent::Results { list })
    }

    pub fn agent_download(link: DownloadLink) -> Self {
        Self::new(Speaker::Agent, TurnContent::Download { link })
    }

    /// Text of a `Text` turn.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TurnContent::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Result list of a `Results` turn.
    pub fn results(&self) -> Option<&ResultList> {
        match &self.content {
            TurnContent::Results { list } => Some(list),
            _ => None,
        }
    }
}
