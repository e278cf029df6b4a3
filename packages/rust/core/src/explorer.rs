//! The file explorer agent: resolves typed input, handles selections from
//! result lists, and seeds new conversations with the root listing.

use std::sync::Arc;
use std::time::Duration;

use filebot_services::{
    ClientOptions, FileClient, FileSource, NodeDirectory, NodeDirectoryClient, SearchClient,
    SearchIndex, ServiceBase,
};
use filebot_shared::{
    AppConfig, FileMode, FilePreview, NodeKind, Query, Result, ResultList, Selection, Session,
    Speaker, Turn, TurnContent,
};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::canned::{CannedResponseMatcher, MatchPolicy};
use crate::conversation::Conversation;
use crate::highlight::ResultHighlighter;
use crate::stages::{
    CannedStage, DirectoryStage, IntentResolver, SearchStage, bounded, contents_caption,
};

/// Shown when the preview service returns a file with no content and no note.
const EMPTY_FILE_NOTE: &str = "Cannot open file, it is empty.";

/// Knobs that differ between explorer variants.
#[derive(Debug, Clone)]
pub struct ExplorerOptions {
    /// Emphasis for search snippets; `None` disables highlighting.
    pub highlighter: Option<ResultHighlighter>,
    /// Download links or inline previews when a file is selected.
    pub file_mode: FileMode,
    /// Deadline for each remote call.
    pub timeout: Duration,
    /// How canned phrases are located in the input.
    pub match_policy: MatchPolicy,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            highlighter: Some(ResultHighlighter::default()),
            file_mode: FileMode::Download,
            timeout: Duration::from_secs(filebot_services::DEFAULT_TIMEOUT_SECS),
            match_policy: MatchPolicy::default(),
        }
    }
}

impl From<&AppConfig> for ExplorerOptions {
    fn from(config: &AppConfig) -> Self {
        let explorer = &config.explorer;
        Self {
            highlighter: explorer.highlight.then(|| {
                ResultHighlighter::new(&explorer.emphasis_open, &explorer.emphasis_close)
            }),
            file_mode: explorer.file_mode,
            timeout: Duration::from_secs(config.service.timeout_secs),
            match_policy: MatchPolicy::default(),
        }
    }
}

/// Resolves input lines and selections into conversation turns.
pub struct ExplorerEngine {
    resolver: IntentResolver,
    directory: Arc<DirectoryStage>,
    files: Arc<dyn FileSource>,
    file_mode: FileMode,
    timeout: Duration,
}

impl ExplorerEngine {
    /// Wire the standard canned → directory → search pipeline.
    pub fn new(
        directory: Arc<dyn NodeDirectory>,
        search: Arc<dyn SearchIndex>,
        files: Arc<dyn FileSource>,
        options: ExplorerOptions,
    ) -> Self {
        let directory = Arc::new(DirectoryStage::new(directory, options.timeout));
        let resolver = IntentResolver::new(vec![
            Arc::new(CannedStage::new(CannedResponseMatcher::new(
                crate::canned::CANNED_RESPONSES,
                options.match_policy,
            ))),
            directory.clone(),
            Arc::new(SearchStage::new(search, options.highlighter, options.timeout)),
        ]);

        Self {
            resolver,
            directory,
            files,
            file_mode: options.file_mode,
            timeout: options.timeout,
        }
    }

    /// Build the HTTP clients described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let base = ServiceBase::parse(&config.service.base_url)?;
        let opts = ClientOptions {
            timeout_secs: config.service.timeout_secs,
        };

        info!(
            base_url = %base.as_url(),
            file_mode = ?config.explorer.file_mode,
            highlight = config.explorer.highlight,
            "explorer configured"
        );

        Ok(Self::new(
            Arc::new(NodeDirectoryClient::new(base.clone(), &opts)?),
            Arc::new(SearchClient::new(base.clone(), &opts)?),
            Arc::new(FileClient::new(base, &opts)?),
            ExplorerOptions::from(config),
        ))
    }

    // -----------------------------------------------------------------------
    // Typed input
    // -----------------------------------------------------------------------

    /// Resolve one input line without touching any conversation.
    ///
    /// Blank input is rejected with `InvalidInput` before any stage runs.
    pub async fn respond(&self, session: &Session, input: &str) -> Result<Vec<Turn>> {
        let query = Query::parse(input)?;
        Ok(self.resolver.resolve(session, &query).await)
    }

    /// Resolve `input` and append the resulting turns. Returns how many were appended.
    #[instrument(skip_all, fields(conversation = %conversation.id()))]
    pub async fn submit(
        &self,
        session: &Session,
        conversation: &mut Conversation,
        input: &str,
    ) -> Result<usize> {
        let query = Query::parse(input)?;
        let ticket = conversation.begin();
        let turns = self.resolver.resolve(session, &query).await;
        let count = turns.len();
        Ok(if conversation.commit(ticket, turns) { count } else { 0 })
    }

    /// Like [`submit`](Self::submit), but releases the lock while the lookup
    /// runs so a newer input can supersede this one. Returns `false` when the
    /// result was discarded as stale.
    pub async fn submit_shared(
        &self,
        session: &Session,
        conversation: &Mutex<Conversation>,
        input: &str,
    ) -> Result<bool> {
        let query = Query::parse(input)?;
        let ticket = conversation.lock().await.begin();
        let turns = self.resolver.resolve(session, &query).await;
        Ok(conversation.lock().await.commit(ticket, turns))
    }

    // -----------------------------------------------------------------------
    // Root listing
    // -----------------------------------------------------------------------

    /// Turns that open a new conversation: the top-level listing, if any.
    pub async fn seed_turns(&self, session: &Session) -> Vec<Turn> {
        match self.directory.list(session, "").await {
            Ok(entries) => ResultList::new("Top-level folders and files:", entries)
                .map(Turn::agent_results)
                .into_iter()
                .collect(),
            Err(e) => {
                warn!(error = %e, "root listing failed");
                vec![Turn::agent_text("Error loading root folders/files.")]
            }
        }
    }

    /// Seed `conversation` with the root listing.
    pub async fn seed(&self, session: &Session, conversation: &mut Conversation) -> usize {
        let ticket = conversation.begin();
        let turns = self.seed_turns(session).await;
        let count = turns.len();
        if conversation.commit(ticket, turns) { count } else { 0 }
    }

    // -----------------------------------------------------------------------
    // Selections
    // -----------------------------------------------------------------------

    /// Turns produced by picking an entry from a result list.
    ///
    /// Folders go straight to the directory lookup with the exact path;
    /// canned replies and search are never consulted.
    #[instrument(skip_all, fields(path = %selection.path, kind = ?selection.kind))]
    pub async fn selection_turns(&self, session: &Session, selection: &Selection) -> Vec<Turn> {
        match selection.kind {
            NodeKind::Folder => self.open_folder(session, &selection.path).await,
            NodeKind::File => self.open_file(session, &selection.path).await,
        }
    }

    /// Apply a selection to `conversation`. Returns how many turns were appended.
    pub async fn select(
        &self,
        session: &Session,
        conversation: &mut Conversation,
        selection: &Selection,
    ) -> usize {
        let ticket = conversation.begin();
        let turns = self.selection_turns(session, selection).await;
        let count = turns.len();
        if conversation.commit(ticket, turns) { count } else { 0 }
    }

    async fn open_folder(&self, session: &Session, path: &str) -> Vec<Turn> {
        let opened = Turn::user_text(format!("Open folder: {path}"));
        let reply = match self.directory.list(session, path).await {
            Ok(entries) => match ResultList::new(contents_caption(path), entries) {
                Some(list) => Turn::agent_results(list),
                None => Turn::agent_text(format!("Folder \"{path}\" is empty.")),
            },
            Err(e) => {
                warn!(path, error = %e, "opening folder failed");
                Turn::agent_text(format!("Error opening folder \"{path}\"."))
            }
        };
        vec![opened, reply]
    }

    async fn open_file(&self, session: &Session, path: &str) -> Vec<Turn> {
        let opened = Turn::user_text(format!("Open file: {path}"));
        let reply = match self.file_mode {
            FileMode::Download => match self.files.download_link(path) {
                Ok(link) => Turn::agent_download(link),
                Err(e) => {
                    warn!(path, error = %e, "building download link failed");
                    Turn::agent_text(format!("Error opening file \"{path}\"."))
                }
            },
            FileMode::Preview => {
                match bounded(self.timeout, "file preview", self.files.preview(session, path))
                    .await
                {
                    Ok(preview) => preview_turn(preview),
                    Err(e) => {
                        warn!(path, error = %e, "file preview failed");
                        Turn::agent_text(format!("Error opening file \"{path}\"."))
                    }
                }
            }
        };
        vec![opened, reply]
    }
}

/// Map a classified preview onto the matching turn kind.
fn preview_turn(preview: FilePreview) -> Turn {
    match preview {
        FilePreview::Image { name, mime, data } => {
            Turn::new(Speaker::Agent, TurnContent::Image { name, mime, data })
        }
        FilePreview::Pdf { name, data } => Turn::new(Speaker::Agent, TurnContent::Pdf { name, data }),
        FilePreview::Text { name, content } => Turn::agent_text(format!("{name}\n\n{content}")),
        FilePreview::Empty { note } => {
            Turn::agent_text(note.unwrap_or_else(|| EMPTY_FILE_NOTE.to_string()))
        }
    }
}

impl std::fmt::Debug for ExplorerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerEngine")
            .field("resolver", &self.resolver)
            .field("file_mode", &self.file_mode)
            .field("timeout", &self.timeout)
            .finish()
    }
}
