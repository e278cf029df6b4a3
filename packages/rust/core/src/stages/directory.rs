//! Stage 2: treat the input as a folder path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use filebot_services::NodeDirectory;
use filebot_shared::{DirectoryEntry, Query, Result, ResultList, Session, Turn};
use tracing::warn;

use super::{Stage, StageOutcome, bounded};

/// Lists the input as a path; resolves only when the folder has children.
#[derive(Clone)]
pub struct DirectoryStage {
    directory: Arc<dyn NodeDirectory>,
    timeout: Duration,
}

impl DirectoryStage {
    pub fn new(directory: Arc<dyn NodeDirectory>, timeout: Duration) -> Self {
        Self { directory, timeout }
    }

    /// Children of `path`, bounded by the stage timeout.
    pub async fn list(&self, session: &Session, path: &str) -> Result<Vec<DirectoryEntry>> {
        bounded(
            self.timeout,
            "node directory",
            self.directory.list_children(session, path),
        )
        .await
    }
}

/// Caption shown above a folder listing.
pub(crate) fn contents_caption(path: &str) -> String {
    format!("Contents of \"{path}\":")
}

#[async_trait]
impl Stage for DirectoryStage {
    fn name(&self) -> &str {
        "directory"
    }

    async fn try_resolve(&self, session: &Session, query: &Query) -> StageOutcome {
        let path = query.raw();
        let entries = match self.list(session, path).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path, error = %e, "directory lookup failed, falling through");
                return StageOutcome::Miss;
            }
        };

        match ResultList::new(contents_caption(path), entries) {
            Some(list) => StageOutcome::Resolved(vec![
                Turn::user_text(format!("Open folder: {path}")),
                Turn::agent_results(list),
            ]),
            None => StageOutcome::Miss,
        }
    }
}
