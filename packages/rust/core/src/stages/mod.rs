//! Resolution stages and the resolver that runs them in order.
//!
//! Each stage either resolves a query into turns or misses. The
//! [`IntentResolver`] tries its stages in priority order and stops at the
//! first one that resolves; a stage is never revisited for the same input.

mod canned;
mod directory;
mod search;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use filebot_shared::{FileBotError, Query, Result, Session, Turn};
use tracing::{debug, instrument};

pub use canned::CannedStage;
pub use directory::DirectoryStage;
pub use search::SearchStage;

pub(crate) use directory::contents_caption;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// What a stage made of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage handled the query; these turns go into the transcript.
    Resolved(Vec<Turn>),
    /// Not this stage's query; try the next one.
    Miss,
}

/// One step of the fallback pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Human-readable stage name for tracing.
    fn name(&self) -> &str;

    /// Resolve `query` or report a miss. Runs at most one remote call.
    async fn try_resolve(&self, session: &Session, query: &Query) -> StageOutcome;
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Holds stages in priority order.
#[derive(Clone)]
pub struct IntentResolver {
    stages: Vec<Arc<dyn Stage>>,
}

impl IntentResolver {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Names of the stages, in the order they run.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Turn one query into transcript turns.
    ///
    /// Returns an empty list only when every stage misses, which cannot
    /// happen with a [`SearchStage`] at the end of the pipeline.
    #[instrument(skip_all, fields(query = %query.raw()))]
    pub async fn resolve(&self, session: &Session, query: &Query) -> Vec<Turn> {
        for stage in &self.stages {
            match stage.try_resolve(session, query).await {
                StageOutcome::Resolved(turns) => {
                    debug!(stage = stage.name(), turns = turns.len(), "query resolved");
                    return turns;
                }
                StageOutcome::Miss => debug!(stage = stage.name(), "stage missed"),
            }
        }
        debug!("no stage resolved the query");
        Vec::new()
    }
}

impl std::fmt::Debug for IntentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentResolver")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Run a remote call under a deadline; expiry counts as the service being unavailable.
pub(crate) async fn bounded<T>(
    limit: Duration,
    what: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, call).await.map_err(|_| {
        FileBotError::unavailable(format!("{what}: no answer within {}ms", limit.as_millis()))
    })?
}
