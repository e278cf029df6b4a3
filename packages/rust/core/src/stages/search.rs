//! Stage 3: full-text search, the fallback of last resort.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use filebot_services::SearchIndex;
use filebot_shared::{Query, ResultList, Session, Turn};
use tracing::warn;

use super::{Stage, StageOutcome, bounded};
use crate::highlight::ResultHighlighter;

/// Searches for the input. Always resolves: results, "no files", or an error turn.
#[derive(Clone)]
pub struct SearchStage {
    index: Arc<dyn SearchIndex>,
    highlighter: Option<ResultHighlighter>,
    timeout: Duration,
}

impl SearchStage {
    /// Pass a highlighter to emphasise query keywords in matched snippets.
    pub fn new(
        index: Arc<dyn SearchIndex>,
        highlighter: Option<ResultHighlighter>,
        timeout: Duration,
    ) -> Self {
        Self {
            index,
            highlighter,
            timeout,
        }
    }
}

#[async_trait]
impl Stage for SearchStage {
    fn name(&self) -> &str {
        "search"
    }

    async fn try_resolve(&self, session: &Session, query: &Query) -> StageOutcome {
        let q = query.raw();
        let mut turns = vec![Turn::user_text(format!("Search: {q}"))];

        let hits = match bounded(self.timeout, "search", self.index.search(session, q)).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(query = q, error = %e, "search failed");
                turns.push(Turn::agent_text(format!("Error searching for \"{q}\".")));
                return StageOutcome::Resolved(turns);
            }
        };

        let hits = match &self.highlighter {
            Some(highlighter) => highlighter.annotate(&hits, q),
            None => hits,
        };

        let reply = match ResultList::new(format!("Search results for \"{q}\":"), hits) {
            Some(list) => Turn::agent_results(list),
            None => Turn::agent_text(format!("No files found for \"{q}\".")),
        };
        turns.push(reply);
        StageOutcome::Resolved(turns)
    }
}
