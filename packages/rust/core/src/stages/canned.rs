//! Stage 1: canned social replies.

use async_trait::async_trait;
use filebot_shared::{Query, Session, Turn};

use super::{Stage, StageOutcome};
use crate::canned::CannedResponseMatcher;

/// Answers greetings and pleasantries from the canned table. No remote calls.
#[derive(Debug, Clone, Default)]
pub struct CannedStage {
    matcher: CannedResponseMatcher,
}

impl CannedStage {
    pub fn new(matcher: CannedResponseMatcher) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl Stage for CannedStage {
    fn name(&self) -> &str {
        "canned"
    }

    async fn try_resolve(&self, _session: &Session, query: &Query) -> StageOutcome {
        match self.matcher.match_query(query.lowercase()) {
            Some(reply) => StageOutcome::Resolved(vec![
                Turn::user_text(query.raw()),
                Turn::agent_text(reply),
            ]),
            None => StageOutcome::Miss,
        }
    }
}
