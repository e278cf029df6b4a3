//! Conversation engine for FileBot.
//!
//! This crate turns user input into conversation turns:
//! - [`ExplorerEngine`] resolves typed input through the canned → directory →
//!   search pipeline and handles selections from result lists
//! - [`AnswerProxy`] relays free-form chat to the answer service
//! - [`Conversation`] holds the transcript and drops superseded lookups

pub mod canned;
pub mod conversation;
pub mod explorer;
pub mod highlight;
pub mod proxy;
pub mod stages;

#[cfg(test)]
mod testing;

pub use canned::{CANNED_RESPONSES, CannedResponseMatcher, MatchPolicy};
pub use conversation::{Conversation, ConversationLog, QueryTicket};
pub use explorer::{ExplorerEngine, ExplorerOptions};
pub use highlight::ResultHighlighter;
pub use proxy::{AnswerProxy, UNREACHABLE_REPLY};
pub use stages::{CannedStage, DirectoryStage, IntentResolver, SearchStage, Stage, StageOutcome};
