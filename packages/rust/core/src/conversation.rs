//! Conversation transcript state.
//!
//! A [`ConversationLog`] is an append-only list of turns. A [`Conversation`]
//! wraps one log with the ticket bookkeeping that keeps a slow, superseded
//! lookup from appending its turns after a newer one.

use filebot_shared::{ConversationId, ResultList, Turn};
use tracing::debug;

/// Append-only ordered sequence of turns.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn extend(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.turns.extend(turns);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Turns appended at or after `index`.
    pub fn since(&self, index: usize) -> &[Turn] {
        &self.turns[index.min(self.turns.len())..]
    }

    /// The most recent result list, which is what `:open N` refers to.
    pub fn last_results(&self) -> Option<&ResultList> {
        self.turns.iter().rev().find_map(Turn::results)
    }
}

impl<'a> IntoIterator for &'a ConversationLog {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

/// Identifies one accepted input; only the newest ticket may commit turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryTicket(u64);

/// One chat view: an id, its log, and the newest issued ticket.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    id: ConversationId,
    log: ConversationLog,
    latest: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Issue a ticket for a new input, superseding every earlier ticket.
    pub fn begin(&mut self) -> QueryTicket {
        self.latest += 1;
        QueryTicket(self.latest)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Append `turns` if `ticket` is still the newest. Returns whether they were kept.
    pub fn commit(&mut self, ticket: QueryTicket, turns: Vec<Turn>) -> bool {
        if !self.is_current(ticket) {
            debug!(
                conversation = %self.id,
                ticket = ticket.0,
                latest = self.latest,
                dropped = turns.len(),
                "discarding turns from superseded query"
            );
            return false;
        }
        self.log.extend(turns);
        true
    }

    /// Append turns that are not tied to a query (e.g. the initial listing).
    pub fn append(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.log.extend(turns);
    }
}
