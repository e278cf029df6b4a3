//! Canned social replies ("hello", "thanks", "bye", ...).
//!
//! The table is ordered: when a query contains several keys, the key
//! declared first wins.

/// Built-in phrase → reply table, in priority order.
pub const CANNED_RESPONSES: &[(&str, &str)] = &[
    ("good morning", "Good morning! 🌞"),
    ("hello", "Hello there! 👋"),
    ("hi", "Hi! How can I help you today?"),
    ("hey", "Hey! How's it going? 😃"),
    ("how are you", "I'm a bot, but I'm doing great! 😄"),
    ("good night", "Good night! 🌙 Sleep well."),
    ("thanks", "You're welcome! 😊"),
    ("thank you", "No problem! 👍"),
    ("what's up", "Not much, just here to help you! 😎"),
    ("how is your day", "My day is running smoothly, thanks for asking! 🤖"),
    ("bye", "Goodbye! 👋 Have a great day!"),
    ("see you", "See you later! 👀"),
    ("good afternoon", "Good afternoon! ☀️"),
    ("good evening", "Good evening! 🌇"),
    ("sorry", "No worries! It's all good. 😌"),
    ("congratulations", "🎉 Congratulations! Well done!"),
    ("happy birthday", "🎂 Happy Birthday! Hope you have a wonderful day!"),
    ("welcome", "You're welcome! 😄"),
    ("ok", "👍 Got it!"),
    ("yes", "✅ Yes!"),
    ("no", "❌ No!"),
    ("help", "Sure! How can I assist you? 🤖"),
];

/// How a key must sit inside the query to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// The key appears anywhere in the query and is not glued to
    /// neighbouring letters, digits or underscores. `"docs/hello"` matches
    /// `hello`; `"thing"` does not match `hi`.
    #[default]
    WordBounded,
    /// Plain substring containment: `"thing"` matches `hi`.
    Substring,
}

/// Looks a lowercase query up in an ordered phrase table.
#[derive(Debug, Clone)]
pub struct CannedResponseMatcher {
    table: &'static [(&'static str, &'static str)],
    policy: MatchPolicy,
}

impl Default for CannedResponseMatcher {
    fn default() -> Self {
        Self::new(CANNED_RESPONSES, MatchPolicy::default())
    }
}

impl CannedResponseMatcher {
    pub fn new(table: &'static [(&'static str, &'static str)], policy: MatchPolicy) -> Self {
        Self { table, policy }
    }

    /// Reply for the first table key found in `lowercase_query`, if any.
    pub fn match_query(&self, lowercase_query: &str) -> Option<&'static str> {
        self.table
            .iter()
            .find(|(key, _)| self.contains(lowercase_query, key))
            .map(|(_, reply)| *reply)
    }

    fn contains(&self, haystack: &str, key: &str) -> bool {
        match self.policy {
            MatchPolicy::Substring => haystack.contains(key),
            MatchPolicy::WordBounded => haystack.match_indices(key).any(|(start, _)| {
                let before = haystack[..start].chars().next_back();
                let after = haystack[start + key.len()..].chars().next();
                !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
            }),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
