//! Keyword emphasis for search-hit snippets.
//!
//! Annotation is a single pass over the snippet: every keyword's
//! occurrences are located (case-insensitively, as literal text), the
//! resulting spans are merged, and each merged span is wrapped once.
//!
//! Text already enclosed in a marker pair is left exactly as it is and never
//! searched, so re-annotating a snippet yields the same output, overlapping
//! keywords never nest, and server text that happens to use the marker
//! strings keeps its content. Unpaired markers are ordinary text.

use std::ops::Range;

use filebot_shared::SearchHit;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Default marker placed before a highlighted span.
pub const DEFAULT_OPEN: &str = "<mark>";
/// Default marker placed after a highlighted span.
pub const DEFAULT_CLOSE: &str = "</mark>";

/// Wraps query keywords found in `matched_content` with emphasis markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultHighlighter {
    open: String,
    close: String,
}

impl Default for ResultHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN, DEFAULT_CLOSE)
    }
}

impl ResultHighlighter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Whitespace-delimited words of `query` longer than one character.
    pub fn keywords(query: &str) -> Vec<&str> {
        query
            .split_whitespace()
            .filter(|word| word.chars().count() > 1)
            .collect()
    }

    /// Return annotated copies of `hits`. The input is left untouched.
    pub fn annotate(&self, hits: &[SearchHit], query: &str) -> Vec<SearchHit> {
        let matchers = compile(&Self::keywords(query));

        hits.iter()
            .map(|hit| {
                let mut hit = hit.clone();
                if let Some(content) = hit.matched_content.as_deref() {
                    if !content.is_empty() && !matchers.is_empty() {
                        hit.matched_content = Some(self.wrap(content, &matchers));
                    }
                }
                hit
            })
            .collect()
    }

    /// Annotate a single piece of text.
    pub fn annotate_text(&self, text: &str, query: &str) -> String {
        let matchers = compile(&Self::keywords(query));
        if matchers.is_empty() {
            return text.to_string();
        }
        self.wrap(text, &matchers)
    }

    /// Remove the markers of every marker pair, leaving the visible text.
    /// Unpaired markers stay.
    pub fn strip_markers(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for pair in self.marked_regions(text) {
            out.push_str(&text[cursor..pair.start]);
            out.push_str(&text[pair.start + self.open.len()..pair.end - self.close.len()]);
            cursor = pair.end;
        }
        out.push_str(&text[cursor..]);
        out
    }

    /// Byte ranges of innermost `open…close` pairs, markers included.
    ///
    /// Each close pairs with the nearest open before it that has not been
    /// consumed, so stray markers in server text never swallow a real pair.
    fn marked_regions(&self, text: &str) -> Vec<Range<usize>> {
        let (open, close) = (self.open.as_str(), self.close.as_str());
        let mut regions = Vec::new();
        if open.is_empty() || close.is_empty() {
            return regions;
        }

        let mut pos = 0;
        while let Some(start) = text[pos..].find(open).map(|i| pos + i) {
            let body = start + open.len();
            let Some(end) = text[body..].find(close).map(|i| body + i) else {
                break;
            };
            // A later open before this close is the one that pairs with it.
            let start = text[body..end]
                .rfind(open)
                .map_or(start, |i| body + i);
            regions.push(start..end + close.len());
            pos = end + close.len();
        }
        regions
    }

    fn wrap(&self, text: &str, matchers: &[Regex]) -> String {
        let mut out = String::with_capacity(text.len() + 32);
        let mut cursor = 0;
        for region in self
            .marked_regions(text)
            .into_iter()
            .chain(std::iter::once(text.len()..text.len()))
        {
            self.wrap_plain(&text[cursor..region.start], matchers, &mut out);
            out.push_str(&text[region.clone()]);
            cursor = region.end;
        }
        out
    }

    /// Wrap keyword spans in text that holds no marker pair.
    fn wrap_plain(&self, plain: &str, matchers: &[Regex], out: &mut String) {
        let spans = merge(
            find_spans(plain, matchers)
                .into_iter()
                .filter(|span| !self.holds_marker(&plain[span.clone()]))
                .collect(),
        );

        let mut cursor = 0;
        for span in spans {
            out.push_str(&plain[cursor..span.start]);
            out.push_str(&self.open);
            out.push_str(&plain[span.clone()]);
            out.push_str(&self.close);
            cursor = span.end;
        }
        out.push_str(&plain[cursor..]);
    }

    /// Spans containing a marker string are left alone so every wrap stays a clean pair.
    fn holds_marker(&self, span: &str) -> bool {
        (!self.open.is_empty() && span.contains(&self.open))
            || (!self.close.is_empty() && span.contains(&self.close))
    }
}

/// One case-insensitive literal matcher per keyword.
fn compile(keywords: &[&str]) -> Vec<Regex> {
    keywords
        .iter()
        .filter_map(|kw| {
            RegexBuilder::new(&regex::escape(kw))
                .case_insensitive(true)
                .build()
                .map_err(|e| warn!(keyword = %kw, error = %e, "skipping keyword"))
                .ok()
        })
        .collect()
}

/// Every occurrence of every keyword, including overlapping ones.
fn find_spans(text: &str, matchers: &[Regex]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    for re in matchers {
        let mut pos = 0;
        while pos < text.len() {
            let Some(m) = re.find_at(text, pos) else {
                break;
            };
            if m.is_empty() {
                break;
            }
            spans.push(m.range());
            // Step one char past the match start so overlapping repeats are found.
            pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
    }
    spans
}

/// Sort spans and fuse any that overlap or touch.
fn merge(mut spans: Vec<Range<usize>>) -> Vec<Range<usize>> {
    spans.sort_by_key(|s| (s.start, s.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}
