//! Heading extraction: pure scan of level-2/3 heading blocks in marked-up
//! text. No I/O, deterministic, safe to call repeatedly on unmodified text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum plain-text context captured after each heading.
const CONTEXT_LIMIT: usize = 200;

/// One level-2 or level-3 heading found in the article body.
///
/// `offset` is a byte position into the exact text version the heading was
/// extracted from; it is stale as soon as that text is mutated. Consumers
/// that rewrite the text must re-locate the heading by its literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    /// Heading level, 2 or 3.
    pub level: u8,
    /// Heading text with nested markup stripped.
    pub text: String,
    /// Byte offset of the opening tag in the source text.
    pub offset: usize,
    /// Up to 200 characters of the following plain-text content.
    pub context: String,
}

pub(crate) static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h([23])\b[^>]*>(.*?)</h[23]>").unwrap());

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Strip markup tags and collapse whitespace runs to single spaces.
pub(crate) fn strip_tags(input: &str) -> String {
    let text = RE_TAG.replace_all(input, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scan `text` for level-2 and level-3 heading blocks in encounter order.
///
/// Headings whose stripped text is empty are dropped. Returns an empty list
/// (not an error) when no headings exist — the caller decides whether that
/// is fatal.
pub fn extract_headings(text: &str) -> Vec<HeadingRef> {
    let mut headings = Vec::new();
    for caps in RE_HEADING.captures_iter(text) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let level: u8 = caps[1].parse().unwrap_or(2);
        let heading_text = strip_tags(&caps[2]);
        if heading_text.is_empty() {
            continue;
        }
        headings.push(HeadingRef {
            level,
            text: heading_text,
            offset: whole.start(),
            context: trailing_context(&text[whole.end()..]),
        });
    }
    headings
}

/// Plain text following a heading, stopping before the next heading block
/// and truncated to `CONTEXT_LIMIT` characters.
fn trailing_context(rest: &str) -> String {
    let until = RE_HEADING.find(rest).map(|m| m.start()).unwrap_or(rest.len());
    truncate_chars(&strip_tags(&rest[..until]), CONTEXT_LIMIT)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
