//! Line pipeline: the lines of a message eligible for structural parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Everything from this line onward is discarded.
pub const SCISSOR_LINE: &str = "# ------------------------ >8 ------------------------";

static SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*gpg:").expect("invalid regex"));

/// Removes leading and trailing line breaks, keeping other whitespace.
pub(crate) fn trim_newlines(text: &str) -> &str {
    text.trim_matches(|c| c == '\r' || c == '\n')
}

/// Splits a raw message into the lines the parser classifies.
///
/// Outer line breaks are trimmed, the text is cut at the scissor line, and
/// comment lines (when `comment_char` is set) and `gpg:` signature lines are
/// dropped.
pub fn message_lines(raw: &str, comment_char: Option<char>) -> Vec<&str> {
    trim_newlines(raw)
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .take_while(|line| *line != SCISSOR_LINE)
        .filter(|line| comment_char.is_none_or(|c| !line.starts_with(c)))
        .filter(|line| !SIGNATURE_RE.is_match(line))
        .collect()
}
