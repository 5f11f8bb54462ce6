//! Compiled commit grammar.

use regex::{Captures, Regex};
use tracing::debug;

use commitlore_config::GrammarOptions;

use crate::GrammarError;

/// A compiled pattern with a uniform single-match and scan-all contract.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    fn compile(field: &'static str, pattern: &str) -> Result<Self, GrammarError> {
        Self::new(pattern).map_err(|source| GrammarError::InvalidPattern { field, source })
    }

    /// Returns the leftmost match in `text`.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.regex.captures(text)
    }

    /// Returns true if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Returns every successive match in `text`.
    ///
    /// Scanning resumes at the end of each match, or one character later
    /// after an empty match.
    pub fn captures_all<'t>(&self, text: &'t str) -> Vec<Captures<'t>> {
        let mut all = Vec::new();
        let mut cursor = 0;

        while cursor <= text.len() {
            let Some(captures) = self.regex.captures_at(text, cursor) else {
                break;
            };
            let Some(whole) = captures.get(0) else {
                break;
            };
            cursor = if whole.is_empty() {
                whole.end() + text[whole.end()..].chars().next().map_or(1, char::len_utf8)
            } else {
                whole.end()
            };
            all.push(captures);
        }

        all
    }

    /// Returns the source pattern.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// One action sentence found by the references matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sentence<'t> {
    pub action: Option<&'t str>,
    pub text: &'t str,
}

/// Splits text into the sentences that may hold issue references.
#[derive(Debug, Clone)]
pub(crate) enum ReferencesMatcher {
    /// An action keyword followed by whitespace opens a sentence that runs to
    /// the next action keyword or the end of the line.
    Actions {
        /// `(?i)(actions)\s+`
        opener: Matcher,
        /// `(?i)^(?:actions)`, tested at each candidate sentence end.
        keyword: Matcher,
    },
    /// Every line of the text is one unlabeled sentence.
    CatchAll,
}

impl ReferencesMatcher {
    fn new(actions: &str) -> Result<Self, GrammarError> {
        if actions.is_empty() {
            return Ok(Self::CatchAll);
        }
        Ok(Self::Actions {
            opener: Matcher::compile("reference_actions", &format!(r"(?i)({actions})\s+"))?,
            keyword: Matcher::compile("reference_actions", &format!("(?i)^(?:{actions})"))?,
        })
    }

    /// Returns the action sentences of `text`; no fallback is applied.
    pub fn sentences<'t>(&self, text: &'t str, catch_all: &Matcher) -> Vec<Sentence<'t>> {
        let (opener, keyword) = match self {
            Self::Actions { opener, keyword } => (opener, keyword),
            Self::CatchAll => return catch_all_sentences(text, catch_all),
        };

        let mut sentences = Vec::new();
        let mut cursor = 0;

        while cursor < text.len() {
            let Some(captures) = opener.regex.captures_at(text, cursor) else {
                break;
            };
            let (Some(whole), Some(action)) = (captures.get(0), captures.get(1)) else {
                break;
            };

            match sentence_end(text, whole.end(), keyword) {
                Some(end) => {
                    sentences.push(Sentence {
                        action: Some(action.as_str()),
                        text: &text[whole.end()..end],
                    });
                    cursor = end;
                }
                None => {
                    cursor = whole.start()
                        + text[whole.start()..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        sentences
    }
}

/// Finds the first position from `start` where an action keyword begins or
/// the text ends, without crossing a line break.
fn sentence_end(text: &str, start: usize, keyword: &Matcher) -> Option<usize> {
    for (offset, c) in text[start..].char_indices() {
        let at = start + offset;
        if keyword.is_match(&text[at..]) {
            return Some(at);
        }
        if c == '\n' || c == '\r' {
            return None;
        }
    }
    Some(text.len())
}

pub(crate) fn catch_all_sentences<'t>(text: &'t str, catch_all: &Matcher) -> Vec<Sentence<'t>> {
    catch_all
        .captures_all(text)
        .into_iter()
        .filter_map(|captures| captures.get(0))
        .map(|line| Sentence {
            action: None,
            text: line.as_str(),
        })
        .collect()
}

/// The immutable, ready-to-use form of [`GrammarOptions`].
///
/// Built once per configuration and shared read-only across parses and
/// threads.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    header: Matcher,
    header_correspondence: Vec<String>,
    merge: Option<Matcher>,
    merge_correspondence: Vec<String>,
    revert: Matcher,
    revert_correspondence: Vec<String>,
    field: Option<Matcher>,
    breaking_header: Option<Matcher>,
    comment_char: Option<char>,
    notes: Option<Matcher>,
    reference_parts: Option<Matcher>,
    references: ReferencesMatcher,
    catch_all: Matcher,
    mentions: Matcher,
}

impl CompiledGrammar {
    /// Compiles every pattern of `options`.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::MissingPattern`] if the header or revert
    /// pattern is empty, or [`GrammarError::InvalidPattern`] if any pattern
    /// does not compile.
    pub fn compile(options: &GrammarOptions) -> Result<Self, GrammarError> {
        let header = required("header_pattern", &options.header_pattern)?;
        let revert = required("revert_pattern", &options.revert_pattern)?;
        let merge = optional("merge_pattern", options.merge_pattern.as_deref())?;
        let field = optional("field_pattern", options.field_pattern.as_deref())?;
        let breaking_header = optional(
            "breaking_header_pattern",
            options.breaking_header_pattern.as_deref(),
        )?;

        let keywords = alternation(&options.note_keywords);
        let notes = if keywords.is_empty() {
            None
        } else {
            let pattern = match &options.notes_pattern {
                Some(template) => template.replace("{keywords}", &keywords),
                None => format!(r"(?i)^[\s|*]*({keywords})[:\s]+(.*)"),
            };
            Some(Matcher::compile("notes_pattern", &pattern)?)
        };

        let prefixes = alternation(&options.issue_prefixes);
        let reference_parts = if prefixes.is_empty() {
            None
        } else {
            let flags = if options.issue_prefixes_case_sensitive {
                ""
            } else {
                "(?i)"
            };
            let pattern = format!(r"{flags}(?:.*?)??\s*([\w./-]*?)??({prefixes})([\w-]*\d+)");
            Some(Matcher::compile("issue_prefixes", &pattern)?)
        };

        let references = ReferencesMatcher::new(&alternation(&options.reference_actions))?;

        let grammar = Self {
            header,
            header_correspondence: trimmed(&options.header_correspondence),
            merge,
            merge_correspondence: trimmed(&options.merge_correspondence),
            revert,
            revert_correspondence: trimmed(&options.revert_correspondence),
            field,
            breaking_header,
            comment_char: options.comment_char,
            notes,
            reference_parts,
            references,
            catch_all: Matcher::compile("references", r"[^\r\n]+")?,
            mentions: Matcher::compile("mentions", r"@([\w-]+)")?,
        };

        debug!(
            header = grammar.header.as_str(),
            merge = ?grammar.merge.as_ref().map(Matcher::as_str),
            notes = ?grammar.notes.as_ref().map(Matcher::as_str),
            reference_parts = ?grammar.reference_parts.as_ref().map(Matcher::as_str),
            "compiled commit grammar"
        );

        Ok(grammar)
    }

    /// Field names of the header pattern's capture groups.
    pub fn header_correspondence(&self) -> &[String] {
        &self.header_correspondence
    }

    /// Field names of the merge pattern's capture groups.
    pub fn merge_correspondence(&self) -> &[String] {
        &self.merge_correspondence
    }

    /// Field names of the revert pattern's capture groups.
    pub fn revert_correspondence(&self) -> &[String] {
        &self.revert_correspondence
    }

    /// The comment character, if configured.
    pub fn comment_char(&self) -> Option<char> {
        self.comment_char
    }

    pub(crate) fn header(&self) -> &Matcher {
        &self.header
    }

    pub(crate) fn merge(&self) -> Option<&Matcher> {
        self.merge.as_ref()
    }

    pub(crate) fn revert(&self) -> &Matcher {
        &self.revert
    }

    pub(crate) fn field(&self) -> Option<&Matcher> {
        self.field.as_ref()
    }

    pub(crate) fn breaking_header(&self) -> Option<&Matcher> {
        self.breaking_header.as_ref()
    }

    pub(crate) fn notes(&self) -> Option<&Matcher> {
        self.notes.as_ref()
    }

    pub(crate) fn reference_parts(&self) -> Option<&Matcher> {
        self.reference_parts.as_ref()
    }

    pub(crate) fn references(&self) -> &ReferencesMatcher {
        &self.references
    }

    pub(crate) fn catch_all(&self) -> &Matcher {
        &self.catch_all
    }

    pub(crate) fn mentions(&self) -> &Matcher {
        &self.mentions
    }
}

fn required(field: &'static str, pattern: &str) -> Result<Matcher, GrammarError> {
    if pattern.trim().is_empty() {
        return Err(GrammarError::MissingPattern(field));
    }
    Matcher::compile(field, pattern)
}

fn optional(field: &'static str, pattern: Option<&str>) -> Result<Option<Matcher>, GrammarError> {
    match pattern {
        Some(pattern) if !pattern.trim().is_empty() => Matcher::compile(field, pattern).map(Some),
        _ => Ok(None),
    }
}

/// Joins the non-empty trimmed entries into a pattern alternation.
fn alternation(items: &[String]) -> String {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join("|")
}

fn trimmed(items: &[String]) -> Vec<String> {
    items.iter().map(|item| item.trim().to_string()).collect()
}
