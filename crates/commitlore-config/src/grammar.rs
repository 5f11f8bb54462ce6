//! Grammar options.

use serde::{Deserialize, Deserializer, Serialize};

/// Options describing the commit grammar.
///
/// Every pattern is a regular expression in string form; it is compiled once
/// when the grammar is built. List options accept either a TOML array or a
/// comma-delimited string (`"type,scope,subject"`).
///
/// Note keywords, reference actions and issue prefixes are joined into
/// alternations verbatim, so they may themselves contain pattern syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarOptions {
    /// Pattern matched against the header line.
    pub header_pattern: String,

    /// Field names for the header pattern's capture groups, in group order.
    #[serde(deserialize_with = "list")]
    pub header_correspondence: Vec<String>,

    /// Pattern recognizing a merge preamble line. Disabled when `None` or empty.
    pub merge_pattern: Option<String>,

    /// Field names for the merge pattern's capture groups.
    #[serde(deserialize_with = "list")]
    pub merge_correspondence: Vec<String>,

    /// Pattern matched against the whole message to detect reverts.
    pub revert_pattern: String,

    /// Field names for the revert pattern's capture groups.
    #[serde(deserialize_with = "list")]
    pub revert_correspondence: Vec<String>,

    /// Pattern of a line opening a custom field; group 1 is the field name.
    pub field_pattern: Option<String>,

    /// Keywords opening a note (e.g. `BREAKING CHANGE`).
    #[serde(deserialize_with = "list")]
    pub note_keywords: Vec<String>,

    /// Notes pattern template; `{keywords}` is replaced by the keyword alternation.
    pub notes_pattern: Option<String>,

    /// Keywords introducing issue references (e.g. `closes`).
    #[serde(deserialize_with = "list")]
    pub reference_actions: Vec<String>,

    /// Prefixes of issue ids (e.g. `#`).
    #[serde(deserialize_with = "list")]
    pub issue_prefixes: Vec<String>,

    /// Whether issue prefixes match case-sensitively.
    pub issue_prefixes_case_sensitive: bool,

    /// Lines starting with this character are dropped.
    pub comment_char: Option<char>,

    /// Pattern flagging a breaking change in the header; group 3 becomes the note text.
    pub breaking_header_pattern: Option<String>,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            header_pattern: r"^(\w*)(?:\(([\w$@.\-*/ ]*)\))?: (.*)$".to_string(),
            header_correspondence: owned(&["type", "scope", "subject"]),
            merge_pattern: None,
            merge_correspondence: Vec::new(),
            revert_pattern: r#"^Revert\s"([\s\S]*)"\s*This reverts commit (\w*)\."#.to_string(),
            revert_correspondence: owned(&["header", "hash"]),
            field_pattern: Some(r"^-(.*?)-$".to_string()),
            note_keywords: owned(&["BREAKING CHANGE", "BREAKING-CHANGE"]),
            notes_pattern: None,
            reference_actions: owned(&[
                "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves",
                "resolved",
            ]),
            issue_prefixes: owned(&["#"]),
            issue_prefixes_case_sensitive: false,
            comment_char: None,
            breaking_header_pattern: None,
        }
    }
}

impl GrammarOptions {
    /// Options for the Conventional Commits convention.
    #[must_use]
    pub fn conventional() -> Self {
        Self::default()
    }

    /// Sets the header pattern and its correspondence.
    #[must_use]
    pub fn with_header(mut self, pattern: impl Into<String>, correspondence: &[&str]) -> Self {
        self.header_pattern = pattern.into();
        self.header_correspondence = owned(correspondence);
        self
    }

    /// Sets the merge pattern and its correspondence.
    #[must_use]
    pub fn with_merge(mut self, pattern: impl Into<String>, correspondence: &[&str]) -> Self {
        self.merge_pattern = Some(pattern.into());
        self.merge_correspondence = owned(correspondence);
        self
    }

    /// Sets the revert pattern and its correspondence.
    #[must_use]
    pub fn with_revert(mut self, pattern: impl Into<String>, correspondence: &[&str]) -> Self {
        self.revert_pattern = pattern.into();
        self.revert_correspondence = owned(correspondence);
        self
    }

    /// Sets or disables the custom field pattern.
    #[must_use]
    pub fn with_field_pattern(mut self, pattern: Option<&str>) -> Self {
        self.field_pattern = pattern.map(String::from);
        self
    }

    /// Sets the note keywords.
    #[must_use]
    pub fn with_note_keywords(mut self, keywords: &[&str]) -> Self {
        self.note_keywords = owned(keywords);
        self
    }

    /// Sets the notes pattern template.
    #[must_use]
    pub fn with_notes_pattern(mut self, template: impl Into<String>) -> Self {
        self.notes_pattern = Some(template.into());
        self
    }

    /// Sets the reference action keywords.
    #[must_use]
    pub fn with_reference_actions(mut self, actions: &[&str]) -> Self {
        self.reference_actions = owned(actions);
        self
    }

    /// Sets the issue prefixes and their case sensitivity.
    #[must_use]
    pub fn with_issue_prefixes(mut self, prefixes: &[&str], case_sensitive: bool) -> Self {
        self.issue_prefixes = owned(prefixes);
        self.issue_prefixes_case_sensitive = case_sensitive;
        self
    }

    /// Sets the comment character.
    #[must_use]
    pub fn with_comment_char(mut self, comment_char: char) -> Self {
        self.comment_char = Some(comment_char);
        self
    }

    /// Sets the breaking-change header pattern.
    #[must_use]
    pub fn with_breaking_header_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.breaking_header_pattern = Some(pattern.into());
        self
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Splits a comma-delimited option into trimmed entries.
///
/// Empty entries are kept so that correspondence positions stay aligned
/// with capture groups.
pub fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|item| item.trim().to_string()).collect()
}

fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Delimited(String),
        Items(Vec<String>),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Delimited(value) => split_list(&value),
        Repr::Items(items) => items.iter().map(|item| item.trim().to_string()).collect(),
    })
}
