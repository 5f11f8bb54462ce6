//! Parsed commit record.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::{Fields, Note, Reference, RevertInfo};

/// A source of named fields in a [`CommitRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayer {
    /// Header correspondence captures (`type`, `scope`, `subject`, ...).
    Header,
    /// Merge correspondence captures.
    Merge,
    /// The fixed sections: `merge`, `header`, `body`, `footer`, `notes`,
    /// `references`, `mentions`, `revert`.
    Structural,
    /// Custom field captures opened by the field pattern.
    Custom,
}

/// Merge order of the field layers. On a name collision a later layer wins.
pub const FIELD_PRECEDENCE: [FieldLayer; 4] = [
    FieldLayer::Header,
    FieldLayer::Merge,
    FieldLayer::Structural,
    FieldLayer::Custom,
];

/// A value in the merged view of a [`CommitRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue<'a> {
    /// A textual field, possibly null.
    Text(Option<&'a str>),
    /// The notes section.
    Notes(&'a [Note]),
    /// The references section.
    References(&'a [Reference]),
    /// The mentions section.
    Mentions(&'a [String]),
    /// The revert section.
    Revert(Option<&'a RevertInfo>),
}

/// A commit message after parsing by the commit grammar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRecord {
    /// The merge preamble line, for merge commits.
    pub merge: Option<String>,

    /// The header line.
    pub header: Option<String>,

    /// The body, without trailing or leading blank lines.
    pub body: Option<String>,

    /// The footer: note, reference and trailing lines.
    pub footer: Option<String>,

    /// Notes such as `BREAKING CHANGE`, in source order.
    pub notes: Vec<Note>,

    /// Issue references, in source order.
    pub references: Vec<Reference>,

    /// `@name` mentions, in source order, duplicates kept.
    pub mentions: Vec<String>,

    /// Revert metadata, for revert commits.
    pub revert: Option<RevertInfo>,

    /// Header correspondence captures.
    pub header_fields: Fields,

    /// Merge correspondence captures.
    pub merge_fields: Fields,

    /// Custom field captures.
    pub custom_fields: Fields,
}

impl CommitRecord {
    /// Creates a new commit record builder.
    #[must_use]
    pub fn builder() -> CommitRecordBuilder {
        CommitRecordBuilder::default()
    }

    /// Returns the fields of one layer, in order.
    fn layer(&self, layer: FieldLayer) -> Vec<(&str, FieldValue<'_>)> {
        fn text(fields: &Fields) -> Vec<(&str, FieldValue<'_>)> {
            fields
                .iter()
                .map(|(name, value)| (name, FieldValue::Text(value)))
                .collect()
        }

        match layer {
            FieldLayer::Header => text(&self.header_fields),
            FieldLayer::Merge => text(&self.merge_fields),
            FieldLayer::Structural => vec![
                ("merge", FieldValue::Text(self.merge.as_deref())),
                ("header", FieldValue::Text(self.header.as_deref())),
                ("body", FieldValue::Text(self.body.as_deref())),
                ("footer", FieldValue::Text(self.footer.as_deref())),
                ("notes", FieldValue::Notes(&self.notes)),
                ("references", FieldValue::References(&self.references)),
                ("mentions", FieldValue::Mentions(&self.mentions)),
                ("revert", FieldValue::Revert(self.revert.as_ref())),
            ],
            FieldLayer::Custom => text(&self.custom_fields),
        }
    }

    /// Returns every field merged in [`FIELD_PRECEDENCE`] order.
    ///
    /// A name keeps the position of its first occurrence; its value comes
    /// from the last layer that defines it.
    pub fn resolved(&self) -> Vec<(&str, FieldValue<'_>)> {
        let mut merged: Vec<(&str, FieldValue<'_>)> = Vec::new();
        for layer in FIELD_PRECEDENCE {
            for (name, value) in self.layer(layer) {
                match merged.iter_mut().find(|(n, _)| *n == name) {
                    Some(slot) => slot.1 = value,
                    None => merged.push((name, value)),
                }
            }
        }
        merged
    }

    /// Looks up a textual field by name through the merged view.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.resolved()
            .into_iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, value)| match value {
                FieldValue::Text(text) => text,
                _ => None,
            })
    }

    /// The `type` field of the conventional header.
    pub fn r#type(&self) -> Option<&str> {
        self.field("type")
    }

    /// The `scope` field of the conventional header.
    pub fn scope(&self) -> Option<&str> {
        self.field("scope")
    }

    /// The `subject` field of the conventional header.
    pub fn subject(&self) -> Option<&str> {
        self.field("subject")
    }

    /// Returns true if a merge preamble was recognized.
    pub fn is_merge(&self) -> bool {
        self.merge.is_some()
    }

    /// Returns true if the message is a revert commit.
    pub fn is_revert(&self) -> bool {
        self.revert.is_some()
    }
}

impl Serialize for CommitRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.resolved();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (name, value) in &fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Builder for [`CommitRecord`].
#[derive(Debug, Default)]
pub struct CommitRecordBuilder {
    record: CommitRecord,
}

impl CommitRecordBuilder {
    /// Sets the merge preamble.
    #[must_use]
    pub fn merge(mut self, merge: impl Into<Option<String>>) -> Self {
        self.record.merge = merge.into();
        self
    }

    /// Sets the header.
    #[must_use]
    pub fn header(mut self, header: impl Into<Option<String>>) -> Self {
        self.record.header = header.into();
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Option<String>>) -> Self {
        self.record.body = body.into();
        self
    }

    /// Sets the footer.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<Option<String>>) -> Self {
        self.record.footer = footer.into();
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn notes(mut self, notes: Vec<Note>) -> Self {
        self.record.notes = notes;
        self
    }

    /// Sets the references.
    #[must_use]
    pub fn references(mut self, references: Vec<Reference>) -> Self {
        self.record.references = references;
        self
    }

    /// Sets the mentions.
    #[must_use]
    pub fn mentions(mut self, mentions: Vec<String>) -> Self {
        self.record.mentions = mentions;
        self
    }

    /// Sets the revert metadata.
    #[must_use]
    pub fn revert(mut self, revert: Option<RevertInfo>) -> Self {
        self.record.revert = revert;
        self
    }

    /// Sets the header correspondence captures.
    #[must_use]
    pub fn header_fields(mut self, fields: Fields) -> Self {
        self.record.header_fields = fields;
        self
    }

    /// Sets the merge correspondence captures.
    #[must_use]
    pub fn merge_fields(mut self, fields: Fields) -> Self {
        self.record.merge_fields = fields;
        self
    }

    /// Sets the custom field captures.
    #[must_use]
    pub fn custom_fields(mut self, fields: Fields) -> Self {
        self.record.custom_fields = fields;
        self
    }

    /// Builds the [`CommitRecord`].
    #[must_use]
    pub fn build(self) -> CommitRecord {
        self.record
    }
}
