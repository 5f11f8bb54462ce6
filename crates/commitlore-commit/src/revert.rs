//! Revert metadata.

use serde::Serialize;

use crate::Fields;

/// Captures of a revert commit, keyed by the revert correspondence names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RevertInfo {
    fields: Fields,
}

impl RevertInfo {
    /// Creates revert metadata from its captured fields.
    #[must_use]
    pub fn new(fields: Fields) -> Self {
        Self { fields }
    }

    /// Returns a captured value by correspondence name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }

    /// The reverted header, under the conventional correspondence.
    pub fn header(&self) -> Option<&str> {
        self.get("header")
    }

    /// The reverted commit hash, under the conventional correspondence.
    pub fn hash(&self) -> Option<&str> {
        self.get("hash")
    }

    /// Returns all captured fields.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}
