//! Footer notes.

use serde::{Deserialize, Serialize};

/// A labeled footer annotation, e.g. `BREAKING CHANGE: drops node 12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// The keyword that opened the note, as written in the message.
    pub title: String,

    /// The note text; continuation lines are joined with newlines.
    pub text: String,
}

impl Note {
    /// Creates a new note.
    #[must_use]
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}
