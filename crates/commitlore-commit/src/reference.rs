//! Issue references.

use serde::{Deserialize, Serialize};

/// An issue or pull request referenced by a commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// The action keyword preceding the reference (e.g. `Closes`), if any.
    pub action: Option<String>,

    /// The repository owner, only set for `owner/repo#1` forms.
    pub owner: Option<String>,

    /// The repository name, if the reference names one.
    pub repository: Option<String>,

    /// The issue id without its prefix.
    pub issue: String,

    /// The matched text the reference was decoded from.
    pub raw: String,

    /// The issue prefix that matched (e.g. `#`).
    pub prefix: String,
}

impl Reference {
    /// Returns `owner/repository`, `repository`, or `None` for local references.
    pub fn slug(&self) -> Option<String> {
        match (&self.owner, &self.repository) {
            (Some(owner), Some(repository)) => Some(format!("{owner}/{repository}")),
            (None, Some(repository)) => Some(repository.clone()),
            _ => None,
        }
    }
}
