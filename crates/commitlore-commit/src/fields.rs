//! Insertion-ordered field map.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Named values captured from a commit message, kept in first-insertion order.
///
/// Re-inserting an existing name overwrites its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, Option<String>)>,
}

impl Fields {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map with every name set to `None`.
    pub fn nulls<S: AsRef<str>>(names: &[S]) -> Self {
        names
            .iter()
            .map(|name| (name.as_ref().to_string(), None))
            .collect()
    }

    /// Sets `name` to `value`, overwriting in place if it already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Appends `line` to the value of `name`, joining with a newline.
    ///
    /// A missing or empty value is replaced by `line`.
    pub fn append(&mut self, name: &str, line: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, Some(value))) if !value.is_empty() => {
                value.push('\n');
                value.push_str(line);
            }
            Some((_, slot)) => *slot = Some(line.to_string()),
            None => self.entries.push((name.to_string(), Some(line.to_string()))),
        }
    }

    /// Returns the value of `name`, if present and not `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Returns true if `name` has an entry, even a `None` one.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Option<String>)> for Fields {
    fn from_iter<T: IntoIterator<Item = (N, Option<String>)>>(iter: T) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
