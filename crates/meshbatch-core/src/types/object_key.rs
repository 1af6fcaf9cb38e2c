//! Object key newtype.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A key naming one object within a bucket.
///
/// Keys are `/`-separated paths, unique within their bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Wrap a raw key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path segment, usable as a local file name.
    ///
    /// Returns `None` for keys ending in `/` (directory placeholders).
    pub fn file_name(&self) -> Option<&str> {
        match self.0.rsplit('/').next() {
            Some(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    /// The file stem of [`ObjectKey::file_name`], without its extension.
    pub fn file_stem(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => Some(name),
            Some(idx) => Some(&name[..idx]),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_of_nested_key() {
        let key = ObjectKey::new("step/2023/bracket.step");
        assert_eq!(key.file_name(), Some("bracket.step"));
        assert_eq!(key.file_stem(), Some("bracket"));
    }

    #[test]
    fn test_directory_placeholder_has_no_name() {
        assert_eq!(ObjectKey::new("step/").file_name(), None);
    }

    #[test]
    fn test_dotfile_stem_is_whole_name() {
        assert_eq!(ObjectKey::new("step/.hidden").file_stem(), Some(".hidden"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&ObjectKey::new("step/a.stp")).expect("serialize");
        assert_eq!(json, "\"step/a.stp\"");
    }
}
