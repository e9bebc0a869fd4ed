//! Canonical tag set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata tags keyed by upper-cased field name.
///
/// Keys are normalized on insertion and lookup, so `title` and `TITLE`
/// address the same field. Iteration is ordered by key, which keeps the
/// argument vectors handed to external programs stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet(BTreeMap<String, String>);

impl TagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, replacing any previous value.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.as_ref().to_uppercase(), value.into())
    }

    /// Returns the value of a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_uppercase()).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(&key.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(KEY, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses `FIELD=value` lines as exported by `metaflac --export-tags-to`.
    ///
    /// A line without `=` continues the value of the preceding field.
    /// Lines before the first field and fields with an empty name are ignored.
    pub fn parse_vorbis_comments(text: &str) -> Self {
        let mut tags = Self::new();
        let mut last_key: Option<String> = None;

        for line in text.lines() {
            match line.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    let key = key.trim().to_uppercase();
                    tags.0.insert(key.clone(), value.to_string());
                    last_key = Some(key);
                }
                Some(_) => last_key = None,
                None => {
                    if let Some(value) = last_key.as_ref().and_then(|k| tags.0.get_mut(k)) {
                        value.push('\n');
                        value.push_str(line);
                    }
                }
            }
        }

        tags
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Self::new();
        for (key, value) in iter {
            tags.insert(key, value);
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_uppercased() {
        let mut tags = TagSet::new();
        tags.insert("title", "Song");
        assert_eq!(tags.get("TITLE"), Some("Song"));
        assert_eq!(tags.get("Title"), Some("Song"));
        assert!(tags.contains_key("title"));
        assert_eq!(tags.iter().next(), Some(("TITLE", "Song")));
    }

    #[test]
    fn test_insert_replaces() {
        let mut tags = TagSet::new();
        tags.insert("ARTIST", "A");
        assert_eq!(tags.insert("artist", "B"), Some("A".to_string()));
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("ARTIST"), Some("B"));
    }

    #[test]
    fn test_parse_vorbis_comments() {
        let out = "title=Song\nArtist=Band\nDATE=2001\nCOMMENT=a=b\n";
        let tags = TagSet::parse_vorbis_comments(out);
        assert_eq!(tags.len(), 4);
        assert_eq!(tags.get("TITLE"), Some("Song"));
        assert_eq!(tags.get("ARTIST"), Some("Band"));
        assert_eq!(tags.get("DATE"), Some("2001"));
        assert_eq!(tags.get("COMMENT"), Some("a=b"));
    }

    #[test]
    fn test_parse_multiline_value() {
        let out = "LYRICS=first line\nsecond line\nTITLE=Song\n";
        let tags = TagSet::parse_vorbis_comments(out);
        assert_eq!(tags.get("LYRICS"), Some("first line\nsecond line"));
        assert_eq!(tags.get("TITLE"), Some("Song"));
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(TagSet::parse_vorbis_comments("").is_empty());
        assert!(TagSet::parse_vorbis_comments("orphan line\n=no key\n").is_empty());
    }

    #[test]
    fn test_from_iter() {
        let tags: TagSet = [("genre", "Jazz"), ("ALBUM", "Blue")].into_iter().collect();
        let keys: Vec<_> = tags.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ALBUM", "GENRE"]);
    }
}
