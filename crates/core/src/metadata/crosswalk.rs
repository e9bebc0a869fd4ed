//! Vorbis comment to Nero Digital (MPEG-4) tag translation.

use std::collections::BTreeMap;
use tracing::debug;

use super::tags::TagSet;

/// Vorbis comment field names and their Nero Digital counterparts.
///
/// The first eleven entries are the standard Ogg Vorbis field names, the
/// remaining four are the names proposed on the xiph.org wiki.
pub const NERO_CROSSWALK: &[(&str, &str)] = &[
    ("ARTIST", "artist"),
    ("TITLE", "title"),
    ("ALBUM", "album"),
    ("DATE", "year"),
    ("TRACKNUMBER", "track"),
    ("GENRE", "genre"),
    ("COMMENT", "comment"),
    ("ORGANIZATION", "label"),
    ("LICENSE", "credits"),
    ("COPYRIGHT", "copyright"),
    ("ISRC", "isrc"),
    ("COMPOSER", "composer"),
    ("TRACKTOTAL", "totaltracks"),
    ("DISCNUMBER", "disc"),
    ("DISCTOTAL", "totaldiscs"),
];

/// Standard Vorbis fields with no Nero Digital equivalent.
///
/// `VERSION` survives as a suffix of the title; the others are lost.
pub const UNMAPPED_VORBIS_FIELDS: &[&str] =
    &["CONTACT", "DESCRIPTION", "LOCATION", "PERFORMER", "VERSION"];

/// Tags in the Nero Digital vocabulary, keyed by lower-case field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeroTags(BTreeMap<&'static str, String>);

impl NeroTags {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(field, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Translates Vorbis comments into Nero Digital tags.
///
/// Applied in order:
/// 1. `VERSION` is appended to `TITLE` as `"Title [Version]"`.
/// 2. `TRACKNUMBER` is re-serialized as an integer (`"03"` becomes `"3"`).
///    Values that do not parse are kept verbatim.
/// 3. Every field listed in [`NERO_CROSSWALK`] is copied under its mapped
///    name. Fields without a mapping are dropped.
pub fn vorbis_to_nero(tags_in: &TagSet) -> NeroTags {
    let mut tags = tags_in.clone();

    if let Some(version) = tags.get("VERSION").map(str::to_owned) {
        if let Some(title) = tags.get("TITLE") {
            let title = format!("{} [{}]", title, version);
            tags.insert("TITLE", title);
        }
    }

    if let Some(track) = tags.get("TRACKNUMBER").map(str::to_owned) {
        match track.trim().parse::<u32>() {
            Ok(number) => {
                tags.insert("TRACKNUMBER", number.to_string());
            }
            Err(_) => debug!("Keeping non-numeric track number: {}", track),
        }
    }

    let mut out = BTreeMap::new();
    for (vorbis_field, nero_field) in NERO_CROSSWALK {
        if let Some(value) = tags.get(vorbis_field) {
            out.insert(*nero_field, value.to_string());
        }
    }

    let dropped = tags.len() - out.len();
    if dropped > 0 {
        debug!("Dropped {} fields without a Nero Digital equivalent", dropped);
    }

    NeroTags(out)
}
