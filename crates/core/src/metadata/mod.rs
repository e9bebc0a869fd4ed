//! Metadata tag sets and translation between tag vocabularies.
//!
//! Decoders produce a [`TagSet`] keyed by upper-cased Vorbis comment field
//! names. Encoders whose container uses the same vocabulary write it back
//! unchanged; the AAC encoder first runs it through [`vorbis_to_nero`].

mod crosswalk;
mod tags;

pub use crosswalk::{vorbis_to_nero, NeroTags, NERO_CROSSWALK, UNMAPPED_VORBIS_FIELDS};
pub use tags::TagSet;
