//! Types for the codec module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::metadata::TagSet;

/// Formats that can be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Free Lossless Audio Codec
    Flac,
    /// RIFF WAVE (uncompressed PCM)
    Wave,
}

impl SourceFormat {
    pub const ALL: &'static [SourceFormat] = &[Self::Flac, Self::Wave];

    /// Returns the format name as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Wave => "wave",
        }
    }

    /// Returns the file extension (without dot) of files in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Wave => "wav",
        }
    }

    /// Whether files in this format carry metadata tags.
    pub fn carries_metadata(&self) -> bool {
        matches!(self, Self::Flac)
    }
}

/// Formats that can be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFormat {
    /// Opus via opus-tools
    Opus,
    /// AAC via the Nero AAC encoder
    Aac,
    /// Free Lossless Audio Codec
    Flac,
    /// RIFF WAVE (uncompressed PCM)
    Wave,
}

impl TargetFormat {
    pub const ALL: &'static [TargetFormat] = &[Self::Opus, Self::Aac, Self::Flac, Self::Wave];

    /// Returns the format name as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wave => "wave",
        }
    }

    /// Returns the file extension (without dot) of files in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Opus => "opus",
            Self::Aac => "m4a",
            Self::Flac => "flac",
            Self::Wave => "wav",
        }
    }

    /// Whether files in this format carry metadata tags.
    pub fn carries_metadata(&self) -> bool {
        !matches!(self, Self::Wave)
    }
}

/// Error returned when a format name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown format: {}", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for SourceFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoding quality on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: i64 = 0;
    pub const MAX: i64 = 100;

    /// Validates a raw quality value.
    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Quality on a 0-10 integer scale.
    pub fn tenths(&self) -> u8 {
        self.0 / 10
    }

    /// Quality on a 0.0-1.0 scale.
    pub fn fraction(&self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(50)
    }
}

impl TryFrom<i64> for Quality {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("quality must be between 0 and 100, got {}", value))
    }
}

impl From<Quality> for i64 {
    fn from(quality: Quality) -> Self {
        i64::from(quality.0)
    }
}

/// Construction options shared by every codec variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecOptions {
    /// Extract (decoders) or embed (encoders) metadata tags.
    pub metadata: bool,
    /// Extract (decoders) or embed (encoders) the cover image.
    pub image: bool,
    /// Encoding quality, ignored by decoders.
    pub quality: Quality,
}

impl CodecOptions {
    pub fn with_metadata(mut self, enabled: bool) -> Self {
        self.metadata = enabled;
        self
    }

    pub fn with_image(mut self, enabled: bool) -> Self {
        self.image = enabled;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }
}

/// Scratch paths a decoder writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTargets {
    /// Where the raw PCM audio goes.
    pub audio: PathBuf,
    /// Where the embedded picture goes, when image extraction is enabled.
    pub image: Option<PathBuf>,
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    /// Raw PCM audio (WAVE container).
    pub audio: PathBuf,
    /// Tags found in the source file.
    pub tags: TagSet,
    /// Extracted cover image, if the source had one.
    pub image: Option<PathBuf>,
}

impl DecodedAudio {
    /// Creates a decode result without tags or image.
    pub fn audio_only(audio: impl AsRef<Path>) -> Self {
        Self {
            audio: audio.as_ref().to_path_buf(),
            tags: TagSet::new(),
            image: None,
        }
    }
}
