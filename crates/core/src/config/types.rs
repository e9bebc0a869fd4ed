use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::codec::ToolsConfig;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub job: JobConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// What to transcode and how.
///
/// Values are kept as written (format names as strings, numbers as `i64`)
/// so that out-of-range input reaches validation with a precise error
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobConfig {
    /// File or directory to transcode.
    pub input: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_source_format")]
    pub source_format: String,
    #[serde(default = "default_target_format")]
    pub target_format: String,
    /// 0 (worst) to 100 (best).
    #[serde(default = "default_quality")]
    pub quality: i64,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub force_overwrite: bool,
    #[serde(default)]
    pub copy_image: bool,
    /// Worker count, 1 to 64.
    #[serde(default = "default_max_threads")]
    pub max_threads: i64,
    /// Where intermediate files go. Defaults to the system temp dir.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl JobConfig {
    /// A job over `input` with every other setting at its default.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: default_output_dir(),
            source_format: default_source_format(),
            target_format: default_target_format(),
            quality: default_quality(),
            recursive: false,
            force_overwrite: false,
            copy_image: false,
            max_threads: default_max_threads(),
            scratch_dir: None,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_formats(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_format = source.into();
        self.target_format = target.into();
        self
    }

    pub fn with_quality(mut self, quality: i64) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_max_threads(mut self, max_threads: i64) -> Self {
        self.max_threads = max_threads;
        self
    }
}

impl Default for JobConfig {
    /// Transcodes the working directory in place.
    fn default() -> Self {
        Self::new(".")
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_source_format() -> String {
    "flac".to_string()
}

fn default_target_format() -> String {
    "opus".to_string()
}

fn default_quality() -> i64 {
    50
}

fn default_max_threads() -> i64 {
    4
}
