//! Error types for the processor module.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::codec::CodecError;

/// Errors that abort a whole run before any job executes.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input path does not exist.
    #[error("Input path does not exist: {path}")]
    InputNotFound { path: PathBuf },

    /// The output path exists but is not a directory, or cannot be created.
    #[error("Output folder is invalid: {path}")]
    InvalidOutputDirectory { path: PathBuf },

    /// Quality outside 0-100.
    #[error("Invalid value for encoding quality: {0} (expected 0-100)")]
    InvalidQuality(i64),

    /// Worker count outside 1-64.
    #[error("Invalid value for maximum threads: {0} (expected 1-64)")]
    InvalidWorkerCount(i64),

    /// Format name not in the supported set.
    #[error("Unsupported {direction} format: {name}")]
    UnsupportedFormat {
        direction: &'static str,
        name: String,
    },

    /// A single input file does not carry the decoder's suffix.
    #[error("Input file has wrong suffix (expected .{expected}): {path}")]
    SuffixMismatch {
        path: PathBuf,
        expected: &'static str,
    },

    /// A directory scan found nothing to transcode.
    #[error("No suitable files were found in the folder: {path}")]
    NoFilesFound { path: PathBuf },

    /// The input is neither a regular file nor a directory.
    #[error("Input is neither a file nor a folder: {path}")]
    NotFileOrDirectory { path: PathBuf },

    /// A codec could not be built (missing program, unsupported option).
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// I/O error while preparing the run.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors that end a single job. They are logged and never leave the worker.
#[derive(Debug, Error)]
pub enum JobError {
    /// Decoding the input failed.
    #[error("Failed to decode {path}: {source}")]
    Decode { path: PathBuf, source: CodecError },

    /// Encoding the output failed.
    #[error("Failed to encode {path}: {source}")]
    Encode { path: PathBuf, source: CodecError },

    /// Whether the output file exists could not be determined.
    #[error("Failed to check existing file {path}: {source}")]
    OutputCheck { path: PathBuf, source: io::Error },

    /// An existing output file could not be removed for overwriting.
    #[error("Failed to remove existing file {path}: {source}")]
    Overwrite { path: PathBuf, source: io::Error },

    /// A scratch file could not be created.
    #[error("Failed to create scratch file: {0}")]
    Scratch(#[source] io::Error),
}

impl JobError {
    /// Short name of the step that failed, for logs.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::Encode { .. } => "encode",
            Self::OutputCheck { .. } | Self::Overwrite { .. } => "overwrite",
            Self::Scratch(_) => "scratch",
        }
    }
}
