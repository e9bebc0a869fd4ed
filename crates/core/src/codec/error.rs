//! Error types for the codec module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing or running a codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A required external program could not be resolved.
    #[error("Cannot locate required executable: {program}")]
    ExecutableNotFound { program: String },

    /// The input file does not carry the format's stream marker.
    #[error("Not a valid {format} file: {path}")]
    InvalidMarker { format: &'static str, path: PathBuf },

    /// An external program exited unsuccessfully.
    #[error("{tool} failed with exit code {code:?}")]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// The external program reported success but produced no output file.
    #[error("Output file not created: {path}")]
    OutputMissing { path: PathBuf },

    /// The codec cannot honour a requested option.
    #[error("{codec} does not support {option}")]
    UnsupportedOption {
        codec: &'static str,
        option: &'static str,
    },

    /// I/O error while preparing or copying audio.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Creates a new tool failure error, dropping empty stderr output.
    pub fn tool_failed(tool: impl Into<String>, code: Option<i32>, stderr: &[u8]) -> Self {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        Self::ToolFailed {
            tool: tool.into(),
            code,
            stderr: if stderr.is_empty() {
                None
            } else {
                Some(stderr)
            },
        }
    }

    /// Whether this error can only happen while a codec is being built.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::ExecutableNotFound { .. } | Self::UnsupportedOption { .. }
        )
    }
}
