//! Invocation of external codec programs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::error::CodecError;

/// One invocation of an external program with a fixed argument vector.
#[derive(Debug, Clone)]
pub(crate) struct ToolCommand {
    tool: &'static str,
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub(crate) fn new(tool: &'static str, program: &Path) -> Self {
        Self {
            tool,
            program: program.to_path_buf(),
            args: Vec::new(),
        }
    }

    pub(crate) fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends `flag=value` as one argument.
    pub(crate) fn arg_pair(self, flag: &str, value: impl AsRef<Path>) -> Self {
        let mut arg = OsString::from(flag);
        arg.push(value.as_ref());
        self.arg(arg)
    }

    pub(crate) fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Runs the program to completion and returns its standard output.
    pub(crate) async fn run(&self) -> Result<Vec<u8>, CodecError> {
        debug!("Running {} with {} arguments", self.tool, self.args.len());

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CodecError::ExecutableNotFound {
                        program: self.tool.to_string(),
                    }
                } else {
                    CodecError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(CodecError::tool_failed(
                self.tool,
                output.status.code(),
                &output.stderr,
            ));
        }

        Ok(output.stdout)
    }
}

/// Fails with [`CodecError::OutputMissing`] unless `path` exists.
pub(crate) async fn ensure_output(path: &Path) -> Result<(), CodecError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        _ => Err(CodecError::OutputMissing {
            path: path.to_path_buf(),
        }),
    }
}

/// Whether `path` names a non-empty file.
pub(crate) async fn has_content(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
