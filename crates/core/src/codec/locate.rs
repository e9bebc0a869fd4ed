//! Resolution of external program names to executable paths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::CodecError;

/// Where to look for external codec programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Directory searched before `PATH`.
    #[serde(default)]
    pub bin_dir: Option<PathBuf>,

    /// Explicit executable paths keyed by program name (e.g. `opusenc`).
    #[serde(default)]
    pub paths: BTreeMap<String, PathBuf>,
}

impl ToolsConfig {
    /// Sets the directory searched before `PATH`.
    pub fn with_bin_dir(mut self, dir: PathBuf) -> Self {
        self.bin_dir = Some(dir);
        self
    }

    /// Pins a program to an explicit path.
    pub fn with_path(mut self, program: impl Into<String>, path: PathBuf) -> Self {
        self.paths.insert(program.into(), path);
        self
    }
}

/// Resolves program names against a [`ToolsConfig`] and the process `PATH`.
///
/// The search path is captured once at construction, so resolution does not
/// depend on later changes to the environment or the working directory.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    config: ToolsConfig,
    search_path: Option<OsString>,
}

impl ToolLocator {
    /// Creates a locator that searches the current `PATH`.
    pub fn new(config: ToolsConfig) -> Self {
        Self {
            config,
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Creates a locator with an explicit search path instead of `PATH`.
    pub fn with_search_path(config: ToolsConfig, search_path: Option<OsString>) -> Self {
        Self {
            config,
            search_path,
        }
    }

    /// Returns the executable path for `program`.
    pub fn resolve(&self, program: &str) -> Result<PathBuf, CodecError> {
        if let Some(explicit) = self.config.paths.get(program) {
            return if is_executable(explicit) {
                debug!("Using configured {} at {}", program, explicit.display());
                Ok(explicit.clone())
            } else {
                Err(CodecError::ExecutableNotFound {
                    program: program.to_string(),
                })
            };
        }

        let mut dirs: Vec<PathBuf> = self.config.bin_dir.iter().cloned().collect();
        if let Some(ref path) = self.search_path {
            dirs.extend(std::env::split_paths(path));
        }

        for dir in dirs {
            for name in candidate_names(program) {
                let candidate = dir.join(&name);
                if is_executable(&candidate) {
                    debug!("Resolved {} to {}", program, candidate.display());
                    return Ok(candidate);
                }
            }
        }

        Err(CodecError::ExecutableNotFound {
            program: program.to_string(),
        })
    }
}

fn candidate_names(program: &str) -> Vec<String> {
    if cfg!(windows) && Path::new(program).extension().is_none() {
        vec![format!("{}.exe", program), program.to_string()]
    } else {
        vec![program.to_string()]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
