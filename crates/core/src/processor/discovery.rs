//! Input discovery: turns the input path into a list of jobs.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::error::PipelineError;
use super::types::TranscodeJob;

/// Lists the jobs for `input`.
///
/// A file becomes a single job targeting `output_root` and must carry
/// `extension`. A directory is scanned for files with `extension` (one level
/// deep, or the whole tree when `recursive`); each file's directory relative
/// to `input` is recreated under `output_root` and used as the job's output
/// directory. Jobs are returned in path order.
pub(crate) fn discover_jobs(
    input: &Path,
    output_root: &Path,
    extension: &'static str,
    recursive: bool,
) -> Result<Vec<TranscodeJob>, PipelineError> {
    if input.is_file() {
        debug!("Input is a file");
        if !has_extension(input, extension) {
            return Err(PipelineError::SuffixMismatch {
                path: input.to_path_buf(),
                expected: extension,
            });
        }
        return Ok(vec![TranscodeJob::new(input, output_root)]);
    }

    if !input.is_dir() {
        return Err(PipelineError::NotFileOrDirectory {
            path: input.to_path_buf(),
        });
    }

    debug!("Input is a directory (recursive: {})", recursive);
    let mut files = if recursive {
        walk_tree(input, extension)
    } else {
        list_dir(input, extension)?
    };
    files.sort();

    if files.is_empty() {
        return Err(PipelineError::NoFilesFound {
            path: input.to_path_buf(),
        });
    }

    let mut jobs = Vec::with_capacity(files.len());
    for file in files {
        let relative = file
            .strip_prefix(input)
            .ok()
            .and_then(Path::parent)
            .unwrap_or(Path::new(""));
        let output_dir = output_root.join(relative);
        std::fs::create_dir_all(&output_dir)?;
        jobs.push(TranscodeJob::new(file, output_dir));
    }

    Ok(jobs)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension() == Some(OsStr::new(extension))
}

fn list_dir(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }
    Ok(files)
}

fn walk_tree(root: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file() && has_extension(path, extension))
        .collect()
}
