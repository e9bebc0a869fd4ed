//! Per-worker scratch file tracking.
//!
//! Every intermediate file a job needs (decoded audio, exported cover art)
//! is allocated through [`ScratchFiles`], which remembers the path until
//! [`ScratchFiles::release_all`] deletes it. Deletion is retried because the
//! external program that just wrote the file may still hold it open for a
//! moment (notably on Windows).

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Deletion attempts per file before it is abandoned.
pub const MAX_DELETE_ATTEMPTS: u32 = 20;

/// Pause between deletion attempts.
pub const DELETE_RETRY_DELAY: Duration = Duration::from_millis(200);

const SCRATCH_PREFIX: &str = "transcoder-";

/// Scratch files owned by one worker.
#[derive(Debug)]
pub struct ScratchFiles {
    dir: PathBuf,
    pending: Vec<PathBuf>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl ScratchFiles {
    /// Creates a tracker allocating files in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pending: Vec::new(),
            max_attempts: MAX_DELETE_ATTEMPTS,
            retry_delay: DELETE_RETRY_DELAY,
        }
    }

    /// Overrides the deletion retry budget.
    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Paths awaiting deletion.
    pub fn pending(&self) -> &[PathBuf] {
        &self.pending
    }

    /// Creates an empty scratch file and records it for deletion.
    pub fn allocate(&mut self, suffix: &str) -> io::Result<PathBuf> {
        let path = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(suffix)
            .tempfile_in(&self.dir)?
            .into_temp_path()
            .keep()?;

        debug!("Allocated scratch file {}", path.display());
        self.pending.push(path.clone());
        Ok(path)
    }

    /// Records a path created elsewhere for deletion.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.pending.push(path.into());
    }

    /// Deletes every recorded path and returns how many had to be abandoned.
    ///
    /// The pending set is empty afterwards whether or not every deletion
    /// succeeded.
    pub async fn release_all(&mut self) -> usize {
        let mut abandoned = 0;
        for path in std::mem::take(&mut self.pending) {
            if !self.delete_with_retry(&path).await {
                abandoned += 1;
            }
        }
        abandoned
    }

    async fn delete_with_retry(&self, path: &Path) -> bool {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    debug!("Deleted scratch file {}", path.display());
                    return true;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => return true,
                Err(e) => {
                    debug!(
                        "Attempt {}/{} to delete {} failed: {}",
                        attempt,
                        self.max_attempts,
                        path.display(),
                        e
                    );
                    last_error = Some(e);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        warn!(
            "Abandoning scratch file {} after {} attempts: {}",
            path.display(),
            self.max_attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_allocate_creates_empty_files() {
        let dir = TempDir::new().unwrap();
        let mut scratch = ScratchFiles::new(dir.path());

        let audio = scratch.allocate(".wav").unwrap();
        let image = scratch.allocate("").unwrap();

        assert_ne!(audio, image);
        assert!(audio.starts_with(dir.path()));
        assert_eq!(audio.extension().and_then(|e| e.to_str()), Some("wav"));
        assert_eq!(std::fs::metadata(&audio).unwrap().len(), 0);
        assert_eq!(scratch.pending().len(), 2);
    }

    #[tokio::test]
    async fn test_release_all_deletes_everything() {
        let dir = TempDir::new().unwrap();
        let mut scratch = ScratchFiles::new(dir.path());

        let audio = scratch.allocate(".wav").unwrap();
        std::fs::write(&audio, b"pcm").unwrap();
        scratch.allocate("").unwrap();

        assert_eq!(scratch.release_all().await, 0);
        assert!(scratch.pending().is_empty());
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_already_deleted_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let mut scratch = ScratchFiles::new(dir.path());
        let path = scratch.allocate("").unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(scratch.release_all().await, 0);
        assert!(scratch.pending().is_empty());
    }

    #[tokio::test]
    async fn test_undeletable_path_is_abandoned() {
        let dir = TempDir::new().unwrap();
        // remove_file refuses directories, even for root
        let stuck = dir.path().join("stuck");
        std::fs::create_dir(&stuck).unwrap();

        let mut scratch = ScratchFiles::new(dir.path()).with_retry(3, Duration::from_millis(1));
        scratch.track(&stuck);
        let deletable = scratch.allocate("").unwrap();

        assert_eq!(scratch.release_all().await, 1);
        assert!(scratch.pending().is_empty());
        assert!(stuck.exists());
        assert!(!deletable.exists());
    }

    #[tokio::test]
    async fn test_tracker_is_reusable() {
        let dir = TempDir::new().unwrap();
        let mut scratch = ScratchFiles::new(dir.path());

        for _ in 0..3 {
            scratch.allocate(".wav").unwrap();
            scratch.release_all().await;
        }
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_allocate_in_missing_dir_fails() {
        let mut scratch = ScratchFiles::new("/nonexistent/scratch/dir");
        assert!(scratch.allocate("").is_err());
        assert!(scratch.pending().is_empty());
    }
}
