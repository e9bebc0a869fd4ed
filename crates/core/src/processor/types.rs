//! Types for the processor module.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// One unit of work: transcode `input` into `output_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TranscodeJob {
    /// Source file.
    pub input: PathBuf,
    /// Directory the output file is written to.
    pub output_dir: PathBuf,
}

impl TranscodeJob {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Output file: the input's stem with `extension`, inside `output_dir`.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        let name = Path::new(self.input.file_name().unwrap_or(self.input.as_os_str()))
            .with_extension(extension);
        self.output_dir.join(name)
    }
}

/// How a job ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The output file was written.
    Transcoded,
    /// The output already existed and overwriting is disabled.
    Skipped,
}

/// Counters shared by the workers of one run.
#[derive(Debug, Default)]
pub(crate) struct PoolStats {
    transcoded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    abandoned_scratch: AtomicU64,
}

impl PoolStats {
    pub(crate) fn record(&self, outcome: Option<JobOutcome>) {
        let counter = match outcome {
            Some(JobOutcome::Transcoded) => &self.transcoded,
            Some(JobOutcome::Skipped) => &self.skipped,
            None => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abandoned(&self, count: usize) {
        self.abandoned_scratch
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn summary(&self, jobs: usize, workers: usize) -> RunSummary {
        RunSummary {
            jobs,
            workers,
            transcoded: self.transcoded.load(Ordering::Relaxed) as usize,
            skipped: self.skipped.load(Ordering::Relaxed) as usize,
            failed: self.failed.load(Ordering::Relaxed) as usize,
            abandoned_scratch: self.abandoned_scratch.load(Ordering::Relaxed) as usize,
        }
    }
}

/// Totals for a finished run.
///
/// A run succeeds even when jobs failed; `failed` is the only place that
/// shows it besides the logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub jobs: usize,
    pub workers: usize,
    pub transcoded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub abandoned_scratch: usize,
}

impl RunSummary {
    /// Jobs that reached the end of the worker loop.
    pub fn completed(&self) -> usize {
        self.transcoded + self.skipped + self.failed
    }
}
