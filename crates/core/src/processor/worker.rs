//! Transcode worker: one long-lived task that executes jobs from the queue.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::JobError;
use super::queue::QueueConsumer;
use super::types::{JobOutcome, PoolStats, TranscodeJob};
use crate::codec::{DecodeTargets, Decoder, Encoder};
use crate::scratch::ScratchFiles;

/// Suffix of the decoded audio scratch file.
const AUDIO_SCRATCH_SUFFIX: &str = ".wav";

/// Pulls jobs until the queue closes.
///
/// For every job the worker checks the output path, decodes, encodes and
/// then releases its scratch files, in that order. A failing or panicking
/// job is logged and counted; the worker always marks it done and moves on.
pub(crate) struct Worker {
    id: usize,
    queue: QueueConsumer,
    decoder: Arc<dyn Decoder>,
    encoder: Arc<dyn Encoder>,
    force_overwrite: bool,
    scratch: ScratchFiles,
    stats: Arc<PoolStats>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        queue: QueueConsumer,
        decoder: Arc<dyn Decoder>,
        encoder: Arc<dyn Encoder>,
        force_overwrite: bool,
        scratch: ScratchFiles,
        stats: Arc<PoolStats>,
    ) -> Self {
        Self {
            id,
            queue,
            decoder,
            encoder,
            force_overwrite,
            scratch,
            stats,
        }
    }

    /// Runs the worker loop. Returns once the queue is closed and drained.
    pub(crate) async fn run(mut self) {
        debug!("Worker {} started", self.id);

        while let Some(job) = self.queue.next().await {
            let outcome = AssertUnwindSafe(self.process(&job)).catch_unwind().await;

            match outcome {
                Ok(Ok(outcome)) => self.stats.record(Some(outcome)),
                Ok(Err(e)) => {
                    warn!("{}", e);
                    self.stats.record(None);
                }
                Err(_) => {
                    warn!("Job for {} panicked", job.input.display());
                    self.stats.record(None);
                }
            }

            let abandoned = self.scratch.release_all().await;
            if abandoned > 0 {
                self.stats.record_abandoned(abandoned);
            }

            self.queue.task_done();
        }

        debug!("Worker {} stopped", self.id);
    }

    async fn process(&mut self, job: &TranscodeJob) -> Result<JobOutcome, JobError> {
        let output = job.output_path(self.encoder.extension());

        if is_same_file(&output, &job.input).await {
            warn!(
                "Output would replace its own source. Skipping: {}",
                job.input.display()
            );
            return Ok(JobOutcome::Skipped);
        }

        let exists = tokio::fs::try_exists(&output)
            .await
            .map_err(|source| JobError::OutputCheck {
                path: output.clone(),
                source,
            })?;
        if exists {
            if !self.force_overwrite {
                info!(
                    "Overwrite disabled. Skipping existing file: {}",
                    output.display()
                );
                return Ok(JobOutcome::Skipped);
            }
            debug!("Overwrite enabled. Deleting existing file: {}", output.display());
            tokio::fs::remove_file(&output)
                .await
                .map_err(|source| JobError::Overwrite {
                    path: output.clone(),
                    source,
                })?;
        }

        let targets = DecodeTargets {
            audio: self
                .scratch
                .allocate(AUDIO_SCRATCH_SUFFIX)
                .map_err(JobError::Scratch)?,
            image: if self.decoder.extracts_image() {
                Some(self.scratch.allocate("").map_err(JobError::Scratch)?)
            } else {
                None
            },
        };

        info!("Decoding from file: {}", job.input.display());
        let decoded = self
            .decoder
            .decode(&job.input, &targets)
            .await
            .map_err(|source| JobError::Decode {
                path: job.input.clone(),
                source,
            })?;
        debug!("Found {} metadata tags", decoded.tags.len());

        info!("Encoding to file: {}", output.display());
        if let Err(source) = self.encoder.encode(&decoded, &output).await {
            remove_partial_output(&output).await;
            return Err(JobError::Encode {
                path: output,
                source,
            });
        }

        Ok(JobOutcome::Transcoded)
    }
}

/// Whether both paths name the same file on disk.
async fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Removes whatever a failed encoder left behind, so a later run without
/// overwriting does not mistake it for a finished file.
async fn remove_partial_output(output: &Path) {
    match tokio::fs::remove_file(output).await {
        Ok(()) => debug!("Removed partial output {}", output.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => debug!("Could not remove partial output {}: {}", output.display(), e),
    }
}
