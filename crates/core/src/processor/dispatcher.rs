//! Job dispatcher: discovers inputs, runs the worker pool, waits for it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};

use super::config::DispatcherConfig;
use super::discovery::discover_jobs;
use super::error::PipelineError;
use super::queue::JobQueue;
use super::types::{PoolStats, RunSummary, TranscodeJob};
use super::worker::Worker;
use crate::codec::{build_decoder, build_encoder, Decoder, Encoder, ToolLocator};
use crate::scratch::ScratchFiles;

/// Runs one batch transcode.
///
/// Construction validates paths and builds both codecs, so every
/// configuration problem surfaces before a single job runs. [`run`](Self::run)
/// then only fails if discovery does; per-job failures are logged by the
/// workers and counted in the returned [`RunSummary`].
pub struct Dispatcher {
    config: DispatcherConfig,
    decoder: Arc<dyn Decoder>,
    encoder: Arc<dyn Encoder>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("decoder", &self.decoder.name())
            .field("encoder", &self.encoder.name())
            .finish()
    }
}

impl Dispatcher {
    /// Validates `config` and builds the codecs it selects.
    pub fn new(config: DispatcherConfig, locator: &ToolLocator) -> Result<Self, PipelineError> {
        let config = prepare_paths(config)?;

        let decoder = build_decoder(config.source_format, config.decoder_options(), locator)?;
        info!("Selected decoder: {}", decoder.name());
        let encoder = build_encoder(config.target_format, config.encoder_options(), locator)?;
        info!("Selected encoder: {}", encoder.name());

        Ok(Self {
            config,
            decoder,
            encoder,
        })
    }

    /// Validates `config` and uses the given codecs instead of building them.
    pub fn with_codecs(
        config: DispatcherConfig,
        decoder: Arc<dyn Decoder>,
        encoder: Arc<dyn Encoder>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            config: prepare_paths(config)?,
            decoder,
            encoder,
        })
    }

    /// Settings after path resolution.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Lists the jobs a run would execute, creating mirrored output folders.
    pub async fn discover(&self) -> Result<Vec<TranscodeJob>, PipelineError> {
        let input = self.config.input.clone();
        let output_dir = self.config.output_dir.clone();
        let extension = self.decoder.extension();
        let recursive = self.config.recursive;

        tokio::task::spawn_blocking(move || {
            discover_jobs(&input, &output_dir, extension, recursive)
        })
        .await
        .map_err(|e| PipelineError::Io(std::io::Error::other(e)))?
    }

    /// Transcodes every discovered file and waits until all jobs are done.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        info!("Starting transcode job");

        let jobs = self.discover().await?;
        let job_count = jobs.len();
        info!("Found {} transcodable files", job_count);

        let (queue, consumer) = JobQueue::new();
        let stats = Arc::new(PoolStats::default());
        let mut workers = JoinSet::new();

        info!("Creating worker pool with {} workers", self.config.workers);
        for id in 0..self.config.workers {
            let worker = Worker::new(
                id,
                consumer.clone(),
                Arc::clone(&self.decoder),
                Arc::clone(&self.encoder),
                self.config.force_overwrite,
                ScratchFiles::new(&self.config.scratch_dir),
                Arc::clone(&stats),
            );
            workers.spawn(worker.run().instrument(info_span!("worker", id)));
        }
        drop(consumer);

        for job in jobs {
            queue.push(job);
        }

        queue.join().await;
        debug!("All {} jobs marked done", job_count);

        // closing the queue lets idle workers return
        drop(queue);
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                warn!("Worker task ended abnormally: {}", e);
            }
        }

        let summary = stats.summary(job_count, self.config.workers);
        info!(
            "Finished: {} transcoded, {} skipped, {} failed",
            summary.transcoded, summary.skipped, summary.failed
        );
        if summary.abandoned_scratch > 0 {
            warn!(
                "{} scratch files could not be deleted from {}",
                summary.abandoned_scratch,
                self.config.scratch_dir.display()
            );
        }

        Ok(summary)
    }
}

/// Checks the input exists, creates the output and scratch folders and
/// makes all three paths absolute.
fn prepare_paths(mut config: DispatcherConfig) -> Result<DispatcherConfig, PipelineError> {
    if !config.input.exists() {
        return Err(PipelineError::InputNotFound { path: config.input });
    }
    config.input = std::fs::canonicalize(&config.input)?;

    config.output_dir = ensure_dir(&config.output_dir)
        .ok_or(PipelineError::InvalidOutputDirectory {
            path: config.output_dir.clone(),
        })?;

    config.scratch_dir = ensure_dir(&config.scratch_dir)
        .ok_or(PipelineError::InvalidOutputDirectory {
            path: config.scratch_dir.clone(),
        })?;

    debug!(
        "Input {}, output {}, scratch {}",
        config.input.display(),
        config.output_dir.display(),
        config.scratch_dir.display()
    );
    Ok(config)
}

fn ensure_dir(path: &Path) -> Option<PathBuf> {
    if !path.exists() {
        std::fs::create_dir_all(path).ok()?;
    }
    if !path.is_dir() {
        return None;
    }
    std::fs::canonicalize(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{SourceFormat, TargetFormat, ToolsConfig};
    use crate::testing::{fixtures, MockDecoder, MockEncoder};
    use tempfile::TempDir;

    fn mocks() -> (Arc<dyn Decoder>, Arc<dyn Encoder>) {
        (
            Arc::new(MockDecoder::new("flac")),
            Arc::new(MockEncoder::new("opus")),
        )
    }

    #[test]
    fn test_missing_input() {
        let out = TempDir::new().unwrap();
        let (decoder, encoder) = mocks();
        let config = DispatcherConfig::new("/nonexistent/input", out.path());

        let err = Dispatcher::with_codecs(config, decoder, encoder).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound { .. }));
    }

    #[test]
    fn test_output_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, b"").unwrap();
        let (decoder, encoder) = mocks();

        let err = Dispatcher::with_codecs(DispatcherConfig::new(dir.path(), &file), decoder, encoder)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidOutputDirectory { .. }));
    }

    #[test]
    fn test_output_dir_created() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("new/output");
        let (decoder, encoder) = mocks();

        let dispatcher =
            Dispatcher::with_codecs(DispatcherConfig::new(dir.path(), &out), decoder, encoder)
                .unwrap();
        assert!(out.is_dir());
        assert!(dispatcher.config().output_dir.is_absolute());
    }

    #[test]
    fn test_wave_source_with_image_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = DispatcherConfig::new(dir.path(), dir.path().join("out"))
            .with_formats(SourceFormat::Wave, TargetFormat::Wave)
            .with_copy_image(true);
        let locator = ToolLocator::with_search_path(ToolsConfig::default(), None);

        let err = Dispatcher::new(config, &locator).unwrap_err();
        assert!(matches!(err, PipelineError::Codec(_)));
    }

    #[test]
    fn test_missing_tools_abort_construction() {
        let dir = TempDir::new().unwrap();
        let config = DispatcherConfig::new(dir.path(), dir.path().join("out"));
        let locator = ToolLocator::with_search_path(ToolsConfig::default(), None);

        let err = Dispatcher::new(config, &locator).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Codec(crate::codec::CodecError::ExecutableNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_with_mocks() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        fixtures::write_tree(input.path(), &["a.flac", "b.flac", "c.flac"]);
        let (decoder, encoder) = mocks();

        let config = DispatcherConfig::new(input.path(), out.path())
            .with_scratch_dir(scratch.path().to_path_buf())
            .with_workers(2)
            .unwrap();
        let summary = Dispatcher::with_codecs(config, decoder, encoder)
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(summary.jobs, 3);
        assert_eq!(summary.transcoded, 3);
        assert_eq!(summary.workers, 2);
        for name in ["a.opus", "b.opus", "c.opus"] {
            assert!(out.path().join(name).exists(), "{name}");
        }
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }
}
