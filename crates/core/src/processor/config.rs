//! Configuration for the processor module.

use serde::Serialize;
use std::path::PathBuf;

use super::error::PipelineError;
use crate::codec::{CodecOptions, Quality, SourceFormat, TargetFormat};
use crate::config::JobConfig;

/// Fewest workers a run may use.
pub const MIN_WORKERS: usize = 1;

/// Most workers a run may use.
pub const MAX_WORKERS: usize = 64;

/// Validated settings for one transcoding run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatcherConfig {
    /// File or directory to transcode.
    pub input: PathBuf,
    /// Root directory outputs are written under.
    pub output_dir: PathBuf,
    pub source_format: SourceFormat,
    pub target_format: TargetFormat,
    pub quality: Quality,
    /// Descend into subdirectories of `input`.
    pub recursive: bool,
    /// Replace outputs that already exist instead of skipping the job.
    pub force_overwrite: bool,
    /// Carry the embedded cover image over to the output.
    pub copy_image: bool,
    /// Number of workers, between [`MIN_WORKERS`] and [`MAX_WORKERS`].
    pub workers: usize,
    /// Directory for intermediate files.
    pub scratch_dir: PathBuf,
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir()
}

impl DispatcherConfig {
    /// Creates a FLAC to Opus configuration with default settings.
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            source_format: SourceFormat::Flac,
            target_format: TargetFormat::Opus,
            quality: Quality::default(),
            recursive: false,
            force_overwrite: false,
            copy_image: false,
            workers: 4,
            scratch_dir: default_scratch_dir(),
        }
    }

    /// Sets the source and target formats.
    pub fn with_formats(mut self, source: SourceFormat, target: TargetFormat) -> Self {
        self.source_format = source;
        self.target_format = target;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_recursive(mut self, enabled: bool) -> Self {
        self.recursive = enabled;
        self
    }

    pub fn with_force_overwrite(mut self, enabled: bool) -> Self {
        self.force_overwrite = enabled;
        self
    }

    pub fn with_copy_image(mut self, enabled: bool) -> Self {
        self.copy_image = enabled;
        self
    }

    /// Sets the worker count, rejecting values outside 1-64.
    pub fn with_workers(mut self, workers: usize) -> Result<Self, PipelineError> {
        self.workers = validate_workers(workers as i64)?;
        Ok(self)
    }

    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Options the decoder is built with.
    ///
    /// Tags are only requested from formats that carry them, so a WAVE
    /// source is a configuration error only when cover art is requested.
    pub fn decoder_options(&self) -> CodecOptions {
        CodecOptions::default()
            .with_metadata(self.source_format.carries_metadata())
            .with_image(self.copy_image)
    }

    /// Options the encoder is built with.
    pub fn encoder_options(&self) -> CodecOptions {
        CodecOptions::default()
            .with_metadata(self.target_format.carries_metadata())
            .with_image(self.copy_image)
            .with_quality(self.quality)
    }
}

impl TryFrom<&JobConfig> for DispatcherConfig {
    type Error = PipelineError;

    fn try_from(job: &JobConfig) -> Result<Self, Self::Error> {
        let source_format =
            job.source_format
                .parse()
                .map_err(|_| PipelineError::UnsupportedFormat {
                    direction: "input",
                    name: job.source_format.clone(),
                })?;
        let target_format =
            job.target_format
                .parse()
                .map_err(|_| PipelineError::UnsupportedFormat {
                    direction: "output",
                    name: job.target_format.clone(),
                })?;
        let quality = Quality::new(job.quality).ok_or(PipelineError::InvalidQuality(job.quality))?;
        let workers = validate_workers(job.max_threads)?;

        Ok(Self {
            input: job.input.clone(),
            output_dir: job.output_dir.clone(),
            source_format,
            target_format,
            quality,
            recursive: job.recursive,
            force_overwrite: job.force_overwrite,
            copy_image: job.copy_image,
            workers,
            scratch_dir: job.scratch_dir.clone().unwrap_or_else(default_scratch_dir),
        })
    }
}

fn validate_workers(workers: i64) -> Result<usize, PipelineError> {
    if (MIN_WORKERS as i64..=MAX_WORKERS as i64).contains(&workers) {
        Ok(workers as usize)
    } else {
        Err(PipelineError::InvalidWorkerCount(workers))
    }
}
