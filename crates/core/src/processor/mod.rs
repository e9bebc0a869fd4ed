//! Processor module: the concurrent transcoding pipeline.
//!
//! The [`Dispatcher`] discovers input files, pushes one [`TranscodeJob`] per
//! file onto a [`JobQueue`] and starts a fixed pool of workers. Each worker
//! repeatedly takes a job, checks the output path, decodes into scratch
//! files, encodes, and deletes its scratch files before taking the next
//! job. The dispatcher returns once every job has been marked done.
//!
//! Per-job failures never leave the worker that hit them: they are logged
//! as warnings and counted in the [`RunSummary`]. Only configuration
//! problems ([`PipelineError`]) are returned to the caller.
//!
//! # Example
//!
//! ```ignore
//! use transcoder_core::codec::{ToolLocator, ToolsConfig};
//! use transcoder_core::processor::{Dispatcher, DispatcherConfig};
//!
//! let config = DispatcherConfig::new("/music/flac", "/music/opus")
//!     .with_recursive(true)
//!     .with_workers(8)?;
//! let locator = ToolLocator::new(ToolsConfig::default());
//!
//! let summary = Dispatcher::new(config, &locator)?.run().await?;
//! println!("{} transcoded, {} failed", summary.transcoded, summary.failed);
//! ```

mod config;
mod discovery;
mod dispatcher;
mod error;
mod queue;
mod types;
mod worker;

pub use config::{DispatcherConfig, MAX_WORKERS, MIN_WORKERS};
pub use dispatcher::Dispatcher;
pub use error::{JobError, PipelineError};
pub use queue::{JobQueue, QueueConsumer};
pub use types::{JobOutcome, RunSummary, TranscodeJob};
