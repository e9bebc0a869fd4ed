use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transcoder_core::{load_config_with, validate_config, Dispatcher, ToolLocator};

/// Batch audio transcoder.
///
/// Decodes every matching file under INPATH to WAVE and re-encodes it into
/// the target format, mirroring the folder layout under the output folder.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// File or folder to transcode
    #[arg(required_unless_present = "config")]
    inpath: Option<PathBuf>,

    /// Output folder
    #[arg(short, long)]
    outfolder: Option<PathBuf>,

    /// Encoding quality from 0 (worst) to 100 (best)
    #[arg(short = 'q', long, allow_negative_numbers = true)]
    encoding_quality: Option<i64>,

    /// Descend into subfolders
    #[arg(short, long)]
    recursive: bool,

    /// Replace existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Carry the embedded cover image over to the output
    #[arg(short = 'i', long)]
    copy_image: bool,

    /// Input format
    #[arg(short, long, value_parser = ["flac", "wave"])]
    source_format: Option<String>,

    /// Output format
    #[arg(short, long, value_parser = ["opus", "aac", "flac", "wave"])]
    target_format: Option<String>,

    /// Number of parallel workers (1-64)
    #[arg(long, allow_negative_numbers = true)]
    max_threads: Option<i64>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Folder searched for codec programs before PATH
    #[arg(long)]
    bin_dir: Option<PathBuf>,

    /// Only log errors
    #[arg(long, conflicts_with = "verbose")]
    silent: bool,

    /// Log debugging output
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.silent {
            "error"
        } else {
            "info"
        }
    }

    /// Command-line values layered over the configuration file.
    fn overrides(&self) -> Overrides {
        // Flags only override when set, so a `true` in the file survives.
        let flag = |set: bool| set.then_some(true);
        Overrides {
            job: JobOverrides {
                input: self.inpath.clone(),
                output_dir: self.outfolder.clone(),
                source_format: self.source_format.clone(),
                target_format: self.target_format.clone(),
                quality: self.encoding_quality,
                recursive: flag(self.recursive),
                force_overwrite: flag(self.force_overwrite),
                copy_image: flag(self.copy_image),
                max_threads: self.max_threads,
            },
            tools: ToolOverrides {
                bin_dir: self.bin_dir.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Overrides {
    job: JobOverrides,
    tools: ToolOverrides,
}

#[derive(Debug, Serialize)]
struct JobOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recursive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    force_overwrite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    copy_image: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_threads: Option<i64>,
}

#[derive(Debug, Serialize)]
struct ToolOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    bin_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_level().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(args).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = load_config_with(args.config.as_deref(), &args.overrides())
        .context("Failed to load configuration")?;
    let settings = validate_config(&config).context("Configuration validation failed")?;
    debug!(?settings, "Configuration loaded");

    let locator = ToolLocator::new(config.tools);
    let dispatcher = Dispatcher::new(settings, &locator).context("Failed to start transcoding")?;
    let summary = dispatcher.run().await?;

    info!(
        transcoded = summary.transcoded,
        skipped = summary.skipped,
        failed = summary.failed,
        "Run finished"
    );
    println!("Done");
    Ok(())
}
