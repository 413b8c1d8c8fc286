//! Adhan Cutoff Detector CLI

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use adhan_cut::{BatchRunner, Config, FileAudioSource, ReportFormat, ReportWriter};

/// Adhan Cutoff Detector
#[derive(Parser)]
#[command(name = "adhan-cut")]
#[command(about = "Recommend short-variant cutoffs for adhan recordings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect cutoffs for one recording or the whole library
    Detect {
        /// Recording name (stem without extension); all recordings if omitted
        name: Option<String>,

        /// Library directory holding the recordings
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Report format (text, json, snippet)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Report file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the recordings in the library
    List {
        /// Library directory holding the recordings
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging - skip warnings are visible by default, use -v for more
    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    // Load configuration
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Detect {
            name,
            dir,
            format,
            output,
        } => {
            // Apply CLI overrides
            if let Some(dir) = dir {
                config.library.dir = dir;
            }
            if let Some(output) = output {
                config.output.path = Some(output);
            }
            config.output.format = match format.as_str() {
                "json" => ReportFormat::Json,
                "snippet" => ReportFormat::Snippet,
                _ => ReportFormat::Text,
            };

            run_detection(config, name)
        }
        Commands::List { dir } => {
            if let Some(dir) = dir {
                config.library.dir = dir;
            }
            list_library(config)
        }
    }
}

/// Run cutoff detection over the selected recordings
fn run_detection(config: Config, name: Option<String>) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let source = FileAudioSource::new(&config.library.dir);

    let names = match name {
        Some(name) => vec![name],
        None => source
            .catalog()
            .with_context(|| format!("Failed to scan library {}", config.library.dir.display()))?,
    };

    if names.is_empty() {
        println!("No recordings found in {}", config.library.dir.display());
        return Ok(());
    }

    info!("Analyzing {} recording(s)", names.len());

    // Allow the batch to be abandoned between items; partial results still
    // get reported.
    let cancel = Arc::new(AtomicBool::new(false));
    let c = cancel.clone();
    ctrlc::set_handler(move || {
        c.store(true, Ordering::SeqCst);
    })?;

    let runner = BatchRunner::new(&config, &source, &config.overrides)
        .context("Failed to build detection pipeline")?;
    let report = runner.run(&names, &cancel);

    let mut writer =
        ReportWriter::new(config.output.clone()).context("Failed to create report writer")?;
    writer.write(&report)?;

    Ok(())
}

/// List the recordings in the library directory
fn list_library(config: Config) -> Result<()> {
    let source = FileAudioSource::new(&config.library.dir);
    let names = source
        .catalog()
        .with_context(|| format!("Failed to scan library {}", config.library.dir.display()))?;

    if names.is_empty() {
        println!("No recordings found in {}", config.library.dir.display());
    } else {
        println!("Recordings in {}:", config.library.dir.display());
        for (i, name) in names.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
    }

    Ok(())
}
