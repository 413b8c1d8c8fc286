//! Adhan Cutoff Detector
//!
//! A Rust-based tool that analyzes adhan recordings and recommends the
//! timestamp where a shortened variant should stop: in the silence between
//! the second and third Takbeer, found by onset detection on the waveform.
//!
//! # Architecture
//!
//! The system is organized into the following modules:
//!
//! - `audio`: Audio file resolution and decoding
//! - `dsp`: Onset strength envelope and peak picking
//! - `cutoff`: Cutoff decision policy and ground-truth overrides
//! - `batch`: Per-item orchestration over a collection of recordings
//! - `output`: Report formatting and writing
//! - `config`: Configuration structures
//! - `error`: Error types
//!
//! # Example
//!
//! ```no_run
//! use adhan_cut::{BatchRunner, Config, FileAudioSource};
//! use std::sync::atomic::AtomicBool;
//!
//! let config = Config::default();
//! config.validate().unwrap();
//!
//! let source = FileAudioSource::new(&config.library.dir);
//! let runner = BatchRunner::new(&config, &source, &config.overrides).unwrap();
//!
//! let names = source.catalog().unwrap();
//! let report = runner.run(&names, &AtomicBool::new(false));
//! for item in &report.items {
//!     println!("{}: {} s", item.name, item.cutoff_seconds);
//! }
//! ```

pub mod audio;
pub mod batch;
pub mod config;
pub mod cutoff;
pub mod dsp;
pub mod error;
pub mod output;

// Re-exports for convenience
pub use audio::{AudioSignal, AudioSource, FileAudioSource};
pub use batch::{BatchReport, BatchRunner, ItemOutcome, ItemReport, SkippedItem};
pub use config::{
    Config, CutoffConfig, EnvelopeConfig, LibraryConfig, OutputConfig, PeakPickingConfig,
    ReportFormat,
};
pub use cutoff::{CutoffPolicy, CutoffResult, GroundTruthTable, Provenance};
pub use dsp::{EnvelopeExtractor, OnsetEnvelope, PeakPicker, PeakSet};
pub use error::{AdhanError, AudioError, ConfigError, Result};
pub use output::ReportWriter;
