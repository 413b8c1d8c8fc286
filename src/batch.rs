//! Per-item orchestration over a collection of recordings
//!
//! Resolves each name through the audio source, runs the detection chain,
//! and collects results in input order. A name that fails to resolve is
//! recorded as a skip and the batch continues; items share no mutable state,
//! so every result is independent of the processing order.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{info, warn};

use crate::audio::AudioSource;
use crate::config::Config;
use crate::cutoff::{CutoffPolicy, CutoffResult, GroundTruthTable, Provenance};
use crate::dsp::{EnvelopeExtractor, PeakPicker, PeakSet};
use crate::error::Result;

/// Final record for one analyzed recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub name: String,
    pub cutoff_seconds: u32,
    pub provenance: Provenance,
}

/// Record of a recording the batch could not analyze
#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub name: String,
    pub reason: String,
}

/// Outcome of one item in a batch
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Analyzed(ItemReport),
    Skipped(SkippedItem),
}

/// Aggregated batch results, in input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
    pub skipped: Vec<SkippedItem>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.skipped.is_empty()
    }
}

/// Runs the detection chain over named recordings
pub struct BatchRunner<'a, S: AudioSource> {
    source: &'a S,
    extractor: EnvelopeExtractor,
    picker: PeakPicker,
    policy: CutoffPolicy,
    overrides: &'a GroundTruthTable,
}

impl<'a, S: AudioSource> BatchRunner<'a, S> {
    /// Build the full chain up front so configuration errors surface before
    /// any audio is touched.
    pub fn new(
        config: &Config,
        source: &'a S,
        overrides: &'a GroundTruthTable,
    ) -> Result<Self> {
        Ok(Self {
            source,
            extractor: EnvelopeExtractor::new(config.envelope.clone())?,
            picker: PeakPicker::new(config.peaks.clone())?,
            policy: CutoffPolicy::new(config.cutoff.clone())?,
            overrides,
        })
    }

    /// Analyze a single recording by name.
    ///
    /// A ground-truth override skips onset detection entirely; the audio is
    /// still decoded because the clamp needs the recording's duration.
    pub fn analyze(&self, name: &str) -> Result<CutoffResult> {
        let signal = self.source.resolve(name)?;
        let duration = signal.duration_seconds();
        info!("[{}] duration: {:.1} s", name, duration);

        let override_value = self.overrides.get(name);
        let peaks = if override_value.is_some() {
            info!("[{}] using ground-truth cutoff", name);
            PeakSet::default()
        } else {
            let envelope = self.extractor.compute(&signal)?;
            let peaks = self.picker.pick(&envelope);
            info!(
                "[{}] detected onsets: {:?}",
                name,
                peaks
                    .times
                    .iter()
                    .map(|t| format!("{:.2}", t))
                    .collect::<Vec<_>>()
            );
            peaks
        };

        Ok(self.policy.decide(&peaks, duration, override_value))
    }

    /// Run the batch over the given names, honoring `cancel` between items.
    ///
    /// Partial results collected before a cancellation remain valid and are
    /// returned.
    pub fn run(&self, names: &[String], cancel: &AtomicBool) -> BatchReport {
        let mut report = BatchReport::default();

        for name in names {
            if cancel.load(Ordering::SeqCst) {
                let done = report.items.len() + report.skipped.len();
                warn!("Batch cancelled, {} items left", names.len() - done);
                break;
            }

            match self.process(name) {
                ItemOutcome::Analyzed(item) => report.items.push(item),
                ItemOutcome::Skipped(skip) => {
                    warn!("[{}] skipped: {}", skip.name, skip.reason);
                    report.skipped.push(skip);
                }
            }
        }

        report
    }

    fn process(&self, name: &str) -> ItemOutcome {
        match self.analyze(name) {
            Ok(result) => {
                info!(
                    "[{}] recommended cutoff: {} s ({})",
                    name,
                    result.rounded_seconds(),
                    result.provenance
                );
                ItemOutcome::Analyzed(ItemReport {
                    name: name.to_string(),
                    cutoff_seconds: result.rounded_seconds(),
                    provenance: result.provenance,
                })
            }
            Err(e) => ItemOutcome::Skipped(SkippedItem {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
