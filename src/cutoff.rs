//! Cutoff decision policy
//!
//! Maps a set of onset candidates (plus the recording duration) to one
//! recommended cutoff. A manually confirmed value for the item takes
//! precedence over detection; too few onsets fall back to a safe default.
//! The policy is total: every input produces a usable cutoff, and ambiguity
//! is reported only through the provenance tag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CutoffConfig;
use crate::dsp::peaks::PeakSet;
use crate::error::Result;

/// How a cutoff value was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Derived from detected onsets
    Detected,
    /// Safe default, too few onsets
    Fallback,
    /// Manually confirmed ground truth
    Override,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Detected => write!(f, "detected"),
            Provenance::Fallback => write!(f, "fallback"),
            Provenance::Override => write!(f, "override"),
        }
    }
}

/// A recommended cutoff for one recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffResult {
    /// Cutoff timestamp in seconds, already clamped to the playable range
    pub seconds: f32,
    /// Where the value came from
    pub provenance: Provenance,
    /// Duration of the source recording, kept for bound checks by callers
    pub duration: f32,
}

impl CutoffResult {
    /// Cutoff as a whole number of seconds, the unit the consuming app uses
    pub fn rounded_seconds(&self) -> u32 {
        self.seconds.max(0.0) as u32
    }
}

/// Manually confirmed cutoffs keyed by item name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundTruthTable(HashMap<String, f32>);

impl GroundTruthTable {
    pub fn get(&self, name: &str) -> Option<f32> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, f32)> for GroundTruthTable {
    fn from_iter<T: IntoIterator<Item = (String, f32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Decides cutoffs from peak sets
pub struct CutoffPolicy {
    config: CutoffConfig,
}

impl CutoffPolicy {
    /// Create a policy, validating the configuration
    pub fn new(config: CutoffConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Decide the cutoff for one recording. Never fails.
    ///
    /// An override value wins outright and skips detection. Otherwise three
    /// or more onsets cut just before the third one, exactly two extrapolate
    /// past the second, and anything less takes the default. Detected values
    /// round up to the next whole second so the cut errs toward keeping
    /// audio rather than truncating mid-utterance. The clamp to
    /// `[min_cutoff, duration - end_margin]` applies to every branch; when
    /// the recording is too short for both bounds, `min_cutoff` wins.
    pub fn decide(
        &self,
        peaks: &PeakSet,
        duration: f32,
        override_value: Option<f32>,
    ) -> CutoffResult {
        let c = &self.config;

        let (raw, provenance) = if let Some(value) = override_value {
            (value, Provenance::Override)
        } else if peaks.len() >= 3 {
            (
                (peaks.times[2] - c.third_peak_lead).ceil(),
                Provenance::Detected,
            )
        } else if peaks.len() == 2 {
            (
                (peaks.times[1] + c.two_peak_offset).ceil(),
                Provenance::Detected,
            )
        } else {
            (c.default_cutoff, Provenance::Fallback)
        };

        let upper = (duration - c.end_margin).max(c.min_cutoff);
        let seconds = raw.clamp(c.min_cutoff, upper);

        debug!(
            "Cutoff {:.1}s ({}) from {} peaks, duration {:.1}s",
            seconds,
            provenance,
            peaks.len(),
            duration
        );

        CutoffResult {
            seconds,
            provenance,
            duration,
        }
    }
}
