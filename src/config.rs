//! Configuration structures for the adhan-cut system

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cutoff::GroundTruthTable;
use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
    pub envelope: EnvelopeConfig,
    pub peaks: PeakPickingConfig,
    pub cutoff: CutoffConfig,
    /// Manually confirmed cutoffs, keyed by item name. Items present here
    /// bypass detection entirely.
    pub overrides: GroundTruthTable,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate every section. Called before any audio is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.envelope.validate()?;
        self.peaks.validate()?;
        self.cutoff.validate()?;
        Ok(())
    }
}

/// Audio library configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory holding the recordings
    pub dir: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("audio"),
        }
    }
}

/// Onset envelope extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// STFT frame length in samples
    pub frame_size: usize,
    /// Hop between consecutive frames in samples
    pub hop_size: usize,
    /// Scale the envelope so its maximum is 1.0. Keeps the peak picker's
    /// absolute `delta` comparable across recordings with different gain.
    pub normalize: bool,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            normalize: true,
        }
    }
}

impl EnvelopeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_size < 2 {
            return Err(ConfigError::InvalidValue {
                field: "envelope.frame_size".to_string(),
                value: self.frame_size.to_string(),
            });
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(ConfigError::InvalidValue {
                field: "envelope.hop_size".to_string(),
                value: self.hop_size.to_string(),
            });
        }
        Ok(())
    }
}

/// Peak picking configuration
///
/// Window sizes are in envelope frames; `wait_seconds` is converted to frames
/// at pick time using the envelope's hop duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakPickingConfig {
    /// Frames before a candidate over which it must be the maximum
    pub pre_max: usize,
    /// Frames after a candidate over which it must be the maximum
    pub post_max: usize,
    /// Frames before a candidate contributing to the local average
    pub pre_avg: usize,
    /// Frames after a candidate contributing to the local average
    pub post_avg: usize,
    /// Minimum margin above the local average
    pub delta: f32,
    /// Refractory period between accepted peaks, in seconds
    pub wait_seconds: f32,
}

impl Default for PeakPickingConfig {
    fn default() -> Self {
        // Tuned for adhan recordings: Takbeer onsets ~3-6 s apart, high amplitude
        Self {
            pre_max: 3,
            post_max: 3,
            pre_avg: 5,
            post_avg: 5,
            delta: 0.1,
            wait_seconds: 2.0,
        }
    }
}

impl PeakPickingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delta.is_finite() || self.delta < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "peaks.delta".to_string(),
                value: self.delta.to_string(),
            });
        }
        if !self.wait_seconds.is_finite() || self.wait_seconds <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "peaks.wait_seconds".to_string(),
                value: self.wait_seconds.to_string(),
            });
        }
        Ok(())
    }
}

/// Cutoff policy configuration
///
/// These constants encode domain assumptions about Takbeer cadence; expose
/// them here rather than as literals so they can be retuned per recording
/// style.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CutoffConfig {
    /// Seconds to cut before the third onset (lands in the silence between
    /// the second and third Takbeer)
    pub third_peak_lead: f32,
    /// Seconds added after the second onset when the third was missed
    pub two_peak_offset: f32,
    /// Safe default when fewer than two onsets are found
    pub default_cutoff: f32,
    /// Minimum plausible cutoff in seconds
    pub min_cutoff: f32,
    /// Seconds to keep clear of the end of the recording
    pub end_margin: f32,
}

impl Default for CutoffConfig {
    fn default() -> Self {
        Self {
            third_peak_lead: 0.3,
            two_peak_offset: 3.0,
            default_cutoff: 20.0,
            min_cutoff: 6.0,
            end_margin: 2.0,
        }
    }
}

impl CutoffConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("cutoff.third_peak_lead", self.third_peak_lead),
            ("cutoff.two_peak_offset", self.two_peak_offset),
            ("cutoff.default_cutoff", self.default_cutoff),
            ("cutoff.min_cutoff", self.min_cutoff),
            ("cutoff.end_margin", self.end_margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report format
    pub format: ReportFormat,
    /// Report file path (None = console only)
    pub path: Option<PathBuf>,
    /// Enable console output
    pub enable_console: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            path: None,
            enable_console: true,
        }
    }
}

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Aligned table
    Text,
    /// JSON with skip records
    Json,
    /// Paste-able code fragment for the consuming app
    Snippet,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Snippet => write!(f, "snippet"),
        }
    }
}
