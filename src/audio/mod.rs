//! Audio loading modules

pub mod source;

pub use source::{AudioSource, FileAudioSource};

/// A decoded mono recording at its native sample rate.
///
/// Immutable once loaded; owned by the pipeline invocation that loaded it.
#[derive(Debug, Clone)]
pub struct AudioSignal {
    /// Mono samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sampling rate in Hz
    pub sample_rate: u32,
}

impl AudioSignal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Recording length in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}
