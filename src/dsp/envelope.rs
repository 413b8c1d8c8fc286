//! Onset strength envelope via non-negative spectral flux
//!
//! The signal is cut into overlapping Hann-windowed frames, and each frame's
//! magnitude spectrum is compared bin-by-bin with the previous frame's. The
//! envelope value is the summed positive difference, which rewards sudden
//! broadband energy increases (onsets) while ignoring decays. Frames are
//! centered: half a frame of silence is padded on each end, so frame `i`
//! describes the signal around sample `i * hop_size`.
//!
//! With `normalize` enabled (the default) the envelope is scaled so its
//! maximum is 1.0. An all-zero envelope (silence) is left untouched.

use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};
use tracing::debug;

use crate::audio::AudioSignal;
use crate::config::EnvelopeConfig;
use crate::error::{AudioError, Result};

/// Frame-rate onset strength signal
#[derive(Debug, Clone)]
pub struct OnsetEnvelope {
    /// Non-negative strength per analysis frame
    pub values: Vec<f32>,
    /// Seconds per frame, used to convert frame indices to time
    pub hop_seconds: f32,
}

impl OnsetEnvelope {
    pub fn new(values: Vec<f32>, hop_seconds: f32) -> Self {
        Self {
            values,
            hop_seconds,
        }
    }

    /// Timestamp of frame `i` in seconds
    pub fn frame_time(&self, i: usize) -> f32 {
        i as f32 * self.hop_seconds
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Computes onset strength envelopes from audio signals
pub struct EnvelopeExtractor {
    config: EnvelopeConfig,
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
}

impl EnvelopeExtractor {
    /// Create an extractor, validating the configuration and planning the FFT
    pub fn new(config: EnvelopeConfig) -> Result<Self> {
        config.validate()?;

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(config.frame_size);
        let window = hann_window(config.frame_size);

        Ok(Self {
            config,
            fft,
            window,
        })
    }

    /// Compute the onset strength envelope of a mono signal
    pub fn compute(&self, signal: &AudioSignal) -> Result<OnsetEnvelope> {
        if signal.samples.is_empty() {
            return Err(AudioError::DegenerateSignal.into());
        }

        let frame_size = self.config.frame_size;
        let hop = self.config.hop_size;
        let half = frame_size / 2;
        let n_bins = frame_size / 2 + 1;

        // Centered frames: pad half a frame of silence on both ends
        let mut padded = vec![0.0f32; signal.samples.len() + frame_size];
        padded[half..half + signal.samples.len()].copy_from_slice(&signal.samples);

        let n_frames = signal.samples.len() / hop + 1;

        // Reusable FFT buffers
        let mut input = self.fft.make_input_vec();
        let mut spectrum = self.fft.make_output_vec();
        let mut prev_mags = vec![0.0f32; n_bins];
        let mut mags = vec![0.0f32; n_bins];

        let mut values = Vec::with_capacity(n_frames);
        for i in 0..n_frames {
            let start = i * hop;
            let frame = &padded[start..start + frame_size];

            for (inp, (&s, &w)) in input
                .iter_mut()
                .zip(frame.iter().zip(self.window.iter()))
            {
                *inp = s * w;
            }
            self.fft.process(&mut input, &mut spectrum).expect("FFT failed");

            for (mag, c) in mags.iter_mut().zip(spectrum.iter()) {
                *mag = c.norm();
            }

            // Summed positive flux against the previous frame
            let flux = if i == 0 {
                0.0
            } else {
                mags.iter()
                    .zip(prev_mags.iter())
                    .map(|(m, p)| (m - p).max(0.0))
                    .sum()
            };
            values.push(flux);

            std::mem::swap(&mut mags, &mut prev_mags);
        }

        if self.config.normalize {
            let max = values.iter().cloned().fold(0.0f32, f32::max);
            if max > 0.0 {
                for v in values.iter_mut() {
                    *v /= max;
                }
            }
        }

        let hop_seconds = hop as f32 / signal.sample_rate as f32;
        debug!(
            "Envelope: {} frames, hop {:.1} ms",
            values.len(),
            hop_seconds * 1000.0
        );

        Ok(OnsetEnvelope::new(values, hop_seconds))
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}
