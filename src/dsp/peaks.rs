//! Sparse peak picking over an onset envelope
//!
//! A single left-to-right pass accepts frame `i` when it is the maximum of
//! its local max window, exceeds the local moving average by `delta`, and is
//! more than the refractory gap past the last accepted peak. The suppression
//! is greedy: once a peak is accepted nothing else qualifies until the gap
//! has elapsed, even if a taller candidate shows up in between.

use tracing::trace;

use crate::config::PeakPickingConfig;
use crate::dsp::envelope::OnsetEnvelope;
use crate::error::Result;

/// Time-ordered onset candidates, in seconds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakSet {
    /// Strictly increasing timestamps
    pub times: Vec<f32>,
}

impl PeakSet {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl From<Vec<f32>> for PeakSet {
    fn from(times: Vec<f32>) -> Self {
        Self { times }
    }
}

/// Extracts onset candidates from an envelope
pub struct PeakPicker {
    config: PeakPickingConfig,
}

impl PeakPicker {
    /// Create a picker, validating the configuration
    pub fn new(config: PeakPickingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Pick peaks from the envelope.
    ///
    /// Frames near either end that lack a full evaluation window are skipped.
    /// An empty result, or fewer than three peaks, is a normal outcome for
    /// the cutoff policy to handle, not an error.
    pub fn pick(&self, envelope: &OnsetEnvelope) -> PeakSet {
        let c = &self.config;
        let values = &envelope.values;

        let wait = ((c.wait_seconds / envelope.hop_seconds) as usize).max(1);
        let lead = c.pre_max.max(c.pre_avg);
        let tail = c.post_max.max(c.post_avg);

        if values.len() <= lead + tail {
            return PeakSet::default();
        }

        let mut times = Vec::new();
        let mut last_peak: Option<usize> = None;

        for i in lead..values.len() - tail {
            let v = values[i];

            let window_max = values[i - c.pre_max..=i + c.post_max]
                .iter()
                .cloned()
                .fold(f32::NEG_INFINITY, f32::max);
            if v < window_max {
                continue;
            }

            let avg_window = &values[i - c.pre_avg..=i + c.post_avg];
            let avg = avg_window.iter().sum::<f32>() / avg_window.len() as f32;
            if v < avg + c.delta {
                continue;
            }

            if let Some(last) = last_peak {
                if i - last <= wait {
                    continue;
                }
            }

            trace!("Peak at frame {} ({:.2}s)", i, envelope.frame_time(i));
            last_peak = Some(i);
            times.push(envelope.frame_time(i));
        }

        PeakSet { times }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOP: f32 = 0.01;

    fn make_picker(delta: f32, wait_seconds: f32) -> PeakPicker {
        PeakPicker::new(PeakPickingConfig {
            delta,
            wait_seconds,
            ..Default::default()
        })
        .unwrap()
    }

    /// Envelope with unit impulses at the given frame indices
    fn impulse_envelope(len: usize, impulses: &[usize]) -> OnsetEnvelope {
        let mut values = vec![0.0f32; len];
        for &i in impulses {
            values[i] = 1.0;
        }
        OnsetEnvelope::new(values, HOP)
    }

    #[test]
    fn test_four_well_separated_impulses() {
        let envelope = impulse_envelope(1400, &[200, 500, 850, 1200]);
        let picker = make_picker(0.05, 2.0);

        let peaks = picker.pick(&envelope);
        assert_eq!(peaks.len(), 4);
        let expected = [2.0, 5.0, 8.5, 12.0];
        for (got, want) in peaks.times.iter().zip(expected.iter()) {
            assert!(
                (got - want).abs() < HOP,
                "Peak at {got:.3}s, expected {want:.3}s"
            );
        }
    }

    #[test]
    fn test_monotonic_and_refractory_spacing() {
        let envelope = impulse_envelope(1400, &[200, 500, 850, 1200]);
        let picker = make_picker(0.05, 2.0);

        let peaks = picker.pick(&envelope);
        let refractory = (2.0 / HOP) as usize as f32 * HOP;
        for pair in peaks.times.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1] - pair[0] >= refractory);
        }
    }

    #[test]
    fn test_greedy_suppression_first_wins() {
        // Second, taller impulse falls inside the refractory gap of the first
        let mut values = vec![0.0f32; 600];
        values[100] = 0.8;
        values[150] = 1.0;
        let envelope = OnsetEnvelope::new(values, HOP);
        let picker = make_picker(0.05, 2.0);

        let peaks = picker.pick(&envelope);
        assert_eq!(peaks.len(), 1);
        assert!((peaks.times[0] - 1.0).abs() < HOP);
    }

    #[test]
    fn test_delta_rejects_small_bumps() {
        let mut values = vec![0.0f32; 600];
        values[100] = 1.0;
        values[400] = 0.05; // below delta
        let envelope = OnsetEnvelope::new(values, HOP);
        let picker = make_picker(0.1, 2.0);

        let peaks = picker.pick(&envelope);
        assert_eq!(peaks.len(), 1);
    }

    #[test]
    fn test_edge_frames_are_skipped() {
        // Impulse inside the leading window cannot be evaluated
        let envelope = impulse_envelope(600, &[2, 300]);
        let picker = make_picker(0.05, 2.0);

        let peaks = picker.pick(&envelope);
        assert_eq!(peaks.len(), 1);
        assert!((peaks.times[0] - 3.0).abs() < HOP);
    }

    #[test]
    fn test_empty_envelope_yields_empty_set() {
        let envelope = OnsetEnvelope::new(Vec::new(), HOP);
        let picker = make_picker(0.05, 2.0);
        assert!(picker.pick(&envelope).is_empty());
    }

    #[test]
    fn test_flat_silence_yields_empty_set() {
        let envelope = OnsetEnvelope::new(vec![0.0; 500], HOP);
        let picker = make_picker(0.1, 2.0);
        assert!(picker.pick(&envelope).is_empty());
    }

    #[test]
    fn test_invalid_wait_fails_fast() {
        let result = PeakPicker::new(PeakPickingConfig {
            wait_seconds: -1.0,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
