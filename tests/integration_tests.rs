//! Integration tests for adhan-cut

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;

use adhan_cut::{
    AudioError, AudioSignal, AudioSource, BatchRunner, Config, CutoffPolicy, EnvelopeConfig,
    EnvelopeExtractor, FileAudioSource, GroundTruthTable, PeakPicker, PeakPickingConfig,
    Provenance,
};

/// Generate a recording with tone bursts starting at the given onset times
fn generate_bursts(sample_rate: u32, duration_secs: f32, onsets: &[f32]) -> AudioSignal {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    let mut samples = vec![0.0f32; num_samples];

    for &onset in onsets {
        let start = (sample_rate as f32 * onset) as usize;
        for i in start..num_samples {
            let t = (i - start) as f32 / sample_rate as f32;
            let decay = (-t / 0.2).exp();
            samples[i] += 0.8
                * decay
                * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin();
        }
    }

    AudioSignal::new(samples, sample_rate)
}

fn generate_silence(sample_rate: u32, duration_secs: f32) -> AudioSignal {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    AudioSignal::new(vec![0.0; num_samples], sample_rate)
}

/// In-memory audio source backed by generated signals
struct MemorySource {
    signals: HashMap<String, AudioSignal>,
}

impl MemorySource {
    fn new(entries: Vec<(&str, AudioSignal)>) -> Self {
        Self {
            signals: entries
                .into_iter()
                .map(|(name, signal)| (name.to_string(), signal))
                .collect(),
        }
    }
}

impl AudioSource for MemorySource {
    fn resolve(&self, name: &str) -> Result<AudioSignal, AudioError> {
        self.signals
            .get(name)
            .cloned()
            .ok_or_else(|| AudioError::FileNotFound(name.to_string()))
    }
}

fn detect(signal: &AudioSignal) -> adhan_cut::CutoffResult {
    let extractor = EnvelopeExtractor::new(EnvelopeConfig::default()).unwrap();
    let picker = PeakPicker::new(PeakPickingConfig::default()).unwrap();
    let policy = CutoffPolicy::new(adhan_cut::CutoffConfig::default()).unwrap();

    let envelope = extractor.compute(signal).expect("envelope failed");
    let peaks = picker.pick(&envelope);
    policy.decide(&peaks, signal.duration_seconds(), None)
}

#[test]
fn test_four_takbeer_onsets_cut_before_third() {
    let signal = generate_bursts(22050, 30.0, &[2.0, 5.0, 8.5, 12.0]);

    let extractor = EnvelopeExtractor::new(EnvelopeConfig::default()).unwrap();
    let picker = PeakPicker::new(PeakPickingConfig::default()).unwrap();
    let envelope = extractor.compute(&signal).unwrap();
    let peaks = picker.pick(&envelope);

    assert_eq!(peaks.len(), 4, "Expected 4 onsets, got {:?}", peaks.times);
    for (got, want) in peaks.times.iter().zip([2.0, 5.0, 8.5, 12.0].iter()) {
        assert!(
            (got - want).abs() < 0.1,
            "Onset at {got:.3}s, expected ~{want:.1}s"
        );
    }

    let result = detect(&signal);
    assert_eq!(result.rounded_seconds(), 9);
    assert_eq!(result.provenance, Provenance::Detected);
}

#[test]
fn test_two_onsets_extrapolate() {
    let signal = generate_bursts(22050, 30.0, &[3.0, 5.8]);

    let result = detect(&signal);
    assert_eq!(result.rounded_seconds(), 9);
    assert_eq!(result.provenance, Provenance::Detected);
}

#[test]
fn test_silence_falls_back() {
    let signal = generate_silence(22050, 30.0);

    let result = detect(&signal);
    assert_eq!(result.rounded_seconds(), 20);
    assert_eq!(result.provenance, Provenance::Fallback);
}

#[test]
fn test_single_onset_falls_back() {
    let signal = generate_bursts(22050, 30.0, &[4.0]);

    let result = detect(&signal);
    assert_eq!(result.rounded_seconds(), 20);
    assert_eq!(result.provenance, Provenance::Fallback);
}

#[test]
fn test_peaks_are_monotonic_with_refractory_gap() {
    let signal = generate_bursts(22050, 30.0, &[2.0, 5.0, 8.5, 12.0, 14.5, 17.0]);

    let config = PeakPickingConfig::default();
    let extractor = EnvelopeExtractor::new(EnvelopeConfig::default()).unwrap();
    let picker = PeakPicker::new(config.clone()).unwrap();
    let envelope = extractor.compute(&signal).unwrap();
    let peaks = picker.pick(&envelope);

    assert!(peaks.len() >= 3);
    let wait_frames = (config.wait_seconds / envelope.hop_seconds) as usize;
    let refractory = wait_frames as f32 * envelope.hop_seconds;
    for pair in peaks.times.windows(2) {
        assert!(pair[1] > pair[0], "Peaks not strictly increasing");
        assert!(
            pair[1] - pair[0] >= refractory,
            "Peaks {:.2}s and {:.2}s closer than {:.2}s",
            pair[0],
            pair[1],
            refractory
        );
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let signal = generate_bursts(22050, 30.0, &[2.0, 5.0, 8.5, 12.0]);

    let first = detect(&signal);
    let second = detect(&signal);
    assert_eq!(first, second);
}

#[test]
fn test_batch_with_override_and_skip() {
    let source = MemorySource::new(vec![
        ("adhan_1", generate_bursts(22050, 60.0, &[2.0, 5.0, 8.5])),
        ("adhan_2", generate_bursts(22050, 30.0, &[2.0, 5.0, 8.5, 12.0])),
    ]);
    let config = Config::default();
    let overrides: GroundTruthTable = [("adhan_1".to_string(), 20.5)].into_iter().collect();
    let runner = BatchRunner::new(&config, &source, &overrides).unwrap();

    let names: Vec<String> = ["adhan_1", "adhan_2", "adhan_missing"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let report = runner.run(&names, &AtomicBool::new(false));

    assert_eq!(report.items.len(), 2);
    assert_eq!(report.skipped.len(), 1);

    // Ground truth wins regardless of the audio content
    assert_eq!(report.items[0].name, "adhan_1");
    assert_eq!(report.items[0].cutoff_seconds, 20);
    assert_eq!(report.items[0].provenance, Provenance::Override);

    assert_eq!(report.items[1].name, "adhan_2");
    assert_eq!(report.items[1].cutoff_seconds, 9);
    assert_eq!(report.items[1].provenance, Provenance::Detected);

    assert_eq!(report.skipped[0].name, "adhan_missing");
}

#[test]
fn test_cutoff_stays_inside_playable_range() {
    let signals = [
        generate_bursts(22050, 12.0, &[2.0, 5.0, 8.5, 11.0]),
        generate_bursts(22050, 30.0, &[1.0, 3.5]),
        generate_silence(22050, 25.0),
    ];

    for signal in &signals {
        let result = detect(signal);
        assert!(result.seconds >= 6.0);
        assert!(result.seconds <= signal.duration_seconds() - 2.0);
    }
}

#[test]
fn test_library_detection_from_wav_files() {
    let dir = std::env::temp_dir().join(format!("adhan-cut-int-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let signal = generate_bursts(22050, 30.0, &[2.0, 5.0, 8.5, 12.0]);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(dir.join("adhan_1.wav"), spec).unwrap();
    for &sample in &signal.samples {
        writer
            .write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();

    let config = Config::default();
    let source = FileAudioSource::new(&dir);
    let runner = BatchRunner::new(&config, &source, &config.overrides).unwrap();

    let names = source.catalog().unwrap();
    assert_eq!(names, vec!["adhan_1".to_string()]);

    let report = runner.run(&names, &AtomicBool::new(false));
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].cutoff_seconds, 9);
    assert_eq!(report.items[0].provenance, Provenance::Detected);

    std::fs::remove_dir_all(&dir).ok();
}
