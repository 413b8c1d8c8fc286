//! Benchmarks for peak picking and cutoff decisions

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use adhan_cut::{
    CutoffConfig, CutoffPolicy, OnsetEnvelope, PeakPicker, PeakPickingConfig, PeakSet,
};

/// Envelope with impulses every ~3 seconds over a noisy floor
fn generate_envelope(frames: usize, hop_seconds: f32) -> OnsetEnvelope {
    let impulse_every = (3.0 / hop_seconds) as usize;
    let values: Vec<f32> = (0..frames)
        .map(|i| {
            let floor = 0.02 * ((i * 7919) % 101) as f32 / 101.0;
            if i > 0 && i % impulse_every == 0 {
                1.0
            } else {
                floor
            }
        })
        .collect();
    OnsetEnvelope::new(values, hop_seconds)
}

fn bench_peak_picking(c: &mut Criterion) {
    let mut group = c.benchmark_group("peak_picking");
    let hop_seconds = 512.0 / 22050.0;

    for duration in [30.0f32, 120.0, 600.0] {
        let frames = (duration / hop_seconds) as usize;
        let envelope = generate_envelope(frames, hop_seconds);
        let picker = PeakPicker::new(PeakPickingConfig::default()).unwrap();

        group.bench_with_input(
            BenchmarkId::new("pick", format!("{}s", duration as u32)),
            &envelope,
            |b, envelope| b.iter(|| black_box(picker.pick(envelope))),
        );
    }

    group.finish();
}

fn bench_cutoff_decision(c: &mut Criterion) {
    let policy = CutoffPolicy::new(CutoffConfig::default()).unwrap();
    let peaks = PeakSet::from(vec![2.0, 5.0, 8.5, 12.0]);

    c.bench_function("cutoff_decide", |b| {
        b.iter(|| black_box(policy.decide(&peaks, 30.0, None)))
    });
}

criterion_group!(benches, bench_peak_picking, bench_cutoff_decision);
criterion_main!(benches);
