//! Benchmark for the full detection chain and the two pitch backends

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use cw_audio::detector::CryDetector;
use cw_audio::features::PitchEstimator;
use cw_core::{DetectorConfig, PitchMethod};

const SAMPLE_RATE: u32 = 16_000;

fn synth(seconds: usize) -> Vec<f32> {
    (0..SAMPLE_RATE as usize * seconds)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * (450.0 + 100.0 * (3.0 * t).sin()) * t).sin()
        })
        .collect()
}

fn bench_detect(c: &mut Criterion) {
    let signal = synth(10);
    for method in [PitchMethod::Direct, PitchMethod::Fft] {
        let detector = CryDetector::new(DetectorConfig {
            pitch_method: method,
            ..DetectorConfig::default()
        })
        .unwrap();
        c.bench_function(&format!("detect_10s_{method:?}"), |b| {
            b.iter(|| detector.detect(black_box(&signal), SAMPLE_RATE))
        });
    }
}

fn bench_pitch(c: &mut Criterion) {
    let frame: Vec<f64> = (0..1024).map(|i| (f64::from(i) * 0.19).sin()).collect();
    for method in [PitchMethod::Direct, PitchMethod::Fft] {
        let config = DetectorConfig {
            pitch_method: method,
            ..DetectorConfig::default()
        };
        let mut est = PitchEstimator::new(&config, SAMPLE_RATE);
        c.bench_function(&format!("pitch_frame_{method:?}"), |b| {
            b.iter(|| est.estimate(black_box(&frame)))
        });
    }
}

criterion_group!(benches, bench_detect, bench_pitch);
criterion_main!(benches);
