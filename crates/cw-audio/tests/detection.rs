//! End-to-end detection on synthetic signals.

use std::f64::consts::PI;

use cw_audio::detector::{CryDetector, detect_cries};
use cw_audio::preprocess::Preprocessor;
use cw_core::{DetectError, DetectorConfig, EventMode, PitchMethod};

const SR: u32 = 16_000;
const HOP_SECS: f64 = 512.0 / 16_000.0;
/// Cry onset, aligned on a hop boundary (1.024 s).
const ONSET: usize = 32 * 512;
/// Cry end (2.56 s).
const OFFSET: usize = 80 * 512;
const TOTAL: usize = 100 * 512;

/// Silence, then a tone whose pitch wobbles 350–650 Hz at 3 Hz and whose
/// amplitude is modulated at 4 Hz, then silence again.
fn synthetic_cry() -> Vec<f32> {
    noisy_cry(0.0)
}

/// Band-limited noise: 40 equal tones spread over 300–1300 Hz with
/// scattered phases, scaled to an RMS of about `amp`.
fn band_noise(n: usize, amp: f64) -> f64 {
    const TONES: usize = 40;
    let golden = (5f64.sqrt() - 1.0) / 2.0;
    let t = n as f64 / f64::from(SR);
    let sum: f64 = (0..TONES)
        .map(|j| {
            let freq = 300.0 + 1000.0 * j as f64 / (TONES - 1) as f64;
            let phase = 2.0 * PI * (j as f64 * golden).fract();
            (2.0 * PI * freq * t + phase).sin()
        })
        .sum();
    amp * sum / (TONES as f64 / 2.0).sqrt()
}

/// [`synthetic_cry`] with band-limited noise of RMS `noise_amp` mixed into
/// the cry segment.
fn noisy_cry(noise_amp: f64) -> Vec<f32> {
    let mut phase = 0.0f64;
    (0..TOTAL)
        .map(|n| {
            if !(ONSET..OFFSET).contains(&n) {
                return 0.0;
            }
            let t = (n - ONSET) as f64 / f64::from(SR);
            let freq = 500.0 + 150.0 * (2.0 * PI * 3.0 * t).sin();
            let amp = 0.6 + 0.4 * (2.0 * PI * 4.0 * t).sin();
            phase += 2.0 * PI * freq / f64::from(SR);
            let noise = if noise_amp > 0.0 { band_noise(n, noise_amp) } else { 0.0 };
            (amp * phase.sin() + noise) as f32
        })
        .collect()
}

fn sine(freq: f64, amp: f64, len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| (amp * (2.0 * PI * freq * n as f64 / f64::from(SR)).sin()) as f32)
        .collect()
}

fn detector(config: DetectorConfig) -> CryDetector {
    CryDetector::new(config).unwrap()
}

#[test]
fn silent_input_is_an_explicit_error() {
    assert_eq!(
        detect_cries(&vec![0.0; 32_000], SR),
        Err(DetectError::SilentSignal)
    );
}

#[test]
fn low_tone_never_triggers() {
    // 150 Hz sits below the pitch band: no frame passes, no event.
    let report = detector(DetectorConfig::default())
        .detect(&sine(150.0, 0.8, 32_000), SR)
        .unwrap();
    assert_eq!(report.flagged_frames, 0);
    assert!(report.events.is_empty());
}

#[test]
fn flat_tone_fails_modulation_criterion() {
    // Loud, in-band, but perfectly steady: pitch deviation stays at 0.
    let trace = detector(DetectorConfig::default())
        .analyze(&sine(500.0, 0.8, 32_000), SR)
        .unwrap();
    assert!(trace.iter().all(|f| !f.is_cry));
    assert!(trace.iter().all(|f| f.tracked.pitch_std < 1e-9));
}

#[test]
fn modulated_cry_is_found_near_onset() {
    let report = detector(DetectorConfig::default())
        .detect(&synthetic_cry(), SR)
        .unwrap();
    let onset = ONSET as f64 / f64::from(SR);
    let offset = OFFSET as f64 / f64::from(SR);

    assert!(report.has_cry());
    let first = report.events[0].timestamp_secs;
    // One hop of framing slack plus the 0.01 s rounding.
    assert!((first - onset).abs() <= HOP_SECS + 0.005, "first event at {first}");

    let ts = report.timestamps();
    assert!(ts.windows(2).all(|w| w[0] <= w[1]));
    assert!(ts.iter().all(|&t| t >= onset - HOP_SECS - 0.005 && t <= offset));
    assert!(ts.iter().all(|&t| t <= report.duration_secs));
}

#[test]
fn cry_survives_band_limited_noise() {
    let report = detector(DetectorConfig::default())
        .detect(&noisy_cry(0.05), SR)
        .unwrap();
    let onset = ONSET as f64 / f64::from(SR);
    let offset = OFFSET as f64 / f64::from(SR);

    assert!(report.has_cry());
    let first = report.events[0].timestamp_secs;
    assert!((first - onset).abs() <= HOP_SECS + 0.005, "first event at {first}");
    assert!(report.timestamps().iter().all(|&t| t <= offset));
}

#[test]
fn long_run_emits_one_event_per_window() {
    let base = detector(DetectorConfig::default())
        .detect(&synthetic_cry(), SR)
        .unwrap();
    let first_only = detector(DetectorConfig {
        event_mode: EventMode::FirstOfRun,
        ..DetectorConfig::default()
    })
    .detect(&synthetic_cry(), SR)
    .unwrap();

    assert!(base.events.len() > 10);
    assert_eq!(first_only.events.len(), 1);
    assert_eq!(first_only.events[0], base.events[0]);
}

#[test]
fn fft_backend_gives_same_events() {
    let direct = detector(DetectorConfig::default())
        .detect(&synthetic_cry(), SR)
        .unwrap();
    let fft = detector(DetectorConfig {
        pitch_method: PitchMethod::Fft,
        ..DetectorConfig::default()
    })
    .detect(&synthetic_cry(), SR)
    .unwrap();
    assert_eq!(direct.events, fft.events);
}

#[test]
fn refiltering_keeps_outcome() {
    let config = DetectorConfig::default();
    let det = detector(config.clone());
    let pre = Preprocessor::new(&config, SR).unwrap();
    let filtered = pre.process(&synthetic_cry()).unwrap();

    assert_eq!(pre.filter().apply(&filtered), pre.filter().apply(&filtered));

    let once = det.confirm(&det.analyze_filtered(&filtered, SR), SR);
    let twice_signal = pre.filter().apply(&filtered);
    let twice = det.confirm(&det.analyze_filtered(&twice_signal, SR), SR);

    assert!(!once.is_empty());
    assert!(!twice.is_empty());
    assert!((once[0].timestamp_secs - twice[0].timestamp_secs).abs() <= HOP_SECS + 0.005);
}

#[test]
fn detection_is_repeatable() {
    let det = detector(DetectorConfig::default());
    let signal = synthetic_cry();
    assert_eq!(det.detect(&signal, SR).unwrap(), det.detect(&signal, SR).unwrap());
}

#[test]
fn passband_above_nyquist_is_rejected() {
    let err = detector(DetectorConfig::default())
        .detect(&sine(300.0, 0.5, 8_000), 2_000)
        .unwrap_err();
    assert!(matches!(err, DetectError::InvalidBand { .. }));
}
