use std::path::Path;

use cw_core::{
    CryEvent, DetectError, DetectionReport, DetectorConfig, FrameAnalysis,
};

use crate::confirm::confirm_events;
use crate::decode::decode_file;
use crate::error::AudioError;
use crate::features::{FeatureExtractor, frame_count, frames};
use crate::fuser::is_cry;
use crate::preprocess::Preprocessor;
use crate::tracker::TrackerState;

/// Détecteur de pleurs par frames : préconditionnement, features, suivi,
/// fusion, confirmation.
///
/// Holds only the immutable configuration; every call starts from a fresh
/// [`TrackerState`], so one detector can serve many signals and threads.
///
/// # Example
/// ```
/// use cw_audio::detector::CryDetector;
/// use cw_core::DetectorConfig;
/// let detector = CryDetector::new(DetectorConfig::default()).unwrap();
/// let short = vec![0.1f32; 100];
/// let report = detector.detect(&short, 16_000).unwrap();
/// assert_eq!(report.frame_count, 0);
/// assert!(report.events.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct CryDetector {
    config: DetectorConfig,
}

impl CryDetector {
    /// Create a detector after validating `config`.
    ///
    /// # Errors
    /// Returns [`DetectError::InvalidConfig`] for meaningless parameters.
    pub fn new(config: DetectorConfig) -> Result<Self, DetectError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Preprocess then trace every frame.
    ///
    /// Signals shorter than one frame yield an empty trace without being
    /// preprocessed.
    ///
    /// # Errors
    /// Propagates preprocessing failures (silent or non-finite input,
    /// zero sample rate, passband above Nyquist).
    pub fn analyze(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<FrameAnalysis>, DetectError> {
        if sample_rate == 0 {
            return Err(DetectError::ZeroSampleRate);
        }
        if samples.len() < self.config.frame_size {
            return Ok(Vec::new());
        }
        let pre = Preprocessor::new(&self.config, sample_rate)?;
        let filtered = pre.process(samples)?;
        Ok(self.analyze_filtered(&filtered, sample_rate))
    }

    /// Trace every frame of an already preprocessed signal.
    ///
    /// The frame loop is a fold threading [`TrackerState`].
    #[must_use]
    pub fn analyze_filtered(&self, filtered: &[f64], sample_rate: u32) -> Vec<FrameAnalysis> {
        let cfg = &self.config;
        let mut extractor = FeatureExtractor::new(cfg, sample_rate);
        let n = frame_count(filtered.len(), cfg.frame_size, cfg.hop_size);

        let (_, trace) = frames(filtered, cfg.frame_size, cfg.hop_size)
            .enumerate()
            .fold(
                (TrackerState::new(cfg), Vec::with_capacity(n)),
                |(state, mut trace), (index, frame)| {
                    let features = extractor.extract(frame);
                    let (state, tracked) = state.advance(&features, cfg);
                    trace.push(FrameAnalysis {
                        index,
                        features,
                        tracked,
                        is_cry: is_cry(&features, &tracked, cfg),
                    });
                    (state, trace)
                },
            );

        log::trace!(
            "{} frames, {} flagged",
            trace.len(),
            trace.iter().filter(|f| f.is_cry).count()
        );
        trace
    }

    /// Confirmed events for an analysed trace.
    #[must_use]
    pub fn confirm(&self, trace: &[FrameAnalysis], sample_rate: u32) -> Vec<CryEvent> {
        let flags: Vec<bool> = trace.iter().map(|f| f.is_cry).collect();
        confirm_events(
            &flags,
            self.config.min_consecutive_frames,
            self.config.hop_secs(sample_rate),
            self.config.event_mode,
        )
    }

    /// Full detection on mono samples.
    ///
    /// # Errors
    /// See [`CryDetector::analyze`].
    pub fn detect(&self, samples: &[f32], sample_rate: u32) -> Result<DetectionReport, DetectError> {
        let trace = self.analyze(samples, sample_rate)?;
        let events = self.confirm(&trace, sample_rate);

        let report = DetectionReport {
            frame_count: trace.len(),
            flagged_frames: trace.iter().filter(|f| f.is_cry).count(),
            sample_rate,
            duration_secs: samples.len() as f64 / f64::from(sample_rate),
            events,
        };
        log::debug!(
            "{} frames, {} flagged, {} events",
            report.frame_count,
            report.flagged_frames,
            report.events.len()
        );
        Ok(report)
    }

    /// Décode un fichier audio (premier canal) et lance la détection.
    ///
    /// # Errors
    /// Returns [`AudioError`] for decode failures and wrapped detection errors.
    pub fn detect_file(&self, path: &Path) -> Result<DetectionReport, AudioError> {
        let audio = decode_file(path)?;
        Ok(self.detect(&audio.samples, audio.sample_rate)?)
    }
}

/// Detect cries with the default configuration.
///
/// # Errors
/// See [`CryDetector::analyze`].
///
/// # Example
/// ```
/// use cw_audio::detector::detect_cries;
/// use cw_core::DetectError;
/// assert_eq!(detect_cries(&[0.0; 4096], 16_000), Err(DetectError::SilentSignal));
/// ```
pub fn detect_cries(samples: &[f32], sample_rate: u32) -> Result<Vec<CryEvent>, DetectError> {
    let detector = CryDetector::new(DetectorConfig::default())?;
    Ok(detector.detect(samples, sample_rate)?.events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_rejected() {
        let config = DetectorConfig {
            pitch_window: 0,
            ..DetectorConfig::default()
        };
        assert!(CryDetector::new(config).is_err());
    }

    #[test]
    fn zero_sample_rate_is_an_error() {
        let detector = CryDetector::new(DetectorConfig::default()).unwrap();
        assert_eq!(
            detector.detect(&[0.5; 2048], 0).unwrap_err(),
            DetectError::ZeroSampleRate
        );
    }

    #[test]
    fn short_signal_is_empty_not_error() {
        let detector = CryDetector::new(DetectorConfig::default()).unwrap();
        let report = detector.detect(&[0.0; 1023], 16_000).unwrap();
        assert_eq!(report.frame_count, 0);
        assert!(!report.has_cry());
    }

    #[test]
    fn trace_length_matches_frame_count() {
        let detector = CryDetector::new(DetectorConfig::default()).unwrap();
        let samples: Vec<f32> = (0..5000).map(|i| ((i * 7919) % 201) as f32 / 100.0 - 1.0).collect();
        let trace = detector.analyze(&samples, 16_000).unwrap();
        assert_eq!(trace.len(), frame_count(5000, 1024, 512));
        assert!(trace.iter().enumerate().all(|(i, f)| f.index == i));
        assert!(trace.iter().all(|f| f.features.teager_energy.is_finite()));
    }

    #[test]
    fn first_frame_energy_is_unsmoothed() {
        let detector = CryDetector::new(DetectorConfig::default()).unwrap();
        let samples: Vec<f32> = (0..4096).map(|i| (i as f32 * 0.25).sin()).collect();
        let trace = detector.analyze(&samples, 16_000).unwrap();
        let first = trace[0];
        assert!((first.tracked.smoothed_energy - first.features.teager_energy).abs() < 1e-15);
    }
}
