use cw_core::{DetectorConfig, FeatureVector, TrackedFeatures};

/// Outcome of each detection criterion for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Smoothed energy above threshold.
    pub energy: bool,
    /// Zero-crossing rate below threshold.
    pub zcr: bool,
    /// Pitch strictly inside (pitch_min, pitch_max).
    pub pitch_band: bool,
    /// Pitch deviation above threshold.
    pub pitch_modulation: bool,
}

impl Criteria {
    /// Evaluate all four criteria.
    #[must_use]
    pub fn evaluate(
        features: &FeatureVector,
        tracked: &TrackedFeatures,
        config: &DetectorConfig,
    ) -> Self {
        let pitch = features.pitch_hz;
        Self {
            energy: tracked.smoothed_energy > config.teo_threshold,
            zcr: features.zcr < config.zcr_threshold,
            pitch_band: f64::from(config.pitch_min_hz) < pitch
                && pitch < f64::from(config.pitch_max_hz),
            pitch_modulation: tracked.pitch_std > config.pitch_std_threshold,
        }
    }

    /// Every criterion holds.
    #[must_use]
    pub fn all(&self) -> bool {
        self.energy && self.zcr && self.pitch_band && self.pitch_modulation
    }
}

/// A frame is a cry frame iff all four criteria hold. No partial credit.
///
/// # Example
/// ```
/// use cw_audio::fuser::is_cry;
/// use cw_core::{DetectorConfig, FeatureVector, TrackedFeatures};
/// let config = DetectorConfig::default();
/// let f = FeatureVector { teager_energy: 0.1, zcr: 0.05, pitch_hz: 450.0 };
/// let t = TrackedFeatures { smoothed_energy: 0.1, pitch_std: 40.0 };
/// assert!(is_cry(&f, &t, &config));
/// ```
#[must_use]
pub fn is_cry(features: &FeatureVector, tracked: &TrackedFeatures, config: &DetectorConfig) -> bool {
    Criteria::evaluate(features, tracked, config).all()
}
