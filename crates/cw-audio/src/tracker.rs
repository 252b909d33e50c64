use std::collections::VecDeque;

use cw_core::{DetectorConfig, FeatureVector, TrackedFeatures};

/// Cross-frame state: smoothed energy and recent pitch values.
///
/// Passed by value into [`TrackerState::advance`] and returned updated, so
/// a whole signal is a fold over its frames. A fresh state is used per signal.
///
/// # Example
/// ```
/// use cw_audio::tracker::TrackerState;
/// use cw_core::{DetectorConfig, FeatureVector};
/// let config = DetectorConfig::default();
/// let f = FeatureVector { teager_energy: 0.01, zcr: 0.05, pitch_hz: 400.0 };
/// let (state, tracked) = TrackerState::new(&config).advance(&f, &config);
/// assert!((tracked.smoothed_energy - 0.01).abs() < 1e-12);
/// assert_eq!(state.pitch_history().len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackerState {
    smoothed_energy: Option<f64>,
    pitch_history: VecDeque<f64>,
}

impl TrackerState {
    /// Empty state sized for `config.pitch_window`.
    #[must_use]
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            smoothed_energy: None,
            pitch_history: VecDeque::with_capacity(config.pitch_window),
        }
    }

    /// Absorb one frame's features.
    ///
    /// The first frame seeds the EMA with its own energy. Undetected pitch
    /// (0 Hz) enters the window unless `unvoiced_in_window` is off.
    #[must_use]
    pub fn advance(
        mut self,
        features: &FeatureVector,
        config: &DetectorConfig,
    ) -> (Self, TrackedFeatures) {
        let teo = features.teager_energy;
        let smoothed = match self.smoothed_energy {
            None => teo,
            Some(prev) => config.smooth_alpha * teo + (1.0 - config.smooth_alpha) * prev,
        };
        self.smoothed_energy = Some(smoothed);

        if features.has_pitch() || config.unvoiced_in_window {
            self.pitch_history.push_back(features.pitch_hz);
            while self.pitch_history.len() > config.pitch_window {
                self.pitch_history.pop_front();
            }
        }

        let tracked = TrackedFeatures {
            smoothed_energy: smoothed,
            pitch_std: population_std(&self.pitch_history),
        };
        (self, tracked)
    }

    /// Most recent pitch values, oldest first.
    #[must_use]
    pub fn pitch_history(&self) -> &VecDeque<f64> {
        &self.pitch_history
    }

    /// Current smoothed energy, `None` before the first frame.
    #[must_use]
    pub fn smoothed_energy(&self) -> Option<f64> {
        self.smoothed_energy
    }
}

/// Population standard deviation (divides by `n`). 0 for an empty window.
#[must_use]
pub fn population_std(values: &VecDeque<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt()
}
