use serde::Serialize;

/// Features extraites d'une seule frame du signal filtré.
///
/// # Example
/// ```
/// use cw_core::frame::FeatureVector;
/// let f = FeatureVector::default();
/// assert!(!f.has_pitch());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Scaled mean Teager energy of the frame.
    pub teager_energy: f64,
    /// Fraction of sign changes between consecutive samples, in [0, 1].
    pub zcr: f64,
    /// Autocorrelation pitch in Hz. 0 = undetected.
    pub pitch_hz: f64,
}

impl FeatureVector {
    /// True if the autocorrelation found a positive peak.
    #[must_use]
    pub fn has_pitch(&self) -> bool {
        self.pitch_hz > 0.0
    }
}

/// Values derived from the tracker state after absorbing a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TrackedFeatures {
    /// Exponentially smoothed Teager energy.
    pub smoothed_energy: f64,
    /// Population standard deviation of the recent pitch window.
    pub pitch_std: f64,
}

/// Full per-frame trace: raw features, tracked values and the fused decision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameAnalysis {
    /// Frame index.
    pub index: usize,
    /// Raw features.
    pub features: FeatureVector,
    /// Tracked features.
    pub tracked: TrackedFeatures,
    /// Fused decision.
    pub is_cry: bool,
}

/// A confirmed cry onset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CryEvent {
    /// Onset time in seconds, rounded to 0.01 s.
    pub timestamp_secs: f64,
    /// Index of the frame that opens the confirmed window.
    pub frame_index: usize,
}

/// Résultat de détection pour un signal complet.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetectionReport {
    /// Confirmed events, non-decreasing in time.
    pub events: Vec<CryEvent>,
    /// Number of analysed frames.
    pub frame_count: usize,
    /// Number of frames flagged by the fuser, confirmed or not.
    pub flagged_frames: usize,
    /// Sample rate of the analysed signal.
    pub sample_rate: u32,
    /// Signal duration in seconds.
    pub duration_secs: f64,
}

impl DetectionReport {
    /// Event timestamps in order.
    #[must_use]
    pub fn timestamps(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.timestamp_secs).collect()
    }

    /// True if at least one event was confirmed.
    #[must_use]
    pub fn has_cry(&self) -> bool {
        !self.events.is_empty()
    }
}
