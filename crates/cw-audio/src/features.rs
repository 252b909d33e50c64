use std::ops::Range;

use cw_core::{DetectorConfig, FeatureVector, PitchMethod};

use crate::autocorr::AutocorrPipeline;

/// Number of full frames in a signal of `len` samples.
///
/// `floor((len - frame_size) / hop_size) + 1`, or 0 if the signal is shorter
/// than one frame.
///
/// # Example
/// ```
/// use cw_audio::features::frame_count;
/// assert_eq!(frame_count(1024, 1024, 512), 1);
/// assert_eq!(frame_count(2047, 1024, 512), 2);
/// assert_eq!(frame_count(1023, 1024, 512), 0);
/// ```
#[must_use]
pub fn frame_count(len: usize, frame_size: usize, hop_size: usize) -> usize {
    if frame_size == 0 || hop_size == 0 || len < frame_size {
        return 0;
    }
    (len - frame_size) / hop_size + 1
}

/// Overlapping frames; frame `i` starts at `i * hop_size`.
pub fn frames(
    signal: &[f64],
    frame_size: usize,
    hop_size: usize,
) -> impl Iterator<Item = &[f64]> + '_ {
    (0..frame_count(signal.len(), frame_size, hop_size))
        .map(move |i| &signal[i * hop_size..i * hop_size + frame_size])
}

/// Mean Teager-Kaiser energy `x[n]² - x[n-1]·x[n+1]`, scaled by `gain`.
///
/// # Example
/// ```
/// use cw_audio::features::teager_energy;
/// // Constant signal: x² - x·x = 0.
/// assert!(teager_energy(&[0.5; 16], 20.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn teager_energy(frame: &[f64], gain: f64) -> f64 {
    if frame.len() < 3 {
        return 0.0;
    }
    let sum: f64 = frame
        .windows(3)
        .map(|w| w[1] * w[1] - w[0] * w[2])
        .sum();
    sum / (frame.len() - 2) as f64 * gain
}

/// Sign with `sign(0) = 0`.
#[inline(always)]
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Fraction of sign changes: `mean(|sign(x[n]) - sign(x[n-1])|) / 2`.
///
/// A step through zero (1 → 0) counts as half a crossing.
///
/// # Example
/// ```
/// use cw_audio::features::zero_crossing_rate;
/// assert!((zero_crossing_rate(&[1.0, -1.0, 1.0]) - 1.0).abs() < 1e-12);
/// assert!(zero_crossing_rate(&[1.0, 2.0, 3.0]).abs() < 1e-12);
/// ```
#[must_use]
pub fn zero_crossing_rate(frame: &[f64]) -> f64 {
    if frame.len() < 2 {
        return 0.0;
    }
    let total: f64 = frame
        .windows(2)
        .map(|w| (sign(w[1]) - sign(w[0])).abs())
        .sum();
    total / (frame.len() - 1) as f64 / 2.0
}

/// Candidate lags `[sr / pitch_max, sr / pitch_min)` (integer division),
/// clamped to `[1, frame_size)`.
///
/// # Example
/// ```
/// use cw_audio::features::lag_range;
/// assert_eq!(lag_range(16_000, 200, 1000, 1024), 16..80);
/// assert_eq!(lag_range(44_100, 200, 1000, 1024), 44..220);
/// ```
#[must_use]
pub fn lag_range(sample_rate: u32, pitch_min_hz: u32, pitch_max_hz: u32, frame_size: usize) -> Range<usize> {
    let lo = (sample_rate / pitch_max_hz.max(1)) as usize;
    let hi = (sample_rate / pitch_min_hz.max(1)) as usize;
    let lo = lo.max(1);
    let hi = hi.min(frame_size);
    lo..hi.max(lo)
}

/// Lag with the highest strictly positive correlation; the first one wins ties.
#[must_use]
pub fn pick_lag(correlations: impl IntoIterator<Item = (usize, f64)>) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut max_corr = 0.0;
    for (lag, corr) in correlations {
        if corr > max_corr {
            max_corr = corr;
            best = Some(lag);
        }
    }
    best
}

/// `sum(frame[..len-lag] * frame[lag..])`.
#[inline(always)]
#[must_use]
pub fn lag_product(frame: &[f64], lag: usize) -> f64 {
    if lag >= frame.len() {
        return 0.0;
    }
    frame[..frame.len() - lag]
        .iter()
        .zip(&frame[lag..])
        .map(|(a, b)| a * b)
        .sum()
}

/// Relative level under which an FFT autocorrelation value is treated as 0.
const FFT_NOISE_FLOOR: f64 = 1e-12;

/// Estimateur de hauteur par autocorrélation, réutilisable de frame en frame.
pub struct PitchEstimator {
    sample_rate: u32,
    lags: Range<usize>,
    fft: Option<AutocorrPipeline>,
}

impl PitchEstimator {
    /// Create an estimator for frames of `config.frame_size` at `sample_rate`.
    ///
    /// # Example
    /// ```
    /// use cw_audio::features::PitchEstimator;
    /// use cw_core::DetectorConfig;
    /// let mut est = PitchEstimator::new(&DetectorConfig::default(), 16_000);
    /// let frame: Vec<f64> = (0..1024)
    ///     .map(|n| (2.0 * std::f64::consts::PI * 500.0 * n as f64 / 16_000.0).sin())
    ///     .collect();
    /// assert_eq!(est.best_lag(&frame), Some(32));
    /// assert!((est.estimate(&frame) - 500.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn new(config: &DetectorConfig, sample_rate: u32) -> Self {
        let fft = match config.pitch_method {
            PitchMethod::Direct => None,
            PitchMethod::Fft => Some(AutocorrPipeline::new(config.frame_size.max(1))),
        };
        Self {
            sample_rate,
            lags: lag_range(
                sample_rate,
                config.pitch_min_hz,
                config.pitch_max_hz,
                config.frame_size,
            ),
            fft,
        }
    }

    /// Lags searched by this estimator.
    #[must_use]
    pub fn lags(&self) -> Range<usize> {
        self.lags.clone()
    }

    /// Lag maximising the autocorrelation, `None` if no lag correlates positively.
    pub fn best_lag(&mut self, frame: &[f64]) -> Option<usize> {
        let lags = self.lags.clone();
        match self.fft.as_mut() {
            Some(fft) => {
                let r = fft.process(frame);
                // FFT rounding turns exact zeros into ±1e-17; below the floor counts as 0.
                let floor =
                    r.first().map_or(0.0, |&r0| r0.abs() * FFT_NOISE_FLOOR) + f64::MIN_POSITIVE;
                let best = pick_lag(
                    lags.filter(|&l| l < r.len())
                        .map(|l| (l, if r[l] > floor { r[l] } else { 0.0 })),
                );
                best.filter(|&l| lag_product(frame, l) > 0.0)
            }
            None => pick_lag(lags.map(|l| (l, lag_product(frame, l)))),
        }
    }

    /// Pitch in Hz, 0 if undetected.
    pub fn estimate(&mut self, frame: &[f64]) -> f64 {
        self.best_lag(frame)
            .map_or(0.0, |lag| f64::from(self.sample_rate) / lag as f64)
    }
}

/// Extract the three per-frame features.
pub struct FeatureExtractor {
    teo_gain: f64,
    pitch: PitchEstimator,
}

impl FeatureExtractor {
    /// Create an extractor for `sample_rate`.
    #[must_use]
    pub fn new(config: &DetectorConfig, sample_rate: u32) -> Self {
        Self {
            teo_gain: config.teo_gain,
            pitch: PitchEstimator::new(config, sample_rate),
        }
    }

    /// Features of one frame.
    pub fn extract(&mut self, frame: &[f64]) -> FeatureVector {
        FeatureVector {
            teager_energy: teager_energy(frame, self.teo_gain),
            zcr: zero_crossing_rate(frame),
            pitch_hz: self.pitch.estimate(frame),
        }
    }
}
