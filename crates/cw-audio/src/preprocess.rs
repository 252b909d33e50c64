use cw_core::{DetectError, DetectorConfig};

use crate::filter::SosFilter;

/// Keep channel 0 of an interleaved buffer.
///
/// # Example
/// ```
/// use cw_audio::preprocess::first_channel;
/// assert_eq!(first_channel(&[1.0, -1.0, 2.0, -2.0], 2), vec![1.0, 2.0]);
/// ```
#[must_use]
pub fn first_channel(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved.iter().step_by(channels).copied().collect()
}

/// Apply pre-emphasis filter to audio signal
///
/// y[0] = x[0], y[n] = x[n] - coef * x[n-1]
#[must_use]
pub fn pre_emphasis(signal: &[f64], coef: f64) -> Vec<f64> {
    let Some(&first) = signal.first() else {
        return Vec::new();
    };

    let mut output = Vec::with_capacity(signal.len());
    output.push(first);
    output.extend(signal.windows(2).map(|w| w[1] - coef * w[0]));
    output
}

/// Divide in place by the peak absolute value.
///
/// # Errors
/// Returns [`DetectError::SilentSignal`] if the peak is zero (or the signal empty).
pub fn peak_normalize(signal: &mut [f64]) -> Result<(), DetectError> {
    let peak = signal.iter().map(|x| x.abs()).fold(0.0f64, f64::max);
    if peak == 0.0 {
        return Err(DetectError::SilentSignal);
    }
    for x in signal.iter_mut() {
        *x /= peak;
    }
    Ok(())
}

/// Préconditionnement : pré-emphase, normalisation crête, passe-bande.
///
/// Built once per sample rate; [`Preprocessor::process`] holds no state
/// between calls.
pub struct Preprocessor {
    filter: SosFilter,
    pre_emphasis: f64,
    sample_rate: u32,
}

impl Preprocessor {
    /// Design the bandpass for `sample_rate`.
    ///
    /// # Errors
    /// Fails on a zero sample rate or a passband that does not fit below Nyquist.
    ///
    /// # Example
    /// ```
    /// use cw_audio::preprocess::Preprocessor;
    /// use cw_core::DetectorConfig;
    /// assert!(Preprocessor::new(&DetectorConfig::default(), 16_000).is_ok());
    /// assert!(Preprocessor::new(&DetectorConfig::default(), 2_000).is_err());
    /// ```
    pub fn new(config: &DetectorConfig, sample_rate: u32) -> Result<Self, DetectError> {
        let filter = SosFilter::butterworth_bandpass(
            config.filter_order,
            config.band_low_hz,
            config.band_high_hz,
            sample_rate,
        )?;
        Ok(Self {
            filter,
            pre_emphasis: config.pre_emphasis,
            sample_rate,
        })
    }

    /// Run the full chain on mono samples. Output has the input's length.
    ///
    /// # Errors
    /// [`DetectError::NonFiniteSample`] on NaN/inf input,
    /// [`DetectError::SilentSignal`] if the emphasised signal is all zeros.
    pub fn process(&self, samples: &[f32]) -> Result<Vec<f64>, DetectError> {
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(DetectError::NonFiniteSample { index });
        }
        let raw: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();
        let mut emphasised = pre_emphasis(&raw, self.pre_emphasis);
        peak_normalize(&mut emphasised)?;
        Ok(self.filter.apply(&emphasised))
    }

    /// The bandpass stage alone.
    #[must_use]
    pub fn filter(&self) -> &SosFilter {
        &self.filter
    }

    /// Sample rate the filter was designed for.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
