use realfft::RealFftPlanner;
use realfft::num_complex::Complex64;

/// FFT autocorrelation pipeline using realfft.
///
/// Zero-pads each frame to at least twice its length so the circular
/// correlation equals the linear one, then returns
/// `r[lag] = sum(x[n] * x[n + lag])` for every lag below the frame length.
/// Plans and scratch buffers are allocated once.
///
/// # Example
/// ```
/// use cw_audio::autocorr::AutocorrPipeline;
/// let mut ac = AutocorrPipeline::new(4);
/// let r = ac.process(&[1.0, 2.0, 3.0, 4.0]);
/// assert!((r[0] - 30.0).abs() < 1e-9);
/// assert!((r[1] - 20.0).abs() < 1e-9);
/// ```
pub struct AutocorrPipeline {
    frame_size: usize,
    fft_size: usize,
    time_buf: Vec<f64>,
    spectrum_buf: Vec<Complex64>,
    forward_scratch: Vec<Complex64>,
    inverse_scratch: Vec<Complex64>,
    forward: std::sync::Arc<dyn realfft::RealToComplex<f64>>,
    inverse: std::sync::Arc<dyn realfft::ComplexToReal<f64>>,
    lags: Vec<f64>,
}

impl AutocorrPipeline {
    /// Create a pipeline for frames of `frame_size` samples.
    ///
    /// # Panics
    /// Panics if `frame_size` is 0.
    #[must_use]
    pub fn new(frame_size: usize) -> Self {
        assert!(frame_size > 0, "frame size must be > 0");

        let fft_size = (2 * frame_size).next_power_of_two();
        let mut planner = RealFftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);

        let time_buf = forward.make_input_vec();
        let spectrum_buf = forward.make_output_vec();
        let forward_scratch = forward.make_scratch_vec();
        let inverse_scratch = inverse.make_scratch_vec();

        Self {
            frame_size,
            fft_size,
            time_buf,
            spectrum_buf,
            forward_scratch,
            inverse_scratch,
            forward,
            inverse,
            lags: vec![0.0; frame_size],
        }
    }

    /// Autocorrelation of `frame` for lags `0..frame_size`.
    ///
    /// Shorter frames are zero-padded; longer ones are truncated.
    pub fn process(&mut self, frame: &[f64]) -> &[f64] {
        let n = self.frame_size.min(frame.len());

        for (i, slot) in self.time_buf.iter_mut().enumerate() {
            *slot = if i < n { frame[i] } else { 0.0 };
        }

        if self
            .forward
            .process_with_scratch(
                &mut self.time_buf,
                &mut self.spectrum_buf,
                &mut self.forward_scratch,
            )
            .is_err()
        {
            self.lags.fill(0.0);
            return &self.lags;
        }

        // Power spectrum; purely real, so the DC/Nyquist imaginary parts are exactly 0.
        for c in &mut self.spectrum_buf {
            *c = Complex64::new(c.norm_sqr(), 0.0);
        }

        if self
            .inverse
            .process_with_scratch(
                &mut self.spectrum_buf,
                &mut self.time_buf,
                &mut self.inverse_scratch,
            )
            .is_err()
        {
            self.lags.fill(0.0);
            return &self.lags;
        }

        let scale = 1.0 / self.fft_size as f64;
        for (lag, out) in self.lags.iter_mut().enumerate() {
            *out = self.time_buf[lag] * scale;
        }
        &self.lags
    }

    /// Frame length this pipeline was planned for.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(frame: &[f64], lag: usize) -> f64 {
        frame[..frame.len() - lag]
            .iter()
            .zip(&frame[lag..])
            .map(|(a, b)| a * b)
            .sum()
    }

    #[test]
    fn matches_direct_sum() {
        let frame: Vec<f64> = (0..256)
            .map(|i| (i as f64 * 0.17).sin() + 0.3 * (i as f64 * 0.61).cos())
            .collect();
        let mut ac = AutocorrPipeline::new(256);
        let r = ac.process(&frame).to_vec();
        for lag in [0, 1, 7, 31, 100, 255] {
            assert!((r[lag] - direct(&frame, lag)).abs() < 1e-8, "lag {lag}");
        }
    }

    #[test]
    fn silent_frame_is_zero() {
        let mut ac = AutocorrPipeline::new(64);
        assert!(ac.process(&[0.0; 64]).iter().all(|&v| v.abs() < 1e-15));
    }
}
