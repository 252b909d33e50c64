//! Butterworth bandpass design and second-order-section filtering.
//!
//! The bandpass is designed in zero/pole/gain form (analog prototype,
//! lowpass-to-bandpass transform, bilinear transform with pre-warping) and
//! then split into biquads. Filtering a cascade of biquads stays stable at
//! orders where a single high-order polynomial would not.

use std::f64::consts::PI;

use cw_core::DetectError;
use realfft::num_complex::Complex64;

/// One second-order section, `a[0]` normalised to 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Biquad {
    /// Numerator coefficients.
    pub b: [f64; 3],
    /// Denominator coefficients.
    pub a: [f64; 3],
}

impl Biquad {
    /// Complex response at `z = e^{jω}`.
    fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = self.b[0] + z1 * self.b[1] + z2 * self.b[2];
        let den = self.a[0] + z1 * self.a[1] + z2 * self.a[2];
        num / den
    }
}

/// Cascade of biquads applied causally with zero initial state.
///
/// # Example
/// ```
/// use cw_audio::filter::SosFilter;
/// let filter = SosFilter::butterworth_bandpass(4, 300.0, 1300.0, 16_000).unwrap();
/// assert_eq!(filter.sections().len(), 4);
/// let out = filter.apply(&[1.0, 0.0, 0.0, 0.0]);
/// assert_eq!(out.len(), 4);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    /// Build a filter from explicit sections.
    #[must_use]
    pub fn from_sections(sections: Vec<Biquad>) -> Self {
        Self { sections }
    }

    /// Digital Butterworth bandpass of prototype order `order`.
    ///
    /// The result has `2 * order` poles, grouped into `order` sections;
    /// the overall gain sits in the first section.
    ///
    /// # Errors
    /// Returns [`DetectError::ZeroSampleRate`] for a zero rate and
    /// [`DetectError::InvalidBand`] unless `0 < low < high < fs / 2`.
    pub fn butterworth_bandpass(
        order: usize,
        low_hz: f64,
        high_hz: f64,
        sample_rate: u32,
    ) -> Result<Self, DetectError> {
        if sample_rate == 0 {
            return Err(DetectError::ZeroSampleRate);
        }
        let fs = f64::from(sample_rate);
        let nyquist_hz = fs / 2.0;
        if order == 0 || !(low_hz > 0.0 && low_hz < high_hz && high_hz < nyquist_hz) {
            return Err(DetectError::InvalidBand {
                low_hz,
                high_hz,
                nyquist_hz,
            });
        }

        // Pre-warped analog edges.
        let fs2 = 2.0 * fs;
        let wl = fs2 * (PI * low_hz / fs).tan();
        let wh = fs2 * (PI * high_hz / fs).tan();
        let bw = wh - wl;
        let w0_sq = wl * wh;

        // Analog prototype -> bandpass poles. Zeros: `order` at s = 0.
        let n = order as i32;
        let mut analog = Vec::with_capacity(2 * order);
        for m in (-n + 1..n).step_by(2) {
            let proto = -Complex64::from_polar(1.0, PI * f64::from(m) / f64::from(2 * n));
            let p = proto * (bw / 2.0);
            let root = (p * p - w0_sq).sqrt();
            analog.push(p + root);
            analog.push(p - root);
        }

        // Bilinear transform. Zeros land at z = +1 (from s = 0) and z = -1 (degree excess).
        let mut gain = Complex64::new(bw.powi(n) * fs2.powi(n), 0.0);
        let mut poles = Vec::with_capacity(analog.len());
        for &p in &analog {
            gain /= fs2 - p;
            poles.push((fs2 + p) / (fs2 - p));
        }

        let mut sections = pair_poles(&poles)
            .into_iter()
            .map(|(a1, a2)| Biquad {
                b: [1.0, 0.0, -1.0],
                a: [1.0, a1, a2],
            })
            .collect::<Vec<_>>();
        if sections.len() != order {
            return Err(DetectError::InvalidBand {
                low_hz,
                high_hz,
                nyquist_hz,
            });
        }

        // Poles closest to the unit circle go last.
        sections.sort_by(|x, y| x.a[2].abs().total_cmp(&y.a[2].abs()));
        let k = gain.re;
        for c in &mut sections[0].b {
            *c *= k;
        }

        Ok(Self { sections })
    }

    /// The biquads in application order.
    #[must_use]
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Filter `input` through the cascade (transposed direct form II).
    ///
    /// State starts at zero on every call, so the same input always yields the
    /// same output.
    #[must_use]
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        let mut out = input.to_vec();
        for s in &self.sections {
            let (mut z1, mut z2) = (0.0, 0.0);
            for x in &mut out {
                let xn = *x;
                let y = s.b[0] * xn + z1;
                z1 = s.b[1] * xn - s.a[1] * y + z2;
                z2 = s.b[2] * xn - s.a[2] * y;
                *x = y;
            }
        }
        out
    }

    /// Magnitude response at `freq_hz`.
    #[must_use]
    pub fn gain_at(&self, freq_hz: f64, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        let omega = 2.0 * PI * freq_hz / f64::from(sample_rate);
        self.sections
            .iter()
            .map(|s| s.response(omega))
            .fold(Complex64::new(1.0, 0.0), |acc, h| acc * h)
            .norm()
    }

    /// True if every pole lies strictly inside the unit circle.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        // For a real biquad, |a2| < 1 and |a1| < 1 + a2 is the stability triangle.
        self.sections
            .iter()
            .all(|s| s.a[2].abs() < 1.0 && s.a[1].abs() < 1.0 + s.a[2])
    }
}

/// Group z-plane poles into real denominators `(a1, a2)`.
///
/// Complex poles pair with their conjugate; real poles pair with each other.
fn pair_poles(poles: &[Complex64]) -> Vec<(f64, f64)> {
    let mut pairs = Vec::with_capacity(poles.len() / 2);
    let mut real = Vec::new();
    for p in poles {
        let tol = 1e-10 * p.norm().max(1.0);
        if p.im > tol {
            pairs.push((-2.0 * p.re, p.norm_sqr()));
        } else if p.im.abs() <= tol {
            real.push(p.re);
        }
    }
    real.sort_by(f64::total_cmp);
    for r in real.chunks_exact(2) {
        pairs.push((-(r[0] + r[1]), r[0] * r[1]));
    }
    pairs
}
