use thiserror::Error;

/// Errors raised by the detection core.
///
/// A signal shorter than one frame is not an error: it yields zero frames
/// and an empty event list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    /// Peak amplitude is zero, normalization would divide by zero.
    #[error("Signal silencieux : amplitude crête nulle")]
    SilentSignal,

    /// A NaN or infinite sample was found in the input.
    #[error("Échantillon non fini à l'index {index}")]
    NonFiniteSample {
        /// Position of the offending sample.
        index: usize,
    },

    /// Sample rate of zero.
    #[error("Fréquence d'échantillonnage nulle")]
    ZeroSampleRate,

    /// Passband edges do not fit strictly inside (0, Nyquist).
    #[error("Bande passante invalide : {low_hz}–{high_hz} Hz (Nyquist {nyquist_hz} Hz)")]
    InvalidBand {
        /// Lower edge in Hz.
        low_hz: f64,
        /// Upper edge in Hz.
        high_hz: f64,
        /// Half the sample rate.
        nyquist_hz: f64,
    },

    /// Invalid configuration value.
    #[error("Configuration invalide : {0}")]
    InvalidConfig(String),
}
