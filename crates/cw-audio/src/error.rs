use cw_core::DetectError;
use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The file could not be opened.
    #[error("Impossible d'ouvrir {path} : {source}")]
    Open {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Unsupported or unrecognised container/codec.
    #[error("Format audio non supporté : {0}")]
    UnsupportedFormat(String),

    /// Audio decode error.
    #[error("Erreur de décodage : {0}")]
    DecodeError(String),

    /// The decoded signal was rejected by the detector.
    #[error(transparent)]
    Detect(#[from] DetectError),
}
