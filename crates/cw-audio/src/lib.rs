// Audio decoding, preconditioning, and frame-based cry detection for crywatch.

pub mod autocorr;
pub mod confirm;
pub mod decode;
pub mod detector;
pub mod error;
pub mod features;
pub mod filter;
pub mod fuser;
pub mod preprocess;
pub mod tracker;

pub use detector::{CryDetector, detect_cries};
pub use error::AudioError;
