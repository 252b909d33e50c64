/// Configuration, error types, and shared structures for crywatch.
///
/// This crate holds the types passed between the detection core and the
/// batch front-end.

pub mod config;
pub mod error;
pub mod frame;
pub mod result;

pub use config::{AppConfig, BatchConfig, DetectorConfig, EventMode, PitchMethod};
pub use error::DetectError;
pub use frame::{CryEvent, DetectionReport, FeatureVector, FrameAnalysis, TrackedFeatures};
pub use result::{CryStatus, FileResult};
