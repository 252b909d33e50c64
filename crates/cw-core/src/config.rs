use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DetectError;

/// Dossiers étiquetés parcourus par défaut en mode batch.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Cry-Noise-NoMusic",
    "Cry-NoNoise-Music",
    "Cry-NoNoise-NoMusic",
    "NoCry-Noise-NoMusic",
    "NoCry-NoNoise-Music",
];

/// Default CSV report path.
pub const DEFAULT_OUTPUT: &str = "cry_detection_results.csv";

/// Autocorrelation backend used by the pitch estimator.
///
/// Both backends apply the same lag-selection rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchMethod {
    /// Direct O(frame × lags) sum per lag.
    #[default]
    Direct,
    /// Zero-padded FFT autocorrelation (realfft).
    Fft,
}

/// How confirmed frame runs are turned into events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMode {
    /// One event per start index that opens a full window of flagged frames.
    /// A run of length L emits L - min + 1 near-duplicate timestamps.
    #[default]
    EveryWindow,
    /// Only the first qualifying index of each contiguous run.
    FirstOfRun,
}

/// Paramètres de détection, immuables pendant une analyse.
///
/// Les valeurs par défaut sont les seuils calibrés du détecteur.
///
/// # Example
/// ```
/// use cw_core::config::DetectorConfig;
/// let config = DetectorConfig::default();
/// assert_eq!(config.frame_size, 1024);
/// assert_eq!(config.hop_size, 512);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DetectorConfig {
    // === Framing ===
    /// Samples per analysis frame.
    pub frame_size: usize,
    /// Stride between frame starts.
    pub hop_size: usize,

    // === Préconditionnement ===
    /// Pre-emphasis coefficient: y[n] = x[n] - k·x[n-1].
    pub pre_emphasis: f64,
    /// Lower passband edge in Hz.
    pub band_low_hz: f64,
    /// Upper passband edge in Hz.
    pub band_high_hz: f64,
    /// Butterworth prototype order (the bandpass has twice as many poles).
    pub filter_order: usize,

    // === Seuils ===
    /// Empirical gain applied to the mean Teager energy.
    pub teo_gain: f64,
    /// Smoothed Teager energy must exceed this.
    pub teo_threshold: f64,
    /// Zero-crossing rate must stay below this.
    pub zcr_threshold: f64,
    /// Lowest accepted pitch in Hz (exclusive). Also bounds the longest lag.
    pub pitch_min_hz: u32,
    /// Highest accepted pitch in Hz (exclusive). Also bounds the shortest lag.
    pub pitch_max_hz: u32,
    /// Pitch standard deviation over the window must exceed this.
    pub pitch_std_threshold: f64,

    // === Suivi temporel ===
    /// EMA weight of the current frame's energy.
    pub smooth_alpha: f64,
    /// Number of recent pitch values kept for the deviation estimate.
    pub pitch_window: usize,
    /// Keep undetected (0 Hz) pitch values in the deviation window.
    pub unvoiced_in_window: bool,

    // === Confirmation ===
    /// Consecutive flagged frames needed to confirm a cry.
    pub min_consecutive_frames: usize,
    /// Event emission policy.
    pub event_mode: EventMode,
    /// Autocorrelation backend.
    pub pitch_method: PitchMethod,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            frame_size: 1024,
            hop_size: 512,
            pre_emphasis: 0.97,
            band_low_hz: 300.0,
            band_high_hz: 1300.0,
            filter_order: 4,
            teo_gain: 20.0,
            teo_threshold: 0.0015,
            zcr_threshold: 0.15,
            pitch_min_hz: 200,
            pitch_max_hz: 1000,
            pitch_std_threshold: 15.0,
            smooth_alpha: 0.6,
            pitch_window: 5,
            unvoiced_in_window: true,
            min_consecutive_frames: 4,
            event_mode: EventMode::EveryWindow,
            pitch_method: PitchMethod::Direct,
        }
    }
}

impl DetectorConfig {
    /// Reject values that make framing, filtering or tracking meaningless.
    ///
    /// # Errors
    /// Returns [`DetectError::InvalidConfig`] naming the first offending field.
    ///
    /// # Example
    /// ```
    /// use cw_core::config::DetectorConfig;
    /// let config = DetectorConfig { hop_size: 0, ..DetectorConfig::default() };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), DetectError> {
        let invalid = |msg: &str| Err(DetectError::InvalidConfig(msg.to_string()));

        if self.frame_size < 3 {
            return invalid("frame_size doit être >= 3");
        }
        if self.hop_size == 0 {
            return invalid("hop_size doit être > 0");
        }
        if !(0.0..1.0).contains(&self.pre_emphasis) {
            return invalid("pre_emphasis doit être dans [0, 1)");
        }
        if !(self.band_low_hz > 0.0 && self.band_low_hz < self.band_high_hz) {
            return invalid("band_low_hz doit être > 0 et < band_high_hz");
        }
        if !(1..=8).contains(&self.filter_order) {
            return invalid("filter_order doit être dans [1, 8]");
        }
        if self.pitch_min_hz == 0 || self.pitch_min_hz >= self.pitch_max_hz {
            return invalid("pitch_min_hz doit être > 0 et < pitch_max_hz");
        }
        if !(self.smooth_alpha > 0.0 && self.smooth_alpha <= 1.0) {
            return invalid("smooth_alpha doit être dans (0, 1]");
        }
        if self.pitch_window == 0 {
            return invalid("pitch_window doit être > 0");
        }
        if self.min_consecutive_frames == 0 {
            return invalid("min_consecutive_frames doit être > 0");
        }
        Ok(())
    }

    /// Frame start spacing in seconds for a given sample rate.
    #[must_use]
    pub fn hop_secs(&self, sample_rate: u32) -> f64 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.hop_size as f64 / f64::from(sample_rate)
    }
}

/// Batch traversal settings.
///
/// # Example
/// ```
/// use cw_core::config::BatchConfig;
/// let batch = BatchConfig::default();
/// assert_eq!(batch.categories.len(), 5);
/// assert_eq!(batch.extensions, vec!["ogg".to_string()]);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Sub-folders of the root to scan, in report order.
    pub categories: Vec<String>,
    /// Accepted file extensions, compared case-insensitively.
    pub extensions: Vec<String>,
    /// Report destination.
    pub output: PathBuf,
    /// Worker threads. 0 = one per logical core.
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|&c| c.to_string()).collect(),
            extensions: vec!["ogg".to_string()],
            output: PathBuf::from(DEFAULT_OUTPUT),
            jobs: 0,
        }
    }
}

impl BatchConfig {
    /// True if `ext` matches one of the accepted extensions.
    #[must_use]
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Configuration complète de l'application.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Detector thresholds and framing.
    pub detector: DetectorConfig,
    /// Batch traversal.
    pub batch: BatchConfig,
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize, Default)]
struct ConfigFile {
    detector: Option<DetectorSection>,
    batch: Option<BatchSection>,
}

/// Detector section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct DetectorSection {
    frame_size: Option<usize>,
    hop_size: Option<usize>,
    pre_emphasis: Option<f64>,
    band_low_hz: Option<f64>,
    band_high_hz: Option<f64>,
    filter_order: Option<usize>,
    teo_gain: Option<f64>,
    teo_threshold: Option<f64>,
    zcr_threshold: Option<f64>,
    pitch_min_hz: Option<u32>,
    pitch_max_hz: Option<u32>,
    pitch_std_threshold: Option<f64>,
    smooth_alpha: Option<f64>,
    pitch_window: Option<usize>,
    unvoiced_in_window: Option<bool>,
    min_consecutive_frames: Option<usize>,
    event_mode: Option<EventMode>,
    pitch_method: Option<PitchMethod>,
}

/// Batch section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct BatchSection {
    categories: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
    output: Option<PathBuf>,
    jobs: Option<usize>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or holds invalid
/// detector values.
///
/// # Example
/// ```no_run
/// use cw_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Erreur de configuration dans {}", path.display()))?;
    log::debug!("Config chargée : {}", path.display());
    Ok(config)
}

/// Parse TOML text on top of the defaults.
///
/// # Errors
/// Returns an error on malformed TOML or invalid detector values.
///
/// # Example
/// ```
/// use cw_core::config::parse_config;
/// let config = parse_config("[detector]\nhop_size = 256\n").unwrap();
/// assert_eq!(config.detector.hop_size, 256);
/// assert_eq!(config.detector.frame_size, 1024);
/// ```
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = AppConfig::default();

    if let Some(d) = file.detector {
        let c = &mut config.detector;
        if let Some(v) = d.frame_size {
            c.frame_size = v;
        }
        if let Some(v) = d.hop_size {
            c.hop_size = v;
        }
        if let Some(v) = d.pre_emphasis {
            c.pre_emphasis = v;
        }
        if let Some(v) = d.band_low_hz {
            c.band_low_hz = v;
        }
        if let Some(v) = d.band_high_hz {
            c.band_high_hz = v;
        }
        if let Some(v) = d.filter_order {
            c.filter_order = v;
        }
        if let Some(v) = d.teo_gain {
            c.teo_gain = v;
        }
        if let Some(v) = d.teo_threshold {
            c.teo_threshold = v;
        }
        if let Some(v) = d.zcr_threshold {
            c.zcr_threshold = v;
        }
        if let Some(v) = d.pitch_min_hz {
            c.pitch_min_hz = v;
        }
        if let Some(v) = d.pitch_max_hz {
            c.pitch_max_hz = v;
        }
        if let Some(v) = d.pitch_std_threshold {
            c.pitch_std_threshold = v;
        }
        if let Some(v) = d.smooth_alpha {
            c.smooth_alpha = v;
        }
        if let Some(v) = d.pitch_window {
            c.pitch_window = v;
        }
        if let Some(v) = d.unvoiced_in_window {
            c.unvoiced_in_window = v;
        }
        if let Some(v) = d.min_consecutive_frames {
            c.min_consecutive_frames = v;
        }
        if let Some(v) = d.event_mode {
            c.event_mode = v;
        }
        if let Some(v) = d.pitch_method {
            c.pitch_method = v;
        }
    }

    if let Some(b) = file.batch {
        let c = &mut config.batch;
        if let Some(v) = b.categories {
            c.categories = v;
        }
        if let Some(v) = b.extensions {
            c.extensions = v;
        }
        if let Some(v) = b.output {
            c.output = v;
        }
        if let Some(v) = b.jobs {
            c.jobs = v;
        }
    }

    config.detector.validate()?;
    Ok(config)
}
