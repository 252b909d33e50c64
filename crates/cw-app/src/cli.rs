use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use cw_core::{AppConfig, EventMode, PitchMethod};

/// Report serialisation format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// `Folder,File,Cry Detected,Timestamps`.
    #[default]
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

/// crywatch: offline infant cry detector.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Dossier racine contenant les dossiers étiquetés.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Analyser un seul fichier et afficher les horodatages (ignore --root).
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Dossier étiqueté à parcourir (répétable). Défaut : les catégories de la config.
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Extension acceptée (répétable), sans le point.
    #[arg(long = "ext")]
    pub extensions: Vec<String>,

    /// Fichier de rapport. Défaut : cry_detection_results.csv.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format du rapport.
    #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
    pub format: ReportFormat,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Nombre de threads de travail (0 = un par cœur).
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Un seul événement par série de frames confirmées.
    #[arg(long, default_value_t = false)]
    pub first_of_run: bool,

    /// Autocorrélation par FFT au lieu de la somme directe.
    #[arg(long, default_value_t = false)]
    pub fft_pitch: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    ///
    /// # Example
    /// ```
    /// use clap::Parser;
    /// use cw_app::cli::Cli;
    /// use cw_core::AppConfig;
    /// let cli = Cli::parse_from(["crywatch", "--ext", "wav", "--jobs", "2"]);
    /// let mut config = AppConfig::default();
    /// cli.apply_overrides(&mut config);
    /// assert_eq!(config.batch.extensions, vec!["wav".to_string()]);
    /// assert_eq!(config.batch.jobs, 2);
    /// ```
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if !self.categories.is_empty() {
            config.batch.categories.clone_from(&self.categories);
        }
        if !self.extensions.is_empty() {
            config.batch.extensions = self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect();
        }
        if let Some(ref out) = self.output {
            config.batch.output.clone_from(out);
        }
        if let Some(jobs) = self.jobs {
            config.batch.jobs = jobs;
        }
        if self.first_of_run {
            config.detector.event_mode = EventMode::FirstOfRun;
        }
        if self.fft_pitch {
            config.detector.pitch_method = PitchMethod::Fft;
        }
    }
}
