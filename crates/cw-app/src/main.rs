use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cw_app::batch::{collect_jobs, run_batch};
use cw_app::cli::{Cli, ReportFormat};
use cw_app::report::{write_csv, write_json};
use cw_audio::detector::CryDetector;
use cw_core::AppConfig;
use cw_core::result::format_timestamp;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config puis appliquer les overrides CLI
    let mut config = resolve_config(&cli.config)?;
    cli.apply_overrides(&mut config);

    let detector = CryDetector::new(config.detector.clone())?;

    // Fichier unique
    if let Some(ref path) = cli.file {
        return analyze_single(&detector, path);
    }

    // 4. Parcourir les dossiers étiquetés
    let jobs = collect_jobs(&cli.root, &config.batch)?;
    if jobs.is_empty() {
        log::warn!(
            "Aucun fichier trouvé sous {} ({:?})",
            cli.root.display(),
            config.batch.extensions
        );
    }

    // 5. Analyse parallèle
    let results = run_batch(&jobs, &detector, config.batch.jobs)?;

    // 6. Rapport
    let output = &config.batch.output;
    match cli.format {
        ReportFormat::Csv => write_csv(output, &results)?,
        ReportFormat::Json => write_json(output, &results)?,
    }
    println!("Results saved to {}", output.display());
    Ok(())
}

fn analyze_single(detector: &CryDetector, path: &Path) -> Result<()> {
    let report = detector.detect_file(path)?;
    log::info!(
        "{} : {} frames, {} flagged, {:.2}s",
        path.display(),
        report.frame_count,
        report.flagged_frames,
        report.duration_secs
    );
    if report.has_cry() {
        let ts: Vec<String> = report.timestamps().into_iter().map(format_timestamp).collect();
        println!("Cry detected at: {}", ts.join(", "));
    } else {
        println!("No cry detected.");
    }
    Ok(())
}

fn resolve_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        cw_core::config::load_config(path)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            path.display()
        );
        Ok(AppConfig::default())
    }
}
