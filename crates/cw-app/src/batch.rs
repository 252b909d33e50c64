use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cw_audio::detector::CryDetector;
use cw_core::{BatchConfig, FileResult};
use rayon::prelude::*;

/// One file to analyse, tagged with its category folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileJob {
    /// Category folder name.
    pub folder: String,
    /// File name.
    pub file: String,
    /// Full path.
    pub path: PathBuf,
}

/// Liste les fichiers à analyser, catégorie par catégorie.
///
/// Only files directly inside `root/<category>` with an accepted extension
/// are kept, sorted by name within each category. Missing category folders
/// are skipped.
///
/// # Errors
/// Returns an error if an existing category folder cannot be read.
pub fn collect_jobs(root: &Path, batch: &BatchConfig) -> Result<Vec<FileJob>> {
    let mut jobs = Vec::new();
    for category in &batch.categories {
        let dir = root.join(category);
        if !dir.is_dir() {
            log::debug!("Catégorie absente, ignorée : {}", dir.display());
            continue;
        }

        let mut files = Vec::new();
        for entry in
            fs::read_dir(&dir).with_context(|| format!("Impossible de lire {}", dir.display()))?
        {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let accepted = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| batch.accepts_extension(ext));
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if accepted {
                files.push(FileJob {
                    folder: category.clone(),
                    file: name.to_string(),
                    path: path.clone(),
                });
            }
        }
        files.sort_by(|a, b| a.file.cmp(&b.file));
        log::info!("{} : {} fichier(s)", category, files.len());
        jobs.extend(files);
    }
    Ok(jobs)
}

/// Analyse one file; failures become an `Error` row instead of propagating.
#[must_use]
pub fn process_job(detector: &CryDetector, job: &FileJob) -> FileResult {
    match detector.detect_file(&job.path) {
        Ok(report) => FileResult::detected(&job.folder, &job.file, report.timestamps()),
        Err(e) => {
            log::warn!("{} : {e}", job.path.display());
            FileResult::failed(&job.folder, &job.file, e)
        }
    }
}

/// Analyse every job on a rayon pool and return rows in job order.
///
/// `workers == 0` uses one thread per logical core.
///
/// # Errors
/// Returns an error only if the thread pool cannot be built.
pub fn run_batch(jobs: &[FileJob], detector: &CryDetector, workers: usize) -> Result<Vec<FileResult>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Impossible de créer le pool de threads")?;

    let results: Vec<FileResult> =
        pool.install(|| jobs.par_iter().map(|job| process_job(detector, job)).collect());

    let (yes, no, err) = cw_core::result::summarize(&results);
    log::info!(
        "{} fichier(s) : {yes} avec pleurs, {no} sans, {err} en erreur",
        results.len()
    );
    Ok(results)
}
