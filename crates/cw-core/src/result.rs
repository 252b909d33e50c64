use std::fmt;

use serde::Serialize;

/// Valeur de la colonne "Cry Detected".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CryStatus {
    /// At least one confirmed event.
    Yes,
    /// Analysed, nothing confirmed.
    No,
    /// Decoding or detection failed.
    Error,
}

impl fmt::Display for CryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::Error => "Error",
        })
    }
}

/// One row of the batch report.
///
/// # Example
/// ```
/// use cw_core::result::{CryStatus, FileResult};
/// let row = FileResult::detected("Cry-NoNoise-NoMusic", "a.ogg", vec![1.0, 1.03]);
/// assert_eq!(row.status, CryStatus::Yes);
/// assert_eq!(row.timestamps_field(), "1.0, 1.03");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileResult {
    /// Category folder name.
    pub folder: String,
    /// File name inside the folder.
    pub file: String,
    /// Outcome.
    pub status: CryStatus,
    /// Confirmed onsets in seconds.
    pub timestamps: Vec<f64>,
    /// Error text for failed files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    /// Row for a successfully analysed file.
    #[must_use]
    pub fn detected(folder: &str, file: &str, timestamps: Vec<f64>) -> Self {
        let status = if timestamps.is_empty() {
            CryStatus::No
        } else {
            CryStatus::Yes
        };
        Self {
            folder: folder.to_string(),
            file: file.to_string(),
            status,
            timestamps,
            error: None,
        }
    }

    /// Row for a file that could not be analysed.
    #[must_use]
    pub fn failed(folder: &str, file: &str, error: impl fmt::Display) -> Self {
        Self {
            folder: folder.to_string(),
            file: file.to_string(),
            status: CryStatus::Error,
            timestamps: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    /// Contenu de la colonne "Timestamps" : horodatages joints ou message d'erreur.
    #[must_use]
    pub fn timestamps_field(&self) -> String {
        if let Some(err) = &self.error {
            return err.clone();
        }
        self.timestamps
            .iter()
            .map(|&t| format_timestamp(t))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Shortest decimal form, always with a fractional part ("1.0", "0.35").
///
/// # Example
/// ```
/// use cw_core::result::format_timestamp;
/// assert_eq!(format_timestamp(2.0), "2.0");
/// assert_eq!(format_timestamp(0.35), "0.35");
/// ```
#[must_use]
pub fn format_timestamp(t: f64) -> String {
    let s = t.to_string();
    if s.contains('.') || !t.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}

/// Count of rows per status: (yes, no, error).
#[must_use]
pub fn summarize(results: &[FileResult]) -> (usize, usize, usize) {
    results
        .iter()
        .fold((0, 0, 0), |(y, n, e), r| match r.status {
            CryStatus::Yes => (y + 1, n, e),
            CryStatus::No => (y, n + 1, e),
            CryStatus::Error => (y, n, e + 1),
        })
}
