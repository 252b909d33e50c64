use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use cw_core::FileResult;

/// En-tête du rapport CSV.
pub const CSV_HEADER: [&str; 4] = ["Folder", "File", "Cry Detected", "Timestamps"];

/// Quote a field only when it contains a delimiter, a quote or a line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row<W: Write>(out: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.write_all(line.as_bytes())?;
    out.write_all(b"\r\n")
}

/// Write the report as CSV to any writer.
///
/// # Errors
/// Propagates I/O errors from `out`.
///
/// # Example
/// ```
/// use cw_app::report::write_csv_to;
/// use cw_core::FileResult;
/// let mut buf = Vec::new();
/// write_csv_to(&mut buf, &[FileResult::detected("A", "x.ogg", vec![1.0])]).unwrap();
/// assert_eq!(
///     String::from_utf8(buf).unwrap(),
///     "Folder,File,Cry Detected,Timestamps\r\nA,x.ogg,Yes,1.0\r\n"
/// );
/// ```
pub fn write_csv_to<W: Write>(out: &mut W, results: &[FileResult]) -> std::io::Result<()> {
    csv_row(out, &CSV_HEADER)?;
    for r in results {
        let status = r.status.to_string();
        let timestamps = r.timestamps_field();
        csv_row(out, &[&r.folder, &r.file, &status, &timestamps])?;
    }
    out.flush()
}

/// Write the CSV report to `path`.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_csv(path: &Path, results: &[FileResult]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Impossible de créer {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_csv_to(&mut out, results)
        .with_context(|| format!("Échec d'écriture de {}", path.display()))
}

/// Write the report as a pretty-printed JSON array to `path`.
///
/// # Errors
/// Returns an error if the file cannot be created or serialised.
pub fn write_json(path: &Path, results: &[FileResult]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Impossible de créer {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, results)
        .with_context(|| format!("Échec de sérialisation JSON : {}", path.display()))?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(results: &[FileResult]) -> String {
        let mut buf = Vec::new();
        write_csv_to(&mut buf, results).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_only_for_empty_batch() {
        assert_eq!(render(&[]), "Folder,File,Cry Detected,Timestamps\r\n");
    }

    #[test]
    fn multiple_timestamps_are_quoted() {
        let out = render(&[
            FileResult::detected("Cry-NoNoise-NoMusic", "a.ogg", vec![0.99, 1.02]),
            FileResult::detected("NoCry-Noise-NoMusic", "b.ogg", vec![]),
        ]);
        let lines: Vec<&str> = out.split("\r\n").collect();
        assert_eq!(lines[1], "Cry-NoNoise-NoMusic,a.ogg,Yes,\"0.99, 1.02\"");
        assert_eq!(lines[2], "NoCry-Noise-NoMusic,b.ogg,No,");
    }

    #[test]
    fn error_message_goes_in_timestamps_column() {
        let out = render(&[FileResult::failed("X", "c.ogg", "say \"no\"")]);
        assert!(out.ends_with("X,c.ogg,Error,\"say \"\"no\"\"\"\r\n"));
    }

    #[test]
    fn json_report_is_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &[FileResult::detected("A", "x.ogg", vec![1.5])]).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["status"], "Yes");
        assert_eq!(value[0]["timestamps"][0], 1.5);
        assert!(value[0].get("error").is_none());
    }
}
