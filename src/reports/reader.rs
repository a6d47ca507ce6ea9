// src/reports/reader.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::reports::models::{ReportRow, ReportTable, STRATEGY_FILE_COLUMN};
use crate::utils::error::ReportError;

const CLEANED_TEXT_SUFFIX: &str = "_cleaned.txt";

/// Path of the converted text for a report listed as `strategy_file`.
/// `report.pdf` maps to `<reports_dir>/report_cleaned.txt`; names already
/// ending in `.txt` are used as they are.
pub fn text_path_for(reports_dir: &Path, strategy_file: &str) -> PathBuf {
    let name = Path::new(strategy_file.trim())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let text_name = if name.ends_with(".txt") {
        name
    } else if let Some(stem) = name.strip_suffix(".pdf") {
        format!("{}{}", stem, CLEANED_TEXT_SUFFIX)
    } else {
        format!("{}{}", name, CLEANED_TEXT_SUFFIX)
    };
    reports_dir.join(text_name)
}

/// Reads a report's text. Bytes that are not UTF-8 (OCR output is not
/// always clean) are replaced rather than rejected.
pub fn read_report_text(path: &Path) -> Result<String, ReportError> {
    if !path.is_file() {
        return Err(ReportError::NotFound(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    tracing::debug!("Read {} bytes of report text from {}", text.len(), path.display());
    Ok(text)
}

/// Loads a species table. The `strategy_file` column is required.
pub fn read_report_table(path: &Path) -> Result<ReportTable, ReportError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if !headers.iter().any(|h| h == STRATEGY_FILE_COLUMN) {
        return Err(ReportError::MissingColumn(STRATEGY_FILE_COLUMN.to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(ReportRow::new(
            headers.iter().cloned().zip(record.iter().map(str::to_string)),
        ));
    }
    tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(ReportTable { headers, rows })
}
