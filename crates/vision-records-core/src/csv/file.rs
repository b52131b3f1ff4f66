//! File boundary for CSV import and export.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// Application name used in exported filenames.
pub const APP_NAME: &str = "deepak-vision-records";

/// File-level failures; each aborts only the current attempt and leaves
/// stored data untouched.
#[derive(Error, Debug)]
pub enum CsvFileError {
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("file is not valid UTF-8 text: {0}")]
    Parse(#[from] std::string::FromUtf8Error),

    #[error("failed to write file: {0}")]
    Write(std::io::Error),
}

/// Filename for an export performed on `date`:
/// `deepak-vision-records-YYYY-MM-DD.csv`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("{}-{}.csv", APP_NAME, date.format("%Y-%m-%d"))
}

/// Read a CSV file into text.
pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<String, CsvFileError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8(bytes)?)
}

/// Write CSV content under `dir` and return the full path.
pub fn write_csv_file<P: AsRef<Path>>(
    dir: P,
    filename: &str,
    content: &str,
) -> Result<PathBuf, CsvFileError> {
    let path = dir.as_ref().join(filename);
    std::fs::write(&path, content).map_err(CsvFileError::Write)?;
    Ok(path)
}
