//! CSV file backend
//!
//! One row per sampling run: the sample timestamp followed by every reading.
//! A header row is written first when the file is missing or empty.
//!
//! ```text
//! Date,Temp1,Temp2
//! 2018-03-25T00:00:00.000000,18.375,18.5
//! ```

use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use templog_core::{Logger, LoggerResult};

/// Header of the timestamp column
pub const DATE_COL_HEADER: &str = "Date";

/// Render a row as the CSV and stdout backends write it
pub fn format_row(timestamp: DateTime<Utc>, values: &[f32]) -> String {
    let mut row = timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
    for v in values {
        row.push(',');
        row.push_str(&v.to_string());
    }
    row
}

/// Header row for `n` readings
pub fn header(n: usize) -> String {
    let mut row = DATE_COL_HEADER.to_string();
    for i in 1..=n {
        row.push_str(&format!(",Temp{i}"));
    }
    row
}

/// Appends rows to a CSV file
#[derive(Debug, Clone)]
pub struct CsvLogger {
    path: PathBuf,
}

impl CsvLogger {
    /// Logger appending to `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File being written
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Logger for CsvLogger {
    fn log(&mut self, timestamp: DateTime<Utc>, values: &[f32]) -> LoggerResult<()> {
        let write_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if write_header {
            writeln!(file, "{}", header(values.len()))?;
        }
        writeln!(file, "{}", format_row(timestamp, values))?;

        log::debug!("appended {} readings to {}", values.len(), self.path.display());
        Ok(())
    }
}
