//! Spreadsheet backend
//!
//! Appends one row per sampling run through the Sheets v4 `values:append`
//! endpoint. The key file holds an OAuth access token; the row is the same
//! timestamp-then-readings layout the CSV backend writes.

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::json;
use std::path::Path;
use templog_core::{Logger, LoggerError, LoggerResult};

use crate::http::{HttpConfig, HttpConnector};

/// Public Sheets API endpoint
pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com";

/// Range rows are appended after
pub const DEFAULT_RANGE: &str = "Sheet1";

/// Bytes escaped in a URL path segment. `!` and `:` stay literal for A1
/// ranges like `Sheet1!A1:C1`
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Appends rows to a spreadsheet
pub struct SheetsLogger {
    sheet_id: String,
    range: String,
    token: String,
    http: HttpConnector,
}

impl SheetsLogger {
    /// Logger for `sheet_id` authenticating with `token`
    pub fn new(sheet_id: impl Into<String>, token: impl Into<String>) -> LoggerResult<Self> {
        let token = token.into();
        Ok(Self {
            sheet_id: sheet_id.into(),
            range: DEFAULT_RANGE.to_string(),
            http: connector(DEFAULT_SHEETS_URL, &token)?,
            token,
        })
    }

    /// Logger for `sheet_id` with the token read from `keyfile`
    pub fn from_keyfile(keyfile: impl AsRef<Path>, sheet_id: impl Into<String>) -> LoggerResult<Self> {
        let keyfile = keyfile.as_ref();
        let token = std::fs::read_to_string(keyfile)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(LoggerError::Config(format!(
                "key file {} is empty",
                keyfile.display()
            )));
        }
        Self::new(sheet_id, token)
    }

    /// Send to another API host (a proxy, or a local server in tests)
    pub fn with_base_url(mut self, base_url: &str) -> LoggerResult<Self> {
        self.http = connector(base_url, &self.token)?;
        Ok(self)
    }

    /// Append after `range` instead of the first sheet
    pub fn range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    /// Path of the append request
    pub fn append_path(&self) -> String {
        format!(
            "/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            utf8_percent_encode(&self.sheet_id, SEGMENT),
            utf8_percent_encode(&self.range, SEGMENT)
        )
    }
}

fn connector(base_url: &str, token: &str) -> LoggerResult<HttpConnector> {
    HttpConnector::new(HttpConfig::new(base_url).bearer_token(token))
        .map_err(|e| LoggerError::Config(e.to_string()))
}

impl Logger for SheetsLogger {
    fn log(&mut self, timestamp: DateTime<Utc>, values: &[f32]) -> LoggerResult<()> {
        let mut row = vec![json!(timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string())];
        row.extend(values.iter().map(|v| json!(v)));

        let body = json!({ "values": [row] });
        self.http
            .post_json(&self.append_path(), &body)
            .map_err(|e| LoggerError::Transport(e.to_string()))?;

        log::info!("appended row to sheet {}", self.sheet_id);
        Ok(())
    }
}
