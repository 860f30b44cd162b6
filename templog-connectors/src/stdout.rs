//! Standard output backend, used when nothing else is selected

use chrono::{DateTime, Utc};
use std::io::{self, Write};
use templog_core::{Logger, LoggerResult};

use crate::csv::format_row;

/// Writes each run as one comma-joined line
pub struct StdoutLogger<W: Write = io::Stdout> {
    out: W,
}

impl StdoutLogger {
    /// Logger writing to the process's stdout
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> StdoutLogger<W> {
    /// Logger writing to any sink
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    /// Give back the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Logger for StdoutLogger<W> {
    fn log(&mut self, timestamp: DateTime<Utc>, values: &[f32]) -> LoggerResult<()> {
        writeln!(self.out, "{}", format_row(timestamp, values))?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn writes_one_line_per_run() {
        let ts = Utc.with_ymd_and_hms(2018, 3, 25, 0, 0, 0).unwrap();
        let mut logger = StdoutLogger::with_writer(Vec::new());

        logger.log(ts, &[18.375]).unwrap();
        logger.log(ts, &[18.5, 19.0]).unwrap();

        let out = String::from_utf8(logger.into_inner()).unwrap();
        assert_eq!(
            out,
            "2018-03-25T00:00:00.000000,18.375\n2018-03-25T00:00:00.000000,18.5,19\n"
        );
    }
}
