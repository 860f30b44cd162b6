//! Capability traits at the seams of the logger
//!
//! - [`Logger`] - somewhere readings can be recorded (file, sheet, cloud)
//! - [`Sensor`] - something readings come from
//! - [`TimeSource`] - where sample timestamps come from
//!
//! ## Implementing a Backend
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use templog_core::{Logger, LoggerResult};
//!
//! /// Keeps the latest row in memory
//! #[derive(Default)]
//! struct LastRow(Option<(DateTime<Utc>, Vec<f32>)>);
//!
//! impl Logger for LastRow {
//!     fn log(&mut self, timestamp: DateTime<Utc>, values: &[f32]) -> LoggerResult<()> {
//!         self.0 = Some((timestamp, values.to_vec()));
//!         Ok(())
//!     }
//! }
//!
//! let mut logger = LastRow::default();
//! logger.log(Utc::now(), &[21.0, 21.5])?;
//! # Ok::<(), templog_core::LoggerError>(())
//! ```

use chrono::{DateTime, Utc};

use crate::errors::{LoggerResult, SensorError};

pub use crate::time::TimeSource;

/// A destination for temperature samples
pub trait Logger {
    /// Record the readings taken at `timestamp`
    ///
    /// Backends that can hold every reading (a CSV row) log them all; backends
    /// that hold one value per sample reduce them first.
    fn log(&mut self, timestamp: DateTime<Utc>, values: &[f32]) -> LoggerResult<()>;
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(&mut self, timestamp: DateTime<Utc>, values: &[f32]) -> LoggerResult<()> {
        (**self).log(timestamp, values)
    }
}

/// A temperature source
pub trait Sensor {
    /// One reading in degrees Celsius
    fn read_temp_c(&mut self) -> Result<f32, SensorError>;
}

impl<S: Sensor + ?Sized> Sensor for Box<S> {
    fn read_temp_c(&mut self) -> Result<f32, SensorError> {
        (**self).read_temp_c()
    }
}
