//! Core measurement engine for templog
//!
//! Turns a timestamp and raw temperature readings into a validated
//! measurement record ready for transmission.
//!
//! Key constraints:
//! - A record is built fresh for every log call and never mutated
//! - An unvalidated record is never handed to a transport
//! - Builder and validator hold no mutable state and can be shared freely
//!
//! ```no_run
//! use chrono::Utc;
//! use templog_core::{MeasurementBuilder, MeasurementValidator, RuleSet};
//!
//! let builder = MeasurementBuilder::new("attic-sensor");
//! let validator = MeasurementValidator::new(RuleSet::new());
//!
//! let measurement = builder.build(Utc::now(), &[21.0, 21.5])?;
//! validator.validate(&measurement)?;
//! // Good to go
//! # Ok::<(), templog_core::MeasurementError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod errors;
pub mod measurement;
pub mod sampling;
pub mod sensor;
pub mod time;
pub mod traits;
pub mod validators;

// Public API
pub use builder::{reduce, MeasurementBuilder};
pub use errors::{LoggerError, LoggerResult, MeasurementError, MeasurementResult, SensorError};
pub use measurement::{FieldId, Measurement};
pub use sampling::{Sample, Sampler, SamplingConfig};
pub use sensor::{HwmonSensor, ScriptedSensor};
pub use time::{FixedTime, SystemTime, TimeSource};
pub use traits::{Logger, Sensor};
pub use validators::{FieldRule, MeasurementValidator, RuleSet};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
