//! Error Types for Measurement Construction and Logging
//!
//! ## Error Categories
//!
//! ### Measurement Errors
//! - `InvalidInput`: the builder was handed nothing to reduce (no readings)
//! - `InvalidProto`: a built record failed one of its field rules
//!
//! Both fire before anything is written or sent, so there is never partial
//! state to roll back. Neither is worth retrying: an empty sample or a bad
//! device ID will be just as bad on the next attempt.
//!
//! ### Sensor Errors
//! - `Io`: the sysfs input could not be read
//! - `Parse`: the input did not hold a millidegree integer
//! - `Exhausted`: a scripted sensor ran out of readings
//!
//! ### Logger Errors
//! Wrap the above plus file I/O, encoding and transport failures so a
//! backend's `log` can use `?` throughout. Transport failures come in two
//! kinds: `Transport` (worth retrying later) and `Rejected` (the receiver
//! said no, retrying is pointless).
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use chrono::Utc;
//! use templog_core::{MeasurementBuilder, MeasurementError};
//!
//! let builder = MeasurementBuilder::new("kitchen");
//! match builder.build(Utc::now(), &[]) {
//!     Ok(_) => unreachable!(),
//!     Err(MeasurementError::InvalidInput { reason }) => {
//!         assert_eq!(reason, "at least one reading is required");
//!     }
//!     Err(e) => panic!("unexpected error: {e}"),
//! }
//! ```

use thiserror::Error;

/// Result type for measurement operations
pub type MeasurementResult<T> = Result<T, MeasurementError>;

/// Result type for logger backends
pub type LoggerResult<T> = Result<T, LoggerError>;

/// Errors raised while turning readings into a loggable measurement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    /// No valid reduction exists for the given readings
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input
        reason: &'static str,
    },

    /// A field's rendered value did not match its declared pattern
    #[error("Field failed regex validation. Field: \"{field}\" Value: \"{value}\" Regex: \"{regex}\"")]
    InvalidProto {
        /// Name of the offending field
        field: &'static str,
        /// The field's value as it was matched
        value: String,
        /// Pattern text as declared in the rule
        regex: String,
    },
}

/// Sensor read failures
#[derive(Error, Debug)]
pub enum SensorError {
    /// Could not read the sensor's input file
    #[error("failed to read sensor at {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Sensor returned something that is not a temperature
    #[error("unparseable sensor value {raw:?}")]
    Parse {
        /// Raw text read from the sensor
        raw: String,
    },

    /// Scripted sensor has no readings left
    #[error("sensor has no more readings")]
    Exhausted,
}

/// Failures surfaced by a `Logger` backend
#[derive(Error, Debug)]
pub enum LoggerError {
    /// Record could not be built or failed validation
    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    /// Sampling failed before anything could be logged
    #[error(transparent)]
    Sensor(#[from] SensorError),

    /// File output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized for transport or storage
    #[error("encoding failed: {0}")]
    Encode(String),

    /// Transport failed to deliver the record; sending again may succeed
    #[error("transport error: {0}")]
    Transport(String),

    /// Receiver refused the record; sending it again won't change that
    #[error("record rejected: {0}")]
    Rejected(String),

    /// Backend was configured with unusable settings
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_proto_message_names_field_value_and_regex() {
        let err = MeasurementError::InvalidProto {
            field: "device_id",
            value: "sensor-42".to_string(),
            regex: "^device-[0-9]+$".to_string(),
        };

        assert_eq!(
            err.to_string(),
            r#"Field failed regex validation. Field: "device_id" Value: "sensor-42" Regex: "^device-[0-9]+$""#
        );
    }

    #[test]
    fn logger_error_wraps_measurement_error() {
        let err: LoggerError = MeasurementError::InvalidInput {
            reason: "at least one reading is required",
        }
        .into();

        assert!(matches!(err, LoggerError::Measurement(MeasurementError::InvalidInput { .. })));
        assert_eq!(err.to_string(), "invalid input: at least one reading is required");
    }
}
