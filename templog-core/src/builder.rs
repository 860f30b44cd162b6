//! Measurement construction
//!
//! Collapses the readings of one sampling run into a single record. Only one
//! temperature fits in a `Measurement`, so several readings are reduced to
//! their arithmetic mean.

use chrono::{DateTime, Utc};
use log::debug;

use crate::{
    errors::{MeasurementError, MeasurementResult},
    measurement::Measurement,
};

/// Builds measurements for one device
#[derive(Debug, Clone)]
pub struct MeasurementBuilder {
    device_id: String,
}

impl MeasurementBuilder {
    /// Builder stamping every record with `device_id`
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
        }
    }

    /// Device stamped on every record
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Reduce `values` and assemble a record taken at `timestamp`
    ///
    /// Fails with `InvalidInput` when `values` is empty. The returned record
    /// has not been validated yet.
    pub fn build(&self, timestamp: DateTime<Utc>, values: &[f32]) -> MeasurementResult<Measurement> {
        let temp = reduce(values)?;
        debug!(
            "built measurement for {} from {} reading(s): {temp}°C",
            self.device_id,
            values.len()
        );

        Ok(Measurement::new(self.device_id.clone(), timestamp, temp))
    }
}

/// Collapse readings to one value: the single reading itself, or the mean
// TODO: make the reduction selectable (mean/median/last) once a backend needs it.
pub fn reduce(values: &[f32]) -> MeasurementResult<f32> {
    match values {
        [] => Err(MeasurementError::InvalidInput {
            reason: "at least one reading is required",
        }),
        [only] => Ok(*only),
        _ => Ok(values.iter().sum::<f32>() / values.len() as f32),
    }
}
