//! Sensor adapters
//!
//! The MCP9808 is driven by the kernel's `jc42` hwmon driver, which exposes the
//! current temperature as an integer number of millidegrees Celsius:
//!
//! ```text
//! $ cat /sys/class/hwmon/hwmon0/temp1_input
//! 21750
//! ```
//!
//! `HwmonSensor` reads that file; no I2C traffic happens in this crate.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use log::trace;

use crate::{errors::SensorError, traits::Sensor};

/// Default hwmon input of the first registered temperature chip
pub const DEFAULT_HWMON_INPUT: &str = "/sys/class/hwmon/hwmon0/temp1_input";

const MILLIDEGREES_PER_DEGREE: f32 = 1000.0;

/// Temperature sensor exposed through Linux hwmon sysfs
#[derive(Debug, Clone)]
pub struct HwmonSensor {
    input: PathBuf,
}

impl HwmonSensor {
    /// Sensor reading from the given `temp*_input` file
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// File the sensor reads
    pub fn input(&self) -> &Path {
        &self.input
    }
}

impl Default for HwmonSensor {
    fn default() -> Self {
        Self::new(DEFAULT_HWMON_INPUT)
    }
}

impl Sensor for HwmonSensor {
    fn read_temp_c(&mut self) -> Result<f32, SensorError> {
        let raw = fs::read_to_string(&self.input).map_err(|source| SensorError::Io {
            path: self.input.display().to_string(),
            source,
        })?;

        let millis: i32 = raw
            .trim()
            .parse()
            .map_err(|_| SensorError::Parse { raw: raw.clone() })?;

        let celsius = millis as f32 / MILLIDEGREES_PER_DEGREE;
        trace!("{}: {celsius}°C", self.input.display());
        Ok(celsius)
    }
}

/// Sensor replaying a fixed list of readings
#[derive(Debug, Clone, Default)]
pub struct ScriptedSensor {
    readings: VecDeque<f32>,
}

impl ScriptedSensor {
    /// Sensor returning `readings` in order, then `Exhausted`
    pub fn new(readings: impl IntoIterator<Item = f32>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    /// Readings not yet taken
    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl Sensor for ScriptedSensor {
    fn read_temp_c(&mut self) -> Result<f32, SensorError> {
        self.readings.pop_front().ok_or(SensorError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn hwmon_millidegrees_converted() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "21750").unwrap();

        let mut sensor = HwmonSensor::new(file.path());
        assert_eq!(sensor.read_temp_c().unwrap(), 21.75);
    }

    #[test]
    fn hwmon_negative_temperature() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "-4500").unwrap();

        let mut sensor = HwmonSensor::new(file.path());
        assert_eq!(sensor.read_temp_c().unwrap(), -4.5);
    }

    #[test]
    fn hwmon_garbage_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "warm").unwrap();

        let mut sensor = HwmonSensor::new(file.path());
        assert!(matches!(sensor.read_temp_c(), Err(SensorError::Parse { .. })));
    }

    #[test]
    fn hwmon_missing_file_is_io_error() {
        let mut sensor = HwmonSensor::new("/nonexistent/temp1_input");
        assert!(matches!(sensor.read_temp_c(), Err(SensorError::Io { .. })));
    }

    #[test]
    fn scripted_sensor_runs_out() {
        let mut sensor = ScriptedSensor::new([20.0, 21.0]);
        assert_eq!(sensor.read_temp_c().unwrap(), 20.0);
        assert_eq!(sensor.read_temp_c().unwrap(), 21.0);
        assert!(matches!(sensor.read_temp_c(), Err(SensorError::Exhausted)));
    }
}
