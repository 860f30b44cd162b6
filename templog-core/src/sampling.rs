//! Sampling loop
//!
//! Takes `num_samples` readings from a sensor with `sample_delay` between
//! them. The sample's timestamp is taken once, before the first reading, and
//! there is no sleep after the last reading.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;

use crate::{
    errors::LoggerError,
    time::TimeSource,
    traits::Sensor,
};

/// Readings taken per sampling run unless configured otherwise
pub const DEFAULT_NUM_SAMPLES: usize = 1;

/// Seconds slept between readings unless configured otherwise
pub const DEFAULT_SAMPLE_DELAY_SECS: u64 = 2;

/// How many readings to take and how far apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Readings per run, at least 1
    pub num_samples: usize,
    /// Sleep between consecutive readings
    pub sample_delay: Duration,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_NUM_SAMPLES,
            sample_delay: Duration::from_secs(DEFAULT_SAMPLE_DELAY_SECS),
        }
    }
}

impl SamplingConfig {
    /// Set the number of readings per run
    pub fn num_samples(mut self, n: usize) -> Self {
        self.num_samples = n;
        self
    }

    /// Set the delay between readings
    pub fn sample_delay(mut self, delay: Duration) -> Self {
        self.sample_delay = delay;
        self
    }

    /// Reject configurations that can't produce a sample
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.num_samples == 0 {
            return Err(LoggerError::Config("num_samples must be at least 1".into()));
        }
        Ok(())
    }
}

/// One sampling run
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// When the run started
    pub timestamp: DateTime<Utc>,
    /// Readings in the order they were taken
    pub values: Vec<f32>,
}

/// Drives a sensor according to a `SamplingConfig`
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    config: SamplingConfig,
}

impl Sampler {
    /// Sampler following `config`
    pub fn new(config: SamplingConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Take one run of readings
    pub fn sample<S, T>(&self, sensor: &mut S, time: &T) -> Result<Sample, LoggerError>
    where
        S: Sensor + ?Sized,
        T: TimeSource + ?Sized,
    {
        self.config.validate()?;

        let timestamp = time.now();
        // Grows with what the sensor actually returns, not with num_samples
        let mut values = Vec::new();

        for i in 0..self.config.num_samples {
            values.push(sensor.read_temp_c()?);

            if i + 1 < self.config.num_samples && !self.config.sample_delay.is_zero() {
                thread::sleep(self.config.sample_delay);
            }
        }

        debug!("sampled {} reading(s) at {timestamp}", values.len());
        Ok(Sample { timestamp, values })
    }
}
