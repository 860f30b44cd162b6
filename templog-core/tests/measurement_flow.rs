//! Integration tests for building and validating measurements
//!
//! Drives the path a backend takes: sensor readings through the sampler,
//! the builder and the validator.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use templog_core::{
    FieldId, FieldRule, FixedTime, LoggerError, Measurement, MeasurementBuilder,
    MeasurementError, MeasurementValidator, RuleSet, Sampler, SamplingConfig, ScriptedSensor,
};

fn t() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 3, 25, 0, 0, 0).unwrap()
}

fn device_rule() -> MeasurementValidator {
    MeasurementValidator::new(
        RuleSet::new().with_rule(FieldRule::new(FieldId::DeviceId, "^device-[0-9]+$").unwrap()),
    )
}

#[test]
fn single_reading_kept_exactly() {
    let m = MeasurementBuilder::new("device-1").build(t(), &[20.0]).unwrap();
    assert_eq!(m.temp(), 20.0);
    assert_eq!(m.timestamp(), t());
    assert_eq!(m.upload_timestamp(), None);
}

#[test]
fn readings_reduced_to_mean() {
    let m = MeasurementBuilder::new("device-1").build(t(), &[18.0, 22.0]).unwrap();
    assert_eq!(m.temp(), 20.0);
}

#[test]
fn device_id_rule_accepts_and_rejects() {
    let validator = device_rule();

    let ok = MeasurementBuilder::new("device-42").build(t(), &[20.0]).unwrap();
    assert!(validator.validate(&ok).is_ok());

    let bad = MeasurementBuilder::new("sensor-42").build(t(), &[20.0]).unwrap();
    let msg = validator.validate(&bad).unwrap_err().to_string();
    assert!(msg.contains("\"device_id\""));
    assert!(msg.contains("\"sensor-42\""));
    assert!(msg.contains("^device-[0-9]+$"));
}

#[test]
fn no_readings_produces_no_record() {
    let err = MeasurementBuilder::new("device-1").build(t(), &[]).unwrap_err();
    assert_eq!(
        err,
        MeasurementError::InvalidInput {
            reason: "at least one reading is required"
        }
    );
}

#[test]
fn first_failing_field_is_reported() {
    let validator = MeasurementValidator::new(
        [
            FieldRule::new(FieldId::Temp, "^-").unwrap(),
            FieldRule::new(FieldId::DeviceId, "^device-").unwrap(),
        ]
        .into_iter()
        .collect(),
    );

    let m = Measurement::new("sensor-1", t(), 20.5);
    match validator.validate(&m) {
        Err(MeasurementError::InvalidProto { field, .. }) => assert_eq!(field, "device_id"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn sampled_readings_flow_into_measurement() {
    let sampler = Sampler::new(
        SamplingConfig::default()
            .num_samples(4)
            .sample_delay(Duration::ZERO),
    );
    let mut sensor = ScriptedSensor::new([18.0, 18.5, 19.0, 19.5]);

    let sample = sampler.sample(&mut sensor, &FixedTime::new(t())).unwrap();
    let m = MeasurementBuilder::new("device-7")
        .build(sample.timestamp, &sample.values)
        .unwrap();

    assert_eq!(m.temp(), 18.75);
    assert_eq!(m.timestamp(), t());
    device_rule().validate(&m).unwrap();
}

#[test]
fn exhausted_sensor_surfaces_as_logger_error() {
    let sampler = Sampler::new(
        SamplingConfig::default()
            .num_samples(2)
            .sample_delay(Duration::ZERO),
    );
    let mut sensor = ScriptedSensor::new([18.0]);

    assert!(matches!(
        sampler.sample(&mut sensor, &FixedTime::new(t())),
        Err(LoggerError::Sensor(_))
    ));
}

#[test]
fn validator_shared_across_threads() {
    let validator = Arc::new(device_rule());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let id = if i % 2 == 0 {
                    format!("device-{i}")
                } else {
                    format!("sensor-{i}")
                };
                let m = MeasurementBuilder::new(id).build(t(), &[20.0]).unwrap();
                validator.validate(&m).is_ok()
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, [true, false, true, false, true, false, true, false]);
}

proptest! {
    #[test]
    fn validation_is_idempotent(id in "[a-z0-9-]{0,12}", temp in -40.0f32..125.0) {
        let validator = device_rule();
        let m = Measurement::new(id, t(), temp);

        prop_assert_eq!(validator.validate(&m), validator.validate(&m));
    }
}
