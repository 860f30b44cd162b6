//! Rules declared on a schema, enforced by the core validator

use chrono::{TimeZone, Utc};
use serde_json::json;
use templog_core::{FieldId, MeasurementBuilder, MeasurementError, MeasurementValidator};
use templog_schemas::{codec, extract_rules, SchemaError, SchemaRegistry};

#[test]
fn custom_schema_rules_drive_validation() {
    // Fields listed out of declaration order still validate device_id first
    let schema = json!({
        "type": "record",
        "name": "Measurement",
        "fields": [
            {"name": "temp", "type": "float", "templog.regex": "^-"},
            {"name": "device_id", "type": "string", "templog.regex": "^device-[0-9]+$"}
        ]
    });

    let rules = extract_rules(&schema).unwrap();
    assert_eq!(
        rules.iter().map(|r| r.field()).collect::<Vec<_>>(),
        [FieldId::DeviceId, FieldId::Temp]
    );

    let validator = MeasurementValidator::new(rules);
    let ts = Utc.with_ymd_and_hms(2018, 3, 25, 0, 0, 0).unwrap();
    let m = MeasurementBuilder::new("sensor-42").build(ts, &[20.0]).unwrap();

    match validator.validate(&m) {
        Err(MeasurementError::InvalidProto { field, value, regex }) => {
            assert_eq!(field, "device_id");
            assert_eq!(value, "sensor-42");
            assert_eq!(regex, "^device-[0-9]+$");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn unknown_field_option_rejected() {
    let schema = json!({
        "type": "record",
        "name": "Measurement",
        "fields": [{"name": "humidity", "type": "float", "templog.regex": "^1"}]
    });

    assert!(matches!(
        extract_rules(&schema),
        Err(SchemaError::InvalidOption { field, .. }) if field == "humidity"
    ));
}

#[test]
fn validated_record_round_trips_through_registry_schema() {
    let registry = SchemaRegistry::new();
    registry.load_defaults().unwrap();
    assert_eq!(registry.get_versions("measurement").unwrap(), ["v1"]);

    let validator = templog_schemas::default_validator();
    let ts = Utc.with_ymd_and_hms(2018, 3, 25, 0, 0, 0).unwrap();
    let m = MeasurementBuilder::new("attic-1").build(ts, &[18.0, 18.75]).unwrap();
    validator.validate(&m).unwrap();

    let decoded = codec::decode(&codec::encode(&m).unwrap()).unwrap();
    assert_eq!(decoded.temp(), 18.375);
    validator.validate(&decoded).unwrap();
}
