//! templog Avro schemas with field validation options
//!
//! Each field may carry a `templog.regex` option. The option travels with the
//! schema, so anything that reads the schema can enforce the same rules the
//! device enforced before sending.

use apache_avro::Schema;
use serde_json::json;

use crate::SchemaError;

/// Field option holding a field's validation regex
pub const REGEX_OPTION: &str = "templog.regex";

/// Device ID rule: starts with a letter, then 2 to 254 letters, digits or
/// `- . _ + ~ %`.
pub const DEVICE_ID_PATTERN: &str = "^[a-zA-Z][-a-zA-Z0-9._+~%]{2,254}$";

/// Measurement schema v1 as JSON, options included
pub fn measurement_v1_json() -> serde_json::Value {
    json!({
        "namespace": "io.templog.measurement.v1",
        "type": "record",
        "name": "Measurement",
        "doc": "One reduced temperature reading from one device",
        "fields": [
            {
                "name": "device_id",
                "type": "string",
                "doc": "Device identifier, fixed per logger",
                "templog.regex": DEVICE_ID_PATTERN
            },
            {
                "name": "timestamp",
                "type": {"type": "long", "logicalType": "timestamp-micros"},
                "doc": "When the sample was taken"
            },
            {
                "name": "temp",
                "type": "float",
                "doc": "Temperature in degrees Celsius"
            },
            {
                "name": "upload_timestamp",
                "type": ["null", {"type": "long", "logicalType": "timestamp-micros"}],
                "default": null,
                "doc": "When the record was sent, if it was held back first"
            }
        ]
    })
}

/// Measurement schema v1
pub fn measurement_v1() -> Result<Schema, SchemaError> {
    Schema::parse(&measurement_v1_json()).map_err(|e| SchemaError::Parse(e.to_string()))
}
