//! Avro binary codec for measurements
//!
//! Records are written as bare Avro datums (no container header); both sides
//! know the schema, so there's nothing to gain from shipping it with every
//! sample. The schema comes from the default [`registry`] and is looked up
//! once per process.

use apache_avro::{from_avro_datum, to_avro_datum, types::Value, Schema};
use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use templog_core::Measurement;

use crate::{registry, SchemaError};

lazy_static! {
    static ref MEASUREMENT_V1: Result<Schema, String> = registry::defaults()
        .and_then(|r| r.get("measurement_v1"))
        .map_err(|e| e.to_string());
}

fn measurement_v1() -> Result<&'static Schema, SchemaError> {
    MEASUREMENT_V1.as_ref().map_err(|e| SchemaError::Parse(e.clone()))
}

/// Avro value of a measurement under the v1 schema
pub fn to_avro_value(m: &Measurement) -> Value {
    let upload = match m.upload_timestamp() {
        Some(ts) => Value::Union(1, Box::new(Value::TimestampMicros(ts.timestamp_micros()))),
        None => Value::Union(0, Box::new(Value::Null)),
    };

    Value::Record(vec![
        ("device_id".to_string(), Value::String(m.device_id().to_string())),
        ("timestamp".to_string(), Value::TimestampMicros(m.timestamp().timestamp_micros())),
        ("temp".to_string(), Value::Float(m.temp())),
        ("upload_timestamp".to_string(), upload),
    ])
}

/// Serialize a measurement to an Avro datum
pub fn encode(m: &Measurement) -> Result<Vec<u8>, SchemaError> {
    let schema = measurement_v1()?;
    to_avro_datum(schema, to_avro_value(m)).map_err(|e| SchemaError::Codec(e.to_string()))
}

/// Parse an Avro datum written with the v1 schema
pub fn decode(mut bytes: &[u8]) -> Result<Measurement, SchemaError> {
    let schema = measurement_v1()?;
    let value = from_avro_datum(schema, &mut bytes, None)
        .map_err(|e| SchemaError::Codec(e.to_string()))?;

    let Value::Record(fields) = value else {
        return Err(SchemaError::Codec("expected a record".to_string()));
    };

    let mut device_id = None;
    let mut timestamp = None;
    let mut temp = None;
    let mut upload_timestamp = None;

    for (name, value) in fields {
        match (name.as_str(), value) {
            ("device_id", Value::String(s)) => device_id = Some(s),
            ("timestamp", Value::TimestampMicros(us)) => timestamp = Some(from_micros(us)?),
            ("temp", Value::Float(t)) => temp = Some(t),
            ("upload_timestamp", Value::Union(_, inner)) => {
                if let Value::TimestampMicros(us) = *inner {
                    upload_timestamp = Some(from_micros(us)?);
                }
            }
            (name, value) => {
                return Err(SchemaError::Codec(format!("unexpected field {name}: {value:?}")));
            }
        }
    }

    let missing = |field: &str| SchemaError::Codec(format!("missing field {field}"));
    let measurement = Measurement::new(
        device_id.ok_or_else(|| missing("device_id"))?,
        timestamp.ok_or_else(|| missing("timestamp"))?,
        temp.ok_or_else(|| missing("temp"))?,
    );

    Ok(match upload_timestamp {
        Some(ts) => measurement.with_upload_timestamp(ts),
        None => measurement,
    })
}

fn from_micros(us: i64) -> Result<DateTime<Utc>, SchemaError> {
    Utc.timestamp_micros(us)
        .single()
        .ok_or_else(|| SchemaError::Codec(format!("timestamp out of range: {us}")))
}
