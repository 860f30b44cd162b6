//! The measurement record
//!
//! A `Measurement` is one reduced temperature reading from one device at one
//! point in time. Records are created fresh for every log call and never
//! mutated afterwards; the only derived copy is the one carrying an upload
//! timestamp when a stored record is sent late.

use core::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::time::format_duration;

/// Separator for keys built from record fields. Device IDs and RFC3339
/// timestamps can't contain it.
const KEY_SEP: &str = "#";

/// Fields of a `Measurement`, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    /// Device identifier
    DeviceId,
    /// When the sample was taken
    Timestamp,
    /// Temperature in °C
    Temp,
    /// When the record was sent, if later than it was taken
    UploadTimestamp,
}

impl FieldId {
    /// All fields in declaration order
    pub const ALL: [FieldId; 4] = [
        FieldId::DeviceId,
        FieldId::Timestamp,
        FieldId::Temp,
        FieldId::UploadTimestamp,
    ];

    /// Field name as it appears in schemas and diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            FieldId::DeviceId => "device_id",
            FieldId::Timestamp => "timestamp",
            FieldId::Temp => "temp",
            FieldId::UploadTimestamp => "upload_timestamp",
        }
    }

    /// Look up a field by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A temperature record ready for validation and transmission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    device_id: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upload_timestamp: Option<DateTime<Utc>>,
    temp: f32,
}

impl Measurement {
    /// Create a record without an upload timestamp
    pub fn new(device_id: impl Into<String>, timestamp: DateTime<Utc>, temp: f32) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp,
            upload_timestamp: None,
            temp,
        }
    }

    /// Copy of this record stamped with the time it was uploaded
    pub fn with_upload_timestamp(&self, uploaded: DateTime<Utc>) -> Self {
        Self {
            upload_timestamp: Some(uploaded),
            ..self.clone()
        }
    }

    /// Device that took the reading
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// When the reading was taken
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// When the record was uploaded, if it was sent late
    pub fn upload_timestamp(&self) -> Option<DateTime<Utc>> {
        self.upload_timestamp
    }

    /// Temperature in degrees Celsius
    pub fn temp(&self) -> f32 {
        self.temp
    }

    /// Time between taking the sample and uploading it
    pub fn upload_delay(&self) -> Option<Duration> {
        self.upload_timestamp.map(|uploaded| uploaded - self.timestamp)
    }

    /// Storage key: device ID and timestamp joined by `#`
    pub fn db_key(&self) -> String {
        [
            self.device_id.as_str(),
            &self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        ]
        .join(KEY_SEP)
    }

    /// Canonical string form of a field, or `None` if it holds its default
    ///
    /// Defaults are the empty string, `0.0` and an absent timestamp. Fields at
    /// their default are not considered present and are skipped by validation.
    pub fn field_value(&self, field: FieldId) -> Option<String> {
        match field {
            FieldId::DeviceId => {
                (!self.device_id.is_empty()).then(|| self.device_id.clone())
            }
            FieldId::Timestamp => Some(render_timestamp(&self.timestamp)),
            FieldId::Temp => (self.temp != 0.0).then(|| self.temp.to_string()),
            FieldId::UploadTimestamp => self.upload_timestamp.as_ref().map(render_timestamp),
        }
    }

    /// Present fields in declaration order with their canonical rendering
    pub fn field_values(&self) -> Vec<(FieldId, String)> {
        FieldId::ALL
            .into_iter()
            .filter_map(|field| self.field_value(field).map(|value| (field, value)))
            .collect()
    }
}

fn render_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.3}°C {}",
            self.device_id,
            self.temp,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;

        if let Some(delay) = self.upload_delay() {
            write!(f, " ({} upload delay)", format_duration(delay))?;
        }

        Ok(())
    }
}
