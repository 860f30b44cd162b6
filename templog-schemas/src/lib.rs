//! Avro Schema Definitions with Embedded Field Rules
//!
//! ## Overview
//!
//! The measurement record's validation rules are declared on the schema itself
//! as field options rather than written as code. The validator in
//! `templog-core` only knows how to run a rule table; this crate is where the
//! table comes from.
//!
//! ```json
//! {
//!   "name": "device_id",
//!   "type": "string",
//!   "templog.regex": "^[a-zA-Z][-a-zA-Z0-9._+~%]{2,254}$"
//! }
//! ```
//!
//! ## Contents
//!
//! - [`schemas`]: the measurement schema, options included
//! - [`options`]: turning field options into a `RuleSet`
//! - [`codec`]: Avro binary encoding used on the wire
//! - [`registry`]: named, versioned schema lookup; the codec's schema comes from here
//!
//! ## Usage Example
//!
//! ```rust
//! use chrono::Utc;
//! use templog_core::MeasurementBuilder;
//! use templog_schemas::{codec, options};
//!
//! let validator = options::default_validator();
//! let measurement = MeasurementBuilder::new("attic-1").build(Utc::now(), &[21.0])?;
//! validator.validate(&measurement)?;
//!
//! let bytes = codec::encode(&measurement)?;
//! assert_eq!(codec::decode(&bytes)?, measurement);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod options;
pub mod registry;
pub mod schemas;

pub use options::{default_validator, extract_rules, MEASUREMENT_RULES};
pub use registry::SchemaRegistry;

/// Schema-related errors
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to parse schema: {0}")]
    Parse(String),

    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Invalid option on field {field}: {reason}")]
    InvalidOption { field: String, reason: String },

    #[error("Codec error: {0}")]
    Codec(String),
}
