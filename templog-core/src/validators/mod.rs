//! Field-Rule Validation
//!
//! ## Overview
//!
//! A measurement is only loggable once it has passed validation. Validation is
//! a gate, not a transform: it either accepts the record unchanged or rejects
//! it with the first rule it broke.
//!
//! Rules are data. Each rule pairs one field with a regex, and the set of rules
//! is a lookup table keyed by field. Nothing in the validator knows about any
//! particular field, so validating a new field means declaring a new rule.
//!
//! ## Evaluation
//!
//! ```text
//! for field in declaration order (device_id, timestamp, temp, upload_timestamp):
//!     rule  = rules[field]            skip if none
//!     value = canonical string form   skip if the field holds its default
//!     if !prefix_match(rule, value):  fail with (field, value, pattern)
//! ```
//!
//! The order is fixed, so when several fields are bad the same one is always
//! reported.
//!
//! ## Usage Example
//!
//! ```rust
//! use chrono::Utc;
//! use templog_core::{FieldId, FieldRule, MeasurementBuilder, MeasurementValidator, RuleSet};
//!
//! let rules = RuleSet::new()
//!     .with_rule(FieldRule::new(FieldId::DeviceId, "^device-[0-9]+$")?);
//! let validator = MeasurementValidator::new(rules);
//!
//! let good = MeasurementBuilder::new("device-42").build(Utc::now(), &[21.5])?;
//! validator.validate(&good)?;
//!
//! let bad = MeasurementBuilder::new("sensor-42").build(Utc::now(), &[21.5])?;
//! assert!(validator.validate(&bad).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod record;
mod rules;
pub mod utils;

pub use record::MeasurementValidator;
pub use rules::{FieldRule, RuleSet};
