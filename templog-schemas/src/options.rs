//! Field options to validation rules
//!
//! Reads the `templog.regex` option off each field of a record schema and
//! builds the rule table the core validator runs. Rules are keyed by field, so
//! the validator visits them in record declaration order whatever order the
//! schema lists them in.

use lazy_static::lazy_static;
use log::debug;
use serde_json::Value;
use templog_core::{FieldId, FieldRule, MeasurementValidator, RuleSet};

use crate::{
    schemas::{self, REGEX_OPTION},
    SchemaError,
};

/// Build the rule table declared by a record schema's field options
///
/// Fields without the option get no rule. An option on a name that isn't a
/// measurement field, a non-string option, or a pattern that doesn't compile
/// is a schema error.
pub fn extract_rules(schema: &Value) -> Result<RuleSet, SchemaError> {
    let fields = schema
        .get("fields")
        .and_then(Value::as_array)
        .ok_or_else(|| SchemaError::Parse("record schema has no fields array".to_string()))?;

    let mut rules = RuleSet::new();
    for field in fields {
        let Some(option) = field.get(REGEX_OPTION) else {
            continue;
        };

        let name = field
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::Parse("field without a name".to_string()))?;

        let id = FieldId::from_name(name).ok_or_else(|| SchemaError::InvalidOption {
            field: name.to_string(),
            reason: "not a measurement field".to_string(),
        })?;

        let pattern = option.as_str().ok_or_else(|| SchemaError::InvalidOption {
            field: name.to_string(),
            reason: format!("{REGEX_OPTION} must be a string"),
        })?;

        let rule = FieldRule::new(id, pattern).map_err(|e| SchemaError::InvalidOption {
            field: name.to_string(),
            reason: e.to_string(),
        })?;

        debug!("field {name} validated by {pattern:?}");
        rules.insert(rule);
    }

    Ok(rules)
}

lazy_static! {
    /// Rules declared by the built-in measurement schema
    pub static ref MEASUREMENT_RULES: RuleSet = extract_rules(&schemas::measurement_v1_json())
        .expect("built-in measurement schema declares valid rules");
}

/// Validator enforcing the built-in measurement schema's rules
pub fn default_validator() -> MeasurementValidator {
    MeasurementValidator::new(MEASUREMENT_RULES.clone())
}
