//! Whole-record validation against a rule table

use log::warn;

use super::rules::RuleSet;
use crate::{
    errors::{MeasurementError, MeasurementResult},
    measurement::Measurement,
};

/// Accepts or rejects a `Measurement` as a whole
///
/// Holds only the immutable rule table, so one validator can be shared
/// between threads and used for any number of records.
#[derive(Debug, Clone, Default)]
pub struct MeasurementValidator {
    rules: RuleSet,
}

impl MeasurementValidator {
    /// Validator enforcing `rules`
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Rules being enforced
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Check every present field that has a rule
    ///
    /// Fields are visited in declaration order and the first failure is
    /// returned; later fields are not checked. Fields holding their default
    /// value are skipped.
    pub fn validate(&self, measurement: &Measurement) -> MeasurementResult<()> {
        for rule in self.rules.iter() {
            let field = rule.field();
            let Some(value) = measurement.field_value(field) else {
                continue;
            };

            if !rule.matches(&value) {
                warn!(
                    "rejecting measurement: {field} {value:?} does not match {:?}",
                    rule.pattern()
                );
                return Err(MeasurementError::InvalidProto {
                    field: field.name(),
                    value,
                    regex: rule.pattern().to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{measurement::FieldId, validators::FieldRule};
    use chrono::{TimeZone, Utc};

    fn measurement(device_id: &str, temp: f32) -> Measurement {
        let ts = Utc.with_ymd_and_hms(2018, 3, 25, 0, 0, 0).unwrap();
        Measurement::new(device_id, ts, temp)
    }

    fn device_rule() -> RuleSet {
        RuleSet::new().with_rule(FieldRule::new(FieldId::DeviceId, "^device-[0-9]+$").unwrap())
    }

    #[test]
    fn matching_device_id_passes() {
        let validator = MeasurementValidator::new(device_rule());
        assert!(validator.validate(&measurement("device-42", 20.0)).is_ok());
    }

    #[test]
    fn mismatching_device_id_reports_field_value_and_regex() {
        let validator = MeasurementValidator::new(device_rule());
        let err = validator.validate(&measurement("sensor-42", 20.0)).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("device_id"));
        assert!(message.contains("sensor-42"));
        assert!(message.contains("^device-[0-9]+$"));
    }

    #[test]
    fn no_rules_accepts_everything() {
        let validator = MeasurementValidator::default();
        assert!(validator.validate(&measurement("anything at all", -5.0)).is_ok());
    }

    #[test]
    fn default_fields_are_not_checked() {
        let validator = MeasurementValidator::new(device_rule());
        assert!(validator.validate(&measurement("", 20.0)).is_ok());
    }

    #[test]
    fn first_failing_field_wins() {
        let rules = RuleSet::new()
            .with_rule(FieldRule::new(FieldId::Temp, "^-").unwrap())
            .with_rule(FieldRule::new(FieldId::DeviceId, "^device-").unwrap());
        let validator = MeasurementValidator::new(rules);

        let err = validator.validate(&measurement("sensor-1", 20.5)).unwrap_err();
        match err {
            MeasurementError::InvalidProto { field, value, .. } => {
                assert_eq!(field, "device_id");
                assert_eq!(value, "sensor-1");
            }
            other => panic!("expected InvalidProto, got {other:?}"),
        }
    }

    #[test]
    fn validation_is_repeatable() {
        let validator = MeasurementValidator::new(device_rule());
        let good = measurement("device-7", 20.0);
        let bad = measurement("sensor-7", 20.0);

        assert_eq!(validator.validate(&good), validator.validate(&good));
        assert_eq!(validator.validate(&bad), validator.validate(&bad));
    }

    #[test]
    fn temp_is_matched_in_its_display_form() {
        let rules = RuleSet::new().with_rule(FieldRule::new(FieldId::Temp, r"[0-9]+\.5$").unwrap());
        let validator = MeasurementValidator::new(rules);

        assert!(validator.validate(&measurement("d", 18.5)).is_ok());
        assert!(validator.validate(&measurement("d", 18.25)).is_err());
    }

    #[test]
    fn validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MeasurementValidator>();
    }
}
