//! Plausibility limits for manually entered readings.
//!
//! These are enforced where readings are collected from a user. Stored
//! readings and `classify` accept any integers.

use std::ops::RangeInclusive;
use thiserror::Error;

/// Accepted systolic values in mmHg.
pub const SYSTOLIC_RANGE: RangeInclusive<i32> = 70..=250;

/// Accepted diastolic values in mmHg.
pub const DIASTOLIC_RANGE: RangeInclusive<i32> = 40..=180;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeasurementError {
    #[error("Systolic value {value} is outside {min}-{max} mmHg")]
    SystolicOutOfRange { value: i32, min: i32, max: i32 },

    #[error("Diastolic value {value} is outside {min}-{max} mmHg")]
    DiastolicOutOfRange { value: i32, min: i32, max: i32 },
}

/// Check a measurement against the collection limits.
pub fn validate_measurement(systolic: i32, diastolic: i32) -> Result<(), MeasurementError> {
    validate_systolic(systolic)?;
    validate_diastolic(diastolic)
}

/// Check a systolic value on its own, as when only one value is edited.
pub fn validate_systolic(value: i32) -> Result<(), MeasurementError> {
    if SYSTOLIC_RANGE.contains(&value) {
        return Ok(());
    }
    Err(MeasurementError::SystolicOutOfRange {
        value,
        min: *SYSTOLIC_RANGE.start(),
        max: *SYSTOLIC_RANGE.end(),
    })
}

pub fn validate_diastolic(value: i32) -> Result<(), MeasurementError> {
    if DIASTOLIC_RANGE.contains(&value) {
        return Ok(());
    }
    Err(MeasurementError::DiastolicOutOfRange {
        value,
        min: *DIASTOLIC_RANGE.start(),
        max: *DIASTOLIC_RANGE.end(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_range_edges() {
        assert!(validate_measurement(70, 40).is_ok());
        assert!(validate_measurement(250, 180).is_ok());
    }

    #[test]
    fn test_rejects_systolic_first() {
        let err = validate_measurement(69, 20).unwrap_err();
        assert_eq!(
            err,
            MeasurementError::SystolicOutOfRange { value: 69, min: 70, max: 250 }
        );
    }

    #[test]
    fn test_rejects_diastolic() {
        let err = validate_measurement(120, 181).unwrap_err();
        assert!(matches!(err, MeasurementError::DiastolicOutOfRange { value: 181, .. }));
        assert!(err.to_string().contains("40-180"));
    }

    #[test]
    fn test_single_value_checks() {
        assert!(validate_systolic(250).is_ok());
        assert!(validate_diastolic(40).is_ok());
        assert_eq!(
            validate_systolic(251),
            Err(MeasurementError::SystolicOutOfRange { value: 251, min: 70, max: 250 })
        );
        assert_eq!(
            validate_diastolic(39),
            Err(MeasurementError::DiastolicOutOfRange { value: 39, min: 40, max: 180 })
        );
    }
}
