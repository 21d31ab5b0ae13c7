//! Shared numeric validation for normalized coordinates and image weights.

use crate::error::CoreError;

/// Smallest accepted normalized coordinate.
pub const UNIT_MIN: f64 = 0.0;

/// Largest accepted normalized coordinate.
pub const UNIT_MAX: f64 = 1.0;

/// Validate that a normalized coordinate lies in `[0, 1]` inclusive.
///
/// NaN is rejected along with values outside the interval; nothing is
/// clamped.
pub fn validate_unit(entity: &'static str, field: &'static str, value: f64) -> Result<(), CoreError> {
    if !(UNIT_MIN..=UNIT_MAX).contains(&value) {
        return Err(CoreError::OutOfRange {
            entity,
            field,
            value,
        });
    }
    Ok(())
}

/// Validate a training weight: finite and non-negative.
pub fn validate_weight(weight: f64) -> Result<(), CoreError> {
    if !weight.is_finite() {
        return Err(CoreError::Validation(
            "weight must be a finite number".to_string(),
        ));
    }
    if weight < 0.0 {
        return Err(CoreError::Validation(format!(
            "weight must not be negative, got {weight}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn unit_bounds_accepted() {
        assert!(validate_unit("point", "x", 0.0).is_ok());
        assert!(validate_unit("point", "x", 1.0).is_ok());
        assert!(validate_unit("point", "x", 0.5).is_ok());
    }

    #[test]
    fn unit_outside_rejected() {
        assert_matches!(
            validate_unit("point", "x", -0.001),
            Err(CoreError::OutOfRange { field: "x", .. })
        );
        assert_matches!(
            validate_unit("box", "y1", 1.001),
            Err(CoreError::OutOfRange { entity: "box", field: "y1", .. })
        );
    }

    #[test]
    fn unit_nan_rejected() {
        assert!(validate_unit("point", "y", f64::NAN).is_err());
    }

    #[test]
    fn weight_rules() {
        assert!(validate_weight(0.0).is_ok());
        assert!(validate_weight(2.5).is_ok());
        assert!(validate_weight(-1.0).is_err());
        assert!(validate_weight(f64::INFINITY).is_err());
    }
}
