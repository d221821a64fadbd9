//! Custom validation functions for configuration.

use validator::ValidationError;

/// Validate that a forced Wu–Manber block size is one of the three sizes
/// the automatic heuristic (spec §4.3) ever produces.
pub fn validate_block_size(value: u8) -> Result<(), ValidationError> {
    if matches!(value, 2 | 3 | 4) {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_2_3_or_4"))
    }
}

/// Validate that a false-positive rate is a usable probability, strictly
/// between zero (meaningless, infinite table) and one (no filtering at
/// all).
pub fn validate_false_positive_rate(value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_in_open_unit_interval"))
    }
}
