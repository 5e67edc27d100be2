//! Common validation rules shared across request payloads.

use validator::ValidationError;

use crate::utils::time::parse_hhmm;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Validates a `HH:mm` time-of-day string.
pub fn validate_hhmm(value: &str) -> Result<(), ValidationError> {
    if parse_hhmm(value).is_none() {
        return Err(ValidationError::new("time_of_day_invalid"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_blank_rejects_whitespace() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t").is_err());
        assert!(validate_not_blank("sick").is_ok());
    }

    #[test]
    fn hhmm_rejects_out_of_range() {
        assert!(validate_hhmm("24:00").is_err());
        assert!(validate_hhmm("7pm").is_err());
        assert!(validate_hhmm("07:45").is_ok());
    }
}
