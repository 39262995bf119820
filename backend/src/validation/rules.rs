//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Validates a record title.
///
/// Requirements:
/// - Not blank
/// - At most 120 characters
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() || title.len() > 120 {
        return Err(ValidationError::new("title_invalid_length"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_rejects_empty() {
        assert!(validate_title("").is_err());
    }

    #[test]
    fn title_rejects_blank() {
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn title_rejects_overlong() {
        assert!(validate_title(&"x".repeat(121)).is_err());
    }

    #[test]
    fn title_accepts_valid() {
        assert!(validate_title("sprint review notes").is_ok());
    }
}
