/// Input validators for account fields
///
/// Emails are checked for shape and length only. They are stored exactly as
/// given; lookups are case-sensitive.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates an email address for registration or profile update
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    // Local part is limited to 64 octets
    if email.split('@').next().map_or(0, str::len) > 64 {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(email.to_string())
}

/// Presence check used where the shape does not matter (login)
pub fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
        assert!(is_valid_email("a@b.io").is_ok());
    }

    #[test]
    fn test_email_preserved_as_given() {
        assert_eq!(is_valid_email("Walt@Example.com").unwrap(), "Walt@Example.com");
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
        assert!(is_valid_email(" user@example.com").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());

        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(is_valid_email(&long_local).is_err());
    }

    #[test]
    fn test_empty_email() {
        assert_eq!(
            is_valid_email("   "),
            Err(ValidationError::EmptyField("email".to_string()))
        );
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("email", "x").is_ok());
        assert!(require_non_empty("email", "").is_err());
        assert!(require_non_empty("email", " \t").is_err());
    }
}
