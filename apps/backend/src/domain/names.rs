//! Display name and room code rules.

use crate::errors::domain::{DomainError, ValidationKind};

pub const MAX_NAME_CHARS: usize = 30;
pub const ROOM_CODE_LEN: usize = 6;

/// Trim and bound a participant's display name.
pub fn validate_display_name(raw: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidName,
            "Name is required",
        ));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(DomainError::validation(
            ValidationKind::InvalidName,
            format!("Name must be between 1 and {MAX_NAME_CHARS} characters"),
        ));
    }
    Ok(name.to_string())
}

/// Normalise a room code from a URL; lookups are case-insensitive.
pub fn normalize_room_code(raw: &str) -> Result<String, DomainError> {
    let code = raw.trim().to_ascii_uppercase();
    let well_formed = code.len() == ROOM_CODE_LEN
        && code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if !well_formed {
        return Err(DomainError::validation(
            ValidationKind::InvalidRoomCode,
            format!("Room code must be {ROOM_CODE_LEN} letters or digits"),
        ));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_display_name("  Alex  ").unwrap(), "Alex");
    }

    #[test]
    fn empty_name_is_required() {
        let err = validate_display_name("   ").unwrap_err();
        assert_eq!(
            err,
            DomainError::validation(ValidationKind::InvalidName, "Name is required")
        );
    }

    #[test]
    fn length_counts_characters() {
        assert!(validate_display_name(&"é".repeat(30)).is_ok());
        let err = validate_display_name(&"x".repeat(31)).unwrap_err();
        assert!(err.to_string().contains("between 1 and 30"));
    }

    #[test]
    fn room_codes() {
        assert_eq!(normalize_room_code("ab12cd").unwrap(), "AB12CD");
        assert!(normalize_room_code("AB12C").is_err());
        assert!(normalize_room_code("AB-2CD").is_err());
        assert!(normalize_room_code("ÄB12CD").is_err());
    }
}
