//! Input validation for account identities and card numbers
//!
//! Both are checked where they are created (account open, card issue), not
//! just by convention at the edges.

// ============================================================================
// Validation Errors
// ============================================================================

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid length for {field}: expected {min}-{max}, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid format for {field}: '{value}' (expected: {expected})")]
    InvalidFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

// ============================================================================
// Account identity
// ============================================================================

pub const IDENTITY_MIN_LEN: usize = 3;
pub const IDENTITY_MAX_LEN: usize = 32;

/// Validate an account identity
///
/// # Validation Rules
/// - Length: 3-32 characters
/// - Characters: ASCII letters, digits, `_`, `.`, `-`
/// - Must start with a letter or digit
/// - Must not have the shape of a card number, or it could capture
///   transfers addressed to that card
pub fn validate_identity(identity: &str) -> Result<(), ValidationError> {
    let len = identity.chars().count();
    if !(IDENTITY_MIN_LEN..=IDENTITY_MAX_LEN).contains(&len) {
        return Err(ValidationError::InvalidLength {
            field: "identity",
            min: IDENTITY_MIN_LEN,
            max: IDENTITY_MAX_LEN,
            actual: len,
        });
    }

    let starts_ok = identity
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    let chars_ok = identity
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if !starts_ok || !chars_ok {
        return Err(ValidationError::InvalidFormat {
            field: "identity",
            value: identity.to_string(),
            expected: "^[A-Za-z0-9][A-Za-z0-9_.-]{2,31}$",
        });
    }

    if looks_like_card_number(identity) {
        return Err(ValidationError::InvalidFormat {
            field: "identity",
            value: identity.to_string(),
            expected: "anything but <PREFIX>-dddd-dddd",
        });
    }

    Ok(())
}

// ============================================================================
// Card number
// ============================================================================

/// Validate a card number against `<PREFIX>-dddd-dddd`
pub fn validate_card_number(number: &str, prefix: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidFormat {
        field: "card",
        value: number.to_string(),
        expected: "<PREFIX>-dddd-dddd",
    };

    let rest = number
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix('-'))
        .ok_or_else(invalid)?;

    let mut groups = rest.split('-');
    let ok = matches!(
        (groups.next(), groups.next(), groups.next()),
        (Some(a), Some(b), None) if is_digit_group(a) && is_digit_group(b)
    );

    if ok { Ok(()) } else { Err(invalid()) }
}

/// Looks like a card number for any prefix (used to route receiver lookups)
pub fn looks_like_card_number(value: &str) -> bool {
    match value.split_once('-') {
        Some((prefix, _)) if !prefix.is_empty() => validate_card_number(value, prefix).is_ok(),
        _ => false,
    }
}

fn is_digit_group(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}
