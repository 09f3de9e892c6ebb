//! # Validation Module
//!
//! Input validation for Caja POS.
//!
//! Validation runs synchronously BEFORE any storage write: a rejected input
//! never opens a transaction, never queues a sync entry, and surfaces to the
//! user immediately.

use crate::error::ValidationError;
use crate::{MAX_LINE_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field (names, reasons, labels).
///
/// ## Example
/// ```rust
/// use caja_core::validation::validate_required;
///
/// assert!(validate_required("reason", "cambio de caja").is_ok());
/// assert!(validate_required("reason", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a staff PIN: exactly 4 ASCII digits.
///
/// ## Example
/// ```rust
/// use caja_core::validation::validate_pin;
///
/// assert!(validate_pin("0423").is_ok());
/// assert!(validate_pin("123").is_err());
/// assert!(validate_pin("12a4").is_err());
/// ```
pub fn validate_pin(pin: &str) -> ValidationResult<()> {
    if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "pin".to_string(),
            reason: "must be exactly 4 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional phone number (used when present).
///
/// Accepts digits, spaces, `+` and `-`; 7 to 20 characters.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.len() < 7 || phone.len() > 20 {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be 7 to 20 characters".to_string(),
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '+' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, '+' and '-'".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount that may be zero but never negative
/// (prices, costs, shift start amounts, tendered amounts).
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a monetary amount that must be strictly positive
/// (cash in/out movements).
pub fn validate_positive_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the line count of a sale: non-empty and bounded.
pub fn validate_sale_lines(line_count: usize) -> ValidationResult<()> {
    if line_count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if line_count > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Coca-Cola 600ml").is_ok());
        assert!(validate_required("name", "").is_err());
        assert!(validate_required("name", "   ").is_err());
        assert!(validate_required("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin("0000").is_ok());
        assert!(validate_pin("9731").is_ok());

        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("12a4").is_err());
        assert!(validate_pin("١٢٣٤").is_err()); // non-ASCII digits
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("555-123-4567").is_ok());
        assert!(validate_phone("+52 55 1234 5678").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("call me maybe").is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_amount_cents("price", 0).is_ok());
        assert!(validate_amount_cents("price", 1099).is_ok());
        assert!(validate_amount_cents("price", -1).is_err());

        assert!(validate_positive_cents("amount", 5000).is_ok());
        assert!(validate_positive_cents("amount", 0).is_err());
        assert!(validate_positive_cents("amount", -100).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_sale_lines() {
        assert!(validate_sale_lines(1).is_ok());
        assert!(validate_sale_lines(100).is_ok());
        assert!(validate_sale_lines(0).is_err());
        assert!(validate_sale_lines(101).is_err());
    }
}
