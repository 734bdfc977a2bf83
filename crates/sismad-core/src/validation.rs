//! # Validation Module
//!
//! Field-level input validation for SISMAD forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end                                                    │
//! │  └── Immediate feedback (empty fields, masks)                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: sismad-app services                                          │
//! │  └── THIS MODULE: every numeric field checked before the volume        │
//! │      calculator runs                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: sismad-db repositories                                       │
//! │  └── Documents validated again on write and on read                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sismad_core::validation::{parse_decimal, validate_dimension};
//!
//! let width = parse_decimal("width_cm", "15,5").unwrap();
//! assert_eq!(validate_dimension("width_cm", Some(width)).unwrap(), 15.5);
//!
//! assert!(validate_dimension("width_cm", Some(0.0)).is_err());
//! assert!(validate_dimension("width_cm", None).is_err());
//! ```

use crate::error::ValidationError;
use crate::volume::Volume;
use crate::{
    MAX_LINE_ITEMS, MAX_LINE_VOLUME_DM3, MAX_PRICE_CENTS, MAX_QUOTE_VALIDITY_DAYS, MAX_TEXT_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Brazilian federative unit codes.
const STATE_CODES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty (after trim) values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Optional free text: may be empty, bounded by [`MAX_TEXT_LEN`] characters.
pub fn validate_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}

/// Names of clients and species.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_TEXT_LEN`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    validate_required(field, name)?;
    validate_text(field, name.trim())
}

/// CPF (11 digits) or CNPJ (14 digits). Punctuation is ignored.
///
/// ## Returns
/// The digits only, as stored.
///
/// ## Example
/// ```rust
/// use sismad_core::validation::validate_tax_id;
///
/// assert_eq!(validate_tax_id("123.456.789-09").unwrap(), "12345678909");
/// assert!(validate_tax_id("12.345.678/0001-95").is_ok());
/// assert!(validate_tax_id("123").is_err());
/// ```
pub fn validate_tax_id(raw: &str) -> ValidationResult<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let stray = raw
        .chars()
        .any(|c| !c.is_ascii_digit() && !matches!(c, '.' | '-' | '/' | ' '));

    if stray || !(digits.len() == 11 || digits.len() == 14) {
        return Err(ValidationError::InvalidFormat {
            field: "tax_id".to_string(),
            reason: "must be a CPF (11 digits) or CNPJ (14 digits)".to_string(),
        });
    }
    Ok(digits)
}

/// Minimal e-mail shape check: `local@domain.tld`.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }
    Ok(())
}

/// Two-letter state code (UF). Returns it upper-cased.
pub fn validate_state_code(state: &str) -> ValidationResult<String> {
    let upper = state.trim().to_uppercase();
    if !STATE_CODES.contains(&upper.as_str()) {
        return Err(ValidationError::InvalidFormat {
            field: "state".to_string(),
            reason: "must be a Brazilian state code (e.g. PR, SP)".to_string(),
        });
    }
    Ok(upper)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a decimal typed by a user, accepting both `15,5` and `15.5`.
///
/// When a comma is present it is the decimal separator and dots are
/// thousands separators (`1.234,5` → 1234.5).
pub fn parse_decimal(field: &str, raw: &str) -> ValidationResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Validates one dimension (or quantity) before it reaches the calculator.
///
/// ## Rules
/// - Must be present
/// - Must be finite
/// - Must be strictly positive
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Log manifest: add line                                                 │
/// │                                                                         │
/// │  d1 = 30, d2 = (empty), length = 4                                      │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_dimension("diameter2_cm", None) ← THIS FUNCTION               │
/// │       │                                                                 │
/// │       └── Error: "diameter2_cm is required" shown under the field       │
/// │           (log_volume is never called)                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_dimension(field: &str, value: Option<f64>) -> ValidationResult<f64> {
    let value = value.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;

    if !value.is_finite() {
        return Err(ValidationError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    if value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(value)
}

/// Validates a price in centavos, from zero (courtesy items) up to
/// [`MAX_PRICE_CENTS`].
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }
    Ok(())
}

/// Validates the computed volume of one line against [`MAX_LINE_VOLUME_DM3`].
///
/// The bound is reported in whole m³.
pub fn validate_line_volume(field: &str, volume: Volume) -> ValidationResult<()> {
    if volume.dm3() > MAX_LINE_VOLUME_DM3 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_LINE_VOLUME_DM3 / 1000,
        });
    }
    Ok(())
}

/// Validates a quote validity period: 1 to [`MAX_QUOTE_VALIDITY_DAYS`] days.
pub fn validate_validity_days(days: u32) -> ValidationResult<()> {
    if !(1..=MAX_QUOTE_VALIDITY_DAYS).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "quote_validity_days".to_string(),
            min: 1,
            max: i64::from(MAX_QUOTE_VALIDITY_DAYS),
        });
    }
    Ok(())
}

/// Validates a density in kg/m³ (species catalog).
pub fn validate_density(density: f64) -> ValidationResult<()> {
    validate_dimension("density_kg_m3", Some(density)).map(|_| ())
}

/// Validates the number of lines on a document.
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 0,
            max: MAX_LINE_ITEMS as i64,
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use sismad_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
