//! # Error Types
//!
//! Domain-specific error types for sismad-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sismad-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  sismad-db errors (separate crate)                                     │
//! │  └── DbError          - Document store failures                        │
//! │                                                                         │
//! │  sismad-app errors                                                     │
//! │  └── ApiError         - What the front end sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front end              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Failure Categories for Line Items
//! 1. *invalid input*: a dimension or price fails numeric/positivity checks.
//!    Reported as [`ValidationError`] against the offending field, and the
//!    volume calculator is never called.
//! 2. *degenerate result*: inputs were valid but the volume rounds to zero.
//!    Reported as [`CoreError::DegenerateVolume`] and blocks saving.

use thiserror::Error;

use crate::dates::DateParseError;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Species not found: {0}")]
    SpeciesNotFound(String),

    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    #[error("Manifest not found: {0}")]
    ManifestNotFound(String),

    /// The measurement is valid but its volume rounds to 0.000 m³.
    ///
    /// ## User Workflow
    /// ```text
    /// Line: 1 x 1 x 1 cm, qty 1
    ///      │
    ///      ▼
    /// volume = 0.000001 m³ → rounds to 0.000
    ///      │
    ///      ▼
    /// DegenerateVolume { description: "..." }
    ///      │
    ///      ▼
    /// UI blocks the line: "Volume is zero"
    /// ```
    #[error("Line '{description}' has zero volume")]
    DegenerateVolume { description: String },

    /// A measurement shape that the document does not accept
    /// (e.g. a lumber piece on a log manifest).
    #[error("{document} does not accept {measurement} lines")]
    MeasurementNotAllowed {
        document: String,
        measurement: String,
    },

    /// Quote status change that the workflow forbids.
    #[error("Quote {quote_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        quote_id: String,
        from: String,
        to: String,
    },

    /// Editing lines of a quote that is no longer pending.
    #[error("Quote {quote_id} is {status} and cannot be edited")]
    QuoteNotEditable { quote_id: String, status: String },

    #[error("Line {index} does not exist (document has {len} lines)")]
    LineNotFound { index: usize, len: usize },

    #[error("Document cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// Saving a quote or manifest with no lines.
    #[error("{document} has no line items")]
    EmptyDocument { document: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid date: {0}")]
    InvalidDate(#[from] DateParseError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Each variant names the field so the form can attach the message to it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Not a finite number (NaN, infinity, or unparsable text).
    #[error("{field} is not a valid number: {value}")]
    InvalidNumber { field: String, value: String },

    /// Invalid format (e.g., invalid UUID, invalid tax id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Name of the field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidNumber { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
