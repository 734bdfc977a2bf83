//! # Application Errors
//!
//! `ApiError` is what the entry forms receive when a service call fails;
//! `AppError` covers startup (configuration and store connection).
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in SISMAD                                 │
//! │                                                                         │
//! │  Front end                   Rust services                              │
//! │  ─────────                   ─────────────                              │
//! │                                                                         │
//! │  quotes.add_line(...)                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service method: Result<T, ApiError>                             │  │
//! │  │         │                                                        │  │
//! │  │  Bad field?  ──── ValidationError ─────────┐                    │  │
//! │  │  Zero volume? ─── CoreError::DegenerateVolume ┤                  │  │
//! │  │  Store failed? ── DbError::QueryFailed ────┴──► ApiError ──────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "DEGENERATE_VOLUME",                                         │
//! │    "message": "Line 'Ripa' has zero volume",                            │
//! │    "field": null }                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use sismad_core::{CoreError, ValidationError};
use sismad_db::DbError;
use thiserror::Error;

/// Error returned from service calls.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "width_cm must be positive",
///   "field": "width_cm"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Form field the error belongs to, for field-level messages.
    pub field: Option<String>,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Document not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// A line whose volume rounds to zero
    DegenerateVolume,

    /// Business rule violated (status workflow, wrong line kind)
    BusinessLogic,

    /// Store operation failed
    DatabaseError,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Attaches the offending form field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Result type of every service method.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        ApiError::validation(err.to_string()).with_field(field)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ClientNotFound(id) => ApiError::not_found("Client", &id),
            CoreError::SpeciesNotFound(id) => ApiError::not_found("Species", &id),
            CoreError::QuoteNotFound(id) => ApiError::not_found("Quote", &id),
            CoreError::ManifestNotFound(id) => ApiError::not_found("Manifest", &id),
            err @ CoreError::DegenerateVolume { .. } => {
                ApiError::new(ErrorCode::DegenerateVolume, err.to_string())
            }
            err @ (CoreError::MeasurementNotAllowed { .. }
            | CoreError::InvalidStatusTransition { .. }
            | CoreError::QuoteNotEditable { .. }
            | CoreError::LineNotFound { .. }
            | CoreError::TooManyLines { .. }
            | CoreError::EmptyDocument { .. }) => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
            err @ CoreError::InvalidDate(_) => ApiError::validation(err.to_string()),
        }
    }
}

/// Converts store errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
                    .with_field(field)
            }
            DbError::Rejected(e) => e.into(),
            DbError::InvalidDocument {
                collection,
                id,
                reason,
            } => {
                tracing::error!(%collection, %id, %reason, "Stored document is invalid");
                ApiError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored {} document '{}' is invalid", collection, id),
                )
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::InvalidField(e) => {
                tracing::error!("Invalid query field: {}", e);
                ApiError::internal("Invalid query")
            }
            DbError::QueryFailed(e) | DbError::Serialization(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Startup Errors
// =============================================================================

/// Errors while loading configuration or opening the store.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to save configuration: {0}")]
    ConfigSaveFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to write configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Store error: {0}")]
    Database(#[from] DbError),
}

pub type AppResult<T> = Result<T, AppError>;
