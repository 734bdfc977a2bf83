//! # sismad-core: Pure Business Logic for SISMAD
//!
//! This crate is the **heart** of SISMAD. It holds the wood-volume formulas,
//! the quote/manifest line-item aggregation and the document types, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SISMAD Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser front end                            │   │
//! │  │   Quote form ──► Lumber manifest form ──► Log manifest form     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 sismad-app (services)                           │   │
//! │  └──────────────┬───────────────────────────────┬──────────────────┘   │
//! │                 │                               │                       │
//! │  ┌──────────────▼──────────────┐  ┌─────────────▼──────────────────┐   │
//! │  │  sismad-core (THIS CRATE)   │  │  sismad-db                     │   │
//! │  │  volume · lines · money     │◄─│  DocumentStore (memory/sqlite) │   │
//! │  └─────────────────────────────┘  └────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`volume`] - Volume type and the piece/log formulas
//! - [`money`] - Money type with integer cents
//! - [`lines`] - Line items, measurements and aggregation
//! - [`types`] - Documents (Client, Species, Quote, Manifest)
//! - [`dates`] - Coercion of stored date representations
//! - [`format`] - pt-BR display formatting
//! - [`validation`] - Field-level validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **No I/O**: persistence lives in `sismad-db`
//! 3. **Integer storage**: money in cents, volume in thousandths of m³
//! 4. **Derived totals**: line totals and document totals are never entered
//!
//! ## Example Usage
//!
//! ```rust
//! use sismad_core::lines::{aggregate, LineItem, Measurement};
//! use sismad_core::money::Money;
//!
//! let board = LineItem::new(
//!     "Tábua 2,5 x 15",
//!     "species-cedro",
//!     Measurement::Direct { cubic_meters: 0.5 },
//!     Money::from_cents(100_00),
//! )
//! .unwrap();
//!
//! let totals = aggregate(&[board]);
//! assert_eq!(totals.total_value().cents(), 50_00);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dates;
pub mod error;
pub mod format;
pub mod lines;
pub mod money;
pub mod types;
pub mod validation;
pub mod volume;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use dates::DateParseError;
pub use error::{CoreError, CoreResult, ValidationError};
pub use lines::{aggregate, LineDocument, LineInput, LineItem, LineItems, Measurement, Totals};
pub use money::Money;
pub use types::*;
pub use volume::Volume;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Cubic centimeters in one cubic meter.
pub const CM3_PER_M3: f64 = 1_000_000.0;

/// Maximum line items on a single quote or manifest.
///
/// ## Business Reason
/// Documents are typed in by hand; a few hundred lines is already a full
/// truck. The cap catches runaway imports.
pub const MAX_LINE_ITEMS: usize = 500;

/// Maximum length of free-text fields (names, descriptions).
pub const MAX_TEXT_LEN: usize = 200;

/// Default validity of a quote, in days.
pub const DEFAULT_QUOTE_VALIDITY_DAYS: u32 = 15;

/// Longest validity a quote may carry, in days (ten years).
pub const MAX_QUOTE_VALIDITY_DAYS: u32 = 3650;

/// Largest volume of a single line, in thousandths of m³ (1 000 000 m³).
///
/// ## Business Reason
/// No real line comes close. The bound keeps every total of
/// [`MAX_LINE_ITEMS`] lines inside i64, priced at up to [`MAX_PRICE_CENTS`].
pub const MAX_LINE_VOLUME_DM3: i64 = 1_000_000_000;

/// Highest unit price accepted, in centavos per m³ (R$ 100.000.000,00).
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;
