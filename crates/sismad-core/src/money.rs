//! # Money Module
//!
//! Provides the `Money` type for monetary values (Brazilian reais).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                   │
//! │                                                                         │
//! │  A quote with 300 lines summed in floats drifts by fractions of a      │
//! │  centavo, and the printed total stops matching the sum of the lines.   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    Each line total is rounded to cents once, when it is derived.       │
//! │    Document totals are exact integer sums of those line totals.        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Rule
//! Round half away from zero, everywhere (volume and money).
//!
//! ## Usage
//! ```rust
//! use sismad_core::money::Money;
//! use sismad_core::volume::Volume;
//!
//! let price_per_m3 = Money::from_cents(1_850_00); // R$ 1.850,00 / m³
//! let volume = Volume::from_m3(0.563);
//!
//! let line_total = price_per_m3.for_volume(volume).unwrap();
//! assert_eq!(line_total.cents(), 1_041_55); // 1850 × 0.563 = 1041.55
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::format::format_currency;
use crate::volume::Volume;

// =============================================================================
// Money Type
// =============================================================================

/// Monetary value in centavos.
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts and corrections may be negative
/// - **Saturating arithmetic**: sums clamp at the i64 bounds instead of
///   wrapping
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Species.default_price ──► LineItem.unit_price (per m³)
///                                   │
///                                   ▼ × LineItem.volume
///                           LineItem.line_total
///                                   │
///                                   ▼ Σ
///                           Quote.total_value / Manifest.total_value
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from reais and centavos.
    ///
    /// ## Example
    /// ```rust
    /// use sismad_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole reais portion (truncated toward zero).
    #[inline]
    pub const fn reais(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavos portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Prices a volume at this per-m³ rate.
    ///
    /// ## Implementation
    /// Volume is held in thousandths of m³, so the exact product is
    /// `cents × dm³ / 1000`. Integer math with i128, rounded half away
    /// from zero: `(p ± 500) / 1000`. Returns `None` when the result does
    /// not fit in i64 centavos.
    ///
    /// ## Example
    /// ```rust
    /// use sismad_core::money::Money;
    /// use sismad_core::volume::Volume;
    ///
    /// let price = Money::from_cents(200_00);
    /// assert_eq!(price.for_volume(Volume::from_m3(1.2)).unwrap().cents(), 240_00);
    ///
    /// // 0.005 m³ at R$ 1,00 = R$ 0,005 → rounds away from zero to R$ 0,01
    /// let price = Money::from_cents(1_00);
    /// assert_eq!(price.for_volume(Volume::from_m3(0.005)).unwrap().cents(), 1);
    /// ```
    pub fn for_volume(&self, volume: Volume) -> Option<Money> {
        let product = self.0 as i128 * volume.dm3() as i128;
        let rounded = if product >= 0 {
            (product + 500) / 1000
        } else {
            (product - 500) / 1000
        };
        i64::try_from(rounded).ok().map(Money)
    }

    /// Converts a decimal reais amount, rounding half away from zero.
    ///
    /// Only for values read from legacy documents, which stored prices as
    /// JSON numbers. Non-finite input yields zero.
    pub fn from_reais_f64(reais: f64) -> Money {
        if !reais.is_finite() {
            return Money::zero();
        }
        Money((reais * 100.0).round() as i64)
    }

    /// The value as decimal reais (for display and export only).
    #[inline]
    pub fn as_reais_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays in pt-BR currency format, e.g. `R$ 1.234,56`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_currency(*self))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
