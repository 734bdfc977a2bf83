//! # Volume Module
//!
//! The `Volume` type and the two wood-volume formulas.
//!
//! ## Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LUMBER PIECE (peça serrada)           LOG (tora)                       │
//! │                                                                         │
//! │   ┌────────────────────┐ thickness       d1 ◯══════════════◯ d2         │
//! │   │                    │                    ◄── length (m) ──►          │
//! │   └────────────────────┘                                                │
//! │    width × length, all in cm            mean diameter (d1+d2)/2 in cm   │
//! │                                                                         │
//! │   V = w × t × l × qty / 1 000 000       V = π × (d̄/100/2)² × length     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The log formula is the mean-diameter cylinder. It is NOT Smalian's or
//! Huber's formula; stored manifests were computed with this one and totals
//! must match them.
//!
//! ## Precision
//! Volumes are kept in thousandths of m³ (dm³), which is exactly the
//! 3-decimal precision used for storage and display.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::f64::consts::PI;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::format::format_volume;
use crate::CM3_PER_M3;

// =============================================================================
// Volume Type
// =============================================================================

/// A wood volume, rounded to 3 decimal places of m³.
///
/// Serialized as a JSON number of cubic meters (`0.563`), which is the shape
/// stored documents use. Addition saturates at the i64 bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Volume(i64);

impl Volume {
    /// Creates a volume from thousandths of a cubic meter.
    #[inline]
    pub const fn from_dm3(dm3: i64) -> Self {
        Volume(dm3)
    }

    /// Creates a volume from cubic meters, rounding half away from zero to
    /// 3 decimals. Non-finite input yields zero.
    ///
    /// ## Example
    /// ```rust
    /// use sismad_core::volume::Volume;
    ///
    /// assert_eq!(Volume::from_m3(0.5625).dm3(), 563);
    /// assert_eq!(Volume::from_m3(0.19635).dm3(), 196);
    /// assert_eq!(Volume::from_m3(f64::NAN), Volume::zero());
    /// ```
    pub fn from_m3(m3: f64) -> Self {
        if !m3.is_finite() {
            return Volume::zero();
        }
        Volume((m3 * 1000.0).round() as i64)
    }

    /// Thousandths of a cubic meter.
    #[inline]
    pub const fn dm3(&self) -> i64 {
        self.0
    }

    /// Cubic meters as a float (3 significant decimals).
    #[inline]
    pub fn m3(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Volume(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_volume(*self))
    }
}

impl Add for Volume {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Volume(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Volume {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sum for Volume {
    fn sum<I: Iterator<Item = Volume>>(iter: I) -> Self {
        iter.fold(Volume::zero(), Add::add)
    }
}

impl Serialize for Volume {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.m3())
    }
}

impl<'de> Deserialize<'de> for Volume {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let m3 = f64::deserialize(deserializer)?;
        Ok(Volume::from_m3(m3))
    }
}

// =============================================================================
// Formulas
// =============================================================================

fn all_positive(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite() && *v > 0.0)
}

/// Exact volume of rectangular pieces in m³ (unrounded).
///
/// Returns 0.0 for any non-finite or non-positive input.
pub fn raw_piece_volume(width_cm: f64, thickness_cm: f64, length_cm: f64, quantity: f64) -> f64 {
    if !all_positive(&[width_cm, thickness_cm, length_cm, quantity]) {
        return 0.0;
    }
    width_cm * thickness_cm * length_cm * quantity / CM3_PER_M3
}

/// Exact volume of a tapered log in m³ (unrounded), mean-diameter cylinder.
///
/// Returns 0.0 for any non-finite or non-positive input.
pub fn raw_log_volume(diameter1_cm: f64, diameter2_cm: f64, length_m: f64) -> f64 {
    if !all_positive(&[diameter1_cm, diameter2_cm, length_m]) {
        return 0.0;
    }
    let mean_diameter_m = (diameter1_cm + diameter2_cm) / 2.0 / 100.0;
    let radius_m = mean_diameter_m / 2.0;
    PI * radius_m * radius_m * length_m
}

/// Volume of `quantity` rectangular pieces, rounded to 3 decimals.
///
/// ## Example
/// ```rust
/// use sismad_core::volume::piece_volume;
///
/// // 30 × 5 × 300 cm × 4 pieces = 180 000 cm³ = 0.180 m³
/// assert_eq!(piece_volume(30.0, 5.0, 300.0, 4.0).dm3(), 180);
///
/// // Missing dimension → zero (caller must have validated)
/// assert!(piece_volume(0.0, 5.0, 300.0, 4.0).is_zero());
/// ```
pub fn piece_volume(width_cm: f64, thickness_cm: f64, length_cm: f64, quantity: f64) -> Volume {
    Volume::from_m3(raw_piece_volume(width_cm, thickness_cm, length_cm, quantity))
}

/// Volume of a tapered log, rounded to 3 decimals.
///
/// ## Example
/// ```rust
/// use sismad_core::volume::log_volume;
///
/// // d1 = 30 cm, d2 = 20 cm, 4 m → π × 0.125² × 4 ≈ 0.19635 m³
/// assert_eq!(log_volume(30.0, 20.0, 4.0).dm3(), 196);
/// ```
pub fn log_volume(diameter1_cm: f64, diameter2_cm: f64, length_m: f64) -> Volume {
    Volume::from_m3(raw_log_volume(diameter1_cm, diameter2_cm, length_m))
}

// =============================================================================
// Unit Tests
// =============================================================================
