//! # Line Items
//!
//! Measurements, line items and the aggregation that produces document
//! totals for quotes and manifests.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    From form fields to totals                           │
//! │                                                                         │
//! │  LineInput (raw form values, fields may be missing)                    │
//! │       │                                                                 │
//! │       ▼  validation (field-level errors, calculator NOT called)        │
//! │  Measurement (Piece | Log | Direct)                                    │
//! │       │                                                                 │
//! │       ▼  volume formula, rounded to 0.001 m³                           │
//! │  LineItem { volume, unit_price, line_total = volume × unit_price }     │
//! │       │         (zero volume → DegenerateVolume, never saved)          │
//! │       ▼                                                                 │
//! │  LineItems ──► aggregate() ──► Totals { total_volume, total_value }    │
//! │                  (recomputed from scratch on every mutation)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Direct Volume Mode
//! Some lines are priced by a volume the user already knows (e.g. a lot of
//! mixed offcuts). That is an explicit [`Measurement::Direct`] chosen by the
//! user. Incomplete piece dimensions are never reinterpreted as a volume.

use serde::{Deserialize, Serialize};
use std::ops::Add;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{
    validate_dimension, validate_line_volume, validate_price_cents, validate_required,
    validate_text,
};
use crate::volume::{log_volume, piece_volume, Volume};
use crate::{MAX_LINE_ITEMS, MAX_PRICE_CENTS};

// =============================================================================
// Measurement
// =============================================================================

/// How the volume of a line is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Measurement {
    /// Rectangular sawn pieces, dimensions in centimeters.
    Piece {
        width_cm: f64,
        thickness_cm: f64,
        length_cm: f64,
        quantity: f64,
    },
    /// A tapered round log: end diameters in centimeters, length in meters.
    Log {
        diameter1_cm: f64,
        diameter2_cm: f64,
        length_m: f64,
    },
    /// Volume typed in directly by the user.
    Direct { cubic_meters: f64 },
}

impl Measurement {
    /// Computes the rounded volume. Total function: out-of-domain values
    /// give zero.
    pub fn volume(&self) -> Volume {
        match *self {
            Measurement::Piece {
                width_cm,
                thickness_cm,
                length_cm,
                quantity,
            } => piece_volume(width_cm, thickness_cm, length_cm, quantity),
            Measurement::Log {
                diameter1_cm,
                diameter2_cm,
                length_m,
            } => log_volume(diameter1_cm, diameter2_cm, length_m),
            Measurement::Direct { cubic_meters } => Volume::from_m3(cubic_meters.max(0.0)),
        }
    }

    /// Checks every numeric field is finite and positive, and that the
    /// resulting volume stays within the line limit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let volume_field = match *self {
            Measurement::Piece {
                width_cm,
                thickness_cm,
                length_cm,
                quantity,
            } => {
                validate_dimension("width_cm", Some(width_cm))?;
                validate_dimension("thickness_cm", Some(thickness_cm))?;
                validate_dimension("length_cm", Some(length_cm))?;
                validate_dimension("quantity", Some(quantity))?;
                "quantity"
            }
            Measurement::Log {
                diameter1_cm,
                diameter2_cm,
                length_m,
            } => {
                validate_dimension("diameter1_cm", Some(diameter1_cm))?;
                validate_dimension("diameter2_cm", Some(diameter2_cm))?;
                validate_dimension("length_m", Some(length_m))?;
                "length_m"
            }
            Measurement::Direct { cubic_meters } => {
                validate_dimension("cubic_meters", Some(cubic_meters))?;
                "cubic_meters"
            }
        };
        validate_line_volume(volume_field, self.volume())
    }

    /// Short name of the shape, as used in messages and serialization.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Measurement::Piece { .. } => "piece",
            Measurement::Log { .. } => "log",
            Measurement::Direct { .. } => "direct",
        }
    }
}

// =============================================================================
// Form Input
// =============================================================================

/// Raw measurement fields as captured by an entry form.
///
/// Every field is optional so a half-filled form can still be validated
/// field by field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MeasurementInput {
    Piece {
        width_cm: Option<f64>,
        thickness_cm: Option<f64>,
        length_cm: Option<f64>,
        quantity: Option<f64>,
    },
    Log {
        diameter1_cm: Option<f64>,
        diameter2_cm: Option<f64>,
        length_m: Option<f64>,
    },
    Direct { cubic_meters: Option<f64> },
}

impl MeasurementInput {
    /// Validates each field and builds the measurement.
    ///
    /// The first failing field is reported.
    pub fn into_measurement(self) -> Result<Measurement, ValidationError> {
        let measurement = match self {
            MeasurementInput::Piece {
                width_cm,
                thickness_cm,
                length_cm,
                quantity,
            } => Measurement::Piece {
                width_cm: validate_dimension("width_cm", width_cm)?,
                thickness_cm: validate_dimension("thickness_cm", thickness_cm)?,
                length_cm: validate_dimension("length_cm", length_cm)?,
                quantity: validate_dimension("quantity", quantity)?,
            },
            MeasurementInput::Log {
                diameter1_cm,
                diameter2_cm,
                length_m,
            } => Measurement::Log {
                diameter1_cm: validate_dimension("diameter1_cm", diameter1_cm)?,
                diameter2_cm: validate_dimension("diameter2_cm", diameter2_cm)?,
                length_m: validate_dimension("length_m", length_m)?,
            },
            MeasurementInput::Direct { cubic_meters } => Measurement::Direct {
                cubic_meters: validate_dimension("cubic_meters", cubic_meters)?,
            },
        };
        Ok(measurement)
    }
}

/// A line as submitted by a quote or manifest form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub species_id: String,
    pub measurement: MeasurementInput,
    /// Price per m³ in centavos.
    pub unit_price_cents: Option<i64>,
}

// =============================================================================
// Line Item
// =============================================================================

/// Stored shape of a line item.
///
/// `volume` and `line_total_cents` are written for readers of the raw
/// document but ignored on load: [`LineItem`] re-derives both.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemRecord {
    #[serde(default)]
    pub description: String,
    pub species_id: String,
    pub measurement: Measurement,
    #[serde(default)]
    #[ts(type = "number")]
    pub volume: Volume,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub line_total_cents: i64,
}

/// A quote or manifest line with its derived volume and total.
///
/// Fields are private: the only way to get a `LineItem` is through a
/// constructor that computes `volume` and `line_total` from the measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineItemRecord", into = "LineItemRecord")]
pub struct LineItem {
    description: String,
    species_id: String,
    measurement: Measurement,
    volume: Volume,
    unit_price: Money,
    line_total: Money,
}

impl LineItem {
    /// Builds a line from an already-typed measurement.
    ///
    /// ## Errors
    /// - `Validation` when a dimension is non-finite or not positive, the
    ///   species is missing, the price is outside `0..=MAX_PRICE_CENTS`, or
    ///   the volume exceeds `MAX_LINE_VOLUME_DM3`
    /// - `DegenerateVolume` when the volume rounds to 0.000 m³
    pub fn new(
        description: impl Into<String>,
        species_id: impl Into<String>,
        measurement: Measurement,
        unit_price: Money,
    ) -> CoreResult<Self> {
        let description = description.into().trim().to_string();
        let species_id = species_id.into().trim().to_string();

        validate_text("description", &description)?;
        validate_required("species_id", &species_id)?;
        measurement.validate()?;
        validate_price_cents("unit_price", unit_price.cents())?;

        let volume = measurement.volume();
        if volume.is_zero() {
            return Err(CoreError::DegenerateVolume { description });
        }
        let line_total = unit_price
            .for_volume(volume)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "unit_price".to_string(),
                min: 0,
                max: MAX_PRICE_CENTS,
            })?;

        Ok(LineItem {
            description,
            species_id,
            measurement,
            volume,
            unit_price,
            line_total,
        })
    }

    /// Builds a line from raw form input.
    pub fn from_input(input: LineInput) -> CoreResult<Self> {
        let measurement = input.measurement.into_measurement()?;
        let cents = input.unit_price_cents.ok_or_else(|| ValidationError::Required {
            field: "unit_price".to_string(),
        })?;
        LineItem::new(
            input.description,
            input.species_id,
            measurement,
            Money::from_cents(cents),
        )
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn species_id(&self) -> &str {
        &self.species_id
    }

    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Price per m³.
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn line_total(&self) -> Money {
        self.line_total
    }
}

impl TryFrom<LineItemRecord> for LineItem {
    type Error = CoreError;

    fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
        LineItem::new(
            record.description,
            record.species_id,
            record.measurement,
            Money::from_cents(record.unit_price_cents),
        )
    }
}

impl From<LineItem> for LineItemRecord {
    fn from(item: LineItem) -> Self {
        LineItemRecord {
            description: item.description,
            species_id: item.species_id,
            measurement: item.measurement,
            volume: item.volume,
            unit_price_cents: item.unit_price.cents(),
            line_total_cents: item.line_total.cents(),
        }
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Totals of a line list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    #[ts(type = "number")]
    pub total_volume: Volume,
    pub total_value_cents: i64,
}

impl Totals {
    pub fn total_value(&self) -> Money {
        Money::from_cents(self.total_value_cents)
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Totals {
            total_volume: self.total_volume + other.total_volume,
            total_value_cents: self.total_value_cents.saturating_add(other.total_value_cents),
        }
    }
}

/// Sums volumes and line totals. Pure linear reduction; the result does not
/// depend on the order of `items`. Never panics: sums saturate.
///
/// ## Example
/// ```rust
/// use sismad_core::lines::{aggregate, LineItem, Measurement};
/// use sismad_core::money::Money;
///
/// let a = LineItem::new("A", "sp-1", Measurement::Direct { cubic_meters: 0.5 }, Money::from_cents(100_00)).unwrap();
/// let b = LineItem::new("B", "sp-2", Measurement::Direct { cubic_meters: 1.2 }, Money::from_cents(200_00)).unwrap();
///
/// let totals = aggregate(&[a, b]);
/// assert_eq!(totals.total_volume.dm3(), 1700);
/// assert_eq!(totals.total_value().cents(), 290_00);
/// ```
pub fn aggregate(items: &[LineItem]) -> Totals {
    items.iter().fold(Totals::default(), |acc, item| Totals {
        total_volume: acc.total_volume + item.volume(),
        total_value_cents: acc
            .total_value_cents
            .saturating_add(item.line_total().cents()),
    })
}

// =============================================================================
// Line Item List
// =============================================================================

/// The ordered line list of a quote or manifest being edited.
///
/// ## Invariants
/// - At most [`MAX_LINE_ITEMS`] lines
/// - Totals are never cached; [`LineItems::totals`] aggregates from scratch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItems {
    items: Vec<LineItem>,
}

impl LineItems {
    pub fn new() -> Self {
        LineItems { items: Vec::new() }
    }

    /// Appends a line and returns the fresh totals.
    pub fn push(&mut self, item: LineItem) -> CoreResult<Totals> {
        if self.items.len() >= MAX_LINE_ITEMS {
            return Err(CoreError::TooManyLines {
                max: MAX_LINE_ITEMS,
            });
        }
        self.items.push(item);
        Ok(self.totals())
    }

    /// Replaces the line at `index` and returns the fresh totals.
    pub fn replace(&mut self, index: usize, item: LineItem) -> CoreResult<Totals> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(CoreError::LineNotFound { index, len })?;
        *slot = item;
        Ok(self.totals())
    }

    /// Removes the line at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> CoreResult<LineItem> {
        if index >= self.items.len() {
            return Err(CoreError::LineNotFound {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn totals(&self) -> Totals {
        aggregate(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[LineItem] {
        &self.items
    }
}

impl From<Vec<LineItem>> for LineItems {
    fn from(items: Vec<LineItem>) -> Self {
        LineItems { items }
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// =============================================================================
// Documents with lines
// =============================================================================

/// Shared editing behavior of quotes and manifests.
///
/// Each mutation goes through the document so its stored totals are
/// refreshed immediately after the line list changes.
pub trait LineDocument {
    /// Human name used in error messages ("Quote", "Log manifest", ...).
    fn document_name(&self) -> String;

    fn lines(&self) -> &LineItems;

    fn lines_mut(&mut self) -> &mut LineItems;

    /// Stores the given totals on the document header.
    fn set_totals(&mut self, totals: Totals);

    /// Whether lines with this measurement shape may be added.
    fn accepts(&self, _measurement: &Measurement) -> bool {
        true
    }

    fn check_accepts(&self, measurement: &Measurement) -> CoreResult<()> {
        if self.accepts(measurement) {
            Ok(())
        } else {
            Err(CoreError::MeasurementNotAllowed {
                document: self.document_name(),
                measurement: measurement.mode_name().to_string(),
            })
        }
    }

    fn add_line(&mut self, item: LineItem) -> CoreResult<Totals> {
        self.check_accepts(item.measurement())?;
        let totals = self.lines_mut().push(item)?;
        self.set_totals(totals);
        Ok(totals)
    }

    fn replace_line(&mut self, index: usize, item: LineItem) -> CoreResult<Totals> {
        self.check_accepts(item.measurement())?;
        let totals = self.lines_mut().replace(index, item)?;
        self.set_totals(totals);
        Ok(totals)
    }

    fn remove_line(&mut self, index: usize) -> CoreResult<Totals> {
        self.lines_mut().remove(index)?;
        let totals = self.lines().totals();
        self.set_totals(totals);
        Ok(totals)
    }

    /// Recomputes totals from the current lines.
    fn refresh_totals(&mut self) -> Totals {
        let totals = self.lines().totals();
        self.set_totals(totals);
        totals
    }

    /// Checks the document can be saved: at least one line, every line of
    /// an accepted shape.
    fn check_saveable(&self) -> CoreResult<()> {
        if self.lines().is_empty() {
            return Err(CoreError::EmptyDocument {
                document: self.document_name(),
            });
        }
        for item in self.lines() {
            self.check_accepts(item.measurement())?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
