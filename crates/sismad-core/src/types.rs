//! # Domain Types
//!
//! The four document kinds SISMAD stores.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │     Client      │   │     Species     │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  id (UUID)      │   │  id (UUID)      │                              │
//! │  │  name           │   │  name           │                              │
//! │  │  tax_id (CPF/   │   │  default_price  │──── suggested unit price     │
//! │  │         CNPJ)   │   │  density        │                              │
//! │  └────────┬────────┘   └─────────────────┘                              │
//! │           │ client_id                                                   │
//! │  ┌────────▼────────┐   ┌─────────────────┐                              │
//! │  │  Quote (ORC-)   │◄──│ Manifest (ROM-) │ quote_id (optional)          │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  status         │   │  kind: lumber   │                              │
//! │  │  valid_until    │   │        | log    │                              │
//! │  │  items ─────────┼───┼─ items          │──── LineItems                │
//! │  │  totals         │   │  totals         │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Quotes and manifests have:
//! - `id`: UUID v4, used for references between documents
//! - `number`: human-readable (`ORC-20240305-1A2B`), printed on paper

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::dates::{deserialize_date, deserialize_timestamp};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::lines::{LineDocument, LineItems, Measurement, Totals};
use crate::money::Money;
use crate::validation::{
    validate_density, validate_email, validate_line_count, validate_name, validate_price_cents,
    validate_required, validate_state_code, validate_tax_id, validate_text, validate_validity_days,
};
use crate::volume::Volume;

fn default_true() -> bool {
    true
}

/// Trims an optional text field, mapping blank to `None`.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds a printed document number: `PREFIX-YYYYMMDD-XXXX`.
///
/// The suffix is the first four hex digits of the document id, upper-cased.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use sismad_core::types::document_number;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// let number = document_number("ORC", date, "1a2b3c4d-0000-4000-8000-000000000000");
/// assert_eq!(number, "ORC-20240305-1A2B");
/// ```
pub fn document_number(prefix: &str, date: NaiveDate, id: &str) -> String {
    let suffix: String = id
        .chars()
        .filter(char::is_ascii_hexdigit)
        .take(4)
        .collect::<String>()
        .to_uppercase();
    format!("{prefix}-{}-{suffix}", date.format("%Y%m%d"))
}

// =============================================================================
// Client
// =============================================================================

/// A customer buying or receiving wood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Client {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Person or company name.
    pub name: String,

    /// CPF or CNPJ, digits only.
    #[serde(default)]
    pub tax_id: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    /// Two-letter state code (UF).
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Whether the client is active (soft delete).
    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(deserialize_with = "deserialize_timestamp")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Client form values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientInput {
    pub name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Client {
    /// Creates a client from form values, normalizing tax id and state.
    pub fn from_input(input: ClientInput, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut client = Client {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            tax_id: None,
            phone: None,
            email: None,
            address: None,
            city: None,
            state: None,
            notes: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        client.apply(input, now)?;
        Ok(client)
    }

    /// Overwrites the editable fields with validated form values.
    ///
    /// On error the client is left unchanged.
    pub fn apply(&mut self, input: ClientInput, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let name = input.name.trim().to_string();
        validate_name("name", &name)?;

        let tax_id = clean(input.tax_id)
            .map(|raw| validate_tax_id(&raw))
            .transpose()?;
        let email = clean(input.email);
        if let Some(email) = &email {
            validate_email(email)?;
        }
        let state = clean(input.state)
            .map(|raw| validate_state_code(&raw))
            .transpose()?;

        let phone = clean(input.phone);
        let address = clean(input.address);
        let city = clean(input.city);
        let notes = clean(input.notes);
        for (field, value) in [("phone", &phone), ("address", &address), ("city", &city)] {
            if let Some(value) = value {
                validate_text(field, value)?;
            }
        }

        self.name = name;
        self.tax_id = tax_id;
        self.phone = phone;
        self.email = email;
        self.address = address;
        self.city = city;
        self.state = state;
        self.notes = notes;
        self.updated_at = now;
        Ok(())
    }

    /// Checks a stored client is well formed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required("id", &self.id)?;
        validate_name("name", &self.name)?;
        if let Some(tax_id) = &self.tax_id {
            validate_tax_id(tax_id)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(state) = &self.state {
            validate_state_code(state)?;
        }
        Ok(())
    }
}

// =============================================================================
// Species
// =============================================================================

/// A wood species in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Species {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Common name (e.g. "Cedro", "Eucalipto").
    pub name: String,

    #[serde(default)]
    pub scientific_name: Option<String>,

    /// Suggested price per m³ in centavos.
    #[serde(default)]
    pub default_price_cents: Option<i64>,

    /// Density in kg/m³.
    #[serde(default)]
    pub density_kg_m3: Option<f64>,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(deserialize_with = "deserialize_timestamp")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Species form values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SpeciesInput {
    pub name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub default_price_cents: Option<i64>,
    #[serde(default)]
    pub density_kg_m3: Option<f64>,
}

impl Species {
    pub fn from_input(input: SpeciesInput, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut species = Species {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            scientific_name: None,
            default_price_cents: None,
            density_kg_m3: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        species.apply(input, now)?;
        Ok(species)
    }

    /// Overwrites the editable fields with validated form values.
    pub fn apply(&mut self, input: SpeciesInput, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let name = input.name.trim().to_string();
        validate_name("name", &name)?;
        let scientific_name = clean(input.scientific_name);
        if let Some(scientific) = &scientific_name {
            validate_text("scientific_name", scientific)?;
        }
        if let Some(cents) = input.default_price_cents {
            validate_price_cents("default_price_cents", cents)?;
        }
        if let Some(density) = input.density_kg_m3 {
            validate_density(density)?;
        }

        self.name = name;
        self.scientific_name = scientific_name;
        self.default_price_cents = input.default_price_cents;
        self.density_kg_m3 = input.density_kg_m3;
        self.updated_at = now;
        Ok(())
    }

    /// Suggested unit price for new lines of this species.
    pub fn default_price(&self) -> Option<Money> {
        self.default_price_cents.map(Money::from_cents)
    }

    /// Weight estimate of a volume of this species, in kg.
    pub fn weight_kg(&self, volume: Volume) -> Option<f64> {
        self.density_kg_m3.map(|density| density * volume.m3())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_required("id", &self.id)?;
        validate_name("name", &self.name)?;
        if let Some(cents) = self.default_price_cents {
            validate_price_cents("default_price_cents", cents)?;
        }
        if let Some(density) = self.density_kg_m3 {
            validate_density(density)?;
        }
        Ok(())
    }
}

// =============================================================================
// Quote
// =============================================================================

/// Quote lifecycle.
///
/// ```text
///            ┌──────────► Approved
///            │
///  Pending ──┼──────────► Expired
///     ▲      │
///     │      └──────────► Rejected
///     └──── reopen ──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::Pending, QuoteStatus::Approved)
                | (QuoteStatus::Pending, QuoteStatus::Rejected)
                | (QuoteStatus::Pending, QuoteStatus::Expired)
                | (QuoteStatus::Rejected, QuoteStatus::Pending)
        )
    }

    /// Lines may only be edited while the quote is pending.
    pub fn is_editable(&self) -> bool {
        *self == QuoteStatus::Pending
    }
}

/// A price quote (orçamento).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Printed number, `ORC-YYYYMMDD-XXXX`.
    pub number: String,

    pub client_id: String,

    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub issue_date: NaiveDate,

    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub valid_until: NaiveDate,

    #[serde(default)]
    pub status: QuoteStatus,

    #[serde(default)]
    #[ts(as = "Vec<crate::lines::LineItemRecord>")]
    pub items: LineItems,

    /// Σ line volumes (derived).
    #[serde(default)]
    #[ts(type = "number")]
    pub total_volume: Volume,

    /// Σ line totals in centavos (derived).
    #[serde(default)]
    pub total_value_cents: i64,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Starts an empty pending quote valid for `validity_days`.
    ///
    /// ## Errors
    /// `Validation` on `quote_validity_days` when the period is outside
    /// `1..=MAX_QUOTE_VALIDITY_DAYS` or runs past the last representable
    /// date.
    pub fn new(
        client_id: impl Into<String>,
        issue_date: NaiveDate,
        validity_days: u32,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        validate_validity_days(validity_days)?;
        let valid_until = issue_date
            .checked_add_days(Days::new(u64::from(validity_days)))
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "quote_validity_days".to_string(),
                min: 1,
                max: i64::from(crate::MAX_QUOTE_VALIDITY_DAYS),
            })?;

        let id = Uuid::new_v4().to_string();
        Ok(Quote {
            number: document_number("ORC", issue_date, &id),
            id,
            client_id: client_id.into(),
            issue_date,
            valid_until,
            status: QuoteStatus::Pending,
            items: LineItems::new(),
            total_volume: Volume::zero(),
            total_value_cents: 0,
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn total_value(&self) -> Money {
        Money::from_cents(self.total_value_cents)
    }

    /// A pending quote whose validity ended before `today`.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.status == QuoteStatus::Pending && today > self.valid_until
    }

    /// Moves the quote to `next`.
    ///
    /// ## Errors
    /// `InvalidStatusTransition` for any move not in the lifecycle diagram.
    pub fn transition(&mut self, next: QuoteStatus, now: DateTime<Utc>) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                quote_id: self.id.clone(),
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Fails unless the quote's lines may still be edited.
    pub fn check_editable(&self) -> CoreResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(CoreError::QuoteNotEditable {
                quote_id: self.id.clone(),
                status: self.status.as_str().to_string(),
            })
        }
    }

    /// Checks a stored quote is well formed.
    pub fn validate(&self) -> CoreResult<()> {
        validate_required("id", &self.id)?;
        validate_required("number", &self.number)?;
        validate_required("client_id", &self.client_id)?;
        validate_line_count(self.items.len())?;
        if self.valid_until < self.issue_date {
            return Err(ValidationError::InvalidFormat {
                field: "valid_until".to_string(),
                reason: "must not be before the issue date".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl LineDocument for Quote {
    fn document_name(&self) -> String {
        format!("Quote {}", self.number)
    }

    fn lines(&self) -> &LineItems {
        &self.items
    }

    fn lines_mut(&mut self) -> &mut LineItems {
        &mut self.items
    }

    fn set_totals(&mut self, totals: Totals) {
        self.total_volume = totals.total_volume;
        self.total_value_cents = totals.total_value_cents;
    }
}

// =============================================================================
// Manifest
// =============================================================================

/// Which kind of wood a manifest lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    /// Sawn lumber (madeira serrada): piece and direct-volume lines.
    Lumber,
    /// Round logs (toras): log lines only.
    Log,
}

impl ManifestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestKind::Lumber => "lumber",
            ManifestKind::Log => "log",
        }
    }

    pub fn accepts(&self, measurement: &Measurement) -> bool {
        match self {
            ManifestKind::Lumber => matches!(
                measurement,
                Measurement::Piece { .. } | Measurement::Direct { .. }
            ),
            ManifestKind::Log => matches!(measurement, Measurement::Log { .. }),
        }
    }
}

/// A delivery manifest (romaneio).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Manifest {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Printed number, `ROM-YYYYMMDD-XXXX`.
    pub number: String,

    pub kind: ManifestKind,

    pub client_id: String,

    #[serde(deserialize_with = "deserialize_date")]
    #[ts(as = "String")]
    pub date: NaiveDate,

    /// Quote this delivery fulfils, if any.
    #[serde(default)]
    pub quote_id: Option<String>,

    #[serde(default)]
    pub vehicle_plate: Option<String>,

    #[serde(default)]
    pub driver: Option<String>,

    #[serde(default)]
    #[ts(as = "Vec<crate::lines::LineItemRecord>")]
    pub items: LineItems,

    #[serde(default)]
    #[ts(type = "number")]
    pub total_volume: Volume,

    #[serde(default)]
    pub total_value_cents: i64,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Manifest {
    /// Starts an empty manifest of the given kind.
    pub fn new(
        kind: ManifestKind,
        client_id: impl Into<String>,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        Manifest {
            number: document_number("ROM", date, &id),
            id,
            kind,
            client_id: client_id.into(),
            date,
            quote_id: None,
            vehicle_plate: None,
            driver: None,
            items: LineItems::new(),
            total_volume: Volume::zero(),
            total_value_cents: 0,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn total_value(&self) -> Money {
        Money::from_cents(self.total_value_cents)
    }

    pub fn validate(&self) -> CoreResult<()> {
        validate_required("id", &self.id)?;
        validate_required("number", &self.number)?;
        validate_required("client_id", &self.client_id)?;
        validate_line_count(self.items.len())?;
        if let Some(plate) = &self.vehicle_plate {
            validate_text("vehicle_plate", plate)?;
        }
        for item in &self.items {
            self.check_accepts(item.measurement())?;
        }
        Ok(())
    }
}

impl LineDocument for Manifest {
    fn document_name(&self) -> String {
        match self.kind {
            ManifestKind::Lumber => format!("Lumber manifest {}", self.number),
            ManifestKind::Log => format!("Log manifest {}", self.number),
        }
    }

    fn lines(&self) -> &LineItems {
        &self.items
    }

    fn lines_mut(&mut self) -> &mut LineItems {
        &mut self.items
    }

    fn set_totals(&mut self, totals: Totals) {
        self.total_volume = totals.total_volume;
        self.total_value_cents = totals.total_value_cents;
    }

    fn accepts(&self, measurement: &Measurement) -> bool {
        self.kind.accepts(measurement)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::LineItem;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn log_line() -> LineItem {
        LineItem::new(
            "Tora",
            "sp-1",
            Measurement::Log {
                diameter1_cm: 30.0,
                diameter2_cm: 20.0,
                length_m: 4.0,
            },
            Money::from_cents(500_00),
        )
        .unwrap()
    }

    fn direct_line(m3: f64, cents: i64) -> LineItem {
        LineItem::new(
            "Lote",
            "sp-1",
            Measurement::Direct { cubic_meters: m3 },
            Money::from_cents(cents),
        )
        .unwrap()
    }

    #[test]
    fn test_client_from_input_normalizes() {
        let input = ClientInput {
            name: "  Madeireira São José ".to_string(),
            tax_id: Some("12.345.678/0001-95".to_string()),
            state: Some("pr".to_string()),
            email: Some("  ".to_string()),
            ..Default::default()
        };
        let client = Client::from_input(input, Utc::now()).unwrap();
        assert_eq!(client.name, "Madeireira São José");
        assert_eq!(client.tax_id.as_deref(), Some("12345678000195"));
        assert_eq!(client.state.as_deref(), Some("PR"));
        assert_eq!(client.email, None);
        assert!(client.active);
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_client_apply_keeps_state_on_error() {
        let mut client = Client::from_input(
            ClientInput {
                name: "Serraria Bom Pinho".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        let err = client
            .apply(
                ClientInput {
                    name: "Outro".to_string(),
                    email: Some("invalido".to_string()),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err.field(), "email");
        assert_eq!(client.name, "Serraria Bom Pinho");
    }

    #[test]
    fn test_client_loads_timestamp_objects() {
        let client: Client = serde_json::from_value(json!({
            "id": "abc",
            "name": "Cliente",
            "created_at": {"_seconds": 1709647200, "_nanoseconds": 0},
            "updated_at": "2024-03-05T10:00:00Z"
        }))
        .unwrap();
        assert!(client.active);
        assert_eq!(client.created_at.date_naive(), ymd(2024, 3, 5));
    }

    #[test]
    fn test_species_rejects_negative_price() {
        let err = Species::from_input(
            SpeciesInput {
                name: "Cedro".to_string(),
                default_price_cents: Some(-1),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_species_weight() {
        let species = Species::from_input(
            SpeciesInput {
                name: "Eucalipto".to_string(),
                density_kg_m3: Some(800.0),
                default_price_cents: Some(450_00),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        let weight = species.weight_kg(Volume::from_m3(0.5)).unwrap();
        assert!((weight - 400.0).abs() < 1e-9);
        assert_eq!(species.default_price(), Some(Money::from_cents(450_00)));
    }

    #[test]
    fn test_new_quote() {
        let quote = Quote::new("client-1", ymd(2024, 3, 5), 15, Utc::now()).unwrap();
        assert_eq!(quote.valid_until, ymd(2024, 3, 20));
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert!(quote.number.starts_with("ORC-20240305-"));
        assert_eq!(quote.number.len(), "ORC-20240305-XXXX".len());
        assert!(quote.validate().is_ok());
    }

    #[test]
    fn test_new_quote_rejects_out_of_range_validity() {
        for days in [0, crate::MAX_QUOTE_VALIDITY_DAYS + 1, u32::MAX] {
            let err = Quote::new("client-1", ymd(2024, 3, 5), days, Utc::now()).unwrap_err();
            match err {
                CoreError::Validation(v) => assert_eq!(v.field(), "quote_validity_days"),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        let quote = Quote::new(
            "client-1",
            ymd(2024, 3, 5),
            crate::MAX_QUOTE_VALIDITY_DAYS,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(quote.valid_until, ymd(2034, 3, 3));

        // the calendar ends before the validity does
        assert!(Quote::new("client-1", NaiveDate::MAX, 1, Utc::now()).is_err());
    }

    #[test]
    fn test_quote_expiry() {
        let mut quote = Quote::new("client-1", ymd(2024, 3, 5), 15, Utc::now()).unwrap();
        assert!(!quote.is_expired_on(ymd(2024, 3, 20)));
        assert!(quote.is_expired_on(ymd(2024, 3, 21)));

        quote.transition(QuoteStatus::Approved, Utc::now()).unwrap();
        assert!(!quote.is_expired_on(ymd(2025, 1, 1)));
    }

    #[test]
    fn test_quote_transitions() {
        let mut quote = Quote::new("client-1", ymd(2024, 3, 5), 15, Utc::now()).unwrap();
        quote.transition(QuoteStatus::Rejected, Utc::now()).unwrap();
        quote.transition(QuoteStatus::Pending, Utc::now()).unwrap();
        quote.transition(QuoteStatus::Approved, Utc::now()).unwrap();

        let err = quote
            .transition(QuoteStatus::Pending, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatusTransition { .. }));
        assert_eq!(quote.status, QuoteStatus::Approved);
        assert!(matches!(
            quote.check_editable(),
            Err(CoreError::QuoteNotEditable { .. })
        ));
    }

    #[test]
    fn test_quote_lines_update_totals() {
        let mut quote = Quote::new("client-1", ymd(2024, 3, 5), 15, Utc::now()).unwrap();
        quote.add_line(direct_line(0.5, 100_00)).unwrap();
        quote.add_line(direct_line(1.2, 200_00)).unwrap();
        assert_eq!(quote.total_volume.dm3(), 1700);
        assert_eq!(quote.total_value(), Money::from_cents(290_00));

        quote.remove_line(0).unwrap();
        assert_eq!(quote.total_volume.dm3(), 1200);
        assert_eq!(quote.total_value_cents, 240_00);
    }

    #[test]
    fn test_quote_load_recomputes_lines() {
        let quote: Quote = serde_json::from_value(json!({
            "id": "q1",
            "number": "ORC-20240305-0001",
            "client_id": "c1",
            "issue_date": "05/03/2024",
            "valid_until": {"seconds": 1710892800, "nanoseconds": 0},
            "status": "approved",
            "items": [{
                "species_id": "sp-1",
                "measurement": {"mode": "direct", "cubic_meters": 0.5},
                "unit_price_cents": 10000,
                "line_total_cents": 1
            }],
            "total_volume": 9.0,
            "total_value_cents": 1,
            "created_at": 1709647200000_i64,
            "updated_at": 1709647200000_i64
        }))
        .unwrap();
        assert_eq!(quote.items.as_slice()[0].line_total().cents(), 50_00);
        assert_eq!(quote.valid_until, ymd(2024, 3, 20));

        let mut quote = quote;
        let totals = quote.refresh_totals();
        assert_eq!(totals.total_value_cents, 50_00);
        assert_eq!(quote.total_volume.dm3(), 500);
    }

    #[test]
    fn test_log_manifest_accepts_only_logs() {
        let mut manifest = Manifest::new(ManifestKind::Log, "client-1", ymd(2024, 3, 5), Utc::now());
        assert!(manifest.number.starts_with("ROM-20240305-"));

        let err = manifest.add_line(direct_line(1.0, 100_00)).unwrap_err();
        assert!(matches!(err, CoreError::MeasurementNotAllowed { .. }));

        let totals = manifest.add_line(log_line()).unwrap();
        assert_eq!(totals.total_volume.dm3(), 196);
        assert_eq!(manifest.total_value_cents, 98_00);
        assert!(manifest.check_saveable().is_ok());
    }

    #[test]
    fn test_lumber_manifest_rejects_logs() {
        let mut manifest =
            Manifest::new(ManifestKind::Lumber, "client-1", ymd(2024, 3, 5), Utc::now());
        assert!(manifest.add_line(log_line()).is_err());
        assert!(matches!(
            manifest.check_saveable(),
            Err(CoreError::EmptyDocument { .. })
        ));
        manifest.add_line(direct_line(2.0, 10_00)).unwrap();
        assert!(manifest.validate().is_ok());
    }
}
