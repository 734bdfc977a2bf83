//! # Services
//!
//! What the entry forms call. Each service wraps a [`Database`] handle and
//! returns [`ApiResult`]s.
//!
//! ## Editing Session
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Quote / Manifest Editing                             │
//! │                                                                         │
//! │  Form opens ──────► quotes.draft(client, date) ─► Quote (not stored)   │
//! │                                                                         │
//! │  Add line ────────► quotes.add_line(&mut quote, input)                 │
//! │                       ├── species looked up (default price)            │
//! │                       ├── LineItem::from_input (validate + volume)     │
//! │                       └── totals recomputed from scratch               │
//! │                                                                         │
//! │  Edit / remove ───► replace_line / remove_line (same recompute)        │
//! │                                                                         │
//! │  Save ────────────► quotes.save(&mut quote) ─► one document write      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines live only in the caller's document until `save`; nothing is
//! written per line.

pub mod client;
pub mod manifest;
pub mod quote;
pub mod species;

pub use client::ClientService;
pub use manifest::ManifestService;
pub use quote::QuoteService;
pub use species::SpeciesService;

use sismad_core::validation::validate_required;
use sismad_core::{CoreError, LineInput, LineItem, Money};
use sismad_db::Database;
use tracing::debug;

use crate::error::ApiResult;

/// Builds a line item from form input.
///
/// The species must exist. When the form leaves the price empty, the
/// species' default price per m³ is used.
pub(crate) async fn build_line(db: &Database, input: LineInput) -> ApiResult<LineItem> {
    validate_required("species_id", &input.species_id)?;

    let species = db
        .species()
        .get(input.species_id.trim())
        .await?
        .ok_or_else(|| CoreError::SpeciesNotFound(input.species_id.clone()))?;

    let LineInput {
        description,
        species_id,
        measurement,
        unit_price_cents,
    } = input;

    let measurement = measurement.into_measurement()?;
    let unit_price = match unit_price_cents {
        Some(cents) => Money::from_cents(cents),
        None => species.default_price().ok_or_else(|| {
            sismad_core::ValidationError::Required {
                field: "unit_price".to_string(),
            }
        })?,
    };

    let description = if description.trim().is_empty() {
        species.name.clone()
    } else {
        description
    };

    let item = LineItem::new(description, species_id, measurement, unit_price)?;
    debug!(
        species = %species.name,
        mode = item.measurement().mode_name(),
        volume_dm3 = item.volume().dm3(),
        line_total_cents = item.line_total().cents(),
        "Line built"
    );
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use sismad_core::lines::MeasurementInput;
    use sismad_core::{Species, SpeciesInput};

    async fn db_with_cedro(default_price_cents: Option<i64>) -> (Database, Species) {
        let db = Database::in_memory();
        let species = Species::from_input(
            SpeciesInput {
                name: "Cedro".to_string(),
                default_price_cents,
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        db.species().insert(&species).await.unwrap();
        (db, species)
    }

    fn piece_input(species_id: &str, price: Option<i64>) -> LineInput {
        LineInput {
            description: String::new(),
            species_id: species_id.to_string(),
            measurement: MeasurementInput::Piece {
                width_cm: Some(15.0),
                thickness_cm: Some(2.5),
                length_cm: Some(300.0),
                quantity: Some(5.0),
            },
            unit_price_cents: price,
        }
    }

    #[tokio::test]
    async fn test_default_price_and_description() {
        let (db, cedro) = db_with_cedro(Some(2_000_00)).await;

        let item = build_line(&db, piece_input(&cedro.id, None)).await.unwrap();
        assert_eq!(item.description(), "Cedro");
        assert_eq!(item.volume().dm3(), 56);
        assert_eq!(item.unit_price().cents(), 2_000_00);
        assert_eq!(item.line_total().cents(), 112_00);

        let item = build_line(&db, piece_input(&cedro.id, Some(1_000_00)))
            .await
            .unwrap();
        assert_eq!(item.line_total().cents(), 56_00);
    }

    #[tokio::test]
    async fn test_missing_price_without_default() {
        let (db, cedro) = db_with_cedro(None).await;
        let err = build_line(&db, piece_input(&cedro.id, None))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("unit_price"));
    }

    #[tokio::test]
    async fn test_unknown_species() {
        let (db, _) = db_with_cedro(None).await;
        let err = build_line(&db, piece_input("nope", Some(100)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = build_line(&db, piece_input("", Some(100)))
            .await
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("species_id"));
    }
}
