//! End-to-end flow through the services on both store variants:
//! register a client and species, quote, approve, deliver.

use chrono::NaiveDate;
use sismad_app::{App, AppConfig, ErrorCode, StoreBackend};
use sismad_core::format::{format_currency, format_volume};
use sismad_core::lines::MeasurementInput;
use sismad_core::{ClientInput, LineInput, ManifestKind, QuoteStatus, SpeciesInput};
use std::path::PathBuf;

async fn apps() -> Vec<App> {
    let mut sqlite = AppConfig::default();
    sqlite.store.backend = StoreBackend::Sqlite;
    sqlite.store.path = Some(PathBuf::from(":memory:"));

    vec![
        App::from_config(AppConfig::in_memory()).await.unwrap(),
        App::from_config(sqlite).await.unwrap(),
    ]
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn board(species_id: &str) -> LineInput {
    LineInput {
        description: "Tábua 15 x 2,5".to_string(),
        species_id: species_id.to_string(),
        measurement: MeasurementInput::Piece {
            width_cm: Some(15.0),
            thickness_cm: Some(2.5),
            length_cm: Some(300.0),
            quantity: Some(5.0),
        },
        unit_price_cents: None,
    }
}

fn batch(species_id: &str, cubic_meters: f64) -> LineInput {
    LineInput {
        description: "Lote medido".to_string(),
        species_id: species_id.to_string(),
        measurement: MeasurementInput::Direct {
            cubic_meters: Some(cubic_meters),
        },
        unit_price_cents: Some(2_000_00),
    }
}

#[tokio::test]
async fn test_quote_to_delivery() {
    for app in apps().await {
        let backend = app.db().backend_name();

        let client = app
            .clients()
            .create(ClientInput {
                name: "Telhados Santa Clara".to_string(),
                tax_id: Some("34.567.890/0001-17".to_string()),
                state: Some("sc".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let cambara = app
            .species()
            .create(SpeciesInput {
                name: "Cambará".to_string(),
                default_price_cents: Some(1_850_00),
                ..Default::default()
            })
            .await
            .unwrap();

        let quotes = app.quotes();
        let mut quote = quotes.draft(&client.id, ymd(2024, 3, 5)).await.unwrap();
        quotes.add_line(&mut quote, board(&cambara.id)).await.unwrap();
        quotes
            .add_line(&mut quote, batch(&cambara.id, 1.2))
            .await
            .unwrap();
        quotes.save(&mut quote).await.unwrap();

        // 0.056 m³ × R$ 1.850,00 = R$ 103,60; 1.2 m³ × R$ 2.000,00 = R$ 2.400,00
        let stored = quotes.get(&quote.id).await.unwrap();
        assert_eq!(stored.total_volume.dm3(), 1256, "backend {backend}");
        assert_eq!(stored.total_value_cents, 2_503_60, "backend {backend}");
        assert_eq!(format_volume(stored.total_volume), "1.256 m³");
        assert_eq!(format_currency(stored.total_value()), "R$ 2.503,60");

        let found = quotes.find_by_number(&quote.number).await.unwrap().unwrap();
        assert_eq!(found.id, quote.id);

        quotes
            .set_status(&quote.id, QuoteStatus::Approved)
            .await
            .unwrap();
        assert_eq!(
            quotes
                .list_by_status(QuoteStatus::Approved)
                .await
                .unwrap()
                .len(),
            1
        );

        let manifests = app.manifests();
        let mut manifest = manifests
            .from_quote(&quote.id, ymd(2024, 3, 8))
            .await
            .unwrap();
        assert_eq!(manifest.kind, ManifestKind::Lumber);
        manifest.vehicle_plate = Some("ABC1D23".to_string());
        manifests.save(&mut manifest).await.unwrap();

        let delivered = manifests.list_by_client(&client.id).await.unwrap();
        assert_eq!(delivered.len(), 1, "backend {backend}");
        assert_eq!(delivered[0].total_value_cents, 2_503_60);
        assert_eq!(delivered[0].quote_id.as_deref(), Some(quote.id.as_str()));
    }
}

#[tokio::test]
async fn test_validation_reaches_the_form() {
    for app in apps().await {
        let client = app
            .clients()
            .create(ClientInput {
                name: "João Carlos Pereira".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let pinus = app
            .species()
            .create(SpeciesInput {
                name: "Pinus".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let quotes = app.quotes();
        let mut quote = quotes.draft(&client.id, ymd(2024, 3, 5)).await.unwrap();

        let mut missing_width = board(&pinus.id);
        missing_width.unit_price_cents = Some(780_00);
        missing_width.measurement = MeasurementInput::Piece {
            width_cm: None,
            thickness_cm: Some(2.5),
            length_cm: Some(300.0),
            quantity: Some(5.0),
        };
        let err = quotes
            .add_line(&mut quote, missing_width)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("width_cm"));

        // No default price on file and none typed in
        let err = quotes
            .add_line(&mut quote, board(&pinus.id))
            .await
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("unit_price"));

        assert!(quote.items.is_empty());
        assert_eq!(quote.total_value_cents, 0);
    }
}

#[tokio::test]
async fn test_validity_from_config() {
    let mut config = AppConfig::in_memory();
    config.business.quote_validity_days = 30;
    let app = App::from_config(config).await.unwrap();

    let client = app
        .clients()
        .create(ClientInput {
            name: "Marcenaria Irmãos Rocha".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let quote = app
        .quotes()
        .draft(&client.id, ymd(2024, 3, 5))
        .await
        .unwrap();
    assert_eq!(quote.valid_until, ymd(2024, 4, 4));
}
