//! # Seed Data Generator
//!
//! Populates a SQLite document store with the species catalog and a few
//! sample clients, for development and demos.
//!
//! ## Usage
//! ```bash
//! # Seed ./sismad_dev.db
//! cargo run -p sismad-db --bin seed
//!
//! # Specify database path
//! cargo run -p sismad-db --bin seed -- --db ./data/sismad.db
//! ```
//!
//! Seeding is skipped per collection when it already has documents.

use chrono::Utc;
use sismad_core::{Client, ClientInput, Species, SpeciesInput};
use sismad_db::{Database, DbConfig};
use std::env;

/// (common name, scientific name, price per m³ in cents, density kg/m³)
const SPECIES: &[(&str, &str, i64, f64)] = &[
    ("Angelim Pedra", "Hymenolobium petraeum", 2_450_00, 710.0),
    ("Cambará", "Qualea albiflora", 1_850_00, 650.0),
    ("Cedro", "Cedrela fissilis", 2_900_00, 530.0),
    ("Cedrinho", "Erisma uncinatum", 1_650_00, 580.0),
    ("Cumaru", "Dipteryx odorata", 4_200_00, 1090.0),
    ("Eucalipto", "Eucalyptus grandis", 950_00, 640.0),
    ("Garapeira", "Apuleia leiocarpa", 2_800_00, 830.0),
    ("Ipê", "Handroanthus serratifolius", 5_600_00, 1050.0),
    ("Itaúba", "Mezilaurus itauba", 3_400_00, 960.0),
    ("Jatobá", "Hymenaea courbaril", 3_900_00, 960.0),
    ("Maçaranduba", "Manilkara huberi", 3_200_00, 1000.0),
    ("Pinus", "Pinus elliottii", 780_00, 480.0),
    ("Peroba Rosa", "Aspidosperma polyneuron", 3_600_00, 790.0),
    ("Tauari", "Couratari oblongifolia", 2_000_00, 620.0),
];

/// (name, CPF/CNPJ, city, state)
const CLIENTS: &[(&str, &str, &str, &str)] = &[
    ("Construtora Horizonte Ltda", "12.345.678/0001-95", "Curitiba", "PR"),
    ("Madeireira São José", "23.456.789/0001-06", "Ponta Grossa", "PR"),
    ("Telhados Santa Clara", "34.567.890/0001-17", "Joinville", "SC"),
    ("João Carlos Pereira", "123.456.789-09", "Londrina", "PR"),
    ("Marcenaria Irmãos Rocha", "45.678.901/0001-28", "Chapecó", "SC"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./sismad_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("SISMAD Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./sismad_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 SISMAD Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::sqlite(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let now = Utc::now();

    if db.species().count().await? > 0 {
        println!("⚠ Species catalog already populated, skipping");
    } else {
        for (name, scientific, price_cents, density) in SPECIES {
            let species = Species::from_input(
                SpeciesInput {
                    name: name.to_string(),
                    scientific_name: Some(scientific.to_string()),
                    default_price_cents: Some(*price_cents),
                    density_kg_m3: Some(*density),
                },
                now,
            )?;
            if let Err(e) = db.species().insert(&species).await {
                eprintln!("Failed to insert {}: {}", name, e);
            }
        }
        println!("✓ Inserted {} species", db.species().count().await?);
    }

    if db.clients().count().await? > 0 {
        println!("⚠ Clients already present, skipping");
    } else {
        for (name, tax_id, city, state) in CLIENTS {
            let client = Client::from_input(
                ClientInput {
                    name: name.to_string(),
                    tax_id: Some(tax_id.to_string()),
                    city: Some(city.to_string()),
                    state: Some(state.to_string()),
                    ..Default::default()
                },
                now,
            )?;
            if let Err(e) = db.clients().insert(&client).await {
                eprintln!("Failed to insert {}: {}", name, e);
            }
        }
        println!("✓ Inserted {} clients", db.clients().count().await?);
    }

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
