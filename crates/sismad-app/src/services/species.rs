//! # Species Service
//!
//! The wood species catalog. Common names are unique, compared without
//! case or surrounding spaces.

use chrono::Utc;
use sismad_core::{Species, SpeciesInput, ValidationError, Volume};
use sismad_db::Database;
use tracing::info;

use crate::error::ApiResult;

#[derive(Debug, Clone)]
pub struct SpeciesService {
    db: Database,
}

impl SpeciesService {
    pub fn new(db: Database) -> Self {
        SpeciesService { db }
    }

    async fn ensure_unique_name(&self, species: &Species) -> ApiResult<()> {
        if let Some(existing) = self.db.species().find_by_name(&species.name).await? {
            if existing.id != species.id {
                return Err(ValidationError::Duplicate {
                    field: "name".to_string(),
                    value: species.name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub async fn create(&self, input: SpeciesInput) -> ApiResult<Species> {
        let species = Species::from_input(input, Utc::now())?;
        self.ensure_unique_name(&species).await?;
        self.db.species().insert(&species).await?;

        info!(species_id = %species.id, name = %species.name, "Species created");
        Ok(species)
    }

    pub async fn update(&self, id: &str, input: SpeciesInput) -> ApiResult<Species> {
        let mut species = self.db.species().require(id).await?;
        species.apply(input, Utc::now())?;
        self.ensure_unique_name(&species).await?;
        self.db.species().save(&species).await?;

        info!(species_id = %species.id, "Species updated");
        Ok(species)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Species> {
        Ok(self.db.species().require(id).await?)
    }

    /// Active species sorted by name, for the line pickers.
    pub async fn list(&self) -> ApiResult<Vec<Species>> {
        Ok(self.db.species().list_active().await?)
    }

    pub async fn deactivate(&self, id: &str) -> ApiResult<Species> {
        let mut species = self.db.species().require(id).await?;
        if species.active {
            species.active = false;
            species.updated_at = Utc::now();
            self.db.species().save(&species).await?;
            info!(species_id = %species.id, "Species deactivated");
        }
        Ok(species)
    }

    /// Estimated load weight of a volume of this species, in kg.
    ///
    /// `None` when the species has no density on file.
    pub async fn estimate_weight(&self, id: &str, volume: Volume) -> ApiResult<Option<f64>> {
        let species = self.db.species().require(id).await?;
        Ok(species.weight_kg(volume))
    }
}
