//! # Species Repository
//!
//! The wood species catalog, collection `species`.

use sismad_core::{CoreError, CoreResult, Species};

use crate::error::DbResult;
use crate::repository::{Document, Repository};

impl Document for Species {
    const COLLECTION: &'static str = "species";
    const ENTITY: &'static str = "Species";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> CoreResult<()> {
        Species::validate(self).map_err(CoreError::from)
    }
}

impl Repository<Species> {
    /// Case-insensitive lookup by common name.
    ///
    /// Names are compared after trimming and lower-casing, so "Cedro" and
    /// " cedro " are the same species.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Species>> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|s| s.name.trim().to_lowercase() == wanted))
    }

    /// Active species sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Species>> {
        let mut species = self.find_by("active", true).await?;
        species.sort_by_key(|s| s.name.to_lowercase());
        Ok(species)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::Utc;
    use sismad_core::SpeciesInput;

    #[tokio::test]
    async fn test_find_by_name_ignores_case() {
        let db = Database::in_memory();
        let cedro = Species::from_input(
            SpeciesInput {
                name: "Cedro".to_string(),
                default_price_cents: Some(2_100_00),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        db.species().insert(&cedro).await.unwrap();

        let found = db.species().find_by_name("  CEDRO ").await.unwrap().unwrap();
        assert_eq!(found.id, cedro.id);
        assert!(db.species().find_by_name("Ipê").await.unwrap().is_none());
    }
}
