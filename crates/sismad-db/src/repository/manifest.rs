//! # Manifest Repository
//!
//! Delivery manifests (romaneios) of both kinds, collection `manifests`.

use sismad_core::{CoreResult, LineDocument, Manifest, ManifestKind};

use crate::error::DbResult;
use crate::repository::{Document, Repository};

impl Document for Manifest {
    const COLLECTION: &'static str = "manifests";
    const ENTITY: &'static str = "Manifest";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> CoreResult<()> {
        Manifest::validate(self)
    }

    fn normalize(&mut self) {
        self.refresh_totals();
    }
}

fn sort_newest_first(manifests: &mut [Manifest]) {
    manifests.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.number.cmp(&b.number)));
}

impl Repository<Manifest> {
    /// Manifests delivered to one client, newest first.
    pub async fn list_by_client(&self, client_id: &str) -> DbResult<Vec<Manifest>> {
        let mut manifests = self.find_by("client_id", client_id).await?;
        sort_newest_first(&mut manifests);
        Ok(manifests)
    }

    pub async fn list_by_kind(&self, kind: ManifestKind) -> DbResult<Vec<Manifest>> {
        let mut manifests = self.find_by("kind", kind.as_str()).await?;
        sort_newest_first(&mut manifests);
        Ok(manifests)
    }

    /// Manifests that deliver against a quote.
    pub async fn list_by_quote(&self, quote_id: &str) -> DbResult<Vec<Manifest>> {
        let mut manifests = self.find_by("quote_id", quote_id).await?;
        sort_newest_first(&mut manifests);
        Ok(manifests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::{NaiveDate, Utc};

    #[tokio::test]
    async fn test_list_by_kind_and_quote() {
        let db = Database::in_memory();
        let repo = db.manifests();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        let mut lumber = Manifest::new(ManifestKind::Lumber, "c1", date, Utc::now());
        lumber.quote_id = Some("q1".to_string());
        repo.insert(&lumber).await.unwrap();
        repo.insert(&Manifest::new(ManifestKind::Log, "c1", date, Utc::now()))
            .await
            .unwrap();

        assert_eq!(repo.list_by_kind(ManifestKind::Log).await.unwrap().len(), 1);
        let for_quote = repo.list_by_quote("q1").await.unwrap();
        assert_eq!(for_quote.len(), 1);
        assert_eq!(for_quote[0].id, lumber.id);
        assert_eq!(repo.list_by_client("c1").await.unwrap().len(), 2);
    }
}
