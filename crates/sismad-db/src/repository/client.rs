//! # Client Repository
//!
//! Client documents, collection `clients`.

use sismad_core::{Client, CoreError, CoreResult};

use crate::error::DbResult;
use crate::repository::{Document, Repository};

impl Document for Client {
    const COLLECTION: &'static str = "clients";
    const ENTITY: &'static str = "Client";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> CoreResult<()> {
        Client::validate(self).map_err(CoreError::from)
    }
}

impl Repository<Client> {
    /// Looks a client up by CPF/CNPJ (digits only).
    pub async fn find_by_tax_id(&self, tax_id: &str) -> DbResult<Option<Client>> {
        Ok(self.find_by("tax_id", tax_id).await?.into_iter().next())
    }

    /// Active clients sorted by name, for pickers.
    pub async fn list_active(&self) -> DbResult<Vec<Client>> {
        let mut clients = self.find_by("active", true).await?;
        clients.sort_by_key(|c| c.name.to_lowercase());
        Ok(clients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::Utc;
    use sismad_core::ClientInput;

    fn client(name: &str, tax_id: Option<&str>) -> Client {
        Client::from_input(
            ClientInput {
                name: name.to_string(),
                tax_id: tax_id.map(str::to_string),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_by_tax_id() {
        let db = Database::in_memory();
        let repo = db.clients();
        repo.insert(&client("Serraria Bom Pinho", Some("123.456.789-09")))
            .await
            .unwrap();

        let found = repo.find_by_tax_id("12345678909").await.unwrap().unwrap();
        assert_eq!(found.name, "Serraria Bom Pinho");
        assert!(repo.find_by_tax_id("00000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_active_sorted() {
        let db = Database::in_memory();
        let repo = db.clients();
        repo.insert(&client("zeca madeiras", None)).await.unwrap();
        repo.insert(&client("Alfa Construções", None)).await.unwrap();
        let mut inactive = client("Beta", None);
        inactive.active = false;
        repo.insert(&inactive).await.unwrap();

        let names: Vec<_> = repo
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alfa Construções", "zeca madeiras"]);
    }
}
