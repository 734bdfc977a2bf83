//! # Client Service
//!
//! Client registry: create, edit, look up, deactivate.
//!
//! A CPF/CNPJ identifies at most one client. Clients are never deleted
//! because quotes and manifests keep pointing at them; they are
//! deactivated and drop out of the pickers.

use chrono::Utc;
use sismad_core::validation::validate_tax_id;
use sismad_core::{Client, ClientInput, ValidationError};
use sismad_db::Database;
use tracing::info;

use crate::error::ApiResult;

#[derive(Debug, Clone)]
pub struct ClientService {
    db: Database,
}

impl ClientService {
    pub fn new(db: Database) -> Self {
        ClientService { db }
    }

    /// Rejects a tax id already used by another client.
    async fn ensure_unique_tax_id(&self, client: &Client) -> ApiResult<()> {
        let Some(tax_id) = &client.tax_id else {
            return Ok(());
        };
        if let Some(existing) = self.db.clients().find_by_tax_id(tax_id).await? {
            if existing.id != client.id {
                return Err(ValidationError::Duplicate {
                    field: "tax_id".to_string(),
                    value: tax_id.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub async fn create(&self, input: ClientInput) -> ApiResult<Client> {
        let client = Client::from_input(input, Utc::now())?;
        self.ensure_unique_tax_id(&client).await?;
        self.db.clients().insert(&client).await?;

        info!(client_id = %client.id, name = %client.name, "Client created");
        Ok(client)
    }

    pub async fn update(&self, id: &str, input: ClientInput) -> ApiResult<Client> {
        let mut client = self.db.clients().require(id).await?;
        client.apply(input, Utc::now())?;
        self.ensure_unique_tax_id(&client).await?;
        self.db.clients().save(&client).await?;

        info!(client_id = %client.id, "Client updated");
        Ok(client)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Client> {
        Ok(self.db.clients().require(id).await?)
    }

    /// Looks a client up by CPF/CNPJ in any punctuation.
    pub async fn find_by_tax_id(&self, raw: &str) -> ApiResult<Option<Client>> {
        let digits = validate_tax_id(raw)?;
        Ok(self.db.clients().find_by_tax_id(&digits).await?)
    }

    /// Active clients sorted by name.
    pub async fn list(&self) -> ApiResult<Vec<Client>> {
        Ok(self.db.clients().list_active().await?)
    }

    pub async fn deactivate(&self, id: &str) -> ApiResult<Client> {
        let mut client = self.db.clients().require(id).await?;
        if client.active {
            client.active = false;
            client.updated_at = Utc::now();
            self.db.clients().save(&client).await?;
            info!(client_id = %client.id, "Client deactivated");
        }
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn input(name: &str, tax_id: Option<&str>) -> ClientInput {
        ClientInput {
            name: name.to_string(),
            tax_id: tax_id.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let service = ClientService::new(Database::in_memory());
        let client = service
            .create(input("Serraria Bom Pinho", Some("12.345.678/0001-95")))
            .await
            .unwrap();
        assert_eq!(client.tax_id.as_deref(), Some("12345678000195"));

        let found = service
            .find_by_tax_id("12345678000195")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, client.id);
    }

    #[tokio::test]
    async fn test_duplicate_tax_id() {
        let service = ClientService::new(Database::in_memory());
        service
            .create(input("Serraria Bom Pinho", Some("123.456.789-09")))
            .await
            .unwrap();

        let err = service
            .create(input("Outra Serraria", Some("12345678909")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("tax_id"));
    }

    #[tokio::test]
    async fn test_update_keeps_own_tax_id() {
        let service = ClientService::new(Database::in_memory());
        let client = service
            .create(input("Serraria Bom Pinho", Some("123.456.789-09")))
            .await
            .unwrap();

        let updated = service
            .update(&client.id, input("Serraria Bom Pinho Ltda", Some("12345678909")))
            .await
            .unwrap();
        assert_eq!(updated.name, "Serraria Bom Pinho Ltda");
        assert_eq!(service.get(&client.id).await.unwrap().name, updated.name);
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_list() {
        let service = ClientService::new(Database::in_memory());
        let a = service.create(input("Alfa", None)).await.unwrap();
        service.create(input("Beta", None)).await.unwrap();

        service.deactivate(&a.id).await.unwrap();
        let names: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Beta"]);

        let err = service.deactivate("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
