//! # Quote Service
//!
//! Quote (orçamento) editing and status workflow.
//!
//! ## Lifecycle
//! ```text
//! draft() ──► add_line / replace_line / remove_line ──► save()
//!                                                          │
//!                                                          ▼
//!                                              pending ──► approved
//!                                                 │  ╲
//!                                                 │   ╲──► expired (expire_overdue)
//!                                                 ▼
//!                                              rejected ──► pending (reopen)
//! ```

use chrono::{NaiveDate, Utc};
use sismad_core::{LineDocument, LineInput, Quote, QuoteStatus, Totals};
use sismad_db::Database;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::services::build_line;

#[derive(Debug, Clone)]
pub struct QuoteService {
    db: Database,
    validity_days: u32,
}

impl QuoteService {
    /// `validity_days` is the validity of new quotes
    /// (`business.quote_validity_days`).
    pub fn new(db: Database, validity_days: u32) -> Self {
        QuoteService { db, validity_days }
    }

    /// Starts an empty quote for an existing client. Nothing is stored
    /// until [`save`](Self::save).
    pub async fn draft(&self, client_id: &str, issue_date: NaiveDate) -> ApiResult<Quote> {
        let client = self.db.clients().require(client_id).await?;
        let quote = Quote::new(client.id, issue_date, self.validity_days, Utc::now())?;
        debug!(quote_id = %quote.id, number = %quote.number, "Quote draft started");
        Ok(quote)
    }

    pub async fn add_line(&self, quote: &mut Quote, input: LineInput) -> ApiResult<Totals> {
        quote.check_editable()?;
        let item = build_line(&self.db, input).await?;
        Ok(quote.add_line(item)?)
    }

    pub async fn replace_line(
        &self,
        quote: &mut Quote,
        index: usize,
        input: LineInput,
    ) -> ApiResult<Totals> {
        quote.check_editable()?;
        let item = build_line(&self.db, input).await?;
        Ok(quote.replace_line(index, item)?)
    }

    pub fn remove_line(&self, quote: &mut Quote, index: usize) -> ApiResult<Totals> {
        quote.check_editable()?;
        Ok(quote.remove_line(index)?)
    }

    /// Writes the whole quote as one document.
    ///
    /// ## Errors
    /// - `BUSINESS_LOGIC` when the quote has no lines
    /// - `NOT_FOUND` when the client no longer exists
    pub async fn save(&self, quote: &mut Quote) -> ApiResult<()> {
        quote.check_saveable()?;
        self.db.clients().require(&quote.client_id).await?;

        let totals = quote.refresh_totals();
        quote.updated_at = Utc::now();
        self.db.quotes().save(quote).await?;

        info!(
            quote_id = %quote.id,
            number = %quote.number,
            lines = quote.items.len(),
            total_volume_dm3 = totals.total_volume.dm3(),
            total_value_cents = totals.total_value_cents,
            "Quote saved"
        );
        Ok(())
    }

    pub async fn get(&self, id: &str) -> ApiResult<Quote> {
        Ok(self.db.quotes().require(id).await?)
    }

    pub async fn find_by_number(&self, number: &str) -> ApiResult<Option<Quote>> {
        Ok(self.db.quotes().find_by_number(number.trim()).await?)
    }

    /// Quotes of one client, newest first.
    pub async fn list_by_client(&self, client_id: &str) -> ApiResult<Vec<Quote>> {
        Ok(self.db.quotes().list_by_client(client_id).await?)
    }

    pub async fn list_by_status(&self, status: QuoteStatus) -> ApiResult<Vec<Quote>> {
        Ok(self.db.quotes().list_by_status(status).await?)
    }

    /// Moves a stored quote through the workflow.
    pub async fn set_status(&self, id: &str, status: QuoteStatus) -> ApiResult<Quote> {
        let mut quote = self.db.quotes().require(id).await?;
        let from = quote.status;
        quote.transition(status, Utc::now())?;
        self.db.quotes().save(&quote).await?;

        info!(
            quote_id = %quote.id,
            from = from.as_str(),
            to = status.as_str(),
            "Quote status changed"
        );
        Ok(quote)
    }

    /// Marks every pending quote past its validity as expired.
    ///
    /// Returns the ids of the quotes that changed.
    pub async fn expire_overdue(&self, today: NaiveDate) -> ApiResult<Vec<String>> {
        let now = Utc::now();
        let mut expired = Vec::new();

        for mut quote in self.db.quotes().list_by_status(QuoteStatus::Pending).await? {
            if quote.is_expired_on(today) {
                quote.transition(QuoteStatus::Expired, now)?;
                self.db.quotes().save(&quote).await?;
                expired.push(quote.id);
            }
        }

        if !expired.is_empty() {
            info!(count = expired.len(), %today, "Expired overdue quotes");
        }
        Ok(expired)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.db.quotes().delete(id).await?;
        info!(quote_id = %id, "Quote deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use sismad_core::lines::MeasurementInput;
    use sismad_core::{Client, ClientInput, Species, SpeciesInput};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> (QuoteService, Client, Species) {
        let db = Database::in_memory();
        let client = Client::from_input(
            ClientInput {
                name: "Construtora Horizonte".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        db.clients().insert(&client).await.unwrap();

        let species = Species::from_input(
            SpeciesInput {
                name: "Pinus".to_string(),
                default_price_cents: Some(100_00),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        db.species().insert(&species).await.unwrap();

        (QuoteService::new(db, 15), client, species)
    }

    fn direct(species: &Species, m3: f64, price: i64) -> LineInput {
        LineInput {
            description: "Lote".to_string(),
            species_id: species.id.clone(),
            measurement: MeasurementInput::Direct {
                cubic_meters: Some(m3),
            },
            unit_price_cents: Some(price),
        }
    }

    #[tokio::test]
    async fn test_draft_rejects_out_of_range_validity() {
        let (service, client, _) = setup().await;
        let service = QuoteService::new(service.db.clone(), u32::MAX);

        let err = service.draft(&client.id, ymd(2024, 3, 5)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("quote_validity_days"));
    }

    #[tokio::test]
    async fn test_huge_line_is_a_validation_error() {
        let (service, client, species) = setup().await;
        let mut quote = service.draft(&client.id, ymd(2024, 3, 5)).await.unwrap();

        let err = service
            .add_line(&mut quote, direct(&species, 5e15, 100_00))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("cubic_meters"));

        let err = service
            .add_line(&mut quote, direct(&species, 2000.0, 9_000_000_000_000_000))
            .await
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("unit_price"));
        assert!(quote.items.is_empty());
    }

    #[tokio::test]
    async fn test_draft_requires_client() {
        let (service, client, _) = setup().await;
        let quote = service.draft(&client.id, ymd(2024, 3, 5)).await.unwrap();
        assert_eq!(quote.valid_until, ymd(2024, 3, 20));
        assert!(quote.number.starts_with("ORC-20240305-"));

        let err = service.draft("missing", ymd(2024, 3, 5)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_edit_and_save() {
        let (service, client, pinus) = setup().await;
        let mut quote = service.draft(&client.id, ymd(2024, 3, 5)).await.unwrap();

        service
            .add_line(&mut quote, direct(&pinus, 0.5, 100_00))
            .await
            .unwrap();
        let totals = service
            .add_line(&mut quote, direct(&pinus, 1.2, 200_00))
            .await
            .unwrap();
        assert_eq!(totals.total_volume.dm3(), 1700);
        assert_eq!(totals.total_value_cents, 290_00);

        let totals = service
            .replace_line(&mut quote, 0, direct(&pinus, 0.3, 100_00))
            .await
            .unwrap();
        assert_eq!(totals.total_value_cents, 270_00);

        // Not stored before save
        assert!(service.list_by_client(&client.id).await.unwrap().is_empty());

        service.save(&mut quote).await.unwrap();
        let loaded = service.get(&quote.id).await.unwrap();
        assert_eq!(loaded.total_value_cents, 270_00);
        assert_eq!(loaded.items.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_quote_cannot_be_saved() {
        let (service, client, _) = setup().await;
        let mut quote = service.draft(&client.id, ymd(2024, 3, 5)).await.unwrap();
        let err = service.save(&mut quote).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_zero_volume_line_is_blocked() {
        let (service, client, pinus) = setup().await;
        let mut quote = service.draft(&client.id, ymd(2024, 3, 5)).await.unwrap();

        let tiny = LineInput {
            description: "Cavaco".to_string(),
            species_id: pinus.id.clone(),
            measurement: MeasurementInput::Piece {
                width_cm: Some(1.0),
                thickness_cm: Some(1.0),
                length_cm: Some(1.0),
                quantity: Some(1.0),
            },
            unit_price_cents: None,
        };
        let err = service.add_line(&mut quote, tiny).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DegenerateVolume);
        assert!(quote.items.is_empty());
    }

    #[tokio::test]
    async fn test_status_workflow() {
        let (service, client, pinus) = setup().await;
        let mut quote = service.draft(&client.id, ymd(2024, 3, 5)).await.unwrap();
        service
            .add_line(&mut quote, direct(&pinus, 1.0, 100_00))
            .await
            .unwrap();
        service.save(&mut quote).await.unwrap();

        let approved = service
            .set_status(&quote.id, QuoteStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.status, QuoteStatus::Approved);

        let err = service
            .set_status(&quote.id, QuoteStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        // Approved quotes are frozen
        let mut approved = approved;
        let err = service
            .add_line(&mut approved, direct(&pinus, 1.0, 100_00))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_expire_overdue() {
        let (service, client, pinus) = setup().await;

        let mut old = service.draft(&client.id, ymd(2024, 1, 2)).await.unwrap();
        service
            .add_line(&mut old, direct(&pinus, 1.0, 100_00))
            .await
            .unwrap();
        service.save(&mut old).await.unwrap();

        let mut fresh = service.draft(&client.id, ymd(2024, 3, 1)).await.unwrap();
        service
            .add_line(&mut fresh, direct(&pinus, 1.0, 100_00))
            .await
            .unwrap();
        service.save(&mut fresh).await.unwrap();

        let expired = service.expire_overdue(ymd(2024, 3, 5)).await.unwrap();
        assert_eq!(expired, vec![old.id.clone()]);
        assert_eq!(
            service.get(&old.id).await.unwrap().status,
            QuoteStatus::Expired
        );
        assert_eq!(
            service.get(&fresh.id).await.unwrap().status,
            QuoteStatus::Pending
        );

        // Nothing left to expire
        assert!(service.expire_overdue(ymd(2024, 3, 5)).await.unwrap().is_empty());
    }
}
