//! # Manifest Service
//!
//! Delivery manifests (romaneios). A lumber manifest lists sawn pieces
//! (or direct volumes); a log manifest lists toras measured by their two
//! end diameters.
//!
//! ## From Quote to Delivery
//! ```text
//! Quote (approved)
//!      │  from_quote(quote_id, date)
//!      ▼
//! Manifest draft ── kind picked from the quote lines
//!      │            lines the kind accepts are copied
//!      ▼
//! edit lines (measured at loading) ──► save()
//! ```

use chrono::{NaiveDate, Utc};
use sismad_core::{
    LineDocument, LineInput, Manifest, ManifestKind, Measurement, QuoteStatus, Totals,
};
use sismad_db::Database;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::services::build_line;

#[derive(Debug, Clone)]
pub struct ManifestService {
    db: Database,
}

impl ManifestService {
    pub fn new(db: Database) -> Self {
        ManifestService { db }
    }

    /// Starts an empty manifest for an existing client.
    pub async fn draft(
        &self,
        kind: ManifestKind,
        client_id: &str,
        date: NaiveDate,
    ) -> ApiResult<Manifest> {
        let client = self.db.clients().require(client_id).await?;
        let manifest = Manifest::new(kind, client.id, date, Utc::now());
        debug!(
            manifest_id = %manifest.id,
            kind = kind.as_str(),
            "Manifest draft started"
        );
        Ok(manifest)
    }

    /// Starts a manifest delivering an approved quote.
    ///
    /// The manifest is a log manifest when the quote has only log lines,
    /// a lumber manifest otherwise; lines the kind does not accept are
    /// left out.
    pub async fn from_quote(&self, quote_id: &str, date: NaiveDate) -> ApiResult<Manifest> {
        let quote = self.db.quotes().require(quote_id).await?;
        if quote.status != QuoteStatus::Approved {
            return Err(ApiError::new(
                ErrorCode::BusinessLogic,
                format!(
                    "Quote {} is {} and cannot be delivered",
                    quote.number,
                    quote.status.as_str()
                ),
            ));
        }

        let all_logs = !quote.items.is_empty()
            && quote
                .items
                .iter()
                .all(|item| matches!(item.measurement(), Measurement::Log { .. }));
        let kind = if all_logs {
            ManifestKind::Log
        } else {
            ManifestKind::Lumber
        };

        let mut manifest = Manifest::new(kind, quote.client_id.clone(), date, Utc::now());
        manifest.quote_id = Some(quote.id.clone());
        for item in quote.items.iter().filter(|i| kind.accepts(i.measurement())) {
            manifest.add_line(item.clone())?;
        }

        debug!(
            manifest_id = %manifest.id,
            quote_id = %quote.id,
            lines = manifest.items.len(),
            "Manifest drafted from quote"
        );
        Ok(manifest)
    }

    pub async fn add_line(&self, manifest: &mut Manifest, input: LineInput) -> ApiResult<Totals> {
        let item = build_line(&self.db, input).await?;
        Ok(manifest.add_line(item)?)
    }

    pub async fn replace_line(
        &self,
        manifest: &mut Manifest,
        index: usize,
        input: LineInput,
    ) -> ApiResult<Totals> {
        let item = build_line(&self.db, input).await?;
        Ok(manifest.replace_line(index, item)?)
    }

    pub fn remove_line(&self, manifest: &mut Manifest, index: usize) -> ApiResult<Totals> {
        Ok(manifest.remove_line(index)?)
    }

    /// Writes the whole manifest as one document.
    pub async fn save(&self, manifest: &mut Manifest) -> ApiResult<()> {
        manifest.check_saveable()?;
        self.db.clients().require(&manifest.client_id).await?;
        if let Some(quote_id) = &manifest.quote_id {
            self.db.quotes().require(quote_id).await?;
        }

        let totals = manifest.refresh_totals();
        manifest.updated_at = Utc::now();
        self.db.manifests().save(manifest).await?;

        info!(
            manifest_id = %manifest.id,
            number = %manifest.number,
            kind = manifest.kind.as_str(),
            lines = manifest.items.len(),
            total_volume_dm3 = totals.total_volume.dm3(),
            total_value_cents = totals.total_value_cents,
            "Manifest saved"
        );
        Ok(())
    }

    pub async fn get(&self, id: &str) -> ApiResult<Manifest> {
        Ok(self.db.manifests().require(id).await?)
    }

    pub async fn list_by_client(&self, client_id: &str) -> ApiResult<Vec<Manifest>> {
        Ok(self.db.manifests().list_by_client(client_id).await?)
    }

    pub async fn list_by_kind(&self, kind: ManifestKind) -> ApiResult<Vec<Manifest>> {
        Ok(self.db.manifests().list_by_kind(kind).await?)
    }

    /// Deliveries made against a quote.
    pub async fn list_by_quote(&self, quote_id: &str) -> ApiResult<Vec<Manifest>> {
        Ok(self.db.manifests().list_by_quote(quote_id).await?)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.db.manifests().delete(id).await?;
        info!(manifest_id = %id, "Manifest deleted");
        Ok(())
    }
}
