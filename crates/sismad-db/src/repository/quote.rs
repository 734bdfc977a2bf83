//! # Quote Repository
//!
//! Quote documents (orçamentos), collection `quotes`.
//!
//! Stored totals are recomputed from the lines on every load, so a quote
//! written by an older screen with stale totals reads back consistent.

use sismad_core::{CoreResult, LineDocument, Quote, QuoteStatus};

use crate::error::DbResult;
use crate::repository::{Document, Repository};

impl Document for Quote {
    const COLLECTION: &'static str = "quotes";
    const ENTITY: &'static str = "Quote";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> CoreResult<()> {
        Quote::validate(self)
    }

    fn normalize(&mut self) {
        self.refresh_totals();
    }
}

/// Newest first, then by number.
fn sort_newest_first(quotes: &mut [Quote]) {
    quotes.sort_by(|a, b| {
        b.issue_date
            .cmp(&a.issue_date)
            .then_with(|| a.number.cmp(&b.number))
    });
}

impl Repository<Quote> {
    /// Quotes of one client, newest first.
    pub async fn list_by_client(&self, client_id: &str) -> DbResult<Vec<Quote>> {
        let mut quotes = self.find_by("client_id", client_id).await?;
        sort_newest_first(&mut quotes);
        Ok(quotes)
    }

    pub async fn list_by_status(&self, status: QuoteStatus) -> DbResult<Vec<Quote>> {
        let mut quotes = self.find_by("status", status.as_str()).await?;
        sort_newest_first(&mut quotes);
        Ok(quotes)
    }

    pub async fn find_by_number(&self, number: &str) -> DbResult<Option<Quote>> {
        Ok(self.find_by("number", number).await?.into_iter().next())
    }
}
