use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::record::Record;
use crate::store::{Filter, RecordStore};

/// Shared state handed to every pipeline.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    /// `None` when no generator is configured; the enrichment step is then skipped.
    pub llm: Option<LlmClient>,
    pub config: Config,
}

impl AppState {
    /// Looks up the applicant row by its external ID.
    pub async fn find_applicant(&self, applicant_id: &str) -> Result<Record, AppError> {
        let tables = &self.config.tables;
        let filter = Filter::equals(&self.config.fields.applicant_id, applicant_id);
        self.store
            .fetch(&tables.applicants, Some(&filter))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Applicant ID '{applicant_id}' not found in {}",
                    tables.applicants
                ))
            })
    }

    /// Fetches the rows of `table` linked to the applicant.
    pub async fn fetch_linked(
        &self,
        table: &str,
        applicant_id: &str,
    ) -> Result<Vec<Record>, AppError> {
        let filter = Filter::linked_to(&self.config.fields.applicant_link, applicant_id);
        self.store.fetch(table, Some(&filter)).await
    }
}
