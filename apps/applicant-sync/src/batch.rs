//! Backfill: compress then decompress every applicant, one at a time.

use tracing::{error, info};

use crate::errors::AppError;
use crate::state::AppState;
use crate::{compress, decompress};

#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub applicant_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// A failing applicant is logged and recorded; the driver moves on. Only a
/// failure to list the applicants is returned as an error.
pub async fn run(state: &AppState) -> Result<BatchReport, AppError> {
    let field = &state.config.fields.applicant_id;
    let applicant_ids: Vec<String> = state
        .store
        .fetch(&state.config.tables.applicants, None)
        .await?
        .iter()
        .filter_map(|record| record.text(field))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    info!("Found {} applicants", applicant_ids.len());

    let mut report = BatchReport::default();
    for applicant_id in applicant_ids {
        info!("=== Processing {applicant_id} ===");
        match process(state, &applicant_id).await {
            Ok(()) => report.succeeded.push(applicant_id),
            Err(e) => {
                error!("Applicant {applicant_id} failed: {e}");
                report.failed.push(BatchFailure {
                    applicant_id,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Backfill finished: {} succeeded, {} failed",
        report.succeeded.len(),
        report.failed.len()
    );
    Ok(report)
}

async fn process(state: &AppState, applicant_id: &str) -> Result<(), AppError> {
    compress::run(state, applicant_id).await?;
    decompress::run(state, applicant_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::compress::tests::{seed_jane, test_state};
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_processes_every_applicant_with_an_id() {
        let store = Arc::new(MemoryStore::new("Applicant ID"));
        seed_jane(&store, "recA", "APP-1");
        seed_jane(&store, "recB", "APP-2");
        store.seed("Applicants", "recBlank", json!({ "Applicant ID": "  " }));
        store.seed("Applicants", "recNone", json!({}));
        let state = test_state(&store, None);

        let report = run(&state).await.unwrap();
        assert_eq!(report.succeeded, vec!["APP-1", "APP-2"]);
        assert!(report.failed.is_empty());
        assert_eq!(store.records("Shortlisted Leads").len(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let store = Arc::new(MemoryStore::new("Applicant ID"));
        seed_jane(&store, "recA", "APP-1");
        store.seed("Applicants", "recB", json!({ "Applicant ID": "APP-2" }));
        store.seed(
            "Personal Details",
            "recBp",
            json!({ "Applicant": ["recB"], "Location": "Paris, France" }),
        );
        store.reject_writes_to("Shortlisted Leads");
        let state = test_state(&store, None);

        let report = run(&state).await.unwrap();
        assert_eq!(report.total(), 2);
        assert_eq!(report.succeeded, vec!["APP-2"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].applicant_id, "APP-1");
        assert!(report.failed[0].error.contains("Shortlisted Leads"));
    }

    #[tokio::test]
    async fn test_empty_table_is_an_empty_report() {
        let store = Arc::new(MemoryStore::new("Applicant ID"));
        let report = run(&test_state(&store, None)).await.unwrap();
        assert_eq!(report, BatchReport::default());
    }
}
