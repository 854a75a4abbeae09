//! Optional LLM enrichment of an applicant.
//!
//! Never fatal: an unavailable model or an unreadable response yields `None`
//! and the caller skips the projection.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::FieldNames;
use crate::llm_client::LlmClient;
use crate::models::document::CanonicalDocument;
use crate::models::record::Fields;

pub mod parser;
pub mod prompts;

pub use parser::{parse_llm_output, LlmEvaluation};

/// Runs the evaluation prompt for `document` through the generator chain.
pub async fn evaluate(llm: &LlmClient, document: &CanonicalDocument) -> Option<LlmEvaluation> {
    let document_json = match serde_json::to_string(document) {
        Ok(json) => json,
        Err(e) => {
            warn!("Could not serialize document for LLM prompt: {e}");
            return None;
        }
    };

    let text = llm
        .complete(&prompts::evaluation_prompt(&document_json))
        .await?;

    match parse_llm_output(&text) {
        Some(evaluation) => {
            info!(
                "LLM evaluation parsed: score={}, followups={}",
                evaluation.score,
                evaluation.followups.len()
            );
            Some(evaluation)
        }
        None => {
            warn!("LLM response had no recognizable labels, skipping enrichment");
            None
        }
    }
}

impl LlmEvaluation {
    /// Applicant fields to write. Columns with an empty configured name are
    /// skipped, and follow-ups are only written when there is at least one.
    pub fn applicant_fields(&self, names: &FieldNames) -> Fields {
        let mut fields = Fields::new();
        let mut put = |name: &str, value: Value| {
            if !name.is_empty() {
                fields.insert(name.to_string(), value);
            }
        };

        put(&names.llm_summary, json!(self.summary));
        put(&names.llm_score, json!(self.score));
        put(&names.llm_issues, json!(self.issues));
        if !self.followups.is_empty() {
            let bullets = self
                .followups
                .iter()
                .map(|q| format!("- {q}"))
                .collect::<Vec<_>>()
                .join("\n");
            put(&names.llm_followups, json!(bullets));
        }

        fields
    }
}
