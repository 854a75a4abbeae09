//! Compress/evaluate pipeline: normalized rows → canonical document → shortlist
//! decision → optional LLM enrichment.

use anyhow::Context;
use chrono::{NaiveDateTime, Utc};
use serde_json::json;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::evaluation;
use crate::models::applicant::{ExperienceFields, PersonalFields, SalaryFields, ShortlistStatus};
use crate::models::record::{decode_all, Fields};
use crate::state::AppState;

pub mod analytics;
pub mod canonical;
pub mod rules;

use canonical::canonicalize;
use rules::RuleEngine;

/// What one compress run did.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressOutcome {
    pub document_changed: bool,
    pub passed: bool,
    pub reason: String,
    pub lead_created: bool,
    pub llm_applied: bool,
}

pub async fn run(state: &AppState, applicant_id: &str) -> Result<CompressOutcome, AppError> {
    run_at(state, applicant_id, Utc::now().naive_utc()).await
}

/// `run` with an explicit clock for open-ended work history.
pub async fn run_at(
    state: &AppState,
    applicant_id: &str,
    now: NaiveDateTime,
) -> Result<CompressOutcome, AppError> {
    let tables = &state.config.tables;
    let names = &state.config.fields;

    let applicant = state.find_applicant(applicant_id).await?;

    let personal = decode_all::<PersonalFields>(
        &state.fetch_linked(&tables.personal, applicant_id).await?,
    )?;
    let experience = decode_all::<ExperienceFields>(
        &state.fetch_linked(&tables.experience, applicant_id).await?,
    )?;
    let salary =
        decode_all::<SalaryFields>(&state.fetch_linked(&tables.salary, applicant_id).await?)?;
    debug!(
        "Applicant {applicant_id}: {} personal, {} experience, {} salary rows",
        personal.len(),
        experience.len(),
        salary.len()
    );

    let document = canonicalize(&personal, &experience, &salary);
    let document_json = document
        .to_stored_json()
        .context("failed to serialize canonical document")?;

    let document_changed = applicant.text(&names.compressed_json) != Some(document_json.as_str());
    if document_changed {
        info!("Applicant {applicant_id}: canonical document changed, storing");
        state
            .store
            .update(
                &tables.applicants,
                &applicant.id,
                single(&names.compressed_json, json!(document_json)),
            )
            .await?;
    }

    let decision = RuleEngine::default().evaluate(
        personal.first(),
        &experience,
        salary.first(),
        now,
    );
    let status = ShortlistStatus::from_passed(decision.passed);
    info!("Applicant {applicant_id}: {} ({})", status.as_str(), decision.reason);
    state
        .store
        .update(
            &tables.applicants,
            &applicant.id,
            single(&names.shortlist_status, json!(status.as_str())),
        )
        .await?;

    let mut lead_created = false;
    if decision.passed {
        let leads = state.fetch_linked(&tables.shortlist, applicant_id).await?;
        if leads.is_empty() {
            let mut fields = Fields::new();
            fields.insert(names.applicant_link.clone(), json!([applicant.id]));
            fields.insert(names.compressed_json.clone(), json!(document_json));
            fields.insert(names.score_reason.clone(), json!(decision.reason));
            state.store.create(&tables.shortlist, fields).await?;
            info!("Applicant {applicant_id}: shortlisted lead created");
            lead_created = true;
        }
    }

    let mut llm_applied = false;
    if let Some(llm) = &state.llm {
        if state.config.llm.run_always || document_changed {
            if let Some(result) = evaluation::evaluate(llm, &document).await {
                let fields = result.applicant_fields(names);
                if !fields.is_empty() {
                    state
                        .store
                        .update(&tables.applicants, &applicant.id, fields)
                        .await?;
                    llm_applied = true;
                }
            }
        } else {
            debug!("Applicant {applicant_id}: document unchanged, skipping LLM");
        }
    }

    Ok(CompressOutcome {
        document_changed,
        passed: decision.passed,
        reason: decision.reason,
        lead_created,
        llm_applied,
    })
}

fn single(field: &str, value: serde_json::Value) -> Fields {
    let mut fields = Fields::new();
    fields.insert(field.to_string(), value);
    fields
}
