//! Decompress pipeline: stored canonical document → normalized rows.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::applicant::{ExperienceFields, PersonalFields, SalaryFields};
use crate::models::document::CanonicalDocument;
use crate::models::record::decode_all;
use crate::state::AppState;

pub mod reconcile;

pub use reconcile::{reconcile, ApplicantRef, ReconcileSummary, TableKind, WriteOp};

pub async fn run(state: &AppState, applicant_id: &str) -> Result<ReconcileSummary, AppError> {
    let tables = &state.config.tables;
    let names = &state.config.fields;

    let applicant = state.find_applicant(applicant_id).await?;

    let raw = applicant
        .text(&names.compressed_json)
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| {
            AppError::MalformedDocument(format!(
                "{} is empty for applicant {applicant_id}",
                names.compressed_json
            ))
        })?;
    let document = CanonicalDocument::from_stored_json(raw).map_err(|e| {
        AppError::MalformedDocument(format!(
            "{} for applicant {applicant_id} is not valid JSON: {e}",
            names.compressed_json
        ))
    })?;

    let personal = decode_all::<PersonalFields>(
        &state.fetch_linked(&tables.personal, applicant_id).await?,
    )?;
    let salary =
        decode_all::<SalaryFields>(&state.fetch_linked(&tables.salary, applicant_id).await?)?;
    let experience = decode_all::<ExperienceFields>(
        &state.fetch_linked(&tables.experience, applicant_id).await?,
    )?;

    let plan = reconcile(
        &document,
        &personal,
        &salary,
        &experience,
        &ApplicantRef {
            record_id: applicant.id.clone(),
            link_field: names.applicant_link.clone(),
        },
    );
    let summary = ReconcileSummary::from_plan(&plan);

    for op in plan {
        let table = match op.table() {
            TableKind::Personal => &tables.personal,
            TableKind::Salary => &tables.salary,
            TableKind::Experience => &tables.experience,
        };
        match op {
            WriteOp::Create { fields, .. } => {
                debug!("Creating row in {table}");
                state.store.create(table, fields).await?;
            }
            WriteOp::Update {
                record_id, fields, ..
            } => {
                debug!("Patching {table} row {record_id}");
                state.store.update(table, &record_id, fields).await?;
            }
        }
    }

    info!(
        "Applicant {applicant_id}: decompressed ({} created, {} updated; dates preserved)",
        summary.created(),
        summary.updated()
    );
    Ok(summary)
}
