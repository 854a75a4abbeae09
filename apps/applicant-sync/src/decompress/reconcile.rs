//! Plans the writes that converge the normalized tables onto a canonical document.
//!
//! Planning is pure: it reads the existing rows and returns `WriteOp`s in the
//! order they must be applied. Nothing is ever deleted, and no patch mentions
//! a date column, so `Start`/`End` survive every round trip.
//!
//! In the single-row sections a key missing from the document leaves its cell
//! alone while an explicit `null` clears it. The document carries one salary
//! rate, so a row holding only a minimum rate comes back with that value in
//! `Preferred Rate` after its first round trip; the minimum stays as it was.

use std::collections::{HashMap, VecDeque};

use serde_json::{json, Value};

use crate::models::applicant::{columns, ExperienceFields, PersonalFields, SalaryFields};
use crate::models::document::CanonicalDocument;
use crate::models::record::{Fields, Row};

/// Normalized tables the reconciler writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Personal,
    Salary,
    Experience,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Create {
        table: TableKind,
        fields: Fields,
    },
    Update {
        table: TableKind,
        record_id: String,
        fields: Fields,
    },
}

impl WriteOp {
    pub fn table(&self) -> TableKind {
        match self {
            WriteOp::Create { table, .. } | WriteOp::Update { table, .. } => *table,
        }
    }
}

/// The applicant row every written record links back to.
#[derive(Debug, Clone)]
pub struct ApplicantRef {
    pub record_id: String,
    pub link_field: String,
}

impl ApplicantRef {
    fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(self.link_field.clone(), json!([self.record_id]));
        fields
    }
}

pub fn reconcile(
    document: &CanonicalDocument,
    personal: &[Row<PersonalFields>],
    salary: &[Row<SalaryFields>],
    experience: &[Row<ExperienceFields>],
    applicant: &ApplicantRef,
) -> Vec<WriteOp> {
    let mut plan = Vec::new();

    if let Some(section) = &document.personal {
        let mut fields = applicant.fields();
        put(&mut fields, columns::FULL_NAME, section.name.clone());
        put(&mut fields, columns::LOCATION, section.location.clone());
        plan.push(upsert_single(
            TableKind::Personal,
            personal.first().map(|row| row.id.as_str()),
            fields,
        ));
    }

    if let Some(section) = &document.salary {
        let mut fields = applicant.fields();
        put(&mut fields, columns::PREFERRED_RATE, section.rate.clone());
        put(&mut fields, columns::CURRENCY, section.currency.clone());
        put(&mut fields, columns::AVAILABILITY, section.availability.clone());
        plan.push(upsert_single(
            TableKind::Salary,
            salary.first().map(|row| row.id.as_str()),
            fields,
        ));
    }

    plan.extend(reconcile_experience(document, experience, applicant));
    plan
}

/// Queue match on the case-insensitive (company, title) pair. Each incoming
/// entry takes the earliest unclaimed row with its key, or becomes a create.
fn reconcile_experience(
    document: &CanonicalDocument,
    existing: &[Row<ExperienceFields>],
    applicant: &ApplicantRef,
) -> Vec<WriteOp> {
    let mut queues: HashMap<(String, String), VecDeque<&str>> = HashMap::new();
    for row in existing {
        let key = identity(row.fields.company.as_deref(), row.fields.title.as_deref());
        queues.entry(key).or_default().push_back(row.id.as_str());
    }

    document
        .experience
        .iter()
        .map(|item| {
            let company = item.company.as_deref().unwrap_or_default().trim();
            let title = item.title.as_deref().unwrap_or_default().trim();
            let claimed = queues
                .get_mut(&identity(Some(company), Some(title)))
                .and_then(VecDeque::pop_front);

            let mut fields = applicant.fields();
            match claimed {
                Some(record_id) => {
                    if !company.is_empty() {
                        fields.insert(columns::COMPANY.to_string(), json!(company));
                    }
                    if !title.is_empty() {
                        fields.insert(columns::TITLE.to_string(), json!(title));
                    }
                    WriteOp::Update {
                        table: TableKind::Experience,
                        record_id: record_id.to_string(),
                        fields,
                    }
                }
                None => {
                    fields.insert(columns::COMPANY.to_string(), non_empty(company));
                    fields.insert(columns::TITLE.to_string(), non_empty(title));
                    WriteOp::Create {
                        table: TableKind::Experience,
                        fields,
                    }
                }
            }
        })
        .collect()
}

fn identity(company: Option<&str>, title: Option<&str>) -> (String, String) {
    (
        company.unwrap_or_default().trim().to_lowercase(),
        title.unwrap_or_default().trim().to_lowercase(),
    )
}

fn upsert_single(table: TableKind, existing: Option<&str>, fields: Fields) -> WriteOp {
    match existing {
        Some(record_id) => WriteOp::Update {
            table,
            record_id: record_id.to_string(),
            fields,
        },
        None => WriteOp::Create { table, fields },
    }
}

/// Absent keys stay out of the patch; a present `null` is written as `null`.
fn put<T: Into<Value>>(fields: &mut Fields, column: &str, value: Option<Option<T>>) {
    if let Some(value) = value {
        fields.insert(column.to_string(), value.map_or(Value::Null, Into::into));
    }
}

fn non_empty(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        json!(value)
    }
}

/// Per-table write counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub created: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub personal: TableCounts,
    pub salary: TableCounts,
    pub experience: TableCounts,
}

impl ReconcileSummary {
    pub fn from_plan(plan: &[WriteOp]) -> Self {
        let mut summary = Self::default();
        for op in plan {
            let counts = match op.table() {
                TableKind::Personal => &mut summary.personal,
                TableKind::Salary => &mut summary.salary,
                TableKind::Experience => &mut summary.experience,
            };
            match op {
                WriteOp::Create { .. } => counts.created += 1,
                WriteOp::Update { .. } => counts.updated += 1,
            }
        }
        summary
    }

    pub fn created(&self) -> usize {
        self.personal.created + self.salary.created + self.experience.created
    }

    pub fn updated(&self) -> usize {
        self.personal.updated + self.salary.updated + self.experience.updated
    }
}
