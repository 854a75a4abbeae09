use crate::models::applicant::{ExperienceFields, PersonalFields, SalaryFields};
use crate::models::document::{CanonicalDocument, ExperienceItem, PersonalSection, SalarySection};
use crate::models::record::Row;

/// Flattens the three normalized row-sets into one canonical document.
///
/// Only the first personal and salary rows are read. Experience rows keep their
/// input order; a row with neither company nor title is dropped.
pub fn canonicalize(
    personal: &[Row<PersonalFields>],
    experience: &[Row<ExperienceFields>],
    salary: &[Row<SalaryFields>],
) -> CanonicalDocument {
    let personal = personal.first().map(|row| PersonalSection {
        name: Some(row.fields.full_name.clone()),
        location: Some(row.fields.location.clone()),
    });

    let experience = experience
        .iter()
        .filter(|row| has_text(&row.fields.company) || has_text(&row.fields.title))
        .map(|row| ExperienceItem {
            company: row.fields.company.clone(),
            title: row.fields.title.clone(),
        })
        .collect();

    let salary = salary.first().map(|row| SalarySection {
        rate: Some(row.fields.rate().cloned()),
        currency: Some(row.fields.currency.clone()),
        availability: Some(row.fields.availability.clone()),
    });

    CanonicalDocument {
        personal,
        experience,
        salary,
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}
