//! Record store boundary. Pipelines only ever talk to `dyn RecordStore`.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::record::{Fields, Record};

pub mod airtable;
#[cfg(test)]
pub mod memory;

/// Row selection understood by every store backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Exact match on a text column, e.g. the external applicant ID.
    Equals { field: String, value: String },
    /// Substring match over the joined values of a link column.
    LinkedTo { field: String, value: String },
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn linked_to(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::LinkedTo {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Fetch/create/update primitives of the record store.
///
/// `fetch` returns the complete result set; paging is the backend's concern.
/// Writes are synchronous and fail with `AppError::StoreWriteRejected`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch(&self, table: &str, filter: Option<&Filter>) -> Result<Vec<Record>, AppError>;

    async fn update(&self, table: &str, record_id: &str, fields: Fields)
        -> Result<Record, AppError>;

    async fn create(&self, table: &str, fields: Fields) -> Result<Record, AppError>;
}
