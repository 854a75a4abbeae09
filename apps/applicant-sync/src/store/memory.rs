//! In-process `RecordStore` used by pipeline tests.
//!
//! Filters behave like the Airtable formulas they stand for: `LinkedTo` joins
//! the primary-field values of the linked records and does a substring search.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{Filter, RecordStore};
use crate::errors::AppError;
use crate::models::record::{Fields, Record};

#[derive(Debug, Clone, PartialEq)]
pub enum WriteKind {
    Create,
    Update,
}

/// One write as the store received it.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteLog {
    pub kind: WriteKind,
    pub table: String,
    pub record_id: String,
    pub fields: Fields,
}

#[derive(Default)]
struct Inner {
    tables: BTreeMap<String, Vec<Record>>,
    writes: Vec<WriteLog>,
    rejected_tables: HashSet<String>,
    next_id: u32,
}

pub struct MemoryStore {
    primary_field: String,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// `primary_field` is the column a link resolves to when joined.
    pub fn new(primary_field: impl Into<String>) -> Self {
        Self {
            primary_field: primary_field.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Inserts a record directly, bypassing the write log.
    pub fn seed(&self, table: &str, id: &str, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        let mut inner = self.inner.lock().unwrap();
        inner.tables.entry(table.to_string()).or_default().push(Record {
            id: id.to_string(),
            fields,
        });
    }

    pub fn records(&self, table: &str) -> Vec<Record> {
        let inner = self.inner.lock().unwrap();
        inner.tables.get(table).cloned().unwrap_or_default()
    }

    pub fn record(&self, table: &str, id: &str) -> Option<Record> {
        self.records(table).into_iter().find(|r| r.id == id)
    }

    pub fn writes(&self) -> Vec<WriteLog> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.inner.lock().unwrap().writes.clear();
    }

    /// Makes every subsequent write to `table` fail with a 422.
    pub fn reject_writes_to(&self, table: &str) {
        self.inner
            .lock()
            .unwrap()
            .rejected_tables
            .insert(table.to_string());
    }

    fn matches(&self, inner: &Inner, record: &Record, filter: &Filter) -> bool {
        match filter {
            Filter::Equals { field, value } => match record.fields.get(field) {
                Some(Value::String(s)) => s == value,
                Some(Value::Number(n)) => n.to_string() == *value,
                _ => false,
            },
            Filter::LinkedTo { field, value } => {
                let links = match record.fields.get(field) {
                    Some(Value::Array(items)) => items,
                    _ => return false,
                };
                let joined = links
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|link| self.primary_value(inner, link))
                    .collect::<Vec<_>>()
                    .join(",");
                joined.contains(value.as_str())
            }
        }
    }

    /// Resolves a linked record id to its primary value; unknown ids stand for themselves.
    fn primary_value(&self, inner: &Inner, link: &str) -> String {
        inner
            .tables
            .values()
            .flatten()
            .find(|r| r.id == link)
            .and_then(|r| r.text(&self.primary_field))
            .unwrap_or(link)
            .to_string()
    }

    fn rejection(table: &str, record_id: Option<&str>, fields: &Fields) -> AppError {
        AppError::StoreWriteRejected {
            table: table.to_string(),
            record_id: record_id.map(str::to_string),
            fields: fields.keys().cloned().collect(),
            status: 422,
            body: "{\"error\":\"rejected by test store\"}".to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch(&self, table: &str, filter: Option<&Filter>) -> Result<Vec<Record>, AppError> {
        let inner = self.inner.lock().unwrap();
        let rows = inner.tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        Ok(rows
            .iter()
            .filter(|r| filter.map_or(true, |f| self.matches(&inner, r, f)))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        table: &str,
        record_id: &str,
        fields: Fields,
    ) -> Result<Record, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.rejected_tables.contains(table) {
            return Err(Self::rejection(table, Some(record_id), &fields));
        }
        let record = inner
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| AppError::StoreWriteRejected {
                table: table.to_string(),
                record_id: Some(record_id.to_string()),
                fields: fields.keys().cloned().collect(),
                status: 404,
                body: "{\"error\":\"NOT_FOUND\"}".to_string(),
            })?;
        for (key, value) in &fields {
            if value.is_null() {
                record.fields.remove(key);
            } else {
                record.fields.insert(key.clone(), value.clone());
            }
        }
        let updated = record.clone();
        inner.writes.push(WriteLog {
            kind: WriteKind::Update,
            table: table.to_string(),
            record_id: record_id.to_string(),
            fields,
        });
        Ok(updated)
    }

    async fn create(&self, table: &str, fields: Fields) -> Result<Record, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.rejected_tables.contains(table) {
            return Err(Self::rejection(table, None, &fields));
        }
        inner.next_id += 1;
        let id = format!("recNew{:03}", inner.next_id);
        let stored: Fields = fields
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let record = Record {
            id: id.clone(),
            fields: stored,
        };
        inner
            .tables
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        inner.writes.push(WriteLog {
            kind: WriteKind::Create,
            table: table.to_string(),
            record_id: id,
            fields,
        });
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        let store = MemoryStore::new("Applicant ID");
        store.seed("Applicants", "recA", json!({ "Applicant ID": "APP-1" }));
        store.seed("Applicants", "recB", json!({ "Applicant ID": "APP-10" }));
        store.seed("Work Experience", "w1", json!({ "Applicant": ["recA"] }));
        store.seed("Work Experience", "w2", json!({ "Applicant": ["recB"] }));
        store
    }

    #[tokio::test]
    async fn test_equals_filter() {
        let store = store();
        let rows = store
            .fetch("Applicants", Some(&Filter::equals("Applicant ID", "APP-1")))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "recA");
    }

    #[tokio::test]
    async fn test_linked_filter_is_substring_like_find() {
        let store = store();
        let rows = store
            .fetch(
                "Work Experience",
                Some(&Filter::linked_to("Applicant", "APP-1")),
            )
            .await
            .unwrap();
        // FIND('APP-1', 'APP-10') also matches.
        assert_eq!(rows.len(), 2);

        let rows = store
            .fetch(
                "Work Experience",
                Some(&Filter::linked_to("Applicant", "APP-10")),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "w2");
    }

    #[tokio::test]
    async fn test_update_merges_and_null_clears() {
        let store = store();
        store.seed(
            "Personal Details",
            "p1",
            json!({ "Full Name": "Old", "Location": "USA" }),
        );
        let mut fields = Fields::new();
        fields.insert("Full Name".to_string(), json!("New"));
        fields.insert("Location".to_string(), Value::Null);
        store.update("Personal Details", "p1", fields).await.unwrap();

        let record = store.record("Personal Details", "p1").unwrap();
        assert_eq!(record.text("Full Name"), Some("New"));
        assert!(record.fields.get("Location").is_none());
    }

    #[tokio::test]
    async fn test_rejected_table() {
        let store = store();
        store.reject_writes_to("Work Experience");
        let err = store
            .create("Work Experience", Fields::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreWriteRejected { status: 422, .. }));
        assert!(store.writes().is_empty());
    }
}
