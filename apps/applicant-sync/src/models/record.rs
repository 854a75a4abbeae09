use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Column name → value mapping as the record store transmits it.
pub type Fields = Map<String, Value>;

/// An untyped record as returned by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

/// A record whose fields were decoded into an explicit struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<F> {
    pub id: String,
    pub fields: F,
}

impl Record {
    /// Decodes the fields into `F`. Absent columns take the struct's defaults.
    pub fn decode<F: DeserializeOwned>(&self) -> Result<Row<F>, AppError> {
        let fields = serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            AppError::Store(format!("record {} has unexpected field types: {e}", self.id))
        })?;
        Ok(Row {
            id: self.id.clone(),
            fields,
        })
    }

    /// Returns a column's value when it is a string.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// Decodes every record, failing on the first one that does not fit `F`.
pub fn decode_all<F: DeserializeOwned>(records: &[Record]) -> Result<Vec<Row<F>>, AppError> {
    records.iter().map(Record::decode).collect()
}
