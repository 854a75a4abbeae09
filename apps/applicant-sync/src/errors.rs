use thiserror::Error;

/// Application-level error type.
///
/// Every variant is fatal for the applicant being processed. LLM failures never
/// reach this type; they are absorbed at the evaluation boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error(
        "Store rejected write to '{table}'{} (status {status}; fields: {}): {body}",
        .record_id.as_deref().map(|id| format!(" record {id}")).unwrap_or_default(),
        .fields.join(", ")
    )]
    StoreWriteRejected {
        table: String,
        record_id: Option<String>,
        fields: Vec<String>,
        status: u16,
        body: String,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        AppError::Store(value.to_string())
    }
}
