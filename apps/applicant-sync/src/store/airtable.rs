//! Airtable-compatible REST backend for `RecordStore`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::{Filter, RecordStore};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::record::{Fields, Record};

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<Record>,
    offset: Option<String>,
}

#[derive(Clone)]
pub struct AirtableStore {
    client: Client,
    api_url: String,
    base_id: String,
    token: String,
}

impl AirtableStore {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.store_timeout_secs))
            .build()
            .context("failed to build record store HTTP client")?;

        Ok(Self {
            client,
            api_url: config.airtable_api_url.trim_end_matches('/').to_string(),
            base_id: config.airtable_base_id.clone(),
            token: config.airtable_token.clone(),
        })
    }

    fn url(&self, table: &str, record_id: Option<&str>) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!("{}/{}", self.api_url, self.base_id))
            .map_err(|e| AppError::Store(format!("invalid store URL: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::Store("store URL cannot take a path".to_string()))?;
            segments.push(table);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn write(
        &self,
        method: Method,
        table: &str,
        record_id: Option<&str>,
        fields: Fields,
    ) -> Result<Record, AppError> {
        let url = self.url(table, record_id)?;
        let field_names: Vec<String> = fields.keys().cloned().collect();

        let response = self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                table,
                record = record_id.unwrap_or("-"),
                fields = ?field_names,
                status = status.as_u16(),
                %body,
                "record store rejected write"
            );
            return Err(AppError::StoreWriteRejected {
                table: table.to_string(),
                record_id: record_id.map(str::to_string),
                fields: field_names,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Record>().await?)
    }
}

/// Renders a filter as a store formula. Single quotes in values are escaped.
pub fn formula(filter: &Filter) -> String {
    match filter {
        Filter::Equals { field, value } => format!("{{{field}}}='{}'", escape(value)),
        Filter::LinkedTo { field, value } => {
            format!("FIND('{}', ARRAYJOIN({{{field}}}))", escape(value))
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn fetch(&self, table: &str, filter: Option<&Filter>) -> Result<Vec<Record>, AppError> {
        let url = self.url(table, None)?;
        let formula = filter.map(formula);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query: Vec<(&str, &str)> = Vec::new();
            if let Some(f) = formula.as_deref() {
                query.push(("filterByFormula", f));
            }
            if let Some(o) = offset.as_deref() {
                query.push(("offset", o));
            }

            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&self.token)
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::Store(format!(
                    "fetch from '{table}' failed with status {status}: {body}"
                )));
            }

            let page: ListResponse = response.json().await?;
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(table, count = records.len(), "fetched records");
        Ok(records)
    }

    async fn update(
        &self,
        table: &str,
        record_id: &str,
        fields: Fields,
    ) -> Result<Record, AppError> {
        self.write(Method::PATCH, table, Some(record_id), fields).await
    }

    async fn create(&self, table: &str, fields: Fields) -> Result<Record, AppError> {
        self.write(Method::POST, table, None, fields).await
    }
}
