use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{LlmError, TextGenerator};
use crate::config::LlmConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_tokens: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    pub output_tokens: u32,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate that has any.
    pub fn text(&self) -> Option<String> {
        self.candidates.iter().find_map(|candidate| {
            let text: String = candidate
                .content
                .as_ref()?
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect();
            (!text.trim().is_empty()).then_some(text)
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini `generateContent` transport for one model.
/// Retries on transport errors, 429 and 5xx with exponential backoff.
pub struct GeminiGenerator {
    client: Client,
    name: String,
    endpoint: String,
    api_key: String,
    backoff_base_ms: u64,
    max_attempts: u32,
}

impl GeminiGenerator {
    pub fn new(config: &LlmConfig, api_key: &str, model: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build LLM HTTP client")?;

        Ok(Self {
            client,
            name: format!("gemini:{model}"),
            endpoint: format!(
                "{}/models/{model}:generateContent",
                config.api_url.trim_end_matches('/')
            ),
            api_key: api_key.to_string(),
            backoff_base_ms: config.backoff_base_ms,
            max_attempts: config.max_attempts.max(1),
        })
    }

    async fn call(&self, prompt: &str) -> Result<GenerateResponse, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let mut attempt = 1;
        loop {
            match self.send(&request_body).await {
                Err(e) if retryable(&e) && attempt < self.max_attempts => {
                    let delay = backoff_delay(self.backoff_base_ms, attempt);
                    warn!(
                        "{} attempt {} failed ({}), retrying after {}ms...",
                        self.name,
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send(&self, request_body: &GenerateRequest<'_>) -> Result<GenerateResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "{} call succeeded: prompt_tokens={}, output_tokens={}",
                self.name, usage.prompt_tokens, usage.output_tokens
            );
        }

        Ok(parsed)
    }
}

/// Transport failures, rate limiting and server errors are worth another try.
fn retryable(error: &LlmError) -> bool {
    match error {
        LlmError::Http(_) => true,
        LlmError::Api { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Wait before retry number `attempt` (1-based): base, 2×base, 4×base, ...
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(base_ms.saturating_mul(factor))
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        response.text().ok_or(LlmError::EmptyContent)
    }
}
