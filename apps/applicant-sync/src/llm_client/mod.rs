/// LLM Client: the single point of entry for text generation.
///
/// No other module may call a model API directly. Callers hand a prompt to
/// `LlmClient::complete`, which walks a prioritized list of generators and
/// returns the first non-empty text, or `None` once every generator failed.
/// Failures never propagate past this module.
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::LlmConfig;

pub mod gemini;
pub mod mock;

pub use gemini::GeminiGenerator;
pub use mock::MockGenerator;

/// Models tried after the configured one.
const FALLBACK_MODELS: &[&str] = &["gemini-1.5-flash", "gemini-1.0-pro"];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One transport strategy. Implementations own their retry policy.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Prioritized chain of generators with isolated failure handling.
#[derive(Clone)]
pub struct LlmClient {
    generators: Vec<Arc<dyn TextGenerator>>,
}

impl LlmClient {
    pub fn new(generators: Vec<Arc<dyn TextGenerator>>) -> Self {
        Self { generators }
    }

    /// Builds the default chain, or `None` when neither a key nor the mock is configured.
    ///
    /// Order: mock (if enabled), configured model, then `FALLBACK_MODELS`.
    pub fn from_config(config: &LlmConfig) -> anyhow::Result<Option<Self>> {
        if !config.enabled() {
            return Ok(None);
        }

        let mut generators: Vec<Arc<dyn TextGenerator>> = Vec::new();

        if config.mock {
            generators.push(Arc::new(MockGenerator::default()));
        }

        if let Some(api_key) = &config.api_key {
            let mut models = vec![config.model.as_str()];
            for model in FALLBACK_MODELS {
                if !models.contains(model) {
                    models.push(*model);
                }
            }
            for model in models {
                generators.push(Arc::new(GeminiGenerator::new(config, api_key, model)?));
            }
        }

        if generators.is_empty() {
            return Ok(None);
        }

        info!(
            "LLM chain initialized: {}",
            generators
                .iter()
                .map(|g| g.name().to_string())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(Some(Self::new(generators)))
    }

    /// Returns the first non-empty response in chain order.
    pub async fn complete(&self, prompt: &str) -> Option<String> {
        let mut last_error: Option<String> = None;

        for generator in &self.generators {
            match generator.generate(prompt).await {
                Ok(text) if !text.trim().is_empty() => return Some(text.trim().to_string()),
                Ok(_) => {
                    warn!("LLM generator {} returned empty text", generator.name());
                    last_error = Some(LlmError::EmptyContent.to_string());
                }
                Err(e) => {
                    warn!("LLM generator {} failed: {e}", generator.name());
                    last_error = Some(e.to_string());
                }
            }
        }

        warn!(
            "LLM unavailable, skipping enrichment: {}",
            last_error.as_deref().unwrap_or("no generators configured")
        );
        None
    }
}
