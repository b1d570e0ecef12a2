use async_trait::async_trait;
use reqwest::StatusCode;
use rig::{client::CompletionClient, completion::Prompt, providers::openrouter};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::info;

use crate::config::ServiceConfig;
use crate::prompt::{AssessmentPrompt, MAX_COMPLETION_TOKENS, SAMPLING_TEMPERATURE};

pub const OPENROUTER_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("model provider rejected the API credential")]
    Auth,
    #[error("model provider quota exhausted")]
    Quota,
    #[error("model provider call failed: {0}")]
    Provider(String),
    #[error("could not reach the model provider: {0}")]
    Transport(String),
}

/// Seam between the HTTP service and the model provider. Production uses
/// OpenRouter; tests script replies through a stub.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &AssessmentPrompt) -> Result<String, BackendError>;
}

pub struct OpenRouterBackend {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl OpenRouterBackend {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Text-only analysis goes through the rig agent.
    async fn complete_text(&self, prompt: &AssessmentPrompt) -> Result<String, BackendError> {
        let client = openrouter::Client::new(&self.config.api_key);
        let agent = client
            .agent(&self.config.text_model)
            .preamble(&prompt.system)
            .temperature(SAMPLING_TEMPERATURE)
            .max_tokens(MAX_COMPLETION_TOKENS as u64)
            .build();

        info!(model = %self.config.text_model, "requesting text-based assessment");

        agent
            .prompt(&prompt.user)
            .await
            .map_err(|e| classify_provider_error(&e.to_string()))
    }

    /// Vision-enhanced analysis sends the inline image payload alongside the
    /// text instructions in a raw chat-completions call.
    async fn complete_vision(
        &self,
        prompt: &AssessmentPrompt,
        data_url: String,
    ) -> Result<String, BackendError> {
        let payload = json!({
            "model": self.config.vision_model,
            "messages": [
                {
                    "role": "system",
                    "content": prompt.system
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": prompt.user },
                        { "type": "image_url", "image_url": { "url": data_url } }
                    ]
                }
            ],
            "temperature": SAMPLING_TEMPERATURE,
            "max_tokens": MAX_COMPLETION_TOKENS
        });

        info!(model = %self.config.vision_model, "requesting vision-enhanced assessment");

        let response = self
            .http
            .post(OPENROUTER_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(BackendError::Auth),
            StatusCode::TOO_MANY_REQUESTS => return Err(BackendError::Quota),
            status if !status.is_success() => {
                return Err(BackendError::Provider(format!(
                    "completion request failed: {status}"
                )));
            }
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Provider(e.to_string()))?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BackendError::Provider("completion response missing content".to_string()))
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterBackend {
    async fn complete(&self, prompt: &AssessmentPrompt) -> Result<String, BackendError> {
        match prompt.data_url() {
            Some(data_url) => self.complete_vision(prompt, data_url).await,
            None => self.complete_text(prompt).await,
        }
    }
}

/// The rig error surface is a display string, so auth and quota failures are
/// recognized by their markers.
fn classify_provider_error(message: &str) -> BackendError {
    let lower = message.to_lowercase();
    if lower.contains("401") || lower.contains("unauthorized") || lower.contains("invalid_api_key")
    {
        BackendError::Auth
    } else if lower.contains("429") || lower.contains("quota") || lower.contains("rate limit") {
        BackendError::Quota
    } else {
        BackendError::Provider(message.to_string())
    }
}
