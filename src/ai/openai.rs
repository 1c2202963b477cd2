//! OpenAI chat-completions backend
//!
//! Works against the OpenAI API and any service exposing the same
//! `/chat/completions` contract (point `base_url` at it). Without an API key
//! the backend reports itself as not configured and never calls the network.

use super::backend::{into_absent, AnalysisBackend, BackendHealth};
use super::capability::Capability;
use super::error::BackendError;
use super::prompt::PromptBuilder;
use super::DEFAULT_TIMEOUT_SECS;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const TEMPERATURE: f32 = 0.1;

/// Connection settings for an OpenAI-compatible service
#[derive(Clone, PartialEq, Eq)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub model: String,
    /// API root including the version segment, e.g. "https://api.openai.com/v1"
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub struct OpenAIBackend {
    config: OpenAIConfig,
    http_client: Client,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn chat(&self, system: &str, user: String) -> Result<String, BackendError> {
        let api_key = self.api_key().ok_or_else(|| BackendError::NotConfigured {
            message: "OPENAI_API_KEY is not set".to_string(),
        })?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
        };

        debug!(
            "Sending request to OpenAI: model={}, prompt_length={}",
            self.config.model,
            request.messages[1].content.len()
        );

        let start = Instant::now();
        let timeout_secs = self.config.timeout.as_secs();

        let response = self
            .http_client
            .post(self.endpoint("/chat/completions"))
            .timeout(self.config.timeout)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e, timeout_secs))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                message: format!("HTTP {}: {}", status, body),
                status_code: status.as_u16(),
            });
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::from_reqwest(&e, timeout_secs))?;

        info!(
            "OpenAI generation completed in {:.2}s (model={})",
            start.elapsed().as_secs_f64(),
            self.config.model
        );

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| BackendError::InvalidResponse {
                message: "No content in chat completion".to_string(),
            })
    }

    async fn analyze(
        &self,
        capability: Capability,
        code: &str,
        filename: &str,
        language: &str,
    ) -> Option<String> {
        if !self.is_configured() {
            return None;
        }
        let prompt = PromptBuilder::build(capability, code, filename, language);
        let outcome = self.chat(prompt.system, prompt.user).await;
        into_absent(self.name(), capability, filename, outcome)
    }
}

#[async_trait]
impl AnalysisBackend for OpenAIBackend {
    async fn refactor(&self, code: &str, filename: &str, language: &str) -> Option<String> {
        self.analyze(Capability::Refactor, code, filename, language)
            .await
    }

    async fn explain(&self, code: &str, filename: &str, language: &str) -> Option<String> {
        self.analyze(Capability::Explain, code, filename, language)
            .await
    }

    async fn trace_core_logic(
        &self,
        code: &str,
        filename: &str,
        language: &str,
    ) -> Option<String> {
        self.analyze(Capability::TraceCoreLogic, code, filename, language)
            .await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model_info(&self) -> Option<String> {
        Some(format!("{} @ {}", self.config.model, self.config.base_url))
    }

    async fn health_check(&self) -> BackendHealth {
        let Some(api_key) = self.api_key() else {
            return BackendHealth::NotConfigured;
        };

        match self
            .http_client
            .get(self.endpoint("/models"))
            .timeout(self.config.timeout)
            .bearer_auth(api_key)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => BackendHealth::Available,
            Ok(response) => BackendHealth::Unavailable(format!("HTTP {}", response.status())),
            Err(e) => BackendHealth::Unavailable(
                BackendError::from_reqwest(&e, self.config.timeout.as_secs()).to_string(),
            ),
        }
    }
}

impl fmt::Debug for OpenAIBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIBackend")
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
