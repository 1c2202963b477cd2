//! Google Gemini `generateContent` backend

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

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Backend for the Gemini generative language API
///
/// Optional in the default chain: without `GEMINI_API_KEY` it answers `None`
/// to everything and costs nothing.
pub struct GeminiBackend {
    config: GeminiConfig,
    http_client: Client,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Self {
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

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn generate(&self, system: &str, user: String) -> Result<String, BackendError> {
        let api_key = self.api_key().ok_or_else(|| BackendError::NotConfigured {
            message: "GEMINI_API_KEY is not set".to_string(),
        })?;

        let url = format!("{}/models/{}:generateContent", self.base(), self.config.model);

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: user }],
            }],
        };

        debug!("Sending request to Gemini: model={}", self.config.model);

        let start = Instant::now();
        let timeout_secs = self.config.timeout.as_secs();

        let response = self
            .http_client
            .post(&url)
            .timeout(self.config.timeout)
            .header(API_KEY_HEADER, api_key)
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

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::from_reqwest(&e, timeout_secs))?;

        info!(
            "Gemini generation completed in {:.2}s (model={})",
            start.elapsed().as_secs_f64(),
            self.config.model
        );

        body.text().ok_or_else(|| BackendError::InvalidResponse {
            message: "No candidate text in Gemini response".to_string(),
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
        let outcome = self.generate(prompt.system, prompt.user).await;
        into_absent(self.name(), capability, filename, outcome)
    }
}

#[async_trait]
impl AnalysisBackend for GeminiBackend {
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
        "gemini"
    }

    fn model_info(&self) -> Option<String> {
        Some(self.config.model.clone())
    }

    async fn health_check(&self) -> BackendHealth {
        let Some(api_key) = self.api_key() else {
            return BackendHealth::NotConfigured;
        };

        let url = format!("{}/models?pageSize=1", self.base());
        match self
            .http_client
            .get(&url)
            .timeout(self.config.timeout)
            .header(API_KEY_HEADER, api_key)
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

impl fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("config", &self.config)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        Some(text)
    }
}
