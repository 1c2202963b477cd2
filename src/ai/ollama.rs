//! Ollama HTTP backend for local LLM inference
//!
//! Talks to the `/api/generate` endpoint of a locally running Ollama server.
//! This is the cheapest backend (no credential, no network egress) and sits
//! first in the default chain.
//!
//! # Example
//!
//! ```no_run
//! use codelens::ai::{AnalysisBackend, OllamaBackend, OllamaConfig};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let backend = OllamaBackend::new(OllamaConfig {
//!     host: "http://localhost:11434".to_string(),
//!     model: "qwen2.5-coder:7b".to_string(),
//!     timeout: Duration::from_secs(60),
//! });
//!
//! if backend.health_check().await.is_available() {
//!     let code = backend.refactor("x=1", "a.py", "python").await;
//!     println!("{:?}", code);
//! }
//! # }
//! ```

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

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";

/// Connection settings for an Ollama server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Base URL, e.g. "http://localhost:11434"
    pub host: String,
    /// Model tag, e.g. "qwen2.5-coder:7b"
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Backend for a local Ollama server
///
/// Thread-safe; the inner HTTP client pools connections and can be shared
/// through `Arc`.
pub struct OllamaBackend {
    config: OllamaConfig,
    http_client: Client,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }

    async fn generate(&self, prompt: String) -> Result<String, BackendError> {
        let url = self.endpoint("/api/generate");

        let request = OllamaRequest {
            model: self.config.model.clone(),
            prompt,
            stream: false,
        };

        debug!(
            "Sending request to Ollama: model={}, prompt_length={}",
            self.config.model,
            request.prompt.len()
        );

        let start = Instant::now();
        let timeout_secs = self.config.timeout.as_secs();

        let response = self
            .http_client
            .post(&url)
            .timeout(self.config.timeout)
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

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| BackendError::from_reqwest(&e, timeout_secs))?;

        info!(
            "Ollama generation completed in {:.2}s (model={})",
            start.elapsed().as_secs_f64(),
            self.config.model
        );

        ollama_response
            .response
            .ok_or_else(|| BackendError::InvalidResponse {
                message: "missing `response` field".to_string(),
            })
    }

    async fn analyze(
        &self,
        capability: Capability,
        code: &str,
        filename: &str,
        language: &str,
    ) -> Option<String> {
        let prompt = PromptBuilder::build(capability, code, filename, language).into_single();
        let outcome = self.generate(prompt).await;
        into_absent(self.name(), capability, filename, outcome)
    }
}

#[async_trait]
impl AnalysisBackend for OllamaBackend {
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
        "ollama"
    }

    fn model_info(&self) -> Option<String> {
        Some(format!("{} @ {}", self.config.model, self.config.host))
    }

    /// Lists local models via `/api/tags`
    async fn health_check(&self) -> BackendHealth {
        let url = self.endpoint("/api/tags");
        debug!("Checking Ollama health at {}", url);

        match self
            .http_client
            .get(&url)
            .timeout(self.config.timeout)
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

impl fmt::Debug for OllamaBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaBackend")
            .field("host", &self.config.host)
            .field("model", &self.config.model)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

/// Request structure for the Ollama generate API
#[derive(Debug, Clone, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    /// Always false: the whole generation is returned in one body
    stream: bool,
}

/// Response structure from the Ollama generate API
#[derive(Debug, Clone, Deserialize)]
struct OllamaResponse {
    response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_default_config() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost:11434");
        assert_eq!(config.model, "qwen2.5-coder:7b");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_backend_trait_methods() {
        let backend = OllamaBackend::new(OllamaConfig::default());
        assert_eq!(backend.name(), "ollama");
        assert_eq!(
            backend.model_info().unwrap(),
            "qwen2.5-coder:7b @ http://localhost:11434"
        );
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let backend = OllamaBackend::new(OllamaConfig {
            host: "http://127.0.0.1:11434/".to_string(),
            ..OllamaConfig::default()
        });
        assert_eq!(
            backend.endpoint("/api/generate"),
            "http://127.0.0.1:11434/api/generate"
        );
    }

    #[test]
    fn test_ollama_request_serialization() {
        let request = OllamaRequest {
            model: "qwen:7b".to_string(),
            prompt: "test prompt".to_string(),
            stream: false,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"model\":\"qwen:7b\""));
        assert!(json.contains("\"prompt\":\"test prompt\""));
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn test_ollama_response_ignores_extra_fields() {
        let json = r#"{
            "model": "qwen:7b",
            "created_at": "2024-01-01T00:00:00Z",
            "response": "test response",
            "done": true,
            "eval_count": 20
        }"#;

        let response: OllamaResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.response.as_deref(), Some("test response"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_absent() {
        let backend = OllamaBackend::new(OllamaConfig {
            host: "http://localhost:59999".to_string(),
            timeout: Duration::from_millis(200),
            ..OllamaConfig::default()
        });

        assert!(backend.explain("x = 1", "a.py", "python").await.is_none());
        assert!(!backend.health_check().await.is_available());
    }
}
