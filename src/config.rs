//! Configuration management for codelens
//!
//! Configuration is an explicit value: backends receive their settings at
//! construction time and nothing below this module reads the process
//! environment. [`CodelensConfig::from_env`] is the single entry point that
//! does.
//!
//! # Environment Variables
//!
//! ## Chain
//! - `CODELENS_CHAIN`: comma-separated backend order - default: "ollama,gemini,openai"
//! - `CODELENS_REQUEST_TIMEOUT`: per-request timeout in seconds - default: "120"
//! - `CODELENS_LOG_LEVEL`: logging level - default: "info"
//!
//! ## Backends
//! - **Ollama**: `OLLAMA_HOST` (default: http://localhost:11434), `OLLAMA_MODEL`
//! - **OpenAI**: `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`
//! - **Gemini**: `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_BASE_URL`
//!
//! # Example
//!
//! ```no_run
//! use codelens::CodelensConfig;
//!
//! let config = CodelensConfig::from_env().expect("invalid configuration");
//! config.validate().expect("invalid configuration");
//! let chain = config.build_chain();
//! println!("chain: {:?}", chain.names());
//! ```

use crate::ai::{
    AnalysisBackend, BackendChain, GeminiBackend, GeminiConfig, OllamaBackend, OllamaConfig,
    OpenAIBackend, OpenAIConfig, DEFAULT_TIMEOUT_SECS,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Order used when `CODELENS_CHAIN` is not set: local and free first
pub const DEFAULT_CHAIN: [BackendKind; 3] =
    [BackendKind::Ollama, BackendKind::Gemini, BackendKind::OpenAI];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown backend: {0}. Valid options: ollama, gemini, openai")]
    UnknownBackend(String),

    #[error("Backend listed twice in chain: {0}")]
    DuplicateBackend(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// The backend variants that can appear in a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Ollama,
    Gemini,
    OpenAI,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::Gemini => "gemini",
            BackendKind::OpenAI => "openai",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(BackendKind::Ollama),
            "gemini" => Ok(BackendKind::Gemini),
            "openai" => Ok(BackendKind::OpenAI),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Parses a comma-separated chain; an empty string is an empty chain
pub fn parse_chain(value: &str) -> Result<Vec<BackendKind>, ConfigError> {
    let mut chain = Vec::new();
    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind: BackendKind = name.parse()?;
        if chain.contains(&kind) {
            return Err(ConfigError::DuplicateBackend(kind.to_string()));
        }
        chain.push(kind);
    }
    Ok(chain)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodelensConfig {
    /// Backend priority, first entry consulted first
    pub chain: Vec<BackendKind>,
    pub ollama: OllamaConfig,
    pub openai: OpenAIConfig,
    pub gemini: GeminiConfig,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for CodelensConfig {
    /// Built-in defaults, without looking at the environment
    fn default() -> Self {
        Self {
            chain: DEFAULT_CHAIN.to_vec(),
            ollama: OllamaConfig::default(),
            openai: OpenAIConfig::default(),
            gemini: GeminiConfig::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl CodelensConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup` instead of the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let chain = match lookup("CODELENS_CHAIN") {
            Some(value) => parse_chain(&value)?,
            None => defaults.chain,
        };

        let request_timeout_secs = match lookup("CODELENS_REQUEST_TIMEOUT") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::ParseError {
                    field: "CODELENS_REQUEST_TIMEOUT".to_string(),
                    error: e.to_string(),
                })?,
            None => defaults.request_timeout_secs,
        };

        let log_level = lookup("CODELENS_LOG_LEVEL")
            .unwrap_or(defaults.log_level)
            .to_lowercase();

        let ollama = OllamaConfig {
            host: lookup("OLLAMA_HOST").unwrap_or(defaults.ollama.host),
            model: lookup("OLLAMA_MODEL").unwrap_or(defaults.ollama.model),
            timeout: defaults.ollama.timeout,
        };

        let openai = OpenAIConfig {
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.openai.model),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.openai.base_url),
            timeout: defaults.openai.timeout,
        };

        let gemini = GeminiConfig {
            api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("GEMINI_MODEL").unwrap_or(defaults.gemini.model),
            base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.gemini.base_url),
            timeout: defaults.gemini.timeout,
        };

        Ok(Self {
            chain,
            ollama,
            openai,
            gemini,
            request_timeout_secs,
            log_level,
        }
        .with_timeout(request_timeout_secs))
    }

    /// Applies one request timeout to every backend
    pub fn with_timeout(mut self, secs: u64) -> Self {
        let timeout = Duration::from_secs(secs);
        self.request_timeout_secs = secs;
        self.ollama.timeout = timeout;
        self.openai.timeout = timeout;
        self.gemini.timeout = timeout;
        self
    }

    pub fn with_chain(mut self, chain: Vec<BackendKind>) -> Self {
        self.chain = chain;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "invalid log level '{}', expected one of: {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Instantiates the configured backends in chain order
    pub fn build_chain(&self) -> BackendChain {
        let backends = self
            .chain
            .iter()
            .map(|kind| -> Arc<dyn AnalysisBackend> {
                match kind {
                    BackendKind::Ollama => Arc::new(OllamaBackend::new(self.ollama.clone())),
                    BackendKind::Gemini => Arc::new(GeminiBackend::new(self.gemini.clone())),
                    BackendKind::OpenAI => Arc::new(OpenAIBackend::new(self.openai.clone())),
                }
            })
            .collect();
        BackendChain::new(backends)
    }

    /// Flattened view for display; credentials are reported as set/unset only
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let credential = |key: &Option<String>| {
            let label = if key.is_some() { "set" } else { "not set" };
            label.to_string()
        };

        let chain = self
            .chain
            .iter()
            .map(BackendKind::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut map = BTreeMap::new();
        map.insert("chain".to_string(), chain);
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("ollama.host".to_string(), self.ollama.host.clone());
        map.insert("ollama.model".to_string(), self.ollama.model.clone());
        map.insert("openai.model".to_string(), self.openai.model.clone());
        map.insert("openai.base_url".to_string(), self.openai.base_url.clone());
        map.insert("openai.api_key".to_string(), credential(&self.openai.api_key));
        map.insert("gemini.model".to_string(), self.gemini.model.clone());
        map.insert("gemini.base_url".to_string(), self.gemini.base_url.clone());
        map.insert("gemini.api_key".to_string(), credential(&self.gemini.api_key));
        map
    }
}
