//! Analysis backend integrations
//!
//! This module provides the capability interface shared by every analysis
//! backend, the concrete variants wrapping remote LLM services, and the
//! ordered fallback chain the orchestrator consults.

pub mod backend;
pub mod capability;
pub mod chain;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod prompt;

/// Per-request timeout used when a backend config does not override it
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub use backend::{AnalysisBackend, BackendHealth};
pub use capability::Capability;
pub use chain::BackendChain;
pub use error::BackendError;
pub use gemini::{GeminiBackend, GeminiConfig};
pub use mock::{MockBackend, MockCall};
pub use ollama::{OllamaBackend, OllamaConfig};
pub use openai::{OpenAIBackend, OpenAIConfig};
pub use prompt::{CapabilityPrompt, PromptBuilder};
