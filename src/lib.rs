//! codelens - multi-backend code analysis
//!
//! This library walks a source tree and, for every selected file, produces
//! three artifacts: a refactored version, a structured Markdown explanation
//! and a trace of the core logic. Each artifact is requested from an ordered
//! chain of LLM backends; the first backend that answers wins, and a
//! deterministic default fills in when none does.
//!
//! # Core Concepts
//!
//! - **Backends**: interchangeable services (Ollama, Gemini, OpenAI) behind the
//!   [`AnalysisBackend`] trait. A failed call is reported as `None`, never as
//!   an error.
//! - **Chain**: the ordered [`BackendChain`] consulted once per artifact.
//! - **Orchestrator**: [`AnalysisOrchestrator`] drives discovery, loading and
//!   the three chain walks per file, and aggregates the results.
//!
//! # Example Usage
//!
//! ```no_run
//! use codelens::{AnalysisOrchestrator, AnalyzeRequest, CodelensConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CodelensConfig::from_env()?;
//! let orchestrator = AnalysisOrchestrator::new(config.build_chain());
//!
//! let response = orchestrator
//!     .analyze(&AnalyzeRequest::new("./src").with_max_files(10))
//!     .await?;
//!
//! for (path, result) in response.files.iter() {
//!     println!("{}\n{}", path, result.explanation);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`ai`]: backend trait, HTTP backends and the fallback chain
//! - [`source`]: file discovery, loading and language labels
//! - [`analysis`]: orchestration and result aggregation
//! - [`config`]: environment-driven configuration
//! - [`cli`]: command-line interface

pub mod ai;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod source;
pub mod util;

pub use ai::{AnalysisBackend, BackendChain, BackendHealth, Capability, MockBackend};
pub use analysis::{AnalysisOrchestrator, AnalysisResponse, AnalysisResult, AnalyzeRequest};
pub use config::{BackendKind, CodelensConfig, ConfigError};
pub use error::AnalysisError;
pub use source::{ContentLoader, SourceDiscovery, SourceFile};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_codelens() {
        assert_eq!(NAME, "codelens");
    }
}
