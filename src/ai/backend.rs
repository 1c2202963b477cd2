//! Analysis backend abstraction
//!
//! An analysis backend is a remote (or scripted) service able to perform the
//! three [`Capability`] operations on a single source file. Every operation
//! returns `Option<String>`: `None` is the explicit "no answer" signal that
//! makes the [`BackendChain`](super::BackendChain) move on to the next
//! backend. Backends never surface errors to their callers.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

use super::capability::Capability;
use super::error::BackendError;

/// Availability reported by [`AnalysisBackend::health_check`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum BackendHealth {
    /// The service answered its health endpoint
    Available,
    /// The service could not be reached or answered with an error
    Unavailable(String),
    /// A required credential is missing; the backend never calls the network
    NotConfigured,
}

impl BackendHealth {
    pub fn is_available(&self) -> bool {
        matches!(self, BackendHealth::Available)
    }
}

impl fmt::Display for BackendHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendHealth::Available => write!(f, "available"),
            BackendHealth::Unavailable(reason) => write!(f, "unavailable ({})", reason),
            BackendHealth::NotConfigured => write!(f, "not configured"),
        }
    }
}

/// Capability interface implemented by every analysis backend
///
/// Implementations must be stateless across invocations: no session or
/// conversation memory is carried from one call to the next.
///
/// # Example
///
/// ```no_run
/// use codelens::ai::{AnalysisBackend, OllamaBackend, OllamaConfig};
///
/// # async fn example() {
/// let backend = OllamaBackend::new(OllamaConfig::default());
/// match backend.explain("print('hi')", "hello.py", "python").await {
///     Some(text) => println!("{}", text),
///     None => println!("{} could not explain the file", backend.name()),
/// }
/// # }
/// ```
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Rewrites `code`; the answer is expected to contain code only
    async fn refactor(&self, code: &str, filename: &str, language: &str) -> Option<String>;

    /// Produces a structured explanation of `code`
    async fn explain(&self, code: &str, filename: &str, language: &str) -> Option<String>;

    /// Extracts the core logic of `code` as numbered steps
    async fn trace_core_logic(&self, code: &str, filename: &str, language: &str)
        -> Option<String>;

    /// Short identifier used in logs and the `backends` listing
    fn name(&self) -> &str;

    fn model_info(&self) -> Option<String> {
        None
    }

    /// Probes the service without performing an analysis
    async fn health_check(&self) -> BackendHealth {
        BackendHealth::Available
    }

    /// Dispatches to the operation matching `capability`
    async fn run(
        &self,
        capability: Capability,
        code: &str,
        filename: &str,
        language: &str,
    ) -> Option<String> {
        match capability {
            Capability::Refactor => self.refactor(code, filename, language).await,
            Capability::Explain => self.explain(code, filename, language).await,
            Capability::TraceCoreLogic => self.trace_core_logic(code, filename, language).await,
        }
    }
}

/// Converts the outcome of a backend call into the absent-result convention
///
/// Errors and blank generations both become `None`; errors are logged here so
/// variants don't each repeat it.
pub(crate) fn into_absent(
    backend: &str,
    capability: Capability,
    filename: &str,
    outcome: Result<String, BackendError>,
) -> Option<String> {
    match outcome {
        Ok(text) if text.trim().is_empty() => {
            warn!(
                backend,
                %capability,
                file = filename,
                "Backend returned empty text"
            );
            None
        }
        Ok(text) => {
            debug!(
                backend,
                %capability,
                file = filename,
                chars = text.len(),
                "Backend produced result"
            );
            Some(text)
        }
        Err(BackendError::NotConfigured { .. }) => {
            debug!(backend, %capability, "Backend not configured, skipping");
            None
        }
        Err(e) => {
            warn!(
                backend,
                %capability,
                file = filename,
                error = %e,
                "Backend call failed"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_absent_keeps_text() {
        let out = into_absent("t", Capability::Explain, "a.py", Ok("hello".to_string()));
        assert_eq!(out.as_deref(), Some("hello"));
    }

    #[test]
    fn test_into_absent_drops_blank_text() {
        let out = into_absent("t", Capability::Explain, "a.py", Ok("  \n".to_string()));
        assert!(out.is_none());
    }

    #[test]
    fn test_into_absent_drops_errors() {
        let out = into_absent(
            "t",
            Capability::Refactor,
            "a.py",
            Err(BackendError::TimeoutError { seconds: 1 }),
        );
        assert!(out.is_none());
    }

    #[test]
    fn test_health_display() {
        assert_eq!(BackendHealth::Available.to_string(), "available");
        assert_eq!(
            BackendHealth::Unavailable("HTTP 500".to_string()).to_string(),
            "unavailable (HTTP 500)"
        );
        assert!(!BackendHealth::NotConfigured.is_available());
    }
}
