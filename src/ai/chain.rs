//! Ordered fallback over analysis backends

use super::backend::AnalysisBackend;
use super::capability::Capability;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Fixed-priority sequence of backends consulted per capability
///
/// The order is set at construction and never changes during a run. An empty
/// chain is valid: every invocation then returns `None` immediately and the
/// orchestrator falls back to its defaults.
#[derive(Clone, Default)]
pub struct BackendChain {
    backends: Vec<Arc<dyn AnalysisBackend>>,
}

impl BackendChain {
    pub fn new(backends: Vec<Arc<dyn AnalysisBackend>>) -> Self {
        Self { backends }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends a backend at the lowest priority
    pub fn with_backend(mut self, backend: Arc<dyn AnalysisBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn backends(&self) -> &[Arc<dyn AnalysisBackend>] {
        &self.backends
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Walks the chain for one capability, stopping at the first answer
    ///
    /// Backends after the one that answered are not called. A backend that
    /// returned `None` is not retried.
    pub async fn invoke(
        &self,
        capability: Capability,
        code: &str,
        filename: &str,
        language: &str,
    ) -> Option<String> {
        for (position, backend) in self.backends.iter().enumerate() {
            if let Some(text) = backend.run(capability, code, filename, language).await {
                debug!(
                    backend = backend.name(),
                    position,
                    %capability,
                    file = filename,
                    "Capability resolved"
                );
                return Some(text);
            }
        }

        debug!(%capability, file = filename, "Backend chain exhausted");
        None
    }
}

impl fmt::Debug for BackendChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendChain")
            .field("backends", &self.names())
            .finish()
    }
}
