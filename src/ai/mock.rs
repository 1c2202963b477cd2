use super::backend::AnalysisBackend;
use super::capability::Capability;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Scripted backend for tests
///
/// Each capability answers with a fixed value (absent unless configured) and
/// every invocation is recorded so tests can assert which backends the chain
/// consulted.
pub struct MockBackend {
    name: String,
    responses: HashMap<Capability, String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<MockCall>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub capability: Capability,
    pub filename: String,
}

impl MockBackend {
    /// A backend that returns `None` for every capability
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: HashMap::new(),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A backend that answers `text` for every capability
    pub fn answering(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Capability::ALL
            .iter()
            .fold(Self::new(name), |mock, cap| mock.with_response(*cap, text.clone()))
    }

    pub fn with_response(mut self, capability: Capability, text: impl Into<String>) -> Self {
        self.responses.insert(capability, text.into());
        self
    }

    /// Sleeps before answering, to exercise timeouts and concurrency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self, capability: Capability) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.capability == capability)
            .count()
    }

    async fn respond(&self, capability: Capability, filename: &str) -> Option<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockCall {
                capability,
                filename: filename.to_string(),
            });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses.get(&capability).cloned()
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    async fn refactor(&self, _code: &str, filename: &str, _language: &str) -> Option<String> {
        self.respond(Capability::Refactor, filename).await
    }

    async fn explain(&self, _code: &str, filename: &str, _language: &str) -> Option<String> {
        self.respond(Capability::Explain, filename).await
    }

    async fn trace_core_logic(
        &self,
        _code: &str,
        filename: &str,
        _language: &str,
    ) -> Option<String> {
        self.respond(Capability::TraceCoreLogic, filename).await
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("name", &self.name)
            .field("responses", &self.responses.len())
            .finish()
    }
}
