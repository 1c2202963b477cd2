use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three independent analyses a backend can perform on a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Rewrite the file following best practices, code only
    Refactor,
    /// Structured natural-language explanation
    Explain,
    /// Ordered extraction of algorithms, critical paths and side effects
    TraceCoreLogic,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::Refactor,
        Capability::Explain,
        Capability::TraceCoreLogic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Refactor => "refactor",
            Capability::Explain => "explain",
            Capability::TraceCoreLogic => "trace_core_logic",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
