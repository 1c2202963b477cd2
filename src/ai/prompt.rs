//! Capability prompts
//!
//! Every backend sends the same instructions; chat-style services receive them
//! as a system + user message pair, completion-style services as one prompt.

use super::capability::Capability;

const REFACTOR_SYSTEM: &str = "You are a strict refactoring assistant. Output only code.";
const EXPLAIN_SYSTEM: &str =
    "You are an expert code reviewer. Produce concise, well-structured explanations.";
const TRACE_SYSTEM: &str = "You are an expert at extracting core logic. Be precise.";

/// Headings every explanation is asked to follow
pub const EXPLAIN_HEADINGS: [&str; 6] = [
    "Overview",
    "Key Components",
    "Important Functions/Classes",
    "Step-by-step",
    "Risks/Smells",
    "Suggestions",
];

/// Instructions for one capability, split for chat APIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityPrompt {
    pub system: &'static str,
    pub user: String,
}

impl CapabilityPrompt {
    /// Flattens the pair into a single completion prompt
    pub fn into_single(self) -> String {
        format!("{}\n{}", self.system, self.user)
    }
}

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(
        capability: Capability,
        code: &str,
        filename: &str,
        language: &str,
    ) -> CapabilityPrompt {
        let source = fenced(code, filename, language);

        match capability {
            Capability::Refactor => CapabilityPrompt {
                system: REFACTOR_SYSTEM,
                user: format!(
                    "Refactor the following {} code with best practices. Return only code, no commentary.\n{}",
                    language, source
                ),
            },
            Capability::Explain => CapabilityPrompt {
                system: EXPLAIN_SYSTEM,
                user: format!(
                    "Explain this {} file with headings {}.\n{}",
                    language,
                    EXPLAIN_HEADINGS.join(", "),
                    source
                ),
            },
            Capability::TraceCoreLogic => CapabilityPrompt {
                system: TRACE_SYSTEM,
                user: format!(
                    "Extract the core logic (algorithms, critical paths, side effects) of this {} file \
                     as numbered steps (1., 2., ...) with minimal code excerpts.\n{}",
                    language, source
                ),
            },
        }
    }
}

fn fenced(code: &str, filename: &str, language: &str) -> String {
    format!("FILE: {}\n\n```{}\n{}\n```", filename, language, code)
}
