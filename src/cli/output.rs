//! Output formatting for analysis responses and backend status
//!
//! JSON and YAML print the serialized structures unchanged; the human format
//! renders each file as a sectioned report.
//!
//! # Example
//!
//! ```ignore
//! use codelens::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_analysis(&response)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::ai::BackendHealth;
use crate::analysis::AnalysisResponse;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Health of one backend in chain order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub health: BackendHealth,
}

/// Result of the `backends` command
#[derive(Debug, Clone, Serialize)]
pub struct BackendsReport {
    pub backends: Vec<BackendStatus>,
    pub config: BTreeMap<String, String>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_analysis(&self, response: &AnalysisResponse) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(response)
                .context("Failed to serialize analysis response to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(response)
                .context("Failed to serialize analysis response to YAML"),
            OutputFormat::Human => Ok(self.format_analysis_human(response)),
        }
    }

    pub fn format_backends(&self, report: &BackendsReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize backend status to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(report)
                .context("Failed to serialize backend status to YAML"),
            OutputFormat::Human => Ok(self.format_backends_human(report)),
        }
    }

    fn format_analysis_human(&self, response: &AnalysisResponse) -> String {
        let mut output = String::new();

        output.push_str("Code Analysis Report\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Root:   {}\n", response.root));
        output.push_str(&format!("Files:  {}\n", response.count));
        if response.truncated {
            output.push_str("\u{26A0} Deadline reached, remaining files were not analyzed\n");
        }

        for (path, result) in response.files.iter() {
            output.push('\n');
            output.push_str(RULE);
            output.push('\n');
            output.push_str(&format!("{}\n", path));
            output.push_str(RULE);
            output.push_str("\n\n");

            output.push_str("Explanation:\n");
            output.push_str(result.explanation.trim_end());
            output.push_str("\n\n");

            output.push_str("Core Logic:\n");
            output.push_str(result.trace.trim_end());
            output.push_str("\n\n");

            output.push_str("Refactored:\n");
            output.push_str(result.refactored.trim_end());
            output.push('\n');
        }

        if response.files.is_empty() {
            output.push_str("\nNo source files matched.\n");
        }

        output
    }

    fn format_backends_human(&self, report: &BackendsReport) -> String {
        let mut output = String::new();

        output.push_str("Backend Health Status\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        if report.backends.is_empty() {
            output.push_str("No backends configured; every file will receive default content.\n\n");
        }

        for (position, status) in report.backends.iter().enumerate() {
            let symbol = if status.health.is_available() {
                "\u{2713}"
            } else {
                "\u{2717}"
            };
            output.push_str(&format!("{} {}. {}\n", symbol, position + 1, status.name));
            if let Some(model) = &status.model {
                output.push_str(&format!("  Model:  {}\n", model));
            }
            output.push_str(&format!("  Status: {}\n\n", status.health));
        }

        output.push_str("Configuration\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        for (key, value) in &report.config {
            output.push_str(&format!("  {:<22} {}\n", key, value));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisResult, ResultAggregator};
    use std::path::PathBuf;

    fn response(truncated: bool) -> AnalysisResponse {
        let mut aggregator = ResultAggregator::new(PathBuf::from("/repo"), 10);
        aggregator.insert(
            "src/a.py".to_string(),
            AnalysisResult {
                refactored: "x = 1".to_string(),
                explanation: "# Overview\nSets x.".to_string(),
                trace: "1. assign".to_string(),
            },
        );
        if truncated {
            aggregator.mark_truncated();
        }
        aggregator.finish()
    }

    fn report() -> BackendsReport {
        BackendsReport {
            backends: vec![
                BackendStatus {
                    name: "ollama".to_string(),
                    model: Some("qwen2.5-coder:7b".to_string()),
                    health: BackendHealth::Available,
                },
                BackendStatus {
                    name: "openai".to_string(),
                    model: None,
                    health: BackendHealth::NotConfigured,
                },
            ],
            config: BTreeMap::from([("chain".to_string(), "ollama,openai".to_string())]),
        }
    }

    #[test]
    fn test_analysis_json_shape() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_analysis(&response(false))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["root"], "/repo");
        assert_eq!(value["count"], 1);
        assert_eq!(value["files"]["src/a.py"]["trace"], "1. assign");
        assert!(value.get("truncated").is_none());
    }

    #[test]
    fn test_analysis_yaml() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_analysis(&response(true))
            .unwrap();
        assert!(output.contains("root: /repo"));
        assert!(output.contains("src/a.py:"));
        assert!(output.contains("truncated: true"));
    }

    #[test]
    fn test_analysis_human() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_analysis(&response(true))
            .unwrap();
        assert!(output.contains("Root:   /repo"));
        assert!(output.contains("src/a.py"));
        assert!(output.contains("Core Logic:\n1. assign"));
        assert!(output.contains("Deadline reached"));
    }

    #[test]
    fn test_backends_human_lists_chain_order() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_backends(&report())
            .unwrap();
        let ollama = output.find("1. ollama").unwrap();
        let openai = output.find("2. openai").unwrap();
        assert!(ollama < openai);
        assert!(output.contains("Status: not configured"));
        assert!(output.contains("Model:  qwen2.5-coder:7b"));
    }

    #[test]
    fn test_backends_json() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_backends(&report())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["backends"][0]["health"]["status"], "available");
        assert_eq!(value["backends"][1]["health"]["status"], "not_configured");
        assert_eq!(value["config"]["chain"], "ollama,openai");
    }
}
