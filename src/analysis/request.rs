use crate::source::discovery::{DiscoveryConfig, DEFAULT_EXCLUDE_DIRS, DEFAULT_INCLUDE_EXTS};
use crate::source::loader::DEFAULT_MAX_CHARS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_FILES: usize = 30;

/// Parameters of one analysis run
///
/// Every field has a default, so a JSON body of `{}` analyses the current
/// directory with the stock filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    pub repo_path: PathBuf,
    pub max_files: usize,
    /// Path suffixes to analyse; empty selects [`DEFAULT_INCLUDE_EXTS`]
    pub include_exts: Vec<String>,
    pub exclude_dirs: Vec<String>,
    /// Files analysed at the same time; 1 is strictly sequential
    pub concurrency: usize,
    /// Per-file content budget in characters
    pub max_chars: usize,
    /// Overall time limit in milliseconds; files not finished by then are left out
    pub deadline_ms: Option<u64>,
    pub respect_gitignore: bool,
}

impl Default for AnalyzeRequest {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            max_files: DEFAULT_MAX_FILES,
            include_exts: Vec::new(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            concurrency: 1,
            max_chars: DEFAULT_MAX_CHARS,
            deadline_ms: None,
            respect_gitignore: false,
        }
    }
}

impl AnalyzeRequest {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            ..Self::default()
        }
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_include_exts<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_exts = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the overall time limit, rounded up to the next millisecond
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        let millis = deadline.as_nanos().saturating_add(999_999) / 1_000_000;
        self.deadline_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        let include_exts = if self.include_exts.is_empty() {
            DEFAULT_INCLUDE_EXTS.iter().map(|s| s.to_string()).collect()
        } else {
            self.include_exts.clone()
        };

        DiscoveryConfig {
            include_exts,
            exclude_dirs: self.exclude_dirs.clone(),
            respect_gitignore: self.respect_gitignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let request: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, AnalyzeRequest::default());
        assert_eq!(request.max_files, 30);
        assert_eq!(request.repo_path, PathBuf::from("."));
        assert!(request.exclude_dirs.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_empty_include_list_selects_defaults() {
        let config = AnalyzeRequest::new("/repo").discovery_config();
        assert_eq!(config.include_exts.len(), DEFAULT_INCLUDE_EXTS.len());
        assert!(config.include_exts.contains(&".rs".to_string()));
    }

    #[test]
    fn test_explicit_include_list_is_kept() {
        let config = AnalyzeRequest::new("/repo")
            .with_include_exts([".py"])
            .discovery_config();
        assert_eq!(config.include_exts, vec![".py".to_string()]);
    }

    #[test]
    fn test_partial_json() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"repo_path": "/src", "max_files": 5, "deadline_ms": 1500}"#)
                .unwrap();
        assert_eq!(request.max_files, 5);
        assert_eq!(request.deadline(), Some(Duration::from_millis(1500)));
        assert_eq!(request.concurrency, 1);
    }

    #[test]
    fn test_sub_second_deadline_is_kept() {
        let request = AnalyzeRequest::new("/repo").with_deadline(Duration::from_millis(900));
        assert_eq!(request.deadline_ms, Some(900));
        assert_eq!(request.deadline(), Some(Duration::from_millis(900)));
    }

    #[test]
    fn test_deadline_rounds_up_to_a_millisecond() {
        let request = AnalyzeRequest::new("/repo").with_deadline(Duration::from_micros(1500));
        assert_eq!(request.deadline(), Some(Duration::from_millis(2)));

        let request = AnalyzeRequest::new("/repo").with_deadline(Duration::from_nanos(1));
        assert_eq!(request.deadline_ms, Some(1));

        let request = AnalyzeRequest::new("/repo").with_deadline(Duration::ZERO);
        assert_eq!(request.deadline_ms, Some(0));
    }
}
