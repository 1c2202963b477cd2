use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;
use tracing::debug;

/// The three artifacts produced for one file; every field is always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub refactored: String,
    pub explanation: String,
    pub trace: String,
}

/// Per-file results in discovery order, serialized as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileResults {
    entries: Vec<(String, AnalysisResult)>,
}

impl FileResults {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&AnalysisResult> {
        self.entries
            .iter()
            .find(|(key, _)| key == path)
            .map(|(_, result)| result)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnalysisResult)> {
        self.entries.iter().map(|(key, result)| (key.as_str(), result))
    }
}

impl Serialize for FileResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, result) in &self.entries {
            map.serialize_entry(path, result)?;
        }
        map.end()
    }
}

/// Outcome of a run: `{root, count, files}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResponse {
    /// Canonical absolute path of the scanned root
    pub root: String,
    pub count: usize,
    pub files: FileResults,
    /// Set when the run hit its deadline before every selected file finished
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// Single writer collecting per-file results up to a cap
#[derive(Debug)]
pub struct ResultAggregator {
    root: PathBuf,
    max_files: usize,
    files: FileResults,
    truncated: bool,
}

impl ResultAggregator {
    pub fn new(root: PathBuf, max_files: usize) -> Self {
        Self {
            root,
            max_files,
            files: FileResults::default(),
            truncated: false,
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.files.len() >= self.max_files
    }

    /// Records `result` under `path`; returns false once the cap is reached
    /// or when `path` was already recorded
    pub fn insert(&mut self, path: String, result: AnalysisResult) -> bool {
        if self.is_full() {
            debug!(path = %path, max_files = self.max_files, "Result cap reached, dropping");
            return false;
        }
        if self.files.contains(&path) {
            debug!(path = %path, "Duplicate result, dropping");
            return false;
        }
        self.files.entries.push((path, result));
        true
    }

    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    pub fn finish(self) -> AnalysisResponse {
        AnalysisResponse {
            root: self.root.display().to_string(),
            count: self.files.len(),
            files: self.files,
            truncated: self.truncated,
        }
    }
}
