use std::path::PathBuf;
use thiserror::Error;

/// Caller-visible failures of an analysis run
///
/// Backend unavailability is never reported here: it only shows up as
/// default content in the response.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Root path not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Root path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to resolve root path {path}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    /// True for errors reported as "not found" (exit code 2)
    pub fn is_not_found(&self) -> bool {
        matches!(self, AnalysisError::RootNotFound(_))
    }
}
