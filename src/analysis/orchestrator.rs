//! Per-file analysis and run orchestration
//!
//! For every discovered file the orchestrator resolves the three capabilities
//! as independent walks over the [`BackendChain`] and fills in defaults for
//! whatever the chain could not produce, so a result never has a missing
//! field. A run always completes, even with no working backend.

use super::request::AnalyzeRequest;
use super::result::{AnalysisResponse, AnalysisResult, ResultAggregator};
use crate::ai::{BackendChain, Capability};
use crate::error::AnalysisError;
use crate::source::{ContentLoader, SourceDiscovery, SourceFile};
use futures_util::stream::{self, StreamExt};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Trace returned when no backend could extract the core logic
pub const TRACE_UNAVAILABLE: &str = "- Core logic could not be auto-traced by LLM. Review manually.";

/// Explanation returned when no backend could explain the file
pub fn default_explanation(file_name: &str, language: &str, lines: usize) -> String {
    format!(
        "# Overview\nThis file '{}' is written in {}. (LLM explanation unavailable)\n\n# Key Components\n- Lines: {}\n",
        file_name, language, lines
    )
}

/// Walks and loads files on a blocking thread, sending them in discovery order
///
/// At most `max_files` non-blank files are sent. The walk stops early once the
/// receiver is dropped.
fn spawn_source_feed(
    discovery: SourceDiscovery,
    loader: ContentLoader,
    max_files: usize,
    capacity: usize,
) -> (mpsc::Receiver<SourceFile>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = tokio::task::spawn_blocking(move || {
        let root = discovery.root().to_path_buf();
        let files = discovery
            .files()
            .filter_map(|path| SourceFile::load(&root, &path, &loader))
            .take(max_files);

        for file in files {
            if tx.blocking_send(file).is_err() {
                debug!("Source feed receiver dropped, stopping walk");
                break;
            }
        }
    });

    (rx, handle)
}

pub struct AnalysisOrchestrator {
    chain: BackendChain,
}

impl AnalysisOrchestrator {
    pub fn new(chain: BackendChain) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &BackendChain {
        &self.chain
    }

    /// Produces a complete result for one file
    ///
    /// The three chain walks run concurrently; each one is sequential over the
    /// chain and stops at the first backend that answers.
    pub async fn analyze_file(&self, file: &SourceFile) -> AnalysisResult {
        let code = file.content.as_str();
        let name = file.file_name.as_str();
        let language = file.language;

        let (refactored, explanation, trace) = tokio::join!(
            self.chain.invoke(Capability::Refactor, code, name, language),
            self.chain.invoke(Capability::Explain, code, name, language),
            self.chain.invoke(Capability::TraceCoreLogic, code, name, language),
        );

        if refactored.is_none() || explanation.is_none() || trace.is_none() {
            debug!(
                file = %file.path,
                refactored = refactored.is_some(),
                explanation = explanation.is_some(),
                trace = trace.is_some(),
                "Applying defaults"
            );
        }

        AnalysisResult {
            refactored: refactored.unwrap_or_else(|| file.content.clone()),
            explanation: explanation
                .unwrap_or_else(|| default_explanation(name, language, file.line_count())),
            trace: trace.unwrap_or_else(|| TRACE_UNAVAILABLE.to_string()),
        }
    }

    /// Runs a full analysis of `request.repo_path`
    ///
    /// Fails only when the root is missing or not a directory, before any file
    /// is read. Blank files are skipped and do not count toward
    /// `max_files`. With `concurrency > 1` files are analysed in parallel but
    /// the response keeps discovery order. The walk runs off the async
    /// runtime, so the deadline also bounds time spent on discovery.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResponse, AnalysisError> {
        let discovery = SourceDiscovery::new(&request.repo_path, request.discovery_config())?;
        let root = discovery.root().to_path_buf();
        let loader = ContentLoader::new(request.max_chars);
        let concurrency = request.concurrency.max(1);
        let start = Instant::now();

        info!(
            root = %root.display(),
            max_files = request.max_files,
            concurrency,
            backends = ?self.chain.names(),
            "Starting analysis"
        );

        let mut aggregator = ResultAggregator::new(root.clone(), request.max_files);

        let (feed, _walker) = spawn_source_feed(discovery, loader, request.max_files, concurrency);
        let files = stream::unfold(feed, |mut feed| async move {
            feed.recv().await.map(|file| (file, feed))
        });

        let results = files
            .map(|file| async move {
                let result = self.analyze_file(&file).await;
                (file.path, result)
            })
            .buffered(concurrency);
        futures_util::pin_mut!(results);

        let deadline = request
            .deadline()
            .map(|limit| tokio::time::Instant::now() + limit);

        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, results.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            completed = aggregator.len(),
                            "Analysis deadline reached, abandoning in-flight files"
                        );
                        aggregator.mark_truncated();
                        break;
                    }
                },
                None => results.next().await,
            };

            let Some((path, result)) = next else {
                break;
            };
            debug!(file = %path, "File analysed");
            if !aggregator.insert(path, result) && aggregator.is_full() {
                break;
            }
        }

        let response = aggregator.finish();
        info!(
            count = response.count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis completed"
        );
        Ok(response)
    }
}
