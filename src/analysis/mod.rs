//! Analysis runs: request parameters, orchestration and result aggregation

pub mod orchestrator;
pub mod request;
pub mod result;

pub use orchestrator::{default_explanation, AnalysisOrchestrator, TRACE_UNAVAILABLE};
pub use request::{AnalyzeRequest, DEFAULT_MAX_FILES};
pub use result::{AnalysisResponse, AnalysisResult, FileResults, ResultAggregator};
