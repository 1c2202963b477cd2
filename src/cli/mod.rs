pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, BackendArgs, BackendsArgs, ChainArg, CliArgs, Commands};
pub use handlers::{handle_analyze, handle_backends};
pub use output::{BackendStatus, BackendsReport, OutputFormat, OutputFormatter};
