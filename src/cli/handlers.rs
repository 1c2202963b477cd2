//! Command handlers; each returns the process exit code

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::commands::{AnalyzeArgs, BackendArgs, BackendsArgs};
use super::output::{BackendStatus, BackendsReport, OutputFormatter};
use crate::analysis::{AnalysisOrchestrator, AnalyzeRequest};
use crate::config::CodelensConfig;
use crate::error::AnalysisError;
use crate::source::discovery::DEFAULT_EXCLUDE_DIRS;
use crate::source::SourceDiscovery;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_NOT_FOUND: i32 = 2;

/// Environment configuration with command-line overrides applied
pub fn resolve_config(args: &BackendArgs) -> Result<CodelensConfig> {
    let mut config = CodelensConfig::from_env().context("Failed to load configuration")?;

    if let Some(chain) = &args.chain {
        config = config.with_chain(chain.0.clone());
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

pub fn build_request(args: &AnalyzeArgs) -> AnalyzeRequest {
    let mut exclude_dirs: Vec<String> = DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect();
    for name in &args.exclude_dirs {
        if !exclude_dirs.contains(name) {
            exclude_dirs.push(name.clone());
        }
    }

    AnalyzeRequest {
        repo_path: args.path.clone().unwrap_or_else(|| PathBuf::from(".")),
        max_files: args.max_files,
        include_exts: args.include_exts.clone(),
        exclude_dirs,
        concurrency: usize::try_from(args.concurrency).unwrap_or(usize::MAX),
        max_chars: args.max_chars,
        deadline_ms: args.deadline.map(|secs| secs.saturating_mul(1000)),
        respect_gitignore: args.respect_gitignore,
    }
}

fn exit_code_for(error: &AnalysisError) -> i32 {
    if error.is_not_found() {
        EXIT_NOT_FOUND
    } else {
        EXIT_FAILURE
    }
}

pub async fn handle_analyze(args: &AnalyzeArgs) -> i32 {
    let request = build_request(args);
    debug!(?request, "Analysis request");

    // A bad root outranks a bad backend configuration
    if let Err(e) = SourceDiscovery::new(&request.repo_path, request.discovery_config()) {
        error!(error = %e, "Invalid analysis root");
        eprintln!("Error: {}", e);
        return exit_code_for(&e);
    }

    let config = match resolve_config(&args.backend) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            return EXIT_FAILURE;
        }
    };

    let orchestrator = AnalysisOrchestrator::new(config.build_chain());
    let response = match orchestrator.analyze(&request).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Analysis failed");
            eprintln!("Error: {}", e);
            return exit_code_for(&e);
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    let rendered = match formatter.format_analysis(&response) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return EXIT_FAILURE;
        }
    };

    match emit(&rendered, args.output.as_deref()) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

pub async fn handle_backends(args: &BackendsArgs) -> i32 {
    let config = match resolve_config(&args.backend) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return EXIT_FAILURE;
        }
    };

    let chain = config.build_chain();
    let checks = chain.backends().iter().map(|backend| async move {
        let health = backend.health_check().await;
        debug!(backend = backend.name(), %health, "Health check");
        BackendStatus {
            name: backend.name().to_string(),
            model: backend.model_info(),
            health,
        }
    });
    let backends = futures_util::future::join_all(checks).await;

    let report = BackendsReport {
        backends,
        config: config.to_display_map(),
    };

    match OutputFormatter::new(args.format.into()).format_backends(&report) {
        Ok(rendered) => {
            println!("{}", rendered);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!(path = %path.display(), "Output written");
            Ok(())
        }
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}
