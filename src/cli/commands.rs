use crate::config::{parse_chain, BackendKind};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Multi-backend code analysis: refactor, explain and trace every source file
#[derive(Parser, Debug)]
#[command(
    name = "codelens",
    about = "Analyze a source tree with a chain of LLM backends",
    version,
    author,
    long_about = "codelens walks a source tree and, for every selected file, asks a chain of \
                  LLM backends (Ollama, Gemini, OpenAI) for a refactored version, a Markdown \
                  explanation and a trace of its core logic. Backends are tried in order and \
                  the first answer wins; when every backend fails a deterministic default is \
                  used, so a run always completes."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze the source files of a directory",
        long_about = "Discovers source files under PATH, analyzes up to --max-files of them \
                      and prints one result per file.\n\n\
                      Examples:\n  \
                      codelens analyze\n  \
                      codelens analyze /path/to/repo --max-files 10\n  \
                      codelens analyze . --ext .py --ext .rs --format json\n  \
                      codelens analyze . --chain openai,ollama --concurrency 4"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Check backend availability",
        long_about = "Checks the health of every backend in the configured chain.\n\n\
                      Examples:\n  \
                      codelens backends\n  \
                      codelens backends --format json"
    )]
    Backends(BackendsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "PATH", help = "Directory to analyze (defaults to current directory)")]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'n',
        long,
        value_name = "N",
        default_value_t = crate::analysis::DEFAULT_MAX_FILES,
        help = "Maximum number of files to analyze"
    )]
    pub max_files: usize,

    #[arg(
        long = "ext",
        value_name = "SUFFIX",
        help = "File suffix to include, repeatable (replaces the default list)"
    )]
    pub include_exts: Vec<String>,

    #[arg(
        long = "exclude",
        value_name = "NAME",
        help = "Directory or file name to skip, repeatable (added to the default list)"
    )]
    pub exclude_dirs: Vec<String>,

    #[arg(
        short = 'j',
        long,
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Number of files analyzed at the same time"
    )]
    pub concurrency: u64,

    #[arg(
        long,
        value_name = "CHARS",
        default_value_t = crate::source::loader::DEFAULT_MAX_CHARS,
        help = "Per-file content budget in characters"
    )]
    pub max_chars: usize,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Stop after this many seconds and report only finished files"
    )]
    pub deadline: Option<u64>,

    #[arg(long, help = "Skip files ignored by .gitignore")]
    pub respect_gitignore: bool,

    #[command(flatten)]
    pub backend: BackendArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

/// Overrides for the environment-derived backend configuration
#[derive(Parser, Debug, Clone, Default)]
pub struct BackendArgs {
    #[arg(
        long,
        value_name = "LIST",
        value_parser = parse_chain_arg,
        help = "Comma-separated backend order, e.g. 'ollama,gemini,openai' (empty for none)"
    )]
    pub chain: Option<ChainArg>,

    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Per-request backend timeout in seconds"
    )]
    pub timeout: Option<u64>,
}

/// Parsed `--chain` value; may be empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainArg(pub Vec<BackendKind>);

#[derive(Parser, Debug, Clone)]
pub struct BackendsArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_chain_arg(s: &str) -> Result<ChainArg, String> {
    parse_chain(s).map(ChainArg).map_err(|e| e.to_string())
}
