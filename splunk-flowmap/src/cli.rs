use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "splunk-flowmap")]
#[command(about = "Resolve Splunk configuration snapshots into data-flow graphs")]
pub struct Cli {
    /// Log filter (trace, debug, info, warn, error, or a tracing directive).
    #[arg(long, global = true, env = "SPLUNK_FLOWMAP_LOG", default_value = "warn")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Parse a snapshot directory and show what was found.
    Parse(ParseArgs),
    /// Parse and resolve a snapshot into a canonical graph.
    Resolve(ResolveArgs),
    /// Validate a graph file or a stored graph.
    Validate(ValidateArgs),
    /// Parse, resolve, and validate a snapshot in one pass.
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Extracted configuration root containing `system/` and/or `apps/`.
    pub dir: PathBuf,
    /// Identifier used for the fallback host id `host_<job-id>`.
    #[arg(long, default_value = "local")]
    pub job_id: String,
    /// Adds an `env:<value>` label to the primary host.
    #[arg(long)]
    pub environment: Option<String>,
    /// Adds a `cluster:<value>` label to the primary host.
    #[arg(long)]
    pub cluster: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ParseArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
    /// Role keyword table overriding the built-in one.
    #[arg(long)]
    pub keywords_file: Option<PathBuf>,
    /// Write the graph JSON here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Save the graph into this store directory.
    #[arg(long, requires = "graph_id")]
    pub store: Option<PathBuf>,
    #[arg(long, requires = "store")]
    pub graph_id: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Graph JSON file.
    #[arg(required_unless_present = "store", conflicts_with = "store")]
    pub graph: Option<PathBuf>,
    /// Validate the graph stored under `--graph-id` and replace its findings.
    #[arg(long, requires = "graph_id")]
    pub store: Option<PathBuf>,
    #[arg(long, requires = "store")]
    pub graph_id: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Fail on warnings as well as errors.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
    #[arg(long)]
    pub keywords_file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[arg(long)]
    pub strict: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
