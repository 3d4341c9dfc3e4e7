use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fbk_diff::{DiffFormat, DEFAULT_CONTEXT_LINES};
use fbk_types::Vote;

#[derive(Parser)]
#[command(
    name = "fbk",
    about = "Diff tracked state and submit implicit or explicit feedback",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score and render the difference between two JSON documents
    Diff(DiffArgs),
    /// Submit one explicit feedback signal
    Send(SendArgs),
    /// Drive a change tracker from a script and print what it reports
    Replay(ReplayArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub before: PathBuf,
    pub after: PathBuf,
    /// git, object or json
    #[arg(short, long, default_value = "git")]
    pub format: DiffFormat,
    /// Unchanged lines around each hunk (git format)
    #[arg(short = 'U', long, default_value_t = DEFAULT_CONTEXT_LINES)]
    pub context: usize,
}

#[derive(Args)]
pub struct SendArgs {
    /// Session the feedback belongs to
    #[arg(long)]
    pub session: String,
    #[arg(long)]
    pub vote: Vote,
    /// TOML file with base_url, project, api_key and timeout_secs
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub base_url: Option<String>,
    /// Falls back to the FBK_API_KEY environment variable
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub explanation: Option<String>,
    #[arg(long)]
    pub correction: Option<String>,
    #[arg(long)]
    pub selection: Option<String>,
    #[arg(long)]
    pub trigger: Option<String>,
    /// Extra metadata as key=value; values are parsed as JSON when possible
    #[arg(long = "meta")]
    pub metadata: Vec<String>,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON script: {"initial": .., "session": .., "steps": [{"value", "trigger", "wait_ms"}]}
    pub script: PathBuf,
    /// TOML file with tracker settings
    #[arg(long)]
    pub settings: Option<PathBuf>,
    #[arg(long)]
    pub debounce_ms: Option<u64>,
    #[arg(short, long)]
    pub format: Option<DiffFormat>,
    /// Report the first transition out of a null initial value
    #[arg(long)]
    pub keep_initial_nullish: bool,
}
