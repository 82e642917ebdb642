use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "kubedeck",
    version,
    about = "A keyboard and mouse driven Kubernetes dashboard for the terminal."
)]
pub struct CliArgs {
    /// Refresh interval in milliseconds (minimum 500)
    #[arg(long)]
    pub refresh_ms: Option<u64>,

    /// Start with a namespace already selected
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// kubeconfig context to use instead of the current one
    #[arg(long)]
    pub context: Option<String>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Write logs to this file instead of discarding them
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Number of log lines fetched per container
    #[arg(long)]
    pub logs_tail: Option<u32>,
}
