use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Process WhatsApp campaign delivery reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest a report and print KPI, status, category, and hourly tables
    Report(ReportArgs),
    /// Ingest a report and persist the columnar artifact plus its metadata
    Pack(PackArgs),
    /// Reload a columnar artifact and summarize it
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Input CSV/XLSX export from the provider report center
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Restrict to this period year
    #[arg(long)]
    pub year: Option<i32>,
    /// Restrict to this period month (1-12)
    #[arg(long)]
    pub month: Option<u32>,
    /// Restrict to this week of month (1-4)
    #[arg(long)]
    pub week: Option<u32>,
    /// Restrict to this exact template name
    #[arg(long)]
    pub template: Option<String>,
    /// Number of most recent messages to list
    #[arg(long, default_value_t = 10)]
    pub recent: usize,
}

#[derive(Debug, Args)]
pub struct PackArgs {
    /// Input CSV/XLSX export from the provider report center
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination artifact file
    #[arg(short = 'o', long = "artifact")]
    pub artifact: PathBuf,
    /// Destination metadata JSON file
    #[arg(short = 'm', long = "meta")]
    pub meta: PathBuf,
    /// Period label for the metadata record (defaults to the upload instant)
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Artifact file to reload
    #[arg(short = 'a', long = "artifact")]
    pub artifact: PathBuf,
    /// Metadata JSON to display alongside the artifact
    #[arg(short = 'm', long = "meta")]
    pub meta: Option<PathBuf>,
}
