use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gene-census",
    version,
    about = "Summary report, leakage checks and charts for a train/test/validation DNA dataset"
)]
pub struct Cli {
    #[command(flatten)]
    pub input: InputArgs,

    /// JSON settings file (analysis parameters and chart style).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct InputArgs {
    /// Directory holding train.csv, test.csv and validation.csv.
    #[arg(long, env = "GENE_CENSUS_DATA_DIR", default_value = ".", global = true)]
    pub data_dir: PathBuf,

    #[arg(long, global = true)]
    pub train: Option<PathBuf>,

    #[arg(long, global = true)]
    pub test: Option<PathBuf>,

    #[arg(long, global = true)]
    pub validation: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the text report.
    Report(ReportArgs),
    /// Write the SVG chart set.
    Charts(ChartArgs),
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Write the report here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also write the full summary as JSON.
    #[arg(long)]
    pub json: Option<PathBuf>,

    #[arg(long, default_value = "GeneType")]
    pub label_column: String,
}

#[derive(Parser)]
pub struct ChartArgs {
    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value = "GeneType")]
    pub label_column: String,
}
