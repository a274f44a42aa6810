use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::args::{ChartArgs, Cli, Commands, InputArgs, ReportArgs};
use gene_census::chart::{self, ChartData};
use gene_census::config::Settings;
use gene_census::data::loader::{load_dataset, DatasetPaths};
use gene_census::data::model::Dataset;
use gene_census::data::schema::Column;
use gene_census::report;
use gene_census::summary::DatasetSummary;

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    match cli.command {
        Commands::Report(args) => run_report(&cli.input, &settings, args),
        Commands::Charts(args) => run_charts(&cli.input, &settings, args),
    }
}

fn dataset_paths(input: &InputArgs) -> DatasetPaths {
    let defaults = DatasetPaths::in_dir(&input.data_dir);
    DatasetPaths {
        train: input.train.clone().unwrap_or(defaults.train),
        test: input.test.clone().unwrap_or(defaults.test),
        validation: input.validation.clone().unwrap_or(defaults.validation),
    }
}

/// Resolve names and load data before any output is produced.
fn prepare(input: &InputArgs, label_column: &str) -> Result<(Column, Dataset)> {
    let column = Column::from_name(label_column)
        .with_context(|| format!("invalid --label-column {label_column:?}"))?;
    let dataset = load_dataset(&dataset_paths(input))?;
    Ok((column, dataset))
}

fn run_report(input: &InputArgs, settings: &Settings, args: ReportArgs) -> Result<()> {
    let (column, dataset) = prepare(input, &args.label_column)?;
    let summary = DatasetSummary::compute(&dataset, &settings.analysis, column);

    match &args.output {
        Some(path) => {
            report::text::write(path, &summary)?;
            log::info!("wrote report to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            report::text::write_report(&mut lock, &summary).context("failed to write report")?;
            lock.flush()?;
        }
    }
    if let Some(path) = &args.json {
        report::json::write(path, &summary)?;
    }
    Ok(())
}

fn run_charts(input: &InputArgs, settings: &Settings, args: ChartArgs) -> Result<()> {
    let (column, dataset) = prepare(input, &args.label_column)?;
    let data = ChartData::compute(&dataset, &settings.analysis, column);
    let written = chart::render_all(&data, &settings.style, &args.out)?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
