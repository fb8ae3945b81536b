//! Command-line interface and command handlers

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use splitcheck_core::{AnalysisConfig, AnalysisReport, AnalysisRequest, MetricOutcome, assemble};

use crate::io::{load_config, load_dataset, write_atomic};

#[derive(Parser, Debug)]
#[command(name = "splitcheck")]
#[command(about = "Compare control and variant groups of an A/B experiment log")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare metrics between control and variant and print the report as JSON
    Analyze(AnalyzeArgs),
    /// List columns whose values are all numeric (candidate metrics)
    Columns(ColumnsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// JSON array of row objects
    #[arg(short, long)]
    pub input: PathBuf,

    /// Column holding each row's group label
    #[arg(short, long)]
    pub assignment_column: String,

    /// Primary metric column
    #[arg(short, long)]
    pub primary: Option<String>,

    /// Comma-separated secondary metric columns
    #[arg(short, long)]
    pub secondary: Option<String>,

    /// Analysis config (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Test name for the report (default: test id column, else input file stem)
    #[arg(long)]
    pub test_name: Option<String>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit single-line JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ColumnsArgs {
    /// JSON array of row objects
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Execute a parsed command line
pub fn run(cli: Cli) -> color_eyre::Result<()> {
    match cli.command {
        Command::Analyze(args) => {
            let report = analyze(&args)?;
            let json = if args.compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            match &args.output {
                Some(path) => {
                    write_atomic(path, &json)?;
                    tracing::info!(output = %path.display(), "report written");
                }
                None => println!("{json}"),
            }
        }
        Command::Columns(args) => {
            for column in columns(&args)? {
                println!("{column}");
            }
        }
    }
    Ok(())
}

/// Load the inputs named by `args` and run the analysis
pub fn analyze(args: &AnalyzeArgs) -> color_eyre::Result<AnalysisReport> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    let dataset = load_dataset(&args.input)?;
    tracing::info!(
        rows = dataset.len(),
        input = %args.input.display(),
        "loaded experiment rows"
    );

    let request = AnalysisRequest {
        assignment_column: args.assignment_column.clone(),
        primary_metric: args.primary.clone(),
        secondary_metrics: args
            .secondary
            .as_deref()
            .map(AnalysisRequest::parse_metric_list)
            .unwrap_or_default(),
        test_name: args
            .test_name
            .clone()
            .or_else(|| default_test_name(&args.input, &config)),
    };

    let report = assemble(&dataset, &request, &config)?;
    log_summary(&report);
    Ok(report)
}

/// Numeric candidate columns of the input file
pub fn columns(args: &ColumnsArgs) -> color_eyre::Result<Vec<String>> {
    let dataset = load_dataset(&args.input)?;
    Ok(dataset.numeric_columns())
}

fn default_test_name(input: &Path, config: &AnalysisConfig) -> Option<String> {
    if config.test_id_column.is_some() {
        return None;
    }
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

fn log_summary(report: &AnalysisReport) {
    let meta = &report.meta;
    tracing::info!(
        control = meta.control_count,
        variant = meta.variant_count,
        srm_detected = meta.srm.detected,
        "analysis complete"
    );
    for entry in report.metrics() {
        match &entry.outcome {
            MetricOutcome::Computed(result) => tracing::info!(
                metric = %entry.metric,
                lift = %result.percent_lift,
                p_value = result.p_value,
                prob_variant_better = result.prob_variant_better,
                significant = result.significant,
                "metric compared"
            ),
            MetricOutcome::InsufficientData { reason, .. } => {
                tracing::warn!(metric = %entry.metric, "{reason}");
            }
        }
    }
}
