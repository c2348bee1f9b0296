use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use throughput_core::collapse::{
    scenario_snapshot_columns, snapshot, RAW_SNAPSHOT_COLUMNS, RECOMMENDATION_COLUMNS,
};
use throughput_core::config::{
    resolve_dir, DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR, OUTPUT_DIR_ENV,
};
use throughput_core::export::{ensure_output_dir, write_recommendations};
use throughput_core::loader::load_picking;
use throughput_core::pipeline::run_recommendation;
use throughput_core::render::{ChartRenderer, PlottersRenderer};
use throughput_core::summary::{frame_table, peak_lines, summary_table};
use throughput_core::{
    load_dataset, publish, run_analysis, AnalysisConfig, AnalysisReport, InputPaths, TableKind,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Warehouse picking throughput analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full analysis and write charts, recommendations and the summary
    Analyze(AnalyzeArgs),
    /// Compute collapse-window staffing recommendations from picking data only
    Recommend(RunArgs),
    /// Print the effective configuration as TOML
    ShowConfig(ConfigArgs),
}

#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// TOML configuration file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Directory holding the input CSV files (falls back to THROUGHPUT_DATA_DIR, then `.`)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Directory receiving the outputs (falls back to THROUGHPUT_OUTPUT_DIR, then `outputs`)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[command(flatten)]
    config: ConfigArgs,
    /// Override the target units per picker
    #[arg(long)]
    target_w2s: Option<f64>,
}

#[derive(Args, Debug, Default)]
struct AnalyzeArgs {
    #[command(flatten)]
    run: RunArgs,
    /// Do not render the PNG charts
    #[arg(long)]
    skip_charts: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Recommend(args) => handle_recommend(args),
        Command::ShowConfig(args) => handle_show_config(args),
    }
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    resolve_dir(flag, env::var(DATA_DIR_ENV).ok(), DEFAULT_DATA_DIR)
}

fn resolve_output_dir(flag: Option<PathBuf>) -> PathBuf {
    resolve_dir(flag, env::var(OUTPUT_DIR_ENV).ok(), DEFAULT_OUTPUT_DIR)
}

fn effective_config(args: &ConfigArgs, target_w2s: Option<f64>) -> Result<AnalysisConfig> {
    AnalysisConfig::resolve(args.config.as_deref(), target_w2s)
        .context("failed to load configuration")
}

fn handle_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = effective_config(&args.run.config, args.run.target_w2s)?;
    let data_dir = resolve_data_dir(args.run.data_dir);
    let output_dir = resolve_output_dir(args.run.output_dir);

    let dataset = load_dataset(&InputPaths::in_dir(&data_dir))
        .with_context(|| format!("failed to load input tables from {}", data_dir.display()))?;
    let report = run_analysis(&dataset, &config).context("analysis failed")?;

    print_snapshots(&report, &config)?;

    let plotters = PlottersRenderer;
    let renderer: Option<&dyn ChartRenderer> = if args.skip_charts {
        info!("chart rendering skipped at user request");
        None
    } else {
        Some(&plotters)
    };
    let written = publish(&report, &config, &output_dir, renderer)
        .with_context(|| format!("failed to write outputs to {}", output_dir.display()))?;
    info!(files = written.len(), "outputs written");

    println!(
        "CSV with optimal picker recommendations saved in {}.",
        output_dir.display()
    );

    println!("\nSummary Statistics:");
    for line in peak_lines(&report.summary) {
        println!("{line}");
    }
    println!("{}", summary_table(&report.summary));

    println!(
        "\nEnd-to-end analysis complete. {} files saved in {}.",
        written.len(),
        output_dir.display()
    );
    Ok(())
}

fn print_snapshots(report: &AnalysisReport, config: &AnalysisConfig) -> Result<()> {
    let rows = config.snapshot_rows;

    println!("Collapse Hours W2S Snapshot:");
    println!(
        "{}",
        frame_table(&snapshot(&report.collapse, RAW_SNAPSHOT_COLUMNS, rows)?)?
    );

    println!("\nCollapse Hours W2S with extra pickers:");
    let scenario_columns = scenario_snapshot_columns(&config.scenario_extra_pickers);
    println!(
        "{}",
        frame_table(&snapshot(&report.collapse, scenario_columns.as_slice(), rows)?)?
    );

    println!("\nCollapse Hours - Optimal Picker Recommendations:");
    println!(
        "{}",
        frame_table(&snapshot(&report.collapse, RECOMMENDATION_COLUMNS, rows)?)?
    );
    Ok(())
}

fn handle_recommend(args: RunArgs) -> Result<()> {
    let config = effective_config(&args.config, args.target_w2s)?;
    let data_dir = resolve_data_dir(args.data_dir);
    let output_dir = resolve_output_dir(args.output_dir);

    let picking_path = data_dir.join(TableKind::Picking.file_name());
    let picking = load_picking(&picking_path)
        .with_context(|| format!("failed to load {}", picking_path.display()))?;
    let collapse = run_recommendation(&picking, &config)?;

    println!("Collapse Hours - Optimal Picker Recommendations:");
    println!(
        "{}",
        frame_table(&snapshot(&collapse, RECOMMENDATION_COLUMNS, config.snapshot_rows)?)?
    );

    ensure_output_dir(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let path = write_recommendations(&collapse, &output_dir)?;
    println!("Recommendations saved to {}.", path.display());
    Ok(())
}

fn handle_show_config(args: ConfigArgs) -> Result<()> {
    let config = effective_config(&args, None)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
