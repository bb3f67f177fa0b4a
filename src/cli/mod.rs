//! Command-line interface for the CSV comparison tool.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::processors::alignment::{AlignmentOutcome, OffsetEstimate};
use crate::{CompareConfig, SingleConfig};

#[derive(Parser)]
#[command(name = "csv-plot")]
#[command(about = "Compare two sampled CSV recordings with automatic time alignment", version)]
pub struct Cli {
    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the time offset of input_file_2 relative to input_file_1
    Offset {
        /// Path to YAML config file
        config: PathBuf,
    },

    /// Align both files, cut them to the time window and export a CSV
    Compare {
        /// Path to YAML config file
        config: PathBuf,
        /// Output CSV file (defaults to <output_dir>/comparison_aligned.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cut one file to its time window and export the selected columns
    Single {
        /// Path to YAML config file
        config: PathBuf,
        /// Output CSV file (defaults to <output_dir>/<input stem>_windowed.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Per-column statistics and histograms of a hexadecimal CSV file
    Histogram {
        /// Path to YAML config file
        config: PathBuf,
    },

    /// Write a config file populated with default values
    InitConfig {
        /// Destination YAML file
        path: PathBuf,
        /// Write a single-file config instead of a comparison config
        #[arg(long)]
        single: bool,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    match cli.command {
        Commands::Offset { config } => {
            let config = load_config(&config, |p| CompareConfig::from_yaml(p));
            cmd_offset(&config);
        }
        Commands::Compare { config, output } => {
            let config = load_config(&config, |p| CompareConfig::from_yaml(p));
            cmd_compare(&config, output.as_deref());
        }
        Commands::Single { config, output } => {
            let config = load_config(&config, |p| SingleConfig::from_yaml(p));
            cmd_single(&config, output.as_deref());
        }
        Commands::Histogram { config } => {
            let config = load_config(&config, |p| SingleConfig::from_yaml(p));
            cmd_histogram(&config);
        }
        Commands::InitConfig { path, single, force } => {
            cmd_init_config(&path, single, force);
        }
    }
}

fn load_config<T>(
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, Box<dyn std::error::Error>>,
) -> T {
    match load(path) {
        Ok(cfg) => {
            info!("Loaded config from: {}", path.display());
            cfg
        }
        Err(e) => {
            error!("Failed to load config from {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Summary rows describing what the estimator found.
fn estimate_items(estimate: &OffsetEstimate) -> Vec<(&'static str, String)> {
    match &estimate.outcome {
        AlignmentOutcome::Manual => vec![("Method", "manual".to_string())],
        AlignmentOutcome::RisingEdge { requested, edge1, edge2 } => vec![
            ("Method", format!("rising edge ({})", requested)),
            ("Edge index file 1", format!("{:?}", edge1)),
            ("Edge index file 2", format!("{:?}", edge2)),
        ],
        AlignmentOutcome::PeakDetection { peak1, peak2 } => vec![
            ("Method", "peak_detection".to_string()),
            ("Peak index file 1", format!("{:?}", peak1)),
            ("Peak index file 2", format!("{:?}", peak2)),
        ],
    }
}

fn cmd_offset(config: &CompareConfig) {
    use crate::processors::{alignment, compare};

    let start = Instant::now();

    let interval = match alignment::SamplingInterval::from_millis(config.sampling_interval_ms) {
        Ok(dt) => dt,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let spinner = create_spinner("Loading input files...");
    let (table1, table2) = match compare::load_pair(config) {
        Ok(pair) => pair,
        Err(e) => {
            spinner.finish_and_clear();
            error!("{:#}", e);
            std::process::exit(1);
        }
    };
    spinner.finish_and_clear();

    match alignment::estimate_offset(&table1.columns, &table2.columns, interval, &config.alignment) {
        Ok(estimate) => {
            println!("{}", estimate);

            let mut items = vec![
                ("Sampling rate", format!("{} Hz", interval.rate_hz())),
                ("Samples file 1", table1.num_rows().to_string()),
                ("Samples file 2", table2.num_rows().to_string()),
            ];
            items.extend(estimate_items(&estimate));
            items.push(("Offset (s)", format!("{:.3}", estimate.offset_s)));
            items.push(("Duration", format!("{:.2?}", start.elapsed())));

            print_summary("Offset Estimate", &items);
        }
        Err(e) => {
            error!("Offset estimation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_compare(config: &CompareConfig, output: Option<&Path>) {
    use crate::processors::compare;

    let start = Instant::now();

    let spinner = create_spinner("Aligning input files...");

    match compare::run_comparison(config, output) {
        Ok(result) => {
            spinner.finish_and_clear();

            if let Some(estimate) = &result.estimate {
                println!("{}", estimate);
            }

            let mut items = Vec::new();
            if let Some(estimate) = &result.estimate {
                items.extend(estimate_items(estimate));
            }
            items.extend([
                ("Offset (s)", format!("{:.3}", result.offset_s)),
                ("Columns", result.columns.join(", ")),
                (
                    "Rows file 1",
                    format!("{}..{}", result.window.file1.start, result.window.file1.end),
                ),
                (
                    "Rows file 2",
                    format!("{}..{}", result.window.file2.start, result.window.file2.end),
                ),
                ("Rows written", result.rows_written.to_string()),
                ("Output CSV", result.output_path.display().to_string()),
                ("Duration", format!("{:.2?}", start.elapsed())),
            ]);

            print_summary("Comparison Complete", &items);
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Comparison failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_single(config: &SingleConfig, output: Option<&Path>) {
    use crate::processors::single;

    let start = Instant::now();

    let spinner = create_spinner("Exporting time window...");

    match single::run_single(config, output) {
        Ok(result) => {
            spinner.finish_and_clear();

            let items = [
                ("Columns", result.columns.join(", ")),
                ("Rows", format!("{}..{}", result.rows.start, result.rows.end)),
                ("Rows written", result.rows_written.to_string()),
                ("Output CSV", result.output_path.display().to_string()),
                ("Duration", format!("{:.2?}", start.elapsed())),
            ];

            print_summary("Export Complete", &items);
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Export failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_histogram(config: &SingleConfig) {
    use crate::processors::histogram;

    let start = Instant::now();

    let spinner = create_spinner("Computing column statistics...");

    match histogram::run_histogram(config) {
        Ok(result) => {
            spinner.finish_and_clear();

            println!(
                "{:<24} {:>12} {:>12} {:>12} {:>12} {:>12}",
                "column", "mean", "std", "min", "max", "delta"
            );
            for (name, st) in result.columns.iter().zip(&result.stats) {
                println!(
                    "{:<24} {:>12.2} {:>12.2} {:>12} {:>12} {:>12}",
                    name, st.mean, st.std, st.min, st.max, st.delta
                );
            }

            let items = [
                ("Columns", result.columns.len().to_string()),
                ("Bins per column", config.histogram_bins.to_string()),
                ("Stats CSV", result.stats_path.display().to_string()),
                ("Histogram CSV", result.histogram_path.display().to_string()),
                ("Duration", format!("{:.2?}", start.elapsed())),
            ];

            print_summary("Histogram Complete", &items);
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Histogram failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_init_config(path: &Path, single: bool, force: bool) {
    if path.exists() && !force {
        error!("{} already exists, pass --force to overwrite", path.display());
        std::process::exit(1);
    }

    let written = if single {
        SingleConfig {
            input_file: Some(PathBuf::from("input/data.csv")),
            ..SingleConfig::default()
        }
        .to_yaml(path)
    } else {
        CompareConfig {
            input_file_1: Some(PathBuf::from("input/data1.csv")),
            input_file_2: Some(PathBuf::from("input/data2.csv")),
            ..CompareConfig::default()
        }
        .to_yaml(path)
    };

    match written {
        Ok(()) => println!("Wrote default configuration to {}", path.display()),
        Err(e) => {
            error!("Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
