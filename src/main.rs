use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::io;
use std::path::PathBuf;

use hreff::export::{self, ExportFormat};
use hreff::import::load_activities;
use hreff::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use hreff::{summarize, ActivityPipeline, AnalysisConfig, HrEffError};

/// hreff - heart-rate efficiency of exported activities
///
/// Loads a Strava activity export, discards implausible readings and derives
/// speed and power efficiency per normalized heart-rate unit.
#[derive(Parser)]
#[command(name = "hreff")]
#[command(version)]
#[command(about = "Heart-rate efficiency analysis for activity exports", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    /// Also write JSON logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform the export and print or save the resulting table
    Process {
        /// Activity export (defaults to the configured path)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format (table, csv, json)
        #[arg(short = 'f', long, default_value = "table")]
        format: ExportFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only the N most recent activities
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Efficiency statistics per activity type
    Summary {
        /// Activity export (defaults to the configured path)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format (table, csv, json)
        #[arg(short = 'f', long, default_value = "table")]
        format: ExportFormat,
    },

    /// Show the oldest activity in the export
    Oldest {
        /// Activity export (defaults to the configured path)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show or initialize the configuration
    Config {
        /// Print the effective configuration as TOML
        #[arg(short, long)]
        show: bool,

        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load_from_file(path),
        None => Ok(AnalysisConfig::load_or_default()),
    }
}

fn execute(cli: &Cli, config: AnalysisConfig) -> Result<()> {
    match &cli.command {
        Commands::Process {
            input,
            format,
            output,
            limit,
        } => {
            let pipeline = ActivityPipeline::new(config);
            let path = input.clone().unwrap_or_else(|| pipeline.config().input.path.clone());
            let result = pipeline.run_file(&path)?;

            match output {
                Some(output) => {
                    export::export_table_to_path(&result.table, *format, *limit, output)
                        .with_context(|| format!("Failed to export to {}", output.display()))?;
                    eprintln!(
                        "{}",
                        format!(
                            "✓ Exported {} activities to {}",
                            limit.map_or(result.table.len(), |l| l.min(result.table.len())),
                            output.display()
                        )
                        .green()
                    );
                }
                None => {
                    export::export_table(&result.table, *format, *limit, true, io::stdout().lock())
                        .map_err(HrEffError::from)?
                }
            }

            if cli.verbose > 0 {
                let scrub = &result.report.scrub;
                eprintln!(
                    "{}",
                    format!(
                        "Scrubbed: {} run speeds, {} run heart rates, {} known-bad heart rates",
                        scrub.run_speed_cleared, scrub.run_hr_cleared, scrub.bad_id_hr_cleared
                    )
                    .dimmed()
                );
            }
        }

        Commands::Summary { input, format } => {
            let pipeline = ActivityPipeline::new(config);
            let path = input.clone().unwrap_or_else(|| pipeline.config().input.path.clone());
            let result = pipeline.run_file(&path)?;
            let summaries = summarize(&result.table);
            export::export_summary(&summaries, *format, true, io::stdout().lock())
                .map_err(HrEffError::from)?;
        }

        Commands::Oldest { input } => {
            let path = input.clone().unwrap_or_else(|| config.input.path.clone());
            let table = load_activities(&path)?;
            match table.oldest() {
                Some(oldest) => println!(
                    "Oldest activity in {}: {} ({}, id {})",
                    path.display(),
                    oldest.timestamp(),
                    oldest.activity_type,
                    oldest.id
                ),
                None => println!("Oldest activity in {}: (none)", path.display()),
            }
        }

        Commands::Config { show, init } => {
            if *init {
                let path = cli
                    .config
                    .clone()
                    .unwrap_or_else(AnalysisConfig::default_config_path);
                AnalysisConfig::default().save_to_file(&path)?;
                println!(
                    "{}",
                    format!("✓ Wrote default configuration to {}", path.display()).green()
                );
            }
            if *show || !*init {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        format: cli.log_format,
        file_path: cli.log_file.clone(),
        include_spans: cli.verbose > 1,
    })?;

    let config = load_config(cli.config.as_ref())?;

    if let Err(err) = execute(&cli, config) {
        match err.downcast_ref::<HrEffError>() {
            Some(hreff_err) => {
                tracing::error!(severity = ?hreff_err.severity(), "{}", hreff_err);
                eprintln!("{}", hreff_err.user_message().red());
            }
            None => eprintln!("{}", format!("{:#}", err).red()),
        }
        std::process::exit(1);
    }

    Ok(())
}
