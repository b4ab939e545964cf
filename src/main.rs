use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, warn};

use specimen_migrator::app::ports::NameMatcher;
use specimen_migrator::config::{MigrationConfig, NameFailurePolicy};
use specimen_migrator::infra::TnrsClient;
use specimen_migrator::observability::{init_logging, metrics};
use specimen_migrator::Pipeline;

#[derive(Parser)]
#[command(name = "specimen_migrator")]
#[command(about = "Migrate ICMS specimen exports into a Symbiota occurrence table")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge, normalize and write the migrated table
    Run {
        /// Primary ICMS export (CSV)
        #[arg(long)]
        primary: PathBuf,
        /// Cross-reference list linking ICMS and Symbiota catalog numbers (CSV)
        #[arg(long)]
        crossref: PathBuf,
        /// Output CSV path
        #[arg(long, default_value = "output.csv")]
        output: PathBuf,
        /// TOML configuration; built-in ICMS defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Skip the name-matching service and keep exported names
        #[arg(long)]
        offline: bool,
        /// Override the name failure policy (abort, skip_record, empty)
        #[arg(long)]
        on_name_failure: Option<NameFailurePolicy>,
        /// Write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write a Prometheus text snapshot of run metrics
        #[arg(long)]
        metrics_file: Option<PathBuf>,
        /// Directory for rolling JSON logs
        #[arg(long, default_value = "logs")]
        log_dir: String,
    },
    /// Print the effective configuration as TOML
    PrintConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<MigrationConfig> {
    let mut config = match path {
        Some(path) => MigrationConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => MigrationConfig::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            primary,
            crossref,
            output,
            config,
            offline,
            on_name_failure,
            report,
            metrics_file,
            log_dir,
        } => {
            init_logging(&log_dir).with_context(|| format!("creating log directory {}", log_dir))?;
            let metrics_handle = match metrics::init() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!("Metrics disabled: {}", e);
                    None
                }
            };

            let mut config = load_config(config.as_ref())?;
            if offline {
                config.name_service.enabled = false;
            }
            if let Some(policy) = on_name_failure {
                config.name_service.on_failure = policy;
            }

            let client = if config.name_service.enabled {
                Some(TnrsClient::new(&config.name_service).context("building name service client")?)
            } else {
                info!("Name resolution disabled; exported scientific names are kept");
                None
            };
            let matcher = client.as_ref().map(|c| c as &dyn NameMatcher);

            let result = Pipeline::new(&config).run(&primary, &crossref, &output, matcher);
            let run_report = match result {
                Ok(r) => r,
                Err(e) => {
                    error!("Migration failed: {}", e);
                    return Err(e).context("migration aborted");
                }
            };

            println!("\n📊 Migration Results:");
            println!("   Primary rows: {}", run_report.primary_rows);
            println!("   Cross-reference rows: {}", run_report.crossref_rows);
            println!("   Merged: {}", run_report.merged_records);
            println!("   Emitted: {}", run_report.emitted_records);
            println!("   Skipped: {}", run_report.derivation.skipped_records);
            println!("   Low-confidence names: {}", run_report.derivation.low_confidence_names);
            println!("   Output file: {}", output.display());

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&run_report)?;
                fs::write(&path, json).with_context(|| format!("writing report to {}", path.display()))?;
            }
            if let (Some(path), Some(handle)) = (metrics_file, metrics_handle) {
                fs::write(&path, handle.render())
                    .with_context(|| format!("writing metrics to {}", path.display()))?;
            }
        }
        Commands::PrintConfig { config } => {
            let config = load_config(config.as_ref())?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
