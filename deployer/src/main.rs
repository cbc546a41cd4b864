//! ggdeploy - Entry Point
//!
//! Rolls component versions out to a Greengrass fleet target and waits for
//! the devices to converge, or synthesizes the delivery pipeline stack.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{error, info};

use ggdeploy::app::options::{DeployOptions, PollOverrides, SynthOptions};
use ggdeploy::app::run::{deploy, report_outcome, synth};
use ggdeploy::http::client::HttpClient;
use ggdeploy::logs::{init_logging, LogLevel, LogOptions};
use ggdeploy::storage::layout::OutputLayout;
use ggdeploy::storage::params::{TargetName, DEFAULT_PARAMS_FILE};
use ggdeploy::storage::settings::{region_from_lookup, Settings};
use ggdeploy::utils::version_info;

#[derive(Parser)]
#[command(name = "ggdeploy")]
#[command(about = "Greengrass fleet deployment reconciler")]
#[command(version)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Emit JSON logs
    #[arg(long, global = true)]
    log_json: bool,

    /// Also write logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or revise the deployment of an environment and wait for devices
    Deploy {
        /// Environment to deploy to
        #[arg(long, value_enum, default_value_t = TargetName::Canary)]
        target_name: TargetName,

        /// Parameter file
        #[arg(long, default_value = DEFAULT_PARAMS_FILE)]
        params: PathBuf,

        /// Maximum number of device status polls
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Seconds between device status polls
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Write the delivery pipeline template
    Synth {
        /// Parameter file
        #[arg(long, default_value = DEFAULT_PARAMS_FILE)]
        params: PathBuf,

        /// Output directory
        #[arg(long, default_value = "cdk.out")]
        out: PathBuf,
    },

    /// Print build information as JSON
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_options = LogOptions {
        log_level: cli.log_level,
        log_dir: cli.log_dir.clone(),
        json_format: cli.log_json,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    let result: anyhow::Result<bool> = match cli.command {
        Commands::Version => match serde_json::to_string_pretty(&version_info()) {
            Ok(json) => {
                println!("{}", json);
                Ok(true)
            }
            Err(e) => Err(e.into()),
        },
        Commands::Synth { params, out } => run_synth(params, out).await,
        Commands::Deploy {
            target_name,
            params,
            max_iterations,
            interval_secs,
        } => {
            let options = DeployOptions {
                target: target_name,
                params_file: params,
                layout: OutputLayout::from_env(),
                poll_overrides: PollOverrides {
                    max_iterations,
                    interval: interval_secs.map(Duration::from_secs),
                },
            };
            run_deploy(options).await
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run_deploy(options: DeployOptions) -> anyhow::Result<bool> {
    let settings = Settings::from_env().context("Failed to read settings")?;
    info!(
        "ggdeploy {} targeting {} in {}",
        version_info().version,
        settings.endpoint,
        settings.region
    );

    let client = HttpClient::connect(&settings)
        .await
        .context("Failed to resolve credentials")?;
    let report = deploy(&client, &options, tokio::time::sleep)
        .await
        .with_context(|| format!("Deployment to {} aborted", options.target))?;
    Ok(report_outcome(&report))
}

async fn run_synth(params: PathBuf, out: PathBuf) -> anyhow::Result<bool> {
    let region = region_from_lookup(&|key: &str| std::env::var(key).ok());

    let path = synth(&SynthOptions {
        params_file: params,
        out_dir: out,
        region,
    })
    .await
    .context("Failed to synthesize the pipeline stack")?;
    println!("{}", path.display());
    Ok(true)
}
