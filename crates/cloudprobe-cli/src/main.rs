//! cloudprobe CLI - CRD manifest validation and platform waits for E2E runs

use clap::{Parser, Subcommand};
use cloudprobe_core::ProbeConfig;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::wait::WaitTarget;
use error::Result;

#[derive(Parser)]
#[command(name = "cloudprobe")]
#[command(version)]
#[command(about = "Validate manifests against CRD schemas and wait on cloud platform state", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Run configuration file (defaults to ~/.config/cloudprobe/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bearer token for the platform APIs
    #[arg(long, global = true, env = "CLOUDPROBE_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate resource manifests against the CRDs in a directory
    Validate {
        /// Directory searched recursively for CustomResourceDefinitions
        #[arg(long, value_name = "DIR")]
        crds: PathBuf,

        /// Manifest files to validate
        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error when any document is not valid
        #[arg(long)]
        strict: bool,
    },

    /// Wait for platform state to converge
    Wait {
        #[command(subcommand)]
        target: WaitTarget,
    },
}

/// Log to stderr; `RUST_LOG` wins over `--debug`
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(debug))
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ProbeConfig> {
    let config = match path {
        Some(path) => ProbeConfig::load_from(path)?,
        None => ProbeConfig::load()?,
    };
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Validate {
            crds,
            targets,
            json,
            strict,
        } => commands::validate::run(&crds, &targets, json, strict),

        Commands::Wait { target } => {
            let config = load_config(cli.config.as_ref())?;
            commands::wait::run(target, &config, cli.token)
        }
    }
}

fn main() -> miette::Result<()> {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.debug);

    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            code
        }
    };

    std::process::exit(code)
}
