//! papilio-identify - run the identification pipeline on a local image
//!
//! Prints the report as JSON. Exit status: 0 identified, 2 not identified,
//! 1 on any error.

use anyhow::{Context, Result};
use clap::Parser;
use papilio_id::cli::{exit_code, identify_image, CliOutcome};
use papilio_id::config::{load_settings, ConfigOverrides};
use papilio_id::load_identifier;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "papilio-identify", version, about = "Identify the butterfly in a photo")]
struct Cli {
    /// Image to identify
    image: PathBuf,

    /// TOML configuration file
    #[arg(long, env = "PAPILIO_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder for model and metadata
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Print the whole embedded image instead of a preview
    #[arg(long)]
    full_image: bool,
}

fn run(cli: Cli) -> Result<(CliOutcome, String)> {
    let settings = load_settings(ConfigOverrides {
        config_path: cli.config,
        root_folder: cli.root_folder,
        ..Default::default()
    })?;
    papilio_common::logging::init_tracing(&settings.log_level);

    let identifier = load_identifier(&settings).context("Failed to load identification service")?;
    identify_image(&identifier, &cli.image, cli.full_image)
}

fn main() -> ExitCode {
    let result = run(Cli::parse());

    match &result {
        Ok((CliOutcome::Identified, report)) => println!("{}", report),
        Ok((CliOutcome::NotIdentified, reason)) => eprintln!("{}", reason),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
        }
    }

    ExitCode::from(exit_code(&result))
}
