//! nestcv - Main Entry Point
//!
//! Compares nested and non-nested cross-validation estimates of an SVM
//! tuned by grid search.

use clap::Parser;
use nestcv::cli::{cmd_datasets, cmd_nested, cmd_run, cmd_search, Cli, Commands, ExperimentArgs};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `run --json` keeps stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nestcv=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { args, json }) => cmd_run(&args, json)?,
        Some(Commands::Search { args }) => cmd_search(&args)?,
        Some(Commands::Nested { args }) => cmd_nested(&args)?,
        Some(Commands::Datasets) => cmd_datasets()?,
        None => {
            // Default: the full comparison with built-in settings
            cmd_run(&ExperimentArgs::default(), false)?;
        }
    }

    Ok(())
}
