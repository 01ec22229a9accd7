//! smackrules CLI
//!
//! Command-line interface for Smack rule files.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use smack_cli::cli::Cli;
use smack_cli::commands;
use smack_cli::config::SmackConfig;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let config = SmackConfig::load(args.config.as_deref())?;

    // Initialize logging
    let default_filter = if args.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    let succeeded = commands::run(args.command, &config, args.config.as_deref(), &mut stdout)?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
