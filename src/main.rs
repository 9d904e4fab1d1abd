// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! jobflow - Pipeline-Definition Compiler
//!
//! Compile declarative CI job descriptions into validated step graphs.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobflow::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Compile {
            config,
            job,
            prefix,
        } => jobflow::cli::compile::run(config, job, prefix, cli.verbose),
        Commands::Validate { config } => jobflow::cli::validate::run(config, cli.verbose),
        Commands::Graph {
            config,
            job,
            format,
        } => jobflow::cli::graph::run(config, job, format, cli.verbose),
    }
}
