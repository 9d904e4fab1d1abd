// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for jobflow.

pub mod compile;
pub mod graph;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pipeline-definition compiler
///
/// Compile declarative CI job descriptions into validated step graphs.
#[derive(Parser, Debug)]
#[clap(
    name = "jobflow",
    version,
    about = "Compile declarative CI job descriptions into validated step graphs",
    long_about = None,
    after_help = "Examples:\n\
        jobflow validate                 Check every job in .jobflow.yaml\n\
        jobflow compile                  Emit the composed graphs as JSON\n\
        jobflow graph --job build        Show one job's step graph\n\n\
        See 'jobflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose all jobs and emit the finalized graphs as JSON
    Compile {
        /// Configuration file
        #[clap(default_value = ".jobflow.yaml")]
        config: PathBuf,

        /// Compile only this job
        #[clap(short, long)]
        job: Option<String>,

        /// Path prefix for step executables in emitted command lines
        #[clap(long)]
        prefix: Option<String>,
    },

    /// Validate the configuration by composing every job
    Validate {
        /// Configuration file
        #[clap(default_value = ".jobflow.yaml")]
        config: PathBuf,
    },

    /// Show a composed job's step graph
    Graph {
        /// Configuration file
        #[clap(default_value = ".jobflow.yaml")]
        config: PathBuf,

        /// Job to show
        #[clap(short, long)]
        job: String,

        /// Output format
        #[clap(short, long, value_enum, default_value = "text")]
        format: GraphFormat,
    },
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}
