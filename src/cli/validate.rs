// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Validate command - compose every job and report all failures

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::config::PipelineConfig;

/// Run the validate command
pub fn run(config_path: PathBuf, verbose: bool) -> Result<()> {
    println!("{}", "Validating jobs...".bold());
    println!();

    if !config_path.exists() {
        return Err(miette::miette!(
            "Configuration file not found: {}",
            config_path.display()
        ));
    }

    let config = match PipelineConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("  {} Failed to parse configuration", "✗".red());
            eprintln!();
            return Err(miette::miette!("Parse error: {}", e));
        }
    };

    println!("  {} Configuration file is valid YAML", "✓".green());

    let report = config.compose_all();

    for job in &report.jobs {
        println!(
            "  {} {} ({} steps)",
            "✓".green(),
            job.name().bold(),
            job.steps().count()
        );
        if verbose {
            for step in job.steps() {
                let mut deps: Vec<String> = step.depends().into_iter().collect();
                deps.sort();
                let deps = if deps.is_empty() {
                    String::new()
                } else {
                    format!(" [depends: {}]", deps.join(", "))
                };
                println!(
                    "      - {} ({}){}",
                    step.name(),
                    step.script_kind(),
                    deps.dimmed()
                );
            }
        }
    }

    if !report.failures.is_empty() {
        println!();
        println!("{}:", "Errors".red().bold());
        for (name, error) in &report.failures {
            println!("  {} {}: {}", "✗".red(), name.bold(), error);
        }
    }

    println!();

    if report.is_success() {
        println!("{}", "All jobs are valid!".green().bold());
        Ok(())
    } else {
        Err(miette::miette!(
            "{} of {} jobs failed to compose",
            report.failures.len(),
            report.failures.len() + report.jobs.len()
        ))
    }
}
