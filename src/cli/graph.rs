// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Graph command - visualize a composed job's step graph

use miette::Result;
use std::path::PathBuf;

use super::GraphFormat;
use crate::config::PipelineConfig;
use crate::pipeline::{DagBuilder, JobVariant};

/// Run the graph command
pub fn run(config_path: PathBuf, job_name: String, format: GraphFormat, _verbose: bool) -> Result<()> {
    if !config_path.exists() {
        return Err(miette::miette!(
            "Configuration file not found: {}",
            config_path.display()
        ));
    }

    let config = PipelineConfig::from_file(&config_path)
        .map_err(|e| miette::miette!("Failed to load configuration: {}", e))?;

    let job = config
        .job_config(&job_name)
        .and_then(JobVariant::compose)
        .map_err(|e| miette::miette!("Failed to compose job '{}': {}", job_name, e))?;

    let dag = DagBuilder::build(&job)
        .map_err(|e| miette::miette!("Failed to build step graph: {}", e))?;

    let output = match format {
        GraphFormat::Text => dag
            .to_text(&job)
            .map_err(|e| miette::miette!("Failed to order steps: {}", e))?,
        GraphFormat::Dot => dag.to_dot(),
        GraphFormat::Mermaid => dag.to_mermaid(),
    };

    println!("{}", output);

    Ok(())
}
