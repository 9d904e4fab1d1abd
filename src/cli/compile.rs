// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Compile command - emit composed job graphs for the renderer

use colored::Colorize;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{CompositionReport, PipelineConfig};
use crate::pipeline::{
    JobVariant, NotificationPolicy, RepositoryKind, ScriptKind, Step,
};
use crate::JobflowResult;

/// What the downstream renderer consumes, per step.
#[derive(Serialize)]
struct StepProjection {
    name: String,
    synthetic: bool,
    script_kind: ScriptKind,
    notification_policy: NotificationPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    registry: Option<String>,
    inputs: indexmap::IndexMap<String, String>,
    outputs: indexmap::IndexMap<String, String>,
    depends: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    publish_to: Vec<String>,
    execute: String,
}

#[derive(Serialize)]
struct RepositoryProjection {
    name: String,
    resource: String,
    kind: RepositoryKind,
    hostname: String,
    path: String,
    branch: String,
    main: bool,
    trigger: bool,
}

#[derive(Serialize)]
struct JobProjection {
    name: String,
    repositories: Vec<RepositoryProjection>,
    traits: Vec<&'static str>,
    steps: Vec<StepProjection>,
}

fn project_step(step: &Step, prefix: Option<&str>) -> JobflowResult<StepProjection> {
    Ok(StepProjection {
        name: step.name().to_string(),
        synthetic: step.is_synthetic(),
        script_kind: step.script_kind(),
        notification_policy: step.notification_policy(),
        image: step.image().map(String::from),
        registry: step.registry().map(String::from),
        inputs: step.inputs().clone(),
        outputs: step.outputs().clone(),
        depends: step.depends().into_iter().collect(),
        publish_to: step.publish_repository_names().to_vec(),
        execute: step.execute_line(prefix)?,
    })
}

fn project_job(job: &JobVariant, prefix: Option<&str>) -> JobflowResult<JobProjection> {
    Ok(JobProjection {
        name: job.name().to_string(),
        repositories: job
            .repositories()
            .map(|repo| RepositoryProjection {
                name: repo.logical_name().to_string(),
                resource: repo.resource_name(),
                kind: repo.kind(),
                hostname: repo.hostname().to_string(),
                path: repo.path().to_string(),
                branch: repo.branch().to_string(),
                main: repo.is_main(),
                trigger: repo.triggers(),
            })
            .collect(),
        traits: job.traits().iter().map(|tr| tr.name()).collect(),
        steps: job
            .steps()
            .map(|step| project_step(step, prefix))
            .collect::<JobflowResult<_>>()?,
    })
}

/// Run the compile command
pub fn run(
    config_path: PathBuf,
    job: Option<String>,
    prefix: Option<String>,
    _verbose: bool,
) -> Result<()> {
    let config = PipelineConfig::from_file(&config_path)
        .map_err(|e| miette::miette!("Failed to load configuration: {}", e))?;

    let report = match &job {
        Some(name) => {
            let mut report = CompositionReport::default();
            match config.job_config(name).and_then(JobVariant::compose) {
                Ok(job) => report.jobs.push(job),
                Err(error) => report.failures.push((name.clone(), error)),
            }
            report
        }
        None => config.compose_all(),
    };

    for (name, error) in &report.failures {
        eprintln!("  {} job '{}': {}", "✗".red(), name.bold(), error);
    }

    let projections: Vec<JobProjection> = report
        .jobs
        .iter()
        .map(|job| project_job(job, prefix.as_deref()))
        .collect::<JobflowResult<_>>()
        .map_err(|e| miette::miette!("Failed to project job: {}", e))?;

    let json = serde_json::to_string_pretty(&projections)
        .map_err(|e| miette::miette!("Failed to serialize: {}", e))?;
    println!("{json}");

    if report.is_success() {
        Ok(())
    } else {
        Err(miette::miette!(
            "{} of {} jobs failed to compose",
            report.failures.len(),
            report.failures.len() + report.jobs.len()
        ))
    }
}
