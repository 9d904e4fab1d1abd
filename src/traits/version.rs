// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! The `version` trait
//!
//! Injects a synthetic `version` step that determines the effective version
//! for the build and exposes it through the `version_path` output. Every
//! other step runs after it and may consume that output.

use crate::config::{AttributeSpec, Expect};
use crate::errors::JobflowResult;
use crate::pipeline::{JobVariant, ScriptKind, Step};

use super::TraitTransformer;

pub(crate) const VERSION_STEP: &str = "version";
pub(crate) const VERSION_PATH: &str = "version_path";

pub(crate) fn attribute_specs() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::optional(
            "versionfile",
            "relative path of the file the repository version is read from",
            Expect::Str,
            "VERSION",
        ),
        AttributeSpec::optional(
            "preprocess",
            "how the effective version is derived from the repository version",
            Expect::OneOf(&["inject-commit-hash", "noop"]),
            "inject-commit-hash",
        ),
    ]
}

pub struct VersionTransformer;

impl TraitTransformer for VersionTransformer {
    fn name(&self) -> &'static str {
        "version"
    }

    fn inject_steps(&mut self) -> JobflowResult<Vec<Step>> {
        let mut step = Step::synthetic(VERSION_STEP, ScriptKind::Python3);
        step.add_output(VERSION_PATH, VERSION_PATH)?;
        Ok(vec![step])
    }

    fn process_pipeline_args(&mut self, mut job: JobVariant) -> JobflowResult<JobVariant> {
        // all other steps run after us and may consume the effective version
        let others: Vec<String> = job
            .steps()
            .map(|step| step.name().to_string())
            .filter(|name| name != VERSION_STEP)
            .collect();

        for name in others {
            if let Some(step) = job.step_mut(&name) {
                step.add_dependency(VERSION_STEP);
                if !step.has_input(VERSION_PATH) {
                    step.add_input(VERSION_PATH, VERSION_PATH)?;
                }
            }
        }

        Ok(job)
    }
}
