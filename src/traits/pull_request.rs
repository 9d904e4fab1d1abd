// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! The `pull-request` trait
//!
//! Makes a job react to pull requests: the main repository is replaced by a
//! pull-request-flavored variant that triggers the job, and a synthetic
//! `rm_pr_label` step removes the ok-to-test label as soon as the job
//! starts, blocking nothing.

use serde_yaml::{Mapping, Value};

use crate::config::{AttributeSpec, Expect};
use crate::errors::{JobflowError, JobflowResult};
use crate::pipeline::{JobVariant, ScriptKind, Step};

use super::TraitTransformer;

pub(crate) const RM_PR_LABEL_STEP: &str = "rm_pr_label";

pub(crate) fn attribute_specs() -> Vec<AttributeSpec> {
    let mut policies = Mapping::new();
    policies.insert(
        Value::from("require-label"),
        Value::from("reviewed/ok-to-test"),
    );
    policies.insert(
        Value::from("replacement-label"),
        Value::from("needs/ok-to-test"),
    );

    vec![AttributeSpec::optional(
        "policies",
        "labels gating pull-request builds",
        Expect::Mapping,
        Value::Mapping(policies),
    )]
}

pub struct PullRequestTransformer;

impl TraitTransformer for PullRequestTransformer {
    fn name(&self) -> &'static str {
        "pull-request"
    }

    fn inject_steps(&mut self) -> JobflowResult<Vec<Step>> {
        // no dependencies: runs asap, blocks nothing
        Ok(vec![Step::synthetic(RM_PR_LABEL_STEP, ScriptKind::Python3)])
    }

    fn process_pipeline_args(&mut self, mut job: JobVariant) -> JobflowResult<JobVariant> {
        let repo_name = job
            .main_repository()
            .ok_or_else(|| JobflowError::MissingRepository {
                job: job.name().to_string(),
            })?
            .logical_name()
            .to_string();

        // convert the main repository to its pull-request variant
        let mut pr_repo = job.pr_repository(&repo_name)?;
        pr_repo.set_trigger(true);
        job.replace_repository(pr_repo);

        Ok(job)
    }
}
