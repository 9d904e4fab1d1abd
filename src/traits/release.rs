// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! The `release` trait
//!
//! Marks a job as release-flavored: a synthetic `release` step runs after
//! every other step, and the job is no longer triggered automatically unless
//! the user configured triggering explicitly.

use crate::config::{AttributeSpec, Expect};
use crate::errors::JobflowResult;
use crate::pipeline::{JobVariant, NotificationPolicy, ScriptKind, Step};

use super::TraitTransformer;

pub(crate) const RELEASE_STEP: &str = "release";

pub(crate) fn attribute_specs() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::optional(
            "nextversion",
            "how the next development version is calculated",
            Expect::OneOf(&["bump_major", "bump_minor", "bump_patch", "noop"]),
            "bump_minor",
        ),
        AttributeSpec::optional_absent(
            "release_callback",
            "callback invoked during release commit creation",
            Expect::Str,
        ),
        AttributeSpec::optional_absent(
            "next_version_callback",
            "callback invoked during next-version commit creation",
            Expect::Str,
        ),
        AttributeSpec::optional(
            "rebase_before_release",
            "rebase against the latest branch head before publishing release commits",
            Expect::Bool,
            false,
        ),
        AttributeSpec::optional(
            "release_notes_policy",
            "release notes handling policy",
            Expect::OneOf(&["default", "disabled"]),
            "default",
        ),
    ]
}

pub struct ReleaseTransformer;

impl TraitTransformer for ReleaseTransformer {
    fn name(&self) -> &'static str {
        "release"
    }

    fn inject_steps(&mut self) -> JobflowResult<Vec<Step>> {
        let step = Step::synthetic(RELEASE_STEP, ScriptKind::Python3)
            .with_notification_policy(NotificationPolicy::NoNotification);
        Ok(vec![step])
    }

    fn process_pipeline_args(&mut self, mut job: JobVariant) -> JobflowResult<JobVariant> {
        // the release step runs last: it depends on every other step
        let others: Vec<String> = job
            .steps()
            .map(|step| step.name().to_string())
            .filter(|name| name != RELEASE_STEP)
            .collect();

        if let Some(release) = job.step_mut(RELEASE_STEP) {
            for name in &others {
                release.add_dependency(name);
            }
        }

        // a release job is only triggered automatically if explicitly configured
        if let Some(repo) = job.main_repository_mut() {
            if !repo.trigger_is_explicit() {
                repo.set_trigger(false);
            }
        }

        Ok(job)
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["version"]
    }

    fn order_dependencies(&self) -> &'static [&'static str] {
        &["publish"]
    }
}
