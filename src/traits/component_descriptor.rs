// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! The `component_descriptor` trait
//!
//! Injects a synthetic step that assembles the job's component descriptor
//! and exposes it through the `component_descriptor_dir` output. When the
//! user configures no component name, it is derived from the main
//! repository (`<hostname>/<path>`) and written back into the trait's
//! attributes for later pipeline stages.

use serde_yaml::Value;

use crate::config::{AttributeSpec, Attributes, Expect};
use crate::errors::{JobflowError, JobflowResult};
use crate::pipeline::{JobVariant, ScriptKind, Step};

use super::release::RELEASE_STEP;
use super::{TraitKind, TraitTransformer};

pub(crate) const DESCRIPTOR_STEP: &str = "component_descriptor";
pub(crate) const DESCRIPTOR_DIR: &str = "component_descriptor_dir";

pub(crate) fn attribute_specs() -> Vec<AttributeSpec> {
    let mut step = serde_yaml::Mapping::new();
    step.insert(Value::from("name"), Value::from(DESCRIPTOR_STEP));

    vec![
        AttributeSpec::optional(
            "step",
            "settings of the injected step",
            Expect::Mapping,
            Value::Mapping(step),
        ),
        AttributeSpec::optional(
            "resolve_dependencies",
            "resolve transitive component references",
            Expect::Bool,
            true,
        ),
        AttributeSpec::optional_absent(
            "component_name",
            "component name (derived from the main repository when absent)",
            Expect::Str,
        ),
    ]
}

// TODO: make the step name actually configurable (needs a concept for
// step-specific behaviour first)
pub(crate) fn validate_attributes(attrs: &Attributes) -> JobflowResult<()> {
    if step_name(attrs) != DESCRIPTOR_STEP {
        return Err(JobflowError::InvalidAttributeValue {
            entity: attrs.entity().to_string(),
            key: "step".to_string(),
            reason: format!("step name must be '{DESCRIPTOR_STEP}'"),
        });
    }
    Ok(())
}

fn step_name(attrs: &Attributes) -> String {
    attrs
        .mapping("step")
        .and_then(|step| step.get(&Value::from("name")))
        .and_then(Value::as_str)
        .unwrap_or(DESCRIPTOR_STEP)
        .to_string()
}

pub struct ComponentDescriptorTransformer {
    step_name: String,
    component_name: Option<String>,
}

impl ComponentDescriptorTransformer {
    pub(crate) fn new(tr: &super::Trait) -> Self {
        Self {
            step_name: step_name(tr.attributes()),
            component_name: tr
                .attributes()
                .str_value("component_name")
                .map(String::from),
        }
    }
}

impl TraitTransformer for ComponentDescriptorTransformer {
    fn name(&self) -> &'static str {
        "component_descriptor"
    }

    fn inject_steps(&mut self) -> JobflowResult<Vec<Step>> {
        let mut step = Step::synthetic(&self.step_name, ScriptKind::Python3);
        step.add_output(DESCRIPTOR_DIR, DESCRIPTOR_DIR)?;
        Ok(vec![step])
    }

    fn process_pipeline_args(&mut self, mut job: JobVariant) -> JobflowResult<JobVariant> {
        // a release step registered by now consumes the descriptor
        if job.has_step(RELEASE_STEP) {
            if let Some(release) = job.step_mut(RELEASE_STEP) {
                if !release.has_input(DESCRIPTOR_DIR) {
                    release.add_input(DESCRIPTOR_DIR, DESCRIPTOR_DIR)?;
                }
            }
        }

        // derive the component name from the main repository if not configured
        if self.component_name.is_none() {
            let derived = job
                .main_repository()
                .map(|repo| format!("{}/{}", repo.hostname(), repo.path()))
                .ok_or_else(|| JobflowError::MissingRepository {
                    job: job.name().to_string(),
                })?;
            if let Some(attrs) = job.trait_attributes_mut(TraitKind::ComponentDescriptor) {
                attrs.set("component_name", Value::from(derived));
            }
        }

        Ok(job)
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["version"]
    }

    fn order_dependencies(&self) -> &'static [&'static str] {
        &["release"]
    }
}
