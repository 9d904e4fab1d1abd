// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! The `publish` trait
//!
//! Declares container images to publish once the job succeeds. A synthetic
//! `prepare` step gathers the outputs of every other step; the synthetic
//! `publish` step consumes them. This core only records the publish targets;
//! the image build/push happens in a later pipeline stage.

use crate::config::{AttributeSpec, Attributes, Expect};
use crate::errors::{JobflowError, JobflowResult};
use crate::pipeline::{JobVariant, ScriptKind, Step};

use super::TraitTransformer;

pub(crate) const PREPARE_STEP: &str = "prepare";
pub(crate) const PUBLISH_STEP: &str = "publish";

pub(crate) fn attribute_specs() -> Vec<AttributeSpec> {
    vec![AttributeSpec::required(
        "dockerimages",
        "images to publish (image name -> registry/image/dockerfile)",
        Expect::Mapping,
    )]
}

/// Each configured image entry must at least name its target reference.
pub(crate) fn validate_attributes(attrs: &Attributes) -> JobflowResult<()> {
    let Some(images) = attrs.mapping("dockerimages") else {
        return Ok(());
    };

    for (name, config) in images {
        let image_name = name.as_str().unwrap_or_default();
        let entity = format!("{} dockerimage '{}'", attrs.entity(), image_name);
        let Some(config) = config.as_mapping() else {
            return Err(JobflowError::InvalidAttributeValue {
                entity,
                key: image_name.to_string(),
                reason: "expected a mapping".to_string(),
            });
        };
        if config.get(&serde_yaml::Value::from("image")).is_none() {
            return Err(JobflowError::MissingAttribute {
                entity,
                key: "image".to_string(),
            });
        }
    }

    Ok(())
}

pub struct PublishTransformer;

impl TraitTransformer for PublishTransformer {
    fn name(&self) -> &'static str {
        "publish"
    }

    fn inject_steps(&mut self) -> JobflowResult<Vec<Step>> {
        let prepare = Step::synthetic(PREPARE_STEP, ScriptKind::BourneShell);
        let mut publish = Step::synthetic(PUBLISH_STEP, ScriptKind::Python3);
        publish.add_dependency(PREPARE_STEP);
        Ok(vec![prepare, publish])
    }

    fn process_pipeline_args(&mut self, mut job: JobVariant) -> JobflowResult<JobVariant> {
        // prepare gathers every other step's results before publish consumes them
        let others: Vec<String> = job
            .steps()
            .map(|step| step.name().to_string())
            .filter(|name| name != PREPARE_STEP && name != PUBLISH_STEP)
            .collect();

        let exposed_outputs: Vec<(String, String)> = job
            .steps()
            .filter(|step| step.name() != PREPARE_STEP && step.name() != PUBLISH_STEP)
            .flat_map(|step| {
                step.outputs()
                    .iter()
                    .map(|(slot, var)| (slot.clone(), var.clone()))
            })
            .collect();

        if let Some(prepare) = job.step_mut(PREPARE_STEP) {
            for name in &others {
                prepare.add_dependency(name);
            }
            for (slot, var) in exposed_outputs {
                if !prepare.has_input(&slot) {
                    prepare.add_input(slot, var)?;
                }
            }
        }

        Ok(job)
    }
}
