// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Graph validation
//!
//! A pure read-only pass over a composed job: referential integrity and
//! acyclicity of the step graph, plus per-step semantic rules. Re-running it
//! against an unchanged graph always yields the same outcome.

use crate::errors::JobflowResult;
use crate::pipeline::{DagBuilder, JobVariant};

/// Validator for composed step graphs
pub struct GraphValidator;

impl GraphValidator {
    /// Validate a composed job.
    ///
    /// Checks that every referenced dependency names a registered step, that
    /// the dependency relation is acyclic, and that every step passes its
    /// own semantic rules (image-reference shape).
    pub fn validate(job: &JobVariant) -> JobflowResult<()> {
        DagBuilder::build(job)?;

        for step in job.steps() {
            step.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JobflowError;
    use crate::pipeline::Step;

    #[test]
    fn test_valid_graph_passes() {
        let mut job = JobVariant::bare("build");
        job.add_step(Step::new("compile")).unwrap();
        let mut test = Step::new("test");
        test.add_dependency("compile");
        job.add_step(test).unwrap();

        GraphValidator::validate(&job).unwrap();
    }

    #[test]
    fn test_bad_image_is_caught_at_validation() {
        let yaml = "image: 'no tag here'";
        let raw = serde_yaml::from_str(yaml).unwrap();
        let attrs = crate::config::Attributes::build(
            "step 'compile'",
            &crate::pipeline::step::attribute_specs(),
            &raw,
        )
        .unwrap();
        let step = Step::from_attributes("compile", &attrs).unwrap();

        let mut job = JobVariant::bare("build");
        job.add_step(step).unwrap();

        assert!(matches!(
            GraphValidator::validate(&job),
            Err(JobflowError::MalformedImageReference { .. })
        ));
    }

    #[test]
    fn test_missing_dependency_is_caught_at_validation() {
        let mut job = JobVariant::bare("build");
        let mut step = Step::new("compile");
        step.add_dependency("ghost");
        job.add_step(step).unwrap();

        assert!(matches!(
            GraphValidator::validate(&job),
            Err(JobflowError::MissingDependency { .. })
        ));
    }
}
