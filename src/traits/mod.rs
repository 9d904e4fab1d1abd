// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Job traits
//!
//! A trait is a named optional feature attached to a job ("this job is
//! release-flavored", "this job reacts to pull requests"). Each trait kind
//! carries a default-attribute schema and contributes exactly one
//! [`TraitTransformer`] that injects synthetic steps and rewrites job state
//! during composition.
//!
//! The set of kinds is closed: new traits are added by extending
//! [`TraitKind`] and its registration table, not by subclassing.

mod component_descriptor;
mod publish;
mod pull_request;
mod release;
mod version;

pub use component_descriptor::ComponentDescriptorTransformer;
pub use publish::PublishTransformer;
pub use pull_request::PullRequestTransformer;
pub use release::ReleaseTransformer;
pub use version::VersionTransformer;

use serde_yaml::Mapping;

use crate::config::{AttributeSpec, Attributes};
use crate::errors::{JobflowError, JobflowResult};
use crate::pipeline::{JobVariant, Step};

/// The closed set of trait kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitKind {
    Version,
    Release,
    Publish,
    PullRequest,
    ComponentDescriptor,
}

impl TraitKind {
    pub const ALL: [TraitKind; 5] = [
        TraitKind::Version,
        TraitKind::Release,
        TraitKind::Publish,
        TraitKind::PullRequest,
        TraitKind::ComponentDescriptor,
    ];

    /// The trait name as it appears in configuration.
    pub fn name(self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Release => "release",
            Self::Publish => "publish",
            Self::PullRequest => "pull-request",
            Self::ComponentDescriptor => "component_descriptor",
        }
    }

    /// Parse a configured trait name.
    pub fn parse(name: &str) -> JobflowResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| JobflowError::UnknownTrait {
                name: name.to_string(),
            })
    }

    /// Attribute schema for this kind.
    pub fn attribute_specs(self) -> Vec<AttributeSpec> {
        match self {
            Self::Version => version::attribute_specs(),
            Self::Release => release::attribute_specs(),
            Self::Publish => publish::attribute_specs(),
            Self::PullRequest => pull_request::attribute_specs(),
            Self::ComponentDescriptor => component_descriptor::attribute_specs(),
        }
    }

    fn post_validate(self, attrs: &Attributes) -> JobflowResult<()> {
        match self {
            Self::Publish => publish::validate_attributes(attrs),
            Self::ComponentDescriptor => component_descriptor::validate_attributes(attrs),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for TraitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A trait instance attached to one job: its kind plus the merged
/// (defaults + user, user wins) attribute set.
#[derive(Debug, Clone, PartialEq)]
pub struct Trait {
    kind: TraitKind,
    attrs: Attributes,
}

impl Trait {
    /// Instantiate a trait from user configuration.
    pub fn from_config(kind: TraitKind, job: &str, user: &Mapping) -> JobflowResult<Self> {
        let entity = format!("trait '{}' of job '{}'", kind.name(), job);
        let attrs = Attributes::build(&entity, &kind.attribute_specs(), user)?;
        kind.post_validate(&attrs)?;
        Ok(Self { kind, attrs })
    }

    pub fn kind(&self) -> TraitKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attrs
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    /// The transformer this trait contributes, selected through the
    /// registration table.
    pub fn transformer(&self) -> Box<dyn TraitTransformer> {
        match self.kind {
            TraitKind::Version => Box::new(VersionTransformer),
            TraitKind::Release => Box::new(ReleaseTransformer),
            TraitKind::Publish => Box::new(PublishTransformer),
            TraitKind::PullRequest => Box::new(PullRequestTransformer),
            TraitKind::ComponentDescriptor => {
                Box::new(ComponentDescriptorTransformer::new(self))
            }
        }
    }
}

/// Behavior a trait contributes to job composition.
///
/// Transformers are transient helpers: the composition loop runs
/// `inject_steps` and then `process_pipeline_args` for one trait at a time,
/// in the order computed by the trait-ordering resolver, and drops the
/// transformer afterwards. `process_pipeline_args` consumes the job under
/// composition and returns the next snapshot, so each trait's effect is a
/// discrete, auditable transformation.
pub trait TraitTransformer {
    /// The trait name this transformer belongs to.
    fn name(&self) -> &'static str;

    /// Steps to add to the job before `process_pipeline_args` runs.
    fn inject_steps(&mut self) -> JobflowResult<Vec<Step>> {
        Ok(Vec::new())
    }

    /// Rewrite already-composed job state.
    fn process_pipeline_args(&mut self, job: JobVariant) -> JobflowResult<JobVariant>;

    /// Trait names that must be processed strictly before this one.
    /// Constraints naming inactive traits are dropped.
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// Trait names that must be processed strictly after this one.
    /// Constraints naming inactive traits are dropped.
    fn order_dependencies(&self) -> &'static [&'static str] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_names() {
        assert_eq!(TraitKind::parse("release").unwrap(), TraitKind::Release);
        assert_eq!(
            TraitKind::parse("pull-request").unwrap(),
            TraitKind::PullRequest
        );
        assert!(matches!(
            TraitKind::parse("cronjob"),
            Err(JobflowError::UnknownTrait { .. })
        ));
    }

    #[test]
    fn test_every_kind_has_a_transformer() {
        for kind in TraitKind::ALL {
            let tr = Trait::from_config(kind, "build", &default_user(kind)).unwrap();
            assert_eq!(tr.transformer().name(), kind.name());
        }
    }

    fn default_user(kind: TraitKind) -> Mapping {
        match kind {
            // publish requires a dockerimages mapping
            TraitKind::Publish => serde_yaml::from_str(
                "dockerimages:\n  widget:\n    image: example.org/widget\n",
            )
            .unwrap(),
            _ => Mapping::new(),
        }
    }
}
