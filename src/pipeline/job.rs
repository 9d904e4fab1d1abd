// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Job composition
//!
//! A [`JobVariant`] exclusively owns the repositories, traits, and step
//! registry of one job. [`JobVariant::compose`] drives the whole composition:
//! registering explicit steps, resolving the trait processing order, running
//! each transformer (inject, then process, one trait fully completed before
//! the next starts), and validating the finished graph. A job either
//! composes into a fully valid graph or composition aborts; partial graphs
//! never escape.

use indexmap::IndexMap;
use tracing::debug;

use crate::config::{Attributes, JobConfig};
use crate::errors::{JobflowError, JobflowResult};
use crate::pipeline::order::resolve_order;
use crate::pipeline::validation::GraphValidator;
use crate::pipeline::{RepositoryReference, Step};
use crate::traits::{Trait, TraitKind};

/// The per-job aggregate of repositories, traits, and the step graph.
#[derive(Debug)]
pub struct JobVariant {
    name: String,
    repositories: IndexMap<String, RepositoryReference>,
    traits: Vec<Trait>,
    steps: IndexMap<String, Step>,
}

impl JobVariant {
    /// Compose a job from its typed configuration: register explicit steps,
    /// run the active traits' transformers in resolved order, validate.
    pub fn compose(config: JobConfig) -> JobflowResult<Self> {
        let JobConfig {
            name,
            main_repository,
            additional_repositories,
            traits,
            steps,
        } = config;

        let mut job = Self::bare(name);
        job.insert_repository(main_repository)?;
        for repo in additional_repositories {
            job.insert_repository(repo)?;
        }
        for step in steps {
            job.add_step(step)?;
        }
        job.traits = traits;

        debug!(
            job = %job.name,
            steps = job.steps.len(),
            traits = job.traits.len(),
            "composing job"
        );

        let mut transformers: Vec<_> = job.traits.iter().map(Trait::transformer).collect();
        let order = resolve_order(&transformers)?;

        for idx in order {
            let transformer = &mut transformers[idx];
            debug!(transformer = transformer.name(), "applying trait transformer");
            for step in transformer.inject_steps()? {
                job.add_step(step)?;
            }
            job = transformer.process_pipeline_args(job)?;
        }

        GraphValidator::validate(&job)?;
        Ok(job)
    }

    pub(crate) fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repositories: IndexMap::new(),
            traits: Vec::new(),
            steps: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered steps, in registration order (explicit first, then
    /// synthetic, per trait processing order).
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.get(name)
    }

    pub fn has_step(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    pub(crate) fn step_mut(&mut self, name: &str) -> Option<&mut Step> {
        self.steps.get_mut(name)
    }

    /// Register a step; step names are unique within a job.
    pub(crate) fn add_step(&mut self, step: Step) -> JobflowResult<()> {
        if self.steps.contains_key(step.name()) {
            return Err(JobflowError::DuplicateStep {
                job: self.name.clone(),
                step: step.name().to_string(),
            });
        }
        self.steps.insert(step.name().to_string(), step);
        Ok(())
    }

    /// All repositories tracked by this job.
    pub fn repositories(&self) -> impl Iterator<Item = &RepositoryReference> {
        self.repositories.values()
    }

    pub fn repository(&self, logical_name: &str) -> Option<&RepositoryReference> {
        self.repositories.get(logical_name)
    }

    /// The job's main repository, if one is configured.
    pub fn main_repository(&self) -> Option<&RepositoryReference> {
        self.repositories.values().find(|repo| repo.is_main())
    }

    pub(crate) fn main_repository_mut(&mut self) -> Option<&mut RepositoryReference> {
        self.repositories.values_mut().find(|repo| repo.is_main())
    }

    /// A pull-request-flavored variant of the named repository.
    pub fn pr_repository(&self, logical_name: &str) -> JobflowResult<RepositoryReference> {
        self.repositories
            .get(logical_name)
            .map(RepositoryReference::pull_request_variant)
            .ok_or_else(|| JobflowError::UnknownRepository {
                job: self.name.clone(),
                name: logical_name.to_string(),
            })
    }

    /// Replace the entry of the same logical name (registry position is
    /// preserved).
    pub(crate) fn replace_repository(&mut self, repo: RepositoryReference) {
        self.repositories
            .insert(repo.logical_name().to_string(), repo);
    }

    fn insert_repository(&mut self, repo: RepositoryReference) -> JobflowResult<()> {
        if self.repositories.contains_key(repo.logical_name()) {
            return Err(JobflowError::InvalidAttributeValue {
                entity: format!("job '{}'", self.name),
                key: "repos".to_string(),
                reason: format!("duplicate repository '{}'", repo.logical_name()),
            });
        }
        self.repositories
            .insert(repo.logical_name().to_string(), repo);
        Ok(())
    }

    /// Active traits, in declaration order.
    pub fn traits(&self) -> &[Trait] {
        &self.traits
    }

    pub fn has_trait(&self, kind: TraitKind) -> bool {
        self.traits.iter().any(|tr| tr.kind() == kind)
    }

    pub fn trait_by_kind(&self, kind: TraitKind) -> Option<&Trait> {
        self.traits.iter().find(|tr| tr.kind() == kind)
    }

    pub(crate) fn trait_attributes_mut(&mut self, kind: TraitKind) -> Option<&mut Attributes> {
        self.traits
            .iter_mut()
            .find(|tr| tr.kind() == kind)
            .map(Trait::attributes_mut)
    }
}
