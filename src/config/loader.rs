// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Configuration loading
//!
//! The serde_yaml edge of the compiler. A configuration file is a mapping of
//! job name to job definition (`repo`, optional `repos`, `traits`, `steps`).
//! Raw mappings are converted into typed configs here and never travel
//! further; a required key missing at any entity fails with a configuration
//! error naming the key, unknown keys are tolerated.

use std::path::Path;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::config::schema::Attributes;
use crate::errors::{JobflowError, JobflowResult};
use crate::pipeline::{repository, step, JobVariant, RepositoryReference, Step};
use crate::traits::{Trait, TraitKind};

/// Typed configuration of one job, ready for composition.
#[derive(Debug)]
pub struct JobConfig {
    pub(crate) name: String,
    pub(crate) main_repository: RepositoryReference,
    pub(crate) additional_repositories: Vec<RepositoryReference>,
    pub(crate) traits: Vec<Trait>,
    pub(crate) steps: Vec<Step>,
}

impl JobConfig {
    /// Build a typed job config from its raw mapping.
    pub fn from_raw(name: &str, raw: &Mapping) -> JobflowResult<Self> {
        let main_raw = match raw.get(&Value::from("repo")) {
            Some(Value::Mapping(mapping)) => mapping.clone(),
            Some(Value::Null) | None => {
                return Err(JobflowError::MissingAttribute {
                    entity: format!("job '{name}'"),
                    key: "repo".to_string(),
                })
            }
            Some(_) => {
                return Err(JobflowError::InvalidAttributeValue {
                    entity: format!("job '{name}'"),
                    key: "repo".to_string(),
                    reason: "expected a mapping".to_string(),
                })
            }
        };
        let main_attrs = Attributes::build(
            &format!("main repository of job '{name}'"),
            &repository::attribute_specs(),
            &main_raw,
        )?;
        let main_repository = RepositoryReference::from_attributes(&main_attrs, true)?;

        let mut additional_repositories = Vec::new();
        for repo_raw in sequence_of_mappings(name, raw, "repos")? {
            let attrs = Attributes::build(
                &format!("additional repository of job '{name}'"),
                &repository::attribute_specs(),
                &repo_raw,
            )?;
            additional_repositories.push(RepositoryReference::from_attributes(&attrs, false)?);
        }

        let mut traits = Vec::new();
        for (trait_name, trait_raw) in named_entries(name, raw, "traits")? {
            let kind = TraitKind::parse(&trait_name)?;
            traits.push(Trait::from_config(kind, name, &trait_raw)?);
        }

        let mut steps = Vec::new();
        for (step_name, step_raw) in named_entries(name, raw, "steps")? {
            let attrs = Attributes::build(
                &format!("step '{step_name}' of job '{name}'"),
                &step::attribute_specs(),
                &step_raw,
            )?;
            steps.push(Step::from_attributes(&step_name, &attrs)?);
        }

        Ok(Self {
            name: name.to_string(),
            main_repository,
            additional_repositories,
            traits,
            steps,
        })
    }
}

/// A whole configuration file: raw job definitions by name, in declaration
/// order.
pub struct PipelineConfig {
    jobs: IndexMap<String, Mapping>,
}

impl PipelineConfig {
    /// Load a configuration from a YAML file.
    pub fn from_file(path: &Path) -> JobflowResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| JobflowError::Io {
            message: format!("failed to read '{}': {}", path.display(), e),
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> JobflowResult<Self> {
        let root: Value = serde_yaml::from_str(yaml)?;
        let Value::Mapping(root) = root else {
            return Err(JobflowError::InvalidAttributeValue {
                entity: "configuration".to_string(),
                key: "<root>".to_string(),
                reason: "expected a mapping of job definitions".to_string(),
            });
        };

        let mut jobs = IndexMap::new();
        for (key, value) in root {
            let name = key
                .as_str()
                .ok_or_else(|| JobflowError::InvalidAttributeValue {
                    entity: "configuration".to_string(),
                    key: "<root>".to_string(),
                    reason: "job names must be strings".to_string(),
                })?
                .to_string();
            let raw = match value {
                Value::Mapping(mapping) => mapping,
                Value::Null => Mapping::new(),
                _ => {
                    return Err(JobflowError::InvalidAttributeValue {
                        entity: format!("job '{name}'"),
                        key: name.clone(),
                        reason: "expected a mapping".to_string(),
                    })
                }
            };
            jobs.insert(name, raw);
        }

        debug!(jobs = jobs.len(), "loaded configuration");
        Ok(Self { jobs })
    }

    /// Names of all configured jobs, in declaration order.
    pub fn job_names(&self) -> Vec<&str> {
        self.jobs.keys().map(String::as_str).collect()
    }

    /// The typed config of one job.
    pub fn job_config(&self, name: &str) -> JobflowResult<JobConfig> {
        let raw = self.jobs.get(name).ok_or_else(|| JobflowError::UnknownJob {
            name: name.to_string(),
        })?;
        JobConfig::from_raw(name, raw)
    }

    /// Compose every configured job, collecting failures instead of stopping
    /// at the first: callers report them all.
    pub fn compose_all(&self) -> CompositionReport {
        let mut report = CompositionReport::default();
        for name in self.jobs.keys() {
            let composed = self
                .job_config(name)
                .and_then(JobVariant::compose);
            match composed {
                Ok(job) => report.jobs.push(job),
                Err(error) => report.failures.push((name.clone(), error)),
            }
        }
        report
    }
}

/// Outcome of composing a whole configuration.
#[derive(Default)]
pub struct CompositionReport {
    /// Successfully composed jobs, in declaration order
    pub jobs: Vec<JobVariant>,
    /// Jobs whose composition aborted, with the error
    pub failures: Vec<(String, JobflowError)>,
}

impl CompositionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn sequence_of_mappings(job: &str, raw: &Mapping, key: &str) -> JobflowResult<Vec<Mapping>> {
    match raw.get(&Value::from(key)) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .map(|item| {
                item.as_mapping().cloned().ok_or_else(|| {
                    JobflowError::InvalidAttributeValue {
                        entity: format!("job '{job}'"),
                        key: key.to_string(),
                        reason: "expected a list of mappings".to_string(),
                    }
                })
            })
            .collect(),
        Some(_) => Err(JobflowError::InvalidAttributeValue {
            entity: format!("job '{job}'"),
            key: key.to_string(),
            reason: "expected a list of mappings".to_string(),
        }),
    }
}

/// Entries of a `name -> mapping-or-null` section, in declaration order.
fn named_entries(job: &str, raw: &Mapping, key: &str) -> JobflowResult<Vec<(String, Mapping)>> {
    let section = match raw.get(&Value::from(key)) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Mapping(mapping)) => mapping,
        Some(_) => {
            return Err(JobflowError::InvalidAttributeValue {
                entity: format!("job '{job}'"),
                key: key.to_string(),
                reason: "expected a mapping".to_string(),
            })
        }
    };

    let mut entries = Vec::new();
    for (entry_key, entry_value) in section {
        let entry_name = entry_key
            .as_str()
            .ok_or_else(|| JobflowError::InvalidAttributeValue {
                entity: format!("job '{job}'"),
                key: key.to_string(),
                reason: "entry names must be strings".to_string(),
            })?
            .to_string();
        let entry_raw = match entry_value {
            Value::Mapping(mapping) => mapping.clone(),
            Value::Null => Mapping::new(),
            _ => {
                return Err(JobflowError::InvalidAttributeValue {
                    entity: format!("job '{job}'"),
                    key: entry_name,
                    reason: "expected a mapping or null".to_string(),
                })
            }
        };
        entries.push((entry_name, entry_raw));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_repo_names_the_key() {
        let config = PipelineConfig::from_yaml("build:\n  steps:\n    compile: ~\n").unwrap();
        let err = config.job_config("build").unwrap_err();
        match err {
            JobflowError::MissingAttribute { entity, key } => {
                assert_eq!(entity, "job 'build'");
                assert_eq!(key, "repo");
            }
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_trait_rejected() {
        let yaml = "\
build:
  repo:
    path: org/widget
  traits:
    cronjob: ~
";
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert!(matches!(
            config.job_config("build"),
            Err(JobflowError::UnknownTrait { ref name }) if name == "cronjob"
        ));
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let yaml = "\
build:
  repo:
    path: org/widget
    some_future_key: 7
  steps:
    compile:
      another_future_key: [x]
";
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        config.job_config("build").unwrap();
    }

    #[test]
    fn test_compose_all_aggregates_failures() {
        let yaml = "\
good:
  repo:
    path: org/widget
  steps:
    compile: ~
broken:
  steps:
    compile: ~
also_broken:
  repo:
    path: org/widget
  steps:
    a:
      depends: [b]
    b:
      depends: [a]
";
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        let report = config.compose_all();
        assert!(!report.is_success());
        assert_eq!(report.jobs.len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].0, "broken");
        assert_eq!(report.failures[1].0, "also_broken");
    }

    #[test]
    fn test_additional_repositories_loaded() {
        let yaml = "\
build:
  repo:
    path: org/widget
  repos:
    - name: docs
      path: org/widget-docs
  steps:
    compile: ~
";
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        let job = JobVariant::compose(config.job_config("build").unwrap()).unwrap();
        assert_eq!(job.repositories().count(), 2);
        assert_eq!(job.repository("docs").map(|r| r.is_main()), Some(false));
    }

    #[test]
    fn test_job_names_preserve_declaration_order() {
        let yaml = "\
zeta:
  repo:
    path: org/zeta
alpha:
  repo:
    path: org/alpha
";
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.job_names(), vec!["zeta", "alpha"]);
    }
}
