// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Repository references
//!
//! A job tracks one main repository plus optional additional ones. Trait
//! transformers may rewrite entries during composition; the pull-request
//! trait replaces the main entry wholesale with a pull-request-flavored
//! variant of the same logical name.

use serde::Serialize;

use crate::config::{AttributeSpec, Attributes, Expect};
use crate::errors::{JobflowError, JobflowResult};

/// What a repository reference tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepositoryKind {
    /// The head of a branch
    Branch,
    /// Open pull requests against a branch
    PullRequest,
}

/// Attribute schema for repository entries.
pub(crate) fn attribute_specs() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::required("path", "repository path ('org/repo')", Expect::Str),
        AttributeSpec::optional("name", "logical name within the job", Expect::Str, "source"),
        AttributeSpec::optional("branch", "branch to track", Expect::Str, "master"),
        AttributeSpec::optional(
            "hostname",
            "host the repository lives on",
            Expect::Str,
            "github.com",
        ),
        AttributeSpec::optional_absent(
            "trigger",
            "whether changes trigger the job automatically",
            Expect::Bool,
        ),
    ]
}

/// Reference to a source repository tracked by a job.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryReference {
    logical_name: String,
    path: String,
    branch: String,
    hostname: String,
    is_main: bool,
    kind: RepositoryKind,
    trigger: bool,
    trigger_explicit: bool,
}

impl RepositoryReference {
    /// Build a branch-tracking reference from its validated attribute set.
    pub(crate) fn from_attributes(attrs: &Attributes, is_main: bool) -> JobflowResult<Self> {
        let path = attrs
            .str_value("path")
            .ok_or_else(|| JobflowError::MissingAttribute {
                entity: attrs.entity().to_string(),
                key: "path".to_string(),
            })?;

        Ok(Self {
            logical_name: attrs.str_value("name").unwrap_or("source").to_string(),
            path: path.to_string(),
            branch: attrs.str_value("branch").unwrap_or("master").to_string(),
            hostname: attrs
                .str_value("hostname")
                .unwrap_or("github.com")
                .to_string(),
            is_main,
            kind: RepositoryKind::Branch,
            trigger: attrs.bool_value("trigger").unwrap_or(true),
            trigger_explicit: attrs.contains("trigger"),
        })
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn is_main(&self) -> bool {
        self.is_main
    }

    pub fn kind(&self) -> RepositoryKind {
        self.kind
    }

    /// Whether changes to this repository trigger the job.
    pub fn triggers(&self) -> bool {
        self.trigger
    }

    /// Whether the user configured the trigger flag explicitly (traits only
    /// override the default, never an explicit user choice).
    pub fn trigger_is_explicit(&self) -> bool {
        self.trigger_explicit
    }

    pub(crate) fn set_trigger(&mut self, trigger: bool) {
        self.trigger = trigger;
    }

    /// The resource name a renderer will emit for this reference.
    pub fn resource_name(&self) -> String {
        match self.kind {
            RepositoryKind::Branch => self.logical_name.clone(),
            RepositoryKind::PullRequest => format!("{}-pr", self.logical_name),
        }
    }

    /// A pull-request-flavored variant of this reference, tracking the same
    /// logical repository.
    pub fn pull_request_variant(&self) -> Self {
        let mut variant = self.clone();
        variant.kind = RepositoryKind::PullRequest;
        variant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(yaml: &str) -> RepositoryReference {
        let raw = serde_yaml::from_str(yaml).unwrap();
        let attrs = Attributes::build("main repository", &attribute_specs(), &raw).unwrap();
        RepositoryReference::from_attributes(&attrs, true).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let repo = repo("path: org/widget");
        assert_eq!(repo.logical_name(), "source");
        assert_eq!(repo.branch(), "master");
        assert_eq!(repo.hostname(), "github.com");
        assert!(repo.triggers());
        assert!(!repo.trigger_is_explicit());
    }

    #[test]
    fn test_explicit_trigger_recorded() {
        let repo = repo("path: org/widget\ntrigger: false");
        assert!(!repo.triggers());
        assert!(repo.trigger_is_explicit());
    }

    #[test]
    fn test_pull_request_variant_keeps_logical_name() {
        let repo = repo("path: org/widget\nname: main");
        let pr = repo.pull_request_variant();
        assert_eq!(pr.logical_name(), "main");
        assert_eq!(pr.kind(), RepositoryKind::PullRequest);
        assert_eq!(pr.resource_name(), "main-pr");
        assert!(pr.is_main());
    }

    #[test]
    fn test_missing_path_is_a_configuration_error() {
        let raw = serde_yaml::from_str("branch: main").unwrap();
        let err = Attributes::build("main repository", &attribute_specs(), &raw).unwrap_err();
        assert!(matches!(
            err,
            JobflowError::MissingAttribute { ref key, .. } if key == "path"
        ));
    }
}
