// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Pipeline steps
//!
//! A step is the atomic unit of work in a job: it owns input/output slots,
//! a dependency-name set, and enough declarative metadata (image reference,
//! command tokens, publish targets) for a downstream renderer to emit it.
//! Steps come from user config or are synthesized by trait transformers;
//! after validation they are immutable.

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

use crate::config::{AttributeSpec, Attributes, Expect};
use crate::errors::{JobflowError, JobflowResult};

/// Execution environment for a step's script payload.
///
/// Script payloads are hard-coded in pipeline templates; user-declared steps
/// run in a Bourne shell, synthetic steps carry the kind their trait assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptKind {
    BourneShell,
    Python3,
}

impl std::fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BourneShell => write!(f, "bourne-shell"),
            Self::Python3 => write!(f, "python3"),
        }
    }
}

/// Whether a step's outcome is reported back to pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationPolicy {
    #[default]
    NotifyPullRequests,
    NoNotification,
}

/// Attribute schema for user-declared steps.
pub(crate) fn attribute_specs() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::optional_absent("image", "container image reference", Expect::Str),
        AttributeSpec::optional_absent("registry", "registry configuration name", Expect::Str),
        AttributeSpec::optional_absent(
            "execute",
            "command to run instead of an executable named like the step",
            Expect::Any,
        ),
        AttributeSpec::optional_absent("depends", "names of steps to run before", Expect::StrList),
        AttributeSpec::optional_absent(
            "output_dir",
            "directory published to dependent steps",
            Expect::Str,
        ),
        AttributeSpec::optional_absent(
            "publish_to",
            "repositories to push resulting commits to",
            Expect::StrList,
        ),
    ]
}

/// Atomic executable unit of a pipeline job.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    name: String,
    synthetic: bool,
    script_kind: ScriptKind,
    notification_policy: NotificationPolicy,
    image: Option<String>,
    registry: Option<String>,
    execute: Option<Vec<String>>,
    output_dir: Option<String>,
    publish_to: Vec<String>,
    outputs: IndexMap<String, String>,
    inputs: IndexMap<String, String>,
    depends: BTreeSet<String>,
}

impl Step {
    /// Create a user-declared step with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            synthetic: false,
            script_kind: ScriptKind::BourneShell,
            notification_policy: NotificationPolicy::default(),
            image: None,
            registry: None,
            execute: None,
            output_dir: None,
            publish_to: Vec::new(),
            outputs: IndexMap::new(),
            inputs: IndexMap::new(),
            depends: BTreeSet::new(),
        }
    }

    /// Create a trait-injected step.
    pub fn synthetic(name: impl Into<String>, script_kind: ScriptKind) -> Self {
        let mut step = Self::new(name);
        step.synthetic = true;
        step.script_kind = script_kind;
        step
    }

    /// Build a step from its validated attribute set.
    pub(crate) fn from_attributes(name: &str, attrs: &Attributes) -> JobflowResult<Self> {
        let mut step = Self::new(name);
        step.image = attrs.str_value("image").map(String::from);
        step.registry = attrs.str_value("registry").map(String::from);

        if let Some(value) = attrs.get("execute") {
            step.execute = Some(parse_execute(attrs.entity(), value)?);
        }

        for dep in attrs.str_list("depends") {
            // a self-reference in config is a toposort-library artifact of
            // older definitions, not a semantic dependency
            if dep != step.name {
                step.depends.insert(dep);
            }
        }

        if let Some(dir) = attrs.str_value("output_dir") {
            let slot = format!("{dir}_path");
            step.output_dir = Some(dir.to_string());
            step.add_output(slot.clone(), slot)?;
        }

        step.publish_to = attrs.str_list("publish_to");
        Ok(step)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn script_kind(&self) -> ScriptKind {
        self.script_kind
    }

    pub fn notification_policy(&self) -> NotificationPolicy {
        self.notification_policy
    }

    pub fn with_notification_policy(mut self, policy: NotificationPolicy) -> Self {
        self.notification_policy = policy;
        self
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Directory this step publishes for dependents, if any.
    pub fn output_dir(&self) -> Option<String> {
        self.output_dir.as_ref().map(|dir| format!("{dir}_path"))
    }

    /// Repositories this step pushes resulting commits to.
    pub fn publish_repository_names(&self) -> &[String] {
        &self.publish_to
    }

    /// Output slots, in declaration order (slot name -> variable name).
    pub fn outputs(&self) -> &IndexMap<String, String> {
        &self.outputs
    }

    /// Input slots, in declaration order (slot name -> variable name).
    pub fn inputs(&self) -> &IndexMap<String, String> {
        &self.inputs
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    /// Declare an output slot. Fails if the slot name is already taken.
    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        variable_name: impl Into<String>,
    ) -> JobflowResult<()> {
        let name = name.into();
        if self.outputs.contains_key(&name) {
            return Err(JobflowError::duplicate_output(&self.name, &name));
        }
        self.outputs.insert(name, variable_name.into());
        Ok(())
    }

    /// Declare an input slot. Fails if the slot name is already taken.
    pub fn add_input(
        &mut self,
        name: impl Into<String>,
        variable_name: impl Into<String>,
    ) -> JobflowResult<()> {
        let name = name.into();
        if self.inputs.contains_key(&name) {
            return Err(JobflowError::duplicate_input(&self.name, &name));
        }
        self.inputs.insert(name, variable_name.into());
        Ok(())
    }

    /// A copy of the current dependency-name set.
    pub fn depends(&self) -> BTreeSet<String> {
        self.depends.clone()
    }

    /// Record a dependency on another step. Trait transformers only; user
    /// config goes through `depends`.
    pub(crate) fn add_dependency(&mut self, step_name: &str) {
        if step_name != self.name {
            self.depends.insert(step_name.to_string());
        }
    }

    /// Check step-level semantic rules. A declared image reference must use
    /// only letters, digits, '.', '-', '_', '/' and ':' and contain at least
    /// one ':'.
    pub fn validate(&self) -> JobflowResult<()> {
        if let Some(reference) = &self.image {
            let allowed =
                |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '/' | ':');
            if !reference.chars().all(allowed) {
                return Err(JobflowError::MalformedImageReference {
                    step: self.name.clone(),
                    reference: reference.clone(),
                    reason: "forbidden character in image reference".to_string(),
                });
            }
            if !reference.contains(':') {
                return Err(JobflowError::MalformedImageReference {
                    step: self.name.clone(),
                    reference: reference.clone(),
                    reason: "image reference must contain a colon".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Command tokens, each shell-quoted. Defaults to the step's own name
    /// when no explicit command is declared.
    fn quoted_argv(&self) -> JobflowResult<Vec<String>> {
        let tokens = match &self.execute {
            None => return Ok(vec![self.name.clone()]),
            Some(tokens) => tokens,
        };
        tokens
            .iter()
            .map(|token| {
                shlex::try_quote(token)
                    .map(|quoted| quoted.into_owned())
                    .map_err(|_| JobflowError::UnquotableCommand {
                        step: self.name.clone(),
                    })
            })
            .collect()
    }

    /// The executable a renderer will invoke for this step: an executable
    /// named like the step, optionally prefixed by a path.
    pub fn executable(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) if !prefix.is_empty() => {
                Path::new(prefix).join(&self.name).display().to_string()
            }
            _ => self.name.clone(),
        }
    }

    /// The full command line a renderer will emit for this step: the quoted
    /// command tokens with argv[0] replaced by the step executable. Nothing
    /// is executed here.
    pub fn execute_line(&self, prefix: Option<&str>) -> JobflowResult<String> {
        let mut argv = self.quoted_argv()?;
        argv[0] = self.executable(prefix);
        Ok(argv.join(" "))
    }
}

fn parse_execute(entity: &str, value: &Value) -> JobflowResult<Vec<String>> {
    let mismatch = || JobflowError::InvalidAttributeValue {
        entity: entity.to_string(),
        key: "execute".to_string(),
        reason: "expected a string or a list of strings".to_string(),
    };

    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Sequence(seq) => seq
            .iter()
            .map(|v| v.as_str().map(String::from).ok_or_else(mismatch))
            .collect(),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_from_yaml(name: &str, yaml: &str) -> JobflowResult<Step> {
        let raw = serde_yaml::from_str(yaml).unwrap();
        let attrs = Attributes::build(
            &format!("step '{name}'"),
            &attribute_specs(),
            &raw,
        )?;
        Step::from_attributes(name, &attrs)
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let mut step = Step::new("compile");
        step.add_output("binary", "binary_path").unwrap();
        let err = step.add_output("binary", "other_path").unwrap_err();
        assert!(matches!(
            err,
            JobflowError::DuplicateSlot { ref kind, ref slot, .. }
                if kind == "output" && slot == "binary"
        ));
        // distinct names still succeed
        step.add_output("log", "log_path").unwrap();
    }

    #[test]
    fn test_duplicate_input_rejected() {
        let mut step = Step::new("compile");
        step.add_input("version_path", "version_path").unwrap();
        assert!(step.add_input("version_path", "version_path").is_err());
        step.add_input("other", "other").unwrap();
    }

    #[test]
    fn test_image_validation() {
        let mut step = Step::new("compile");
        step.image = Some("registry.example.org/tools/build:1.2".into());
        step.validate().unwrap();

        step.image = Some("registry.example.org/tools/build".into());
        let err = step.validate().unwrap_err();
        assert!(matches!(
            err,
            JobflowError::MalformedImageReference { ref reason, .. }
                if reason.contains("colon")
        ));

        step.image = Some("registry.example.org/tools/build:1 2".into());
        let err = step.validate().unwrap_err();
        assert!(matches!(
            err,
            JobflowError::MalformedImageReference { ref reference, .. }
                if reference.contains(' ')
        ));
    }

    #[test]
    fn test_execute_line_defaults_to_step_name() {
        let step = Step::new("compile");
        assert_eq!(step.execute_line(None).unwrap(), "compile");
        assert_eq!(
            step.execute_line(Some("/opt/tools")).unwrap(),
            "/opt/tools/compile"
        );
    }

    #[test]
    fn test_execute_line_quotes_tokens_and_replaces_argv0() {
        let step = step_from_yaml(
            "compile",
            "execute:\n  - build.sh\n  - --flag\n  - value with spaces\n",
        )
        .unwrap();
        assert_eq!(
            step.execute_line(None).unwrap(),
            "compile --flag \"value with spaces\""
        );
        assert_eq!(
            step.execute_line(Some("/usr/local/bin")).unwrap(),
            "/usr/local/bin/compile --flag \"value with spaces\""
        );
    }

    #[test]
    fn test_scalar_execute_becomes_single_token() {
        let step = step_from_yaml("compile", "execute: build.sh\n").unwrap();
        assert_eq!(step.execute_line(None).unwrap(), "compile");
    }

    #[test]
    fn test_output_dir_declares_slot() {
        let step = step_from_yaml("compile", "output_dir: build_result\n").unwrap();
        assert!(step.has_output("build_result_path"));
        assert_eq!(step.output_dir(), Some("build_result_path".to_string()));
    }

    #[test]
    fn test_self_reference_in_depends_is_stripped() {
        let step = step_from_yaml("compile", "depends: [compile, lint]\n").unwrap();
        assert_eq!(step.depends(), BTreeSet::from(["lint".to_string()]));
    }

    #[test]
    fn test_depends_returns_copy() {
        let mut step = Step::new("compile");
        step.add_dependency("lint");
        let mut copy = step.depends();
        copy.insert("other".into());
        assert_eq!(step.depends().len(), 1);
    }
}
