// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Error types for job composition and validation
//!
//! A job either composes into a fully valid step graph or its composition
//! aborts with one of these errors. Nothing is recovered locally; callers
//! (the CLI, or an embedding build system) aggregate failures across jobs.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for jobflow operations
pub type JobflowResult<T> = Result<T, JobflowError>;

/// Main error type for jobflow
#[derive(Error, Debug, Diagnostic)]
pub enum JobflowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("required attribute '{key}' missing in {entity}")]
    #[diagnostic(code(jobflow::missing_attribute))]
    MissingAttribute { entity: String, key: String },

    #[error("invalid value for attribute '{key}' in {entity}: {reason}")]
    #[diagnostic(code(jobflow::invalid_attribute))]
    InvalidAttributeValue {
        entity: String,
        key: String,
        reason: String,
    },

    #[error("unknown trait '{name}'")]
    #[diagnostic(
        code(jobflow::unknown_trait),
        help("known traits: version, release, publish, pull-request, component_descriptor")
    )]
    UnknownTrait { name: String },

    #[error("job '{job}' declares no main repository")]
    #[diagnostic(
        code(jobflow::missing_repository),
        help("add a 'repo' entry to the job definition")
    )]
    MissingRepository { job: String },

    #[error("job '{job}' references unknown repository '{name}'")]
    #[diagnostic(code(jobflow::unknown_repository))]
    UnknownRepository { job: String, name: String },

    #[error("duplicate step '{step}' in job '{job}'")]
    #[diagnostic(
        code(jobflow::duplicate_step),
        help("step names must be unique within a job; traits inject steps under fixed names")
    )]
    DuplicateStep { job: String, step: String },

    #[error("trait ordering cycle: {}", .traits.join(" -> "))]
    #[diagnostic(
        code(jobflow::trait_cycle),
        help("review the ordering constraints declared by the listed traits")
    )]
    TraitCycle { traits: Vec<String> },

    #[error("job '{name}' not found in configuration")]
    #[diagnostic(code(jobflow::unknown_job))]
    UnknownJob { name: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Validation Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("step '{step}': {reason}: '{reference}'")]
    #[diagnostic(
        code(jobflow::malformed_image_reference),
        help("image references use letters, digits, '.', '-', '_', '/' and ':' and must name a tag or digest")
    )]
    MalformedImageReference {
        step: String,
        reference: String,
        reason: String,
    },

    #[error("step '{step}': command token contains a NUL byte")]
    #[diagnostic(code(jobflow::unquotable_command))]
    UnquotableCommand { step: String },

    #[error("step '{step}' already declares {kind} '{slot}'")]
    #[diagnostic(code(jobflow::duplicate_slot))]
    DuplicateSlot {
        step: String,
        kind: String,
        slot: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Graph Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("step '{step}' depends on unknown step '{dependency}'")]
    #[diagnostic(
        code(jobflow::missing_dependency),
        help("check that '{dependency}' is declared in the job or injected by an active trait")
    )]
    MissingDependency { step: String, dependency: String },

    #[error("cyclic step dependency: {}", .steps.join(" -> "))]
    #[diagnostic(
        code(jobflow::cyclic_dependency),
        help("review the 'depends' entries of the listed steps")
    )]
    CyclicDependency { steps: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/Parsing Errors (config-loading edge)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(jobflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(jobflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON serialization error: {message}")]
    #[diagnostic(code(jobflow::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for JobflowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for JobflowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for JobflowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json {
            message: e.to_string(),
        }
    }
}

impl JobflowError {
    /// Create a duplicate-slot error for an input slot
    pub(crate) fn duplicate_input(step: &str, slot: &str) -> Self {
        Self::DuplicateSlot {
            step: step.to_string(),
            kind: "input".to_string(),
            slot: slot.to_string(),
        }
    }

    /// Create a duplicate-slot error for an output slot
    pub(crate) fn duplicate_output(step: &str, slot: &str) -> Self {
        Self::DuplicateSlot {
            step: step.to_string(),
            kind: "output".to_string(),
            slot: slot.to_string(),
        }
    }
}
