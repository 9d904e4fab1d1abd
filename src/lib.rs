// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! # jobflow - Pipeline-Definition Compiler
//!
//! `jobflow` turns declarative CI job descriptions (repositories, steps,
//! optional traits) into validated directed graphs of executable steps.
//!
//! ## Features
//!
//! - **Trait composition** - cross-cutting behaviors ("release-flavored",
//!   "reacts to pull requests") resolve into concrete synthetic steps
//! - **Deterministic ordering** - independently-authored traits merge into
//!   one graph, in a resolved, reproducible order
//! - **Structural validation** - referential integrity, acyclicity, and
//!   per-step semantic rules, checked before anything reaches a renderer
//!
//! ## Quick Start
//!
//! ```bash
//! # Validate every job in .jobflow.yaml
//! jobflow validate
//!
//! # Emit the composed graphs as JSON for the renderer
//! jobflow compile
//!
//! # Inspect one job's step graph
//! jobflow graph --job build --format mermaid
//! ```
//!
//! Composition itself is synchronous and in-memory: a job either composes
//! into a fully valid graph or composition aborts with an error.

pub mod cli;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod traits;

// Re-export commonly used types
pub use config::{CompositionReport, JobConfig, PipelineConfig};
pub use errors::{JobflowError, JobflowResult};
pub use pipeline::{DagBuilder, GraphValidator, JobVariant, Step};
pub use traits::{Trait, TraitKind, TraitTransformer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
