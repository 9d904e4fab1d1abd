// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Configuration schemas and loading
//!
//! The attribute-schema substrate shared by all config-backed entities, and
//! the YAML loading edge that turns raw mappings into typed job configs.

mod loader;
mod schema;

pub use loader::{CompositionReport, JobConfig, PipelineConfig};
pub use schema::{deep_merge, AttributeSpec, Attributes, Expect};
