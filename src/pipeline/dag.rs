// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Step dependency graphs
//!
//! Builds the directed graph over a composed job's steps, checking
//! referential integrity and acyclicity, and renders it for inspection
//! (text, DOT, Mermaid). Self-references are stripped before cycle-checking;
//! zero-dependency steps are accepted natively.

use std::collections::HashMap;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::errors::{JobflowError, JobflowResult};
use crate::pipeline::JobVariant;

/// Builder for step dependency graphs
#[derive(Debug)]
pub struct DagBuilder {
    graph: DiGraph<usize, ()>,
    names: Vec<String>,
    name_to_index: HashMap<String, NodeIndex>,
}

impl DagBuilder {
    /// Build the dependency graph of a composed job.
    ///
    /// Fails with `MissingDependency` when a step references an unregistered
    /// name and with `CyclicDependency` when the relation contains a cycle.
    pub fn build(job: &JobVariant) -> JobflowResult<Self> {
        let mut builder = Self {
            graph: DiGraph::new(),
            names: Vec::new(),
            name_to_index: HashMap::new(),
        };

        for (idx, step) in job.steps().enumerate() {
            let node = builder.graph.add_node(idx);
            builder.names.push(step.name().to_string());
            builder.name_to_index.insert(step.name().to_string(), node);
        }

        for step in job.steps() {
            let step_node = builder.name_to_index[step.name()];
            for dep_name in step.depends() {
                if dep_name == step.name() {
                    // toposort-library artifact from older definitions
                    continue;
                }
                let dep_node = builder.name_to_index.get(&dep_name).ok_or_else(|| {
                    JobflowError::MissingDependency {
                        step: step.name().to_string(),
                        dependency: dep_name.clone(),
                    }
                })?;
                builder.graph.add_edge(*dep_node, step_node, ());
            }
        }

        builder.ensure_acyclic()?;
        Ok(builder)
    }

    fn ensure_acyclic(&self) -> JobflowResult<()> {
        if toposort(&self.graph, None).is_ok() {
            return Ok(());
        }
        Err(JobflowError::CyclicDependency {
            steps: self.cycle_members(),
        })
    }

    /// Names of one strongly connected component with more than one member,
    /// in registry order.
    fn cycle_members(&self) -> Vec<String> {
        for component in tarjan_scc(&self.graph) {
            if component.len() > 1 {
                let mut indices: Vec<usize> =
                    component.iter().map(|node| self.graph[*node]).collect();
                indices.sort_unstable();
                return indices.into_iter().map(|idx| self.names[idx].clone()).collect();
            }
        }
        Vec::new()
    }

    /// Step names in a valid execution order.
    pub fn topological_order(&self) -> JobflowResult<Vec<String>> {
        toposort(&self.graph, None)
            .map(|nodes| {
                nodes
                    .into_iter()
                    .map(|node| self.names[self.graph[node]].clone())
                    .collect()
            })
            .map_err(|_| JobflowError::CyclicDependency {
                steps: self.cycle_members(),
            })
    }

    /// Direct dependencies of a step (steps that must run before it).
    pub fn dependencies(&self, step_name: &str) -> Option<Vec<String>> {
        let node = self.name_to_index.get(step_name)?;
        Some(
            self.graph
                .neighbors_directed(*node, petgraph::Direction::Incoming)
                .map(|n| self.names[self.graph[n]].clone())
                .collect(),
        )
    }

    /// Generate a Mermaid diagram of the step graph.
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");

        for name in &self.names {
            out.push_str(&format!("    {name}[{name}]\n"));
        }

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                let from_name = &self.names[self.graph[from]];
                let to_name = &self.names[self.graph[to]];
                out.push_str(&format!("    {from_name} --> {to_name}\n"));
            }
        }

        out
    }

    /// Generate a DOT diagram of the step graph.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph job {\n");
        out.push_str("    rankdir=TB;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                let from_name = &self.names[self.graph[from]];
                let to_name = &self.names[self.graph[to]];
                out.push_str(&format!("    \"{from_name}\" -> \"{to_name}\";\n"));
            }
        }

        for (name, node) in self.names.iter().zip(self.graph.node_indices()) {
            if self.graph.neighbors_undirected(node).count() == 0 {
                out.push_str(&format!("    \"{name}\";\n"));
            }
        }

        out.push_str("}\n");
        out
    }

    /// Generate a numbered text representation of the execution order.
    pub fn to_text(&self, job: &JobVariant) -> JobflowResult<String> {
        let order = self.topological_order()?;
        let mut out = String::new();

        for (i, name) in order.iter().enumerate() {
            let mut deps = self.dependencies(name).unwrap_or_default();
            deps.sort();

            out.push_str(&format!("{}. {}", i + 1, name));
            if let Some(step) = job.step(name) {
                out.push_str(&format!(" ({})", step.script_kind()));
                if step.is_synthetic() {
                    out.push_str(" [synthetic]");
                }
            }
            if !deps.is_empty() {
                out.push_str(&format!(" [depends: {}]", deps.join(", ")));
            }
            out.push('\n');
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Step;

    fn job_with(steps: Vec<(&str, Vec<&str>)>) -> JobVariant {
        let mut job = JobVariant::bare("test");
        for (name, deps) in steps {
            let mut step = Step::new(name);
            for dep in deps {
                step.add_dependency(dep);
            }
            job.add_step(step).unwrap();
        }
        job
    }

    #[test]
    fn test_linear_chain_orders_correctly() {
        let job = job_with(vec![("a", vec![]), ("b", vec!["a"]), ("c", vec!["b"])]);
        let dag = DagBuilder::build(&job).unwrap();
        assert_eq!(dag.topological_order().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diamond_orders_correctly() {
        let job = job_with(vec![
            ("a", vec![]),
            ("b", vec!["a"]),
            ("c", vec!["a"]),
            ("d", vec!["b", "c"]),
        ]);
        let dag = DagBuilder::build(&job).unwrap();
        let order = dag.topological_order().unwrap();
        assert_eq!(order[0], "a");
        assert_eq!(order[3], "d");
    }

    #[test]
    fn test_cycle_reports_members() {
        let job = job_with(vec![("a", vec!["b"]), ("b", vec!["a"]), ("c", vec![])]);
        let err = DagBuilder::build(&job).unwrap_err();
        match err {
            JobflowError::CyclicDependency { steps } => assert_eq!(steps, vec!["a", "b"]),
            other => panic!("expected CyclicDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_dependency_reported() {
        let job = job_with(vec![("a", vec!["ghost"])]);
        let err = DagBuilder::build(&job).unwrap_err();
        assert!(matches!(
            err,
            JobflowError::MissingDependency { ref dependency, .. } if dependency == "ghost"
        ));
    }

    #[test]
    fn test_zero_dependency_steps_accepted() {
        let job = job_with(vec![("lonely", vec![])]);
        let dag = DagBuilder::build(&job).unwrap();
        assert_eq!(dag.topological_order().unwrap(), vec!["lonely"]);
        assert!(dag.to_dot().contains("\"lonely\";"));
    }

    #[test]
    fn test_mermaid_output_lists_edges() {
        let job = job_with(vec![("a", vec![]), ("b", vec!["a"])]);
        let dag = DagBuilder::build(&job).unwrap();
        let mermaid = dag.to_mermaid();
        assert!(mermaid.contains("graph TD"));
        assert!(mermaid.contains("a --> b"));
    }
}
