// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 jobflow contributors

//! Trait-ordering resolver
//!
//! Trait transformers are authored independently but observe each other's
//! effects, so the order they run in matters. Each transformer declares
//! `dependencies` (traits that must run before it) and `order_dependencies`
//! (traits that must run after it). This module merges both constraint
//! directions into one directed graph over the active traits and computes a
//! deterministic topological order, breaking ties by declaration order.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;

use crate::errors::{JobflowError, JobflowResult};
use crate::traits::TraitTransformer;

/// Compute the processing order for the given transformers, as indices into
/// the input slice. Constraints naming inactive traits are dropped; a cycle
/// among active traits fails composition.
pub fn resolve_order(transformers: &[Box<dyn TraitTransformer>]) -> JobflowResult<Vec<usize>> {
    let index_of: HashMap<&str, usize> = transformers
        .iter()
        .enumerate()
        .map(|(idx, transformer)| (transformer.name(), idx))
        .collect();

    let mut graph = DiGraph::<usize, ()>::new();
    let nodes: Vec<_> = (0..transformers.len())
        .map(|idx| graph.add_node(idx))
        .collect();

    for (idx, transformer) in transformers.iter().enumerate() {
        for before in transformer.dependencies() {
            if let Some(&dep) = index_of.get(before) {
                graph.add_edge(nodes[dep], nodes[idx], ());
            }
        }
        for after in transformer.order_dependencies() {
            if let Some(&succ) = index_of.get(after) {
                graph.add_edge(nodes[idx], nodes[succ], ());
            }
        }
    }

    // cycles are reported with their exact membership
    for component in tarjan_scc(&graph) {
        if component.len() > 1 {
            let mut indices: Vec<usize> = component.iter().map(|node| graph[*node]).collect();
            indices.sort_unstable();
            return Err(JobflowError::TraitCycle {
                traits: indices
                    .into_iter()
                    .map(|idx| transformers[idx].name().to_string())
                    .collect(),
            });
        }
    }

    // Kahn's algorithm; among ready traits the earliest-declared runs first
    let mut indegree = vec![0usize; transformers.len()];
    for edge in graph.edge_references() {
        indegree[graph[edge.target()]] += 1;
    }

    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(idx, _)| idx)
        .collect();

    let mut order = Vec::with_capacity(transformers.len());
    while let Some(&idx) = ready.iter().next() {
        ready.remove(&idx);
        order.push(idx);
        for neighbor in graph.neighbors(nodes[idx]) {
            let succ = graph[neighbor];
            indegree[succ] -= 1;
            if indegree[succ] == 0 {
                ready.insert(succ);
            }
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::JobVariant;

    struct TestTransformer {
        name: &'static str,
        deps: &'static [&'static str],
        order_deps: &'static [&'static str],
    }

    impl TraitTransformer for TestTransformer {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process_pipeline_args(&mut self, job: JobVariant) -> JobflowResult<JobVariant> {
            Ok(job)
        }

        fn dependencies(&self) -> &'static [&'static str] {
            self.deps
        }

        fn order_dependencies(&self) -> &'static [&'static str] {
            self.order_deps
        }
    }

    fn transformers(
        specs: &'static [(&'static str, &'static [&'static str], &'static [&'static str])],
    ) -> Vec<Box<dyn TraitTransformer>> {
        specs
            .iter()
            .map(|&(name, deps, order_deps)| {
                Box::new(TestTransformer {
                    name,
                    deps,
                    order_deps,
                }) as Box<dyn TraitTransformer>
            })
            .collect()
    }

    fn names(input: &[Box<dyn TraitTransformer>], order: &[usize]) -> Vec<&'static str> {
        order.iter().map(|&idx| input[idx].name()).collect()
    }

    #[test]
    fn test_both_constraint_directions_are_honored() {
        // a must run after b; b must run before c
        let input = transformers(&[("a", &["b"], &[]), ("b", &[], &["c"]), ("c", &[], &[])]);
        let order = resolve_order(&input).unwrap();
        let order = names(&input, &order);

        let pos = |name| order.iter().position(|n| *n == name).unwrap();
        assert!(pos("b") < pos("a"));
        assert!(pos("b") < pos("c"));
    }

    #[test]
    fn test_ties_break_by_declaration_order() {
        let input = transformers(&[("x", &[], &[]), ("y", &[], &[]), ("z", &[], &[])]);
        let order = resolve_order(&input).unwrap();
        assert_eq!(names(&input, &order), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_constraint_naming_inactive_trait_is_dropped() {
        let input = transformers(&[("a", &["not-active"], &["also-missing"]), ("b", &[], &[])]);
        let order = resolve_order(&input).unwrap();
        assert_eq!(names(&input, &order), vec!["a", "b"]);
    }

    #[test]
    fn test_cycle_is_reported_with_members() {
        let input = transformers(&[
            ("a", &["b"], &[]),
            ("b", &["a"], &[]),
            ("standalone", &[], &[]),
        ]);
        let err = resolve_order(&input).unwrap_err();
        match err {
            JobflowError::TraitCycle { traits } => {
                assert_eq!(traits, vec!["a", "b"]);
            }
            other => panic!("expected TraitCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_order_dependency_can_induce_cycle() {
        // a before b (order_dependencies) but also after b (dependencies)
        let input = transformers(&[("a", &["b"], &["b"]), ("b", &[], &[])]);
        assert!(matches!(
            resolve_order(&input),
            Err(JobflowError::TraitCycle { .. })
        ));
    }
}
