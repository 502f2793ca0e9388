//! Graph construction from the loaded issue set (§4.2).
//!
//! # Overview
//!
//! Builds a [`petgraph`] directed graph whose nodes are issue ids and whose
//! edges are `blocks`-typed dependencies only. An edge `A → B` means "A
//! blocks B" — A must close before B can start.
//!
//! ## Determinism
//!
//! Nodes are added in id-sorted order and each node's outgoing edges are
//! added in id-sorted target order, so [`petgraph`]'s node/edge iteration
//! order is reproducible across runs on the same issue set — every
//! downstream metric that iterates the graph inherits that determinism for
//! free (§4.2 invariant).
//!
//! ## Cache Invalidation
//!
//! [`Graph`] does not itself hash anything — callers key caches on
//! [`insights_core::hash::DataHash`] computed from the source issues
//! instead, since the hash must reflect fields (status, priority) the
//! graph itself discards.
//!
//! ## Only Blocking Edges
//!
//! Only [`insights_core::model::DependencyType::Blocks`] edges become
//! graph edges; `related`/`parent_of`/other relations are excluded from
//! structural metrics.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use insights_core::model::Issue;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::instrument;

/// A directed dependency graph built from an issue set.
///
/// Preserves every blocking edge present in the source data, including
/// cycles — [`crate::graph::cycles`] and [`crate::graph::stats`] are
/// responsible for detecting and reporting those, not this module.
#[derive(Debug)]
pub struct Graph {
    pub graph: DiGraph<String, ()>,
    pub node_map: HashMap<String, NodeIndex>,
    /// Self-loops encountered while building (data-quality note, §3).
    pub self_loops: Vec<String>,
    /// Dependencies pointing at ids absent from the issue set (§3:
    /// "dependencies referencing unknown ids are tolerated").
    pub dangling_edges: Vec<(String, String)>,
}

impl Graph {
    /// Build a [`Graph`] from `issues`. Every issue becomes a node (even
    /// with no dependencies); only `Blocks` dependencies become edges.
    /// Duplicate edges collapse to one; self-loops are recorded but not
    /// added as graph edges (a self-loop contributes nothing structural
    /// and would otherwise poison cycle enumeration with trivial 1-cycles).
    #[instrument(skip_all, fields(issue_count = issues.len()))]
    #[must_use]
    pub fn build(issues: &[Issue]) -> Self {
        let mut sorted_ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
        sorted_ids.sort_unstable();

        let mut graph = DiGraph::<String, ()>::new();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(issues.len());
        for id in &sorted_ids {
            let idx = graph.add_node((*id).to_string());
            node_map.insert((*id).to_string(), idx);
        }

        let by_id: HashMap<&str, &Issue> = issues.iter().map(|i| (i.id.as_str(), i)).collect();

        let mut self_loops = Vec::new();
        let mut dangling_edges = Vec::new();

        for id in &sorted_ids {
            let issue = by_id[id];
            // `target` is something `id` depends on (it must finish first),
            // so `target` is the blocker and the edge runs target -> id.
            let mut targets = issue.blocking_dependency_ids();
            targets.sort_unstable();
            targets.dedup();

            for target in targets {
                if target == *id {
                    self_loops.push((*id).to_string());
                    continue;
                }
                let Some(&target_idx) = node_map.get(target) else {
                    dangling_edges.push(((*id).to_string(), target.to_string()));
                    continue;
                };
                let dependent_idx = node_map[*id];
                if !graph.contains_edge(target_idx, dependent_idx) {
                    graph.add_edge(target_idx, dependent_idx, ());
                }
            }
        }

        Self {
            graph,
            node_map,
            self_loops,
            dangling_edges,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn node_index(&self, issue_id: &str) -> Option<NodeIndex> {
        self.node_map.get(issue_id).copied()
    }

    #[must_use]
    pub fn issue_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// Node ids in sorted order — the canonical iteration order every
    /// Phase 1/2 metric uses for deterministic output.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.graph.node_weights().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_core::model::{Dependency, DependencyType, Status};

    fn issue(id: &str, blocks_on: &[&str]) -> Issue {
        Issue {
            id: id.to_string(),
            title: id.to_string(),
            status: Status::Open,
            dependencies: blocks_on
                .iter()
                .map(|t| Dependency {
                    depends_on_id: (*t).to_string(),
                    dep_type: DependencyType::Blocks,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_issue_set_produces_empty_graph() {
        let graph = Graph::build(&[]);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn issues_without_deps_are_nodes_only() {
        let issues = vec![issue("a", &[]), issue("b", &[])];
        let graph = Graph::build(&issues);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn blocking_edge_direction_is_dependency_to_dependent() {
        // b depends on (is blocked by) a => edge a -> b
        let issues = vec![issue("a", &[]), issue("b", &["a"])];
        let graph = Graph::build(&issues);
        assert_eq!(graph.edge_count(), 1);

        let a = graph.node_index("a").unwrap();
        let b = graph.node_index("b").unwrap();
        assert!(graph.graph.contains_edge(a, b));
        assert!(!graph.graph.contains_edge(b, a));
    }

    #[test]
    fn non_blocking_dependency_excluded() {
        let issues = vec![
            issue("a", &[]),
            Issue {
                id: "b".to_string(),
                title: "b".to_string(),
                status: Status::Open,
                dependencies: vec![Dependency {
                    depends_on_id: "a".to_string(),
                    dep_type: DependencyType::Related,
                }],
                ..Default::default()
            },
        ];
        let graph = Graph::build(&issues);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn duplicate_edges_collapse_to_one() {
        let mut b = issue("b", &["a"]);
        b.dependencies.push(Dependency {
            depends_on_id: "a".to_string(),
            dep_type: DependencyType::Blocks,
        });
        let issues = vec![issue("a", &[]), b];
        let graph = Graph::build(&issues);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn self_loop_recorded_and_not_added_as_edge() {
        let issues = vec![issue("a", &["a"])];
        let graph = Graph::build(&issues);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.self_loops, vec!["a".to_string()]);
    }

    #[test]
    fn dangling_dependency_recorded_and_not_added_as_edge() {
        let issues = vec![issue("a", &["ghost"])];
        let graph = Graph::build(&issues);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(
            graph.dangling_edges,
            vec![("a".to_string(), "ghost".to_string())]
        );
    }

    #[test]
    fn node_and_edge_order_is_deterministic() {
        let issues = vec![issue("z", &["a"]), issue("a", &[]), issue("m", &["a"])];
        let g1 = Graph::build(&issues);
        let mut reordered = issues.clone();
        reordered.reverse();
        let g2 = Graph::build(&reordered);

        assert_eq!(g1.sorted_ids(), g2.sorted_ids());
        assert_eq!(g1.sorted_ids(), vec!["a", "m", "z"]);
    }
}
