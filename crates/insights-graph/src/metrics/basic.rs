//! Degree centrality and source/sink identification (§4.3 Phase 1).
//!
//! Synchronous, O(|V|+|E|) metrics computed on every analysis run directly
//! on the raw [`Graph`] — cycles are not collapsed first.

use std::collections::HashMap;

use petgraph::{Direction, visit::IntoNodeIdentifiers};

use crate::graph::build::Graph;

/// Per-item degree centrality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DegreeCentrality {
    /// In-degree per item ID (how many issues block this one).
    pub in_degree: HashMap<String, usize>,
    /// Out-degree per item ID (how many issues this one blocks).
    pub out_degree: HashMap<String, usize>,
}

/// Compute in/out degree for every node in `graph`.
#[must_use]
pub fn degree_centrality(graph: &Graph) -> DegreeCentrality {
    let g = &graph.graph;
    let mut in_degree = HashMap::with_capacity(g.node_count());
    let mut out_degree = HashMap::with_capacity(g.node_count());

    for idx in g.node_identifiers() {
        let id = g[idx].clone();
        in_degree.insert(
            id.clone(),
            g.neighbors_directed(idx, Direction::Incoming).count(),
        );
        out_degree.insert(id, g.neighbors_directed(idx, Direction::Outgoing).count());
    }

    DegreeCentrality {
        in_degree,
        out_degree,
    }
}

/// Items with no incoming blocking edges — nothing blocks them.
#[must_use]
pub fn source_items(graph: &Graph) -> Vec<String> {
    let g = &graph.graph;
    let mut sources: Vec<String> = g
        .node_identifiers()
        .filter(|&idx| {
            g.neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none()
        })
        .map(|idx| g[idx].clone())
        .collect();
    sources.sort_unstable();
    sources
}

/// Items with no outgoing blocking edges — nothing depends on them.
#[must_use]
pub fn sink_items(graph: &Graph) -> Vec<String> {
    let g = &graph.graph;
    let mut sinks: Vec<String> = g
        .node_identifiers()
        .filter(|&idx| {
            g.neighbors_directed(idx, Direction::Outgoing)
                .next()
                .is_none()
        })
        .map(|idx| g[idx].clone())
        .collect();
    sinks.sort_unstable();
    sinks
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_core::model::{Dependency, DependencyType, Issue, Status};

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
    fn degree_centrality_empty_graph() {
        let g = Graph::build(&[]);
        let dc = degree_centrality(&g);
        assert!(dc.in_degree.is_empty());
    }

    #[test]
    fn degree_centrality_linear_chain() {
        let issues = vec![issue("a", &[]), issue("b", &["a"]), issue("c", &["b"])];
        let g = Graph::build(&issues);
        let dc = degree_centrality(&g);

        assert_eq!(dc.in_degree["a"], 0);
        assert_eq!(dc.out_degree["a"], 1);
        assert_eq!(dc.in_degree["b"], 1);
        assert_eq!(dc.out_degree["b"], 1);
        assert_eq!(dc.in_degree["c"], 1);
        assert_eq!(dc.out_degree["c"], 0);
    }

    #[test]
    fn degree_centrality_star_hub() {
        let issues = vec![
            issue("a", &[]),
            issue("hub", &["a"]),
            issue("b", &["hub"]),
            issue("c", &["hub"]),
        ];
        let g = Graph::build(&issues);
        let dc = degree_centrality(&g);
        assert_eq!(dc.in_degree["hub"], 1);
        assert_eq!(dc.out_degree["hub"], 2);
    }

    #[test]
    fn source_items_chain_is_only_head() {
        let issues = vec![issue("a", &[]), issue("b", &["a"]), issue("c", &["b"])];
        let g = Graph::build(&issues);
        assert_eq!(source_items(&g), vec!["a".to_string()]);
    }

    #[test]
    fn sink_items_chain_is_only_tail() {
        let issues = vec![issue("a", &[]), issue("b", &["a"]), issue("c", &["b"])];
        let g = Graph::build(&issues);
        assert_eq!(sink_items(&g), vec!["c".to_string()]);
    }

    #[test]
    fn isolated_nodes_are_both_source_and_sink() {
        let issues = vec![issue("a", &[]), issue("b", &[])];
        let g = Graph::build(&issues);
        assert_eq!(source_items(&g), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(sink_items(&g), vec!["a".to_string(), "b".to_string()]);
    }
}
