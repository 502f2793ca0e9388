//! Kahn's algorithm topological sort (§4.3) with lexicographic tie-breaking.
//!
//! Operates directly on the raw [`Graph`] — there is no SCC condensation
//! step. If any nodes remain un-orderable after the algorithm drains all
//! zero-indegree nodes, the graph contains a cycle and the order is `None`.

use std::collections::BinaryHeap;

use petgraph::{Direction, visit::EdgeRef};

use crate::graph::build::Graph;

/// Run Kahn's algorithm on `graph`, breaking ties between equally-ready
/// nodes by id, ascending. Returns `None` if the graph contains a cycle —
/// some nodes never reach indegree zero.
#[must_use]
pub fn topological_order(graph: &Graph) -> Option<Vec<String>> {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 {
        return Some(Vec::new());
    }

    let mut indegree: Vec<usize> = vec![0; n];
    for idx in g.node_indices() {
        indegree[idx.index()] = g.edges_directed(idx, Direction::Incoming).count();
    }

    // Reverse-ordered by id so the max-heap pops the lexicographically
    // smallest ready id first.
    let mut ready: BinaryHeap<std::cmp::Reverse<(&str, petgraph::graph::NodeIndex)>> =
        BinaryHeap::new();
    for idx in g.node_indices() {
        if indegree[idx.index()] == 0 {
            ready.push(std::cmp::Reverse((g[idx].as_str(), idx)));
        }
    }

    let mut order = Vec::with_capacity(n);

    while let Some(std::cmp::Reverse((_, idx))) = ready.pop() {
        order.push(g[idx].clone());

        for edge in g.edges_directed(idx, Direction::Outgoing) {
            let target = edge.target();
            indegree[target.index()] -= 1;
            if indegree[target.index()] == 0 {
                ready.push(std::cmp::Reverse((g[target].as_str(), target)));
            }
        }
    }

    if order.len() == n { Some(order) } else { None }
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
    fn empty_graph_orders_empty() {
        let g = Graph::build(&[]);
        assert_eq!(topological_order(&g), Some(Vec::new()));
    }

    #[test]
    fn linear_chain_orders_in_dependency_order() {
        // a -> b -> c -> d (a blocks b, b blocks c, c blocks d)
        let issues = vec![
            issue("a", &[]),
            issue("b", &["a"]),
            issue("c", &["b"]),
            issue("d", &["c"]),
        ];
        let g = Graph::build(&issues);
        assert_eq!(
            topological_order(&g),
            Some(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string()
            ])
        );
    }

    #[test]
    fn ties_broken_lexicographically() {
        // z, m, a all ready at once (no deps) — order should be a, m, z
        let issues = vec![issue("z", &[]), issue("m", &[]), issue("a", &[])];
        let g = Graph::build(&issues);
        assert_eq!(
            topological_order(&g),
            Some(vec!["a".to_string(), "m".to_string(), "z".to_string()])
        );
    }

    #[test]
    fn cycle_yields_none() {
        let issues = vec![issue("a", &["b"]), issue("b", &["a"])];
        let g = Graph::build(&issues);
        assert_eq!(topological_order(&g), None);
    }

    #[test]
    fn partial_cycle_still_yields_none() {
        // a is free-standing, b<->c cycle
        let issues = vec![issue("a", &[]), issue("b", &["c"]), issue("c", &["b"])];
        let g = Graph::build(&issues);
        assert_eq!(topological_order(&g), None);
    }
}
