//! Articulation point detection (§4.3) via DFS lowlink on the undirected
//! projection of the dependency graph.
//!
//! An articulation point is an issue whose removal increases the number of
//! weakly-connected components — a single point of failure in the
//! dependency structure, independent of edge direction. Standard
//! Hopcroft-Tarjan lowlink computation.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use petgraph::graph::NodeIndex;
use petgraph::visit::IntoNodeIdentifiers;

use crate::graph::build::Graph;
use crate::metrics::MetricOutcome;

struct Search<'g> {
    g: &'g petgraph::graph::DiGraph<String, ()>,
    disc: HashMap<NodeIndex, u32>,
    low: HashMap<NodeIndex, u32>,
    timer: u32,
    cut_vertices: HashSet<NodeIndex>,
    deadline: Instant,
    timed_out: bool,
}

impl<'g> Search<'g> {
    fn sorted_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.g.neighbors_undirected(node).collect();
        neighbors.sort_by_key(|&idx| self.g[idx].clone());
        neighbors
    }

    /// Returns the number of DFS-tree children of `node` (needed by the
    /// caller to apply the root's special-case cut-vertex rule).
    fn visit(&mut self, node: NodeIndex, parent: Option<NodeIndex>) -> u32 {
        if Instant::now() >= self.deadline {
            self.timed_out = true;
            return 0;
        }

        self.disc.insert(node, self.timer);
        self.low.insert(node, self.timer);
        self.timer += 1;

        let mut children = 0u32;
        for child in self.sorted_neighbors(node) {
            if Some(child) == parent {
                continue;
            }
            if let Some(&child_disc) = self.disc.get(&child) {
                let node_low = self.low[&node];
                self.low.insert(node, node_low.min(child_disc));
                continue;
            }

            children += 1;
            self.visit(child, Some(node));
            if self.timed_out {
                return children;
            }

            let child_low = self.low[&child];
            let node_low = self.low[&node];
            self.low.insert(node, node_low.min(child_low));

            let node_disc = self.disc[&node];
            if parent.is_some() && child_low >= node_disc {
                self.cut_vertices.insert(node);
            }
        }
        children
    }
}

/// Ids of every articulation point in `graph`'s undirected projection.
#[must_use]
pub fn articulation_points(graph: &Graph, deadline: Instant) -> MetricOutcome<Vec<String>> {
    let started_at = Instant::now();
    let g = &graph.graph;

    let mut search = Search {
        g,
        disc: HashMap::new(),
        low: HashMap::new(),
        timer: 0,
        cut_vertices: HashSet::new(),
        deadline,
        timed_out: false,
    };

    let mut roots: Vec<NodeIndex> = g.node_identifiers().collect();
    roots.sort_by_key(|&idx| g[idx].clone());

    for root in roots {
        if search.timed_out {
            break;
        }
        if search.disc.contains_key(&root) {
            continue;
        }
        let root_children = search.visit(root, None);
        if root_children > 1 {
            search.cut_vertices.insert(root);
        }
    }

    let mut ids: Vec<String> = search
        .cut_vertices
        .into_iter()
        .filter_map(|idx| graph.issue_id(idx))
        .map(str::to_string)
        .collect();
    ids.sort_unstable();

    if search.timed_out {
        MetricOutcome {
            value: ids,
            status: crate::metrics::MetricStatus::Timeout,
            elapsed_ms: crate::metrics::elapsed_ms(started_at),
        }
    } else {
        MetricOutcome::computed(ids, started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_core::model::{Dependency, DependencyType, Issue, Status};
    use std::time::Duration;

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

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    #[test]
    fn empty_graph_has_no_articulation_points() {
        let g = Graph::build(&[]);
        let result = articulation_points(&g, far_deadline());
        assert!(result.value.is_empty());
    }

    #[test]
    fn linear_chain_middle_nodes_are_cut_vertices() {
        let issues = vec![
            issue("a", &[]),
            issue("b", &["a"]),
            issue("c", &["b"]),
            issue("d", &["c"]),
        ];
        let g = Graph::build(&issues);
        let result = articulation_points(&g, far_deadline());
        assert_eq!(result.value, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn triangle_has_no_articulation_points() {
        let issues = vec![
            issue("a", &[]),
            issue("b", &["a"]),
            issue("c", &["b", "a"]),
        ];
        let g = Graph::build(&issues);
        let result = articulation_points(&g, far_deadline());
        assert!(result.value.is_empty());
    }

    #[test]
    fn bridge_node_between_two_triangles_is_articulation_point() {
        // triangle a-b-c, triangle c-d-e, c is the shared cut vertex.
        let issues = vec![
            issue("a", &[]),
            issue("b", &["a"]),
            issue("c", &["b", "a"]),
            issue("d", &["c"]),
            issue("e", &["d", "c"]),
        ];
        let g = Graph::build(&issues);
        let result = articulation_points(&g, far_deadline());
        assert_eq!(result.value, vec!["c".to_string()]);
    }

    #[test]
    fn star_hub_is_the_only_articulation_point() {
        let issues = vec![
            issue("hub", &[]),
            issue("a", &["hub"]),
            issue("b", &["hub"]),
            issue("c", &["hub"]),
        ];
        let g = Graph::build(&issues);
        let result = articulation_points(&g, far_deadline());
        assert_eq!(result.value, vec!["hub".to_string()]);
    }
}
