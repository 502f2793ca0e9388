//! Basic graph statistics (§4.3 Phase 1): node/edge counts, density, and
//! degree/connectivity summaries computed directly on the raw [`Graph`] —
//! no SCC condensation, since Phase 1 works the uncollapsed graph.

use petgraph::{Direction, algo::connected_components, visit::IntoNodeIdentifiers};

use crate::graph::build::Graph;

/// Summary statistics for a dependency graph (§3 DerivedStats, non-metric
/// fields).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// `edge_count / (node_count * (node_count - 1))`; 0.0 for |V| < 2.
    pub density: f64,
    /// Number of weakly connected components (treating edges as undirected).
    pub weakly_connected_component_count: usize,
    /// Nodes with neither in-edges nor out-edges.
    pub isolated_node_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
}

impl GraphStats {
    #[must_use]
    pub fn compute(graph: &Graph) -> Self {
        let g = &graph.graph;
        let node_count = g.node_count();
        let edge_count = g.edge_count();
        let density = compute_density(node_count, edge_count);
        let weakly_connected_component_count = connected_components(g);

        let isolated_node_count = g
            .node_identifiers()
            .filter(|&idx| {
                g.neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
                    && g.neighbors_directed(idx, Direction::Outgoing)
                        .next()
                        .is_none()
            })
            .count();

        let max_in_degree = g
            .node_identifiers()
            .map(|idx| g.neighbors_directed(idx, Direction::Incoming).count())
            .max()
            .unwrap_or(0);

        let max_out_degree = g
            .node_identifiers()
            .map(|idx| g.neighbors_directed(idx, Direction::Outgoing).count())
            .max()
            .unwrap_or(0);

        Self {
            node_count,
            edge_count,
            density,
            weakly_connected_component_count,
            isolated_node_count,
            max_in_degree,
            max_out_degree,
        }
    }

    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.edge_count == 0
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
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
    fn empty_graph_stats() {
        let g = Graph::build(&[]);
        let stats = GraphStats::compute(&g);
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.edge_count, 0);
        assert!((stats.density - 0.0).abs() < f64::EPSILON);
        assert!(stats.is_flat());
    }

    #[test]
    fn single_node_no_edges() {
        let g = Graph::build(&[issue("a", &[])]);
        let stats = GraphStats::compute(&g);
        assert_eq!(stats.node_count, 1);
        assert_eq!(stats.isolated_node_count, 1);
        assert_eq!(stats.weakly_connected_component_count, 1);
    }

    #[test]
    fn density_two_node_one_edge() {
        let g = Graph::build(&[issue("a", &[]), issue("b", &["a"])]);
        let stats = GraphStats::compute(&g);
        assert!((stats.density - 0.5).abs() < 1e-10);
    }

    #[test]
    fn density_complete_directed_pair() {
        let issues = vec![issue("a", &["b"]), issue("b", &["a"])];
        let g = Graph::build(&issues);
        let stats = GraphStats::compute(&g);
        assert!((stats.density - 1.0).abs() < 1e-10);
    }

    #[test]
    fn disjoint_components_counted() {
        let issues = vec![
            issue("a", &[]),
            issue("b", &["a"]),
            issue("c", &[]),
            issue("d", &["c"]),
        ];
        let g = Graph::build(&issues);
        let stats = GraphStats::compute(&g);
        assert_eq!(stats.weakly_connected_component_count, 2);
        assert_eq!(stats.isolated_node_count, 0);
    }

    #[test]
    fn max_degree_correct() {
        // Hub: a,b,d -> c, c -> e
        let issues = vec![
            issue("a", &[]),
            issue("b", &[]),
            issue("d", &[]),
            issue("c", &["a", "b", "d"]),
            issue("e", &["c"]),
        ];
        let g = Graph::build(&issues);
        let stats = GraphStats::compute(&g);
        assert_eq!(stats.max_in_degree, 3, "c has 3 in-edges");
        assert_eq!(stats.max_out_degree, 1);
    }
}
