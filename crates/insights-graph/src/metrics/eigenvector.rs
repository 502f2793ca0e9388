//! Eigenvector centrality via power iteration on the undirected projection
//! of the dependency graph (§4.3).
//!
//! Scores a node by the scores of its neighbors: connections to
//! high-scoring nodes contribute more than connections to low-scoring
//! ones. The directed graph is a DAG in the common case, where pure
//! directed power iteration converges to all zeros, so this treats edges
//! as undirected (incoming ∪ outgoing neighbors) — the standard fix for
//! running eigenvector centrality on a DAG. Tolerance 1e-6, max 200
//! iterations (§4.5).

use std::collections::HashMap;
use std::time::Instant;

use petgraph::{Direction, graph::NodeIndex, visit::IntoNodeIdentifiers};

use crate::graph::build::Graph;
use crate::metrics::{MetricOutcome, MetricStatus, elapsed_ms};

pub const MAX_ITER: usize = 200;
pub const TOLERANCE: f64 = 1e-6;

/// Compute eigenvector centrality for every node in `graph`.
///
/// If the graph has no edges, the spectral radius is 0 and every score is
/// 0 (documented in §4.5: "if spectral radius ≈ 0, all zeros").
#[must_use]
pub fn eigenvector_centrality(graph: &Graph, deadline: Instant) -> MetricOutcome<HashMap<String, f64>> {
    let started_at = Instant::now();
    let g = &graph.graph;
    let n = g.node_count();

    if n == 0 {
        return MetricOutcome::computed(HashMap::new(), started_at);
    }

    let mut node_ids: Vec<NodeIndex> = g.node_identifiers().collect();
    node_ids.sort_by_key(|&idx| g[idx].clone());

    let neighbors: HashMap<NodeIndex, Vec<NodeIndex>> = node_ids
        .iter()
        .map(|&v| {
            let mut nbrs: Vec<NodeIndex> = g.neighbors_directed(v, Direction::Incoming).collect();
            for w in g.neighbors_directed(v, Direction::Outgoing) {
                if !nbrs.contains(&w) {
                    nbrs.push(w);
                }
            }
            (v, nbrs)
        })
        .collect();

    let init_val = 1.0 / (n as f64).sqrt();
    let mut scores: HashMap<NodeIndex, f64> = node_ids.iter().map(|&v| (v, init_val)).collect();

    let mut converged = false;
    let mut timed_out = false;

    for _ in 0..MAX_ITER {
        if Instant::now() >= deadline {
            timed_out = true;
            break;
        }

        let mut new_scores: HashMap<NodeIndex, f64> =
            node_ids.iter().map(|&v| (v, 0.0)).collect();
        for &v in &node_ids {
            let sum: f64 = neighbors[&v].iter().map(|u| scores[u]).sum();
            new_scores.insert(v, sum);
        }

        let norm: f64 = new_scores.values().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in new_scores.values_mut() {
                *x /= norm;
            }
        }

        let diff: f64 = node_ids
            .iter()
            .map(|v| (scores[v] - new_scores[v]).powi(2))
            .sum::<f64>()
            .sqrt();

        scores = new_scores;

        if diff < TOLERANCE {
            converged = true;
            break;
        }
    }

    let result: HashMap<String, f64> = node_ids
        .iter()
        .map(|&idx| (g[idx].clone(), scores[&idx]))
        .collect();

    if timed_out {
        MetricOutcome {
            value: result,
            status: MetricStatus::Timeout,
            elapsed_ms: elapsed_ms(started_at),
        }
    } else if converged {
        MetricOutcome::computed(result, started_at)
    } else {
        MetricOutcome {
            value: result,
            status: MetricStatus::Approx { sample_size: None },
            elapsed_ms: elapsed_ms(started_at),
        }
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
    fn empty_graph_returns_empty() {
        let g = Graph::build(&[]);
        let result = eigenvector_centrality(&g, far_deadline());
        assert!(result.value.is_empty());
        assert!(result.status.is_computed());
    }

    #[test]
    fn isolated_node_has_zero_score() {
        let issues = vec![issue("a", &[])];
        let g = Graph::build(&issues);
        let result = eigenvector_centrality(&g, far_deadline());
        assert_eq!(result.value["a"], 0.0);
    }

    #[test]
    fn pair_has_equal_scores() {
        let issues = vec![issue("a", &[]), issue("b", &["a"])];
        let g = Graph::build(&issues);
        let result = eigenvector_centrality(&g, far_deadline());
        assert!((result.value["a"] - result.value["b"]).abs() < 1e-6);
    }

    #[test]
    fn star_center_outscores_leaves() {
        let issues = vec![
            issue("a", &[]),
            issue("hub", &["a"]),
            issue("b", &["hub"]),
            issue("c", &["hub"]),
        ];
        let g = Graph::build(&issues);
        let result = eigenvector_centrality(&g, far_deadline());
        assert!(result.value["hub"] > result.value["a"]);
        assert!((result.value["a"] - result.value["b"]).abs() < 1e-6);
    }

    #[test]
    fn scores_are_non_negative() {
        let issues = vec![issue("a", &[]), issue("b", &["a"]), issue("c", &["a", "b"])];
        let g = Graph::build(&issues);
        let result = eigenvector_centrality(&g, far_deadline());
        for score in result.value.values() {
            assert!(*score >= 0.0);
        }
    }

    #[test]
    fn past_deadline_reports_timeout() {
        let issues = vec![issue("a", &[]), issue("b", &["a"])];
        let g = Graph::build(&issues);
        let result = eigenvector_centrality(&g, Instant::now());
        assert_eq!(result.status, MetricStatus::Timeout);
    }
}
