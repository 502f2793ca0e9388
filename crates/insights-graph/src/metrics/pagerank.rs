//! PageRank centrality (§4.3).
//!
//! Identifies items that unblock the most downstream work: items with high
//! PageRank are "important" in the dependency graph because many
//! significant chains flow through them.
//!
//! ```text
//! PR(v) = (1 - d) / N + d * Σ PR(u) / out_degree(u)   for each u → v
//! ```
//!
//! where `d` is the damping factor (default 0.85). Dangling nodes (no
//! outgoing edges) redistribute their rank uniformly across every node
//! rather than losing it, so the total stays (approximately) 1.0.

use std::collections::HashMap;
use std::time::Instant;

use petgraph::{Direction, visit::IntoNodeIdentifiers};
use tracing::instrument;

use crate::graph::build::Graph;
use crate::metrics::{MetricOutcome, MetricStatus, elapsed_ms};

/// PageRank tuning. Defaults match the documented spec values exactly.
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Probability of following an edge vs teleporting. Default 0.85.
    pub damping: f64,
    /// Stop when the L1 norm of the rank delta drops below this. Default 1e-6.
    pub tolerance: f64,
    /// Hard iteration cap. Default 100.
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iter: 100,
        }
    }
}

/// Compute PageRank over every node in `graph`, checking `deadline` between
/// iterations.
#[must_use]
#[instrument(skip(graph, config))]
pub fn pagerank(
    graph: &Graph,
    config: &PageRankConfig,
    deadline: Instant,
) -> MetricOutcome<HashMap<String, f64>> {
    let started_at = Instant::now();
    let g = &graph.graph;
    let n = g.node_count();

    if n == 0 {
        return MetricOutcome::computed(HashMap::new(), started_at);
    }

    let n_f64 = n as f64;
    let base = (1.0 - config.damping) / n_f64;

    let mut node_ids: Vec<petgraph::graph::NodeIndex> = g.node_identifiers().collect();
    node_ids.sort_by_key(|&idx| g[idx].clone());

    let mut ranks = vec![1.0 / n_f64; n];
    let mut new_ranks = vec![0.0_f64; n];

    let mut iterations = 0;
    let mut converged = false;
    let mut timed_out = false;

    for _ in 0..config.max_iter {
        if Instant::now() >= deadline {
            timed_out = true;
            break;
        }
        iterations += 1;

        for r in &mut new_ranks {
            *r = base;
        }

        for &idx in &node_ids {
            let i = idx.index();
            let out_degree = g.neighbors_directed(idx, Direction::Outgoing).count();

            if out_degree == 0 {
                let share = config.damping * ranks[i] / n_f64;
                for r in &mut new_ranks {
                    *r += share;
                }
            } else {
                let share = config.damping * ranks[i] / out_degree as f64;
                for neighbor in g.neighbors_directed(idx, Direction::Outgoing) {
                    new_ranks[neighbor.index()] += share;
                }
            }
        }

        let delta: f64 = ranks
            .iter()
            .zip(new_ranks.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut new_ranks);

        if delta < config.tolerance {
            converged = true;
            break;
        }
    }

    let scores: HashMap<String, f64> = g
        .node_identifiers()
        .map(|idx| (g[idx].clone(), ranks[idx.index()]))
        .collect();

    if timed_out {
        MetricOutcome {
            value: scores,
            status: MetricStatus::Timeout,
            elapsed_ms: elapsed_ms(started_at),
        }
    } else if converged {
        MetricOutcome::computed(scores, started_at)
    } else {
        MetricOutcome {
            value: scores,
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
    fn empty_graph_has_no_scores() {
        let g = Graph::build(&[]);
        let result = pagerank(&g, &PageRankConfig::default(), far_deadline());
        assert!(result.value.is_empty());
        assert!(result.status.is_computed());
    }

    #[test]
    fn single_node_gets_full_rank() {
        let issues = vec![issue("a", &[])];
        let g = Graph::build(&issues);
        let result = pagerank(&g, &PageRankConfig::default(), far_deadline());
        assert!((result.value["a"] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn blocker_outranks_the_issue_it_unblocks() {
        // a -> b (a blocks b): a is the source, b accumulates rank from a.
        let issues = vec![issue("a", &[]), issue("b", &["a"])];
        let g = Graph::build(&issues);
        let result = pagerank(&g, &PageRankConfig::default(), far_deadline());
        assert!(result.value["a"] > result.value["b"]);
    }

    #[test]
    fn diamond_sink_has_highest_rank() {
        let issues = vec![
            issue("a", &[]),
            issue("b", &["a"]),
            issue("c", &["a"]),
            issue("d", &["b", "c"]),
        ];
        let g = Graph::build(&issues);
        let result = pagerank(&g, &PageRankConfig::default(), far_deadline());
        assert!((result.value["b"] - result.value["c"]).abs() < 1e-10);
        assert!(result.value["a"] > result.value["d"]);
    }

    #[test]
    fn scores_sum_to_approximately_one() {
        let issues = vec![
            issue("a", &[]),
            issue("b", &["a"]),
            issue("c", &["a", "b"]),
            issue("d", &["c"]),
        ];
        let g = Graph::build(&issues);
        let result = pagerank(&g, &PageRankConfig::default(), far_deadline());
        let total: f64 = result.value.values().sum();
        assert!((total - 1.0).abs() < 1e-3, "sum was {total}");
    }

    #[test]
    fn isolated_nodes_share_rank_equally() {
        let issues = vec![issue("a", &[]), issue("b", &[]), issue("c", &[]), issue("d", &[])];
        let g = Graph::build(&issues);
        let result = pagerank(&g, &PageRankConfig::default(), far_deadline());
        for score in result.value.values() {
            assert!((score - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn past_deadline_reports_timeout() {
        let issues = vec![issue("a", &[]), issue("b", &["a"])];
        let g = Graph::build(&issues);
        let result = pagerank(&g, &PageRankConfig::default(), Instant::now());
        assert_eq!(result.status, MetricStatus::Timeout);
    }

    #[test]
    fn tight_tolerance_with_one_iteration_reports_approx() {
        let issues = vec![issue("a", &[]), issue("b", &["a"]), issue("c", &["b"])];
        let g = Graph::build(&issues);
        let config = PageRankConfig {
            max_iter: 1,
            tolerance: 1e-15,
            ..PageRankConfig::default()
        };
        let result = pagerank(&g, &config, far_deadline());
        assert_eq!(result.status, MetricStatus::Approx { sample_size: None });
    }
}
