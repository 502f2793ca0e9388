//! HITS hub/authority centrality (§4.3).
//!
//! - **Hub score**: how much an item points to good authorities — a hub
//!   item blocks many important items.
//! - **Authority score**: how much an item is pointed to by good hubs —
//!   an authority is depended on by many important items.
//!
//! Iterative power method (Kleinberg, 1999): authority update sums hub
//! scores of in-neighbors, hub update sums authority scores of
//! out-neighbors, both renormalized to unit L2 length each iteration.
//!
//! Skipped on XL-tier graphs above the configured density threshold
//! (`AnalysisConfig::should_skip_hits`) — quadratic-ish iteration cost on
//! a dense graph that large isn't worth a centrality score nobody will act
//! on differently than PageRank already would.

use std::collections::HashMap;
use std::time::Instant;

use petgraph::{Direction, visit::IntoNodeIdentifiers};
use tracing::instrument;

use crate::config::AnalysisConfig;
use crate::graph::build::Graph;
use crate::graph::stats::GraphStats;
use crate::metrics::{MetricOutcome, MetricStatus, elapsed_ms};

/// Hub and authority scores for every item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitsScores {
    pub hubs: HashMap<String, f64>,
    pub authorities: HashMap<String, f64>,
}

/// Compute HITS hub/authority scores, or report [`MetricStatus::Skipped`]
/// when `config` and the graph's density call for it.
#[must_use]
#[instrument(skip(graph, config))]
pub fn hits(
    graph: &Graph,
    config: &AnalysisConfig,
    max_iter: usize,
    tolerance: f64,
    deadline: Instant,
) -> MetricOutcome<HitsScores> {
    let started_at = Instant::now();
    let density = GraphStats::compute(graph).density;

    if config.should_skip_hits(density) {
        return MetricOutcome::skipped(
            HitsScores::default(),
            format!("density {density:.4} exceeds hits_skip_density on an XL graph"),
        );
    }

    let g = &graph.graph;
    let n = g.node_count();

    if n == 0 {
        return MetricOutcome::computed(HitsScores::default(), started_at);
    }

    let mut node_ids: Vec<petgraph::graph::NodeIndex> = g.node_identifiers().collect();
    node_ids.sort_by_key(|&idx| g[idx].clone());

    let mut hub: Vec<f64> = vec![1.0; n];
    let mut auth: Vec<f64> = vec![1.0; n];

    let mut converged = false;
    let mut timed_out = false;

    for _ in 0..max_iter {
        if Instant::now() >= deadline {
            timed_out = true;
            break;
        }

        let mut new_auth = vec![0.0; n];
        for &v in &node_ids {
            let vi = v.index();
            for u in g.neighbors_directed(v, Direction::Incoming) {
                new_auth[vi] += hub[u.index()];
            }
        }

        let mut new_hub = vec![0.0; n];
        for &v in &node_ids {
            let vi = v.index();
            for w in g.neighbors_directed(v, Direction::Outgoing) {
                new_hub[vi] += new_auth[w.index()];
            }
        }

        normalize_l2(&mut new_auth);
        normalize_l2(&mut new_hub);

        let diff: f64 = auth
            .iter()
            .zip(new_auth.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt();

        auth = new_auth;
        hub = new_hub;

        if diff < tolerance {
            converged = true;
            break;
        }
    }

    let hubs: HashMap<String, f64> = node_ids
        .iter()
        .map(|&idx| (g[idx].clone(), hub[idx.index()]))
        .collect();
    let authorities: HashMap<String, f64> = node_ids
        .iter()
        .map(|&idx| (g[idx].clone(), auth[idx.index()]))
        .collect();
    let scores = HitsScores { hubs, authorities };

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

fn normalize_l2(v: &mut [f64]) {
    let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
