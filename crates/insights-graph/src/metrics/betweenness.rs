//! Betweenness centrality via Brandes' algorithm (§4.3).
//!
//! For graphs over the Large/XL size tier, [`AnalysisConfig::betweenness_sample`]
//! caps the number of source nodes BFS is run from; the accumulated score is
//! scaled by `|V| / sample_size` to approximate the full result (§4.5: "Large:
//! Betweenness sampled"). Sampling picks the lexicographically first `k` ids
//! so the same issue set always samples the same sources.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use petgraph::{Direction, graph::NodeIndex, visit::IntoNodeIdentifiers};
use tracing::instrument;

use crate::config::AnalysisConfig;
use crate::graph::build::Graph;
use crate::metrics::{MetricOutcome, elapsed_ms};

/// Compute betweenness centrality for every node in `graph`.
///
/// Runs Brandes' algorithm from every node, or from a deterministic sample
/// when `config.betweenness_sample` is set, scaling the accumulated scores
/// to approximate the unsampled result. Checks `deadline` between sources
/// and returns a partial, `Approx`/`Timeout`-tagged result if it runs out
/// of time.
#[must_use]
#[instrument(skip(graph, config))]
pub fn betweenness_centrality(
    graph: &Graph,
    config: &AnalysisConfig,
    deadline: Instant,
) -> MetricOutcome<HashMap<String, f64>> {
    let started_at = Instant::now();
    let g = &graph.graph;
    let n = g.node_count();

    if n == 0 {
        return MetricOutcome::computed(HashMap::new(), started_at);
    }

    let mut sources: Vec<NodeIndex> = g.node_identifiers().collect();
    sources.sort_by_key(|&idx| g[idx].clone());

    let sampled = config
        .betweenness_sample
        .is_some_and(|sample| sample < sources.len());
    if let Some(sample) = config.betweenness_sample {
        sources.truncate(sample);
    }
    let sample_count = sources.len();

    let mut cb: HashMap<NodeIndex, f64> = HashMap::with_capacity(n);
    let mut timed_out = false;

    for &s in &sources {
        if Instant::now() >= deadline {
            timed_out = true;
            break;
        }
        accumulate_from_source(g, s, &mut cb);
    }

    let scale = if sample_count > 0 {
        n as f64 / sample_count as f64
    } else {
        1.0
    };

    let result: HashMap<String, f64> = g
        .node_identifiers()
        .map(|idx| (g[idx].clone(), cb.get(&idx).copied().unwrap_or(0.0) * scale))
        .collect();

    if timed_out {
        MetricOutcome {
            value: result,
            status: crate::metrics::MetricStatus::Approx {
                sample_size: Some(sample_count),
            },
            elapsed_ms: elapsed_ms(started_at),
        }
    } else if sampled {
        MetricOutcome::approx(result, started_at, Some(sample_count))
    } else {
        MetricOutcome::computed(result, started_at)
    }
}

fn accumulate_from_source(
    g: &petgraph::graph::DiGraph<String, ()>,
    s: NodeIndex,
    cb: &mut HashMap<NodeIndex, f64>,
) {
    let n = g.node_count();
    let mut stack: Vec<NodeIndex> = Vec::with_capacity(n);
    let mut predecessors: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
    let mut sigma: HashMap<NodeIndex, f64> = HashMap::new();
    let mut dist: HashMap<NodeIndex, i64> = HashMap::new();

    sigma.insert(s, 1.0);
    dist.insert(s, 0);

    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    queue.push_back(s);

    while let Some(v) = queue.pop_front() {
        stack.push(v);
        let dv = dist[&v];

        for w in g.neighbors_directed(v, Direction::Outgoing) {
            if !dist.contains_key(&w) {
                dist.insert(w, dv + 1);
                queue.push_back(w);
            }
            if dist[&w] == dv + 1 {
                *sigma.entry(w).or_insert(0.0) += sigma[&v];
                predecessors.entry(w).or_default().push(v);
            }
        }
    }

    let mut delta: HashMap<NodeIndex, f64> = HashMap::new();
    while let Some(w) = stack.pop() {
        let preds = predecessors.get(&w).cloned().unwrap_or_default();
        let sigma_w = sigma.get(&w).copied().unwrap_or(0.0);
        for v in preds {
            if sigma_w > 0.0 {
                let sigma_v = sigma.get(&v).copied().unwrap_or(0.0);
                let dw = delta.get(&w).copied().unwrap_or(0.0);
                *delta.entry(v).or_insert(0.0) += (sigma_v / sigma_w) * (1.0 + dw);
            }
        }
        if w != s {
            *cb.entry(w).or_insert(0.0) += delta.get(&w).copied().unwrap_or(0.0);
        }
    }
}
