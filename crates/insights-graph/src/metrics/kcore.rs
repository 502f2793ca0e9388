//! k-core decomposition (§4.3) via iterative degree pruning.
//!
//! Dependencies are treated as undirected for this metric — a core is a
//! maximal subgraph in which every node has at least `k` neighbors within
//! it, regardless of blocking direction. Computed by repeatedly stripping
//! the lowest-degree node and incrementing the running `k` floor whenever
//! the minimum degree in what remains rises, matching the standard
//! Matula-Beck peeling algorithm.

use std::collections::HashMap;
use std::time::Instant;

use petgraph::visit::IntoNodeIdentifiers;

use crate::graph::build::Graph;
use crate::metrics::MetricOutcome;

/// Per-item core number: the largest `k` for which the item belongs to the
/// `k`-core.
#[must_use]
pub fn k_core(graph: &Graph, deadline: Instant) -> MetricOutcome<HashMap<String, u32>> {
    let started_at = Instant::now();
    let g = &graph.graph;

    let mut degree: HashMap<String, u32> = HashMap::with_capacity(g.node_count());
    let mut neighbors: HashMap<String, Vec<String>> = HashMap::with_capacity(g.node_count());

    for idx in g.node_identifiers() {
        let id = g[idx].clone();
        let mut adj: Vec<String> = g
            .neighbors_undirected(idx)
            .map(|n| g[n].clone())
            .collect();
        adj.sort_unstable();
        adj.dedup();
        degree.insert(id.clone(), u32::try_from(adj.len()).unwrap_or(u32::MAX));
        neighbors.insert(id, adj);
    }

    let mut core: HashMap<String, u32> = HashMap::with_capacity(degree.len());
    let mut remaining: Vec<String> = degree.keys().cloned().collect();
    remaining.sort_unstable();
    let mut removed: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut k_floor: u32 = 0;
    let mut timed_out = false;

    while removed.len() < remaining.len() {
        if Instant::now() >= deadline {
            timed_out = true;
            break;
        }

        let min_entry = remaining
            .iter()
            .filter(|id| !removed.contains(*id))
            .min_by_key(|id| (degree[*id], (*id).clone()))
            .cloned();

        let Some(v) = min_entry else { break };
        let deg_v = degree[&v];
        k_floor = k_floor.max(deg_v);
        core.insert(v.clone(), k_floor);
        removed.insert(v.clone());

        for n in &neighbors[&v] {
            if !removed.contains(n) {
                if let Some(d) = degree.get_mut(n) {
                    *d = d.saturating_sub(1);
                }
            }
        }
    }

    for id in remaining {
        if !removed.contains(&id) {
            core.entry(id).or_insert(k_floor);
        }
    }

    if timed_out {
        MetricOutcome {
            value: core,
            status: crate::metrics::MetricStatus::Timeout,
            elapsed_ms: crate::metrics::elapsed_ms(started_at),
        }
    } else {
        MetricOutcome::computed(core, started_at)
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
    fn empty_graph_has_no_cores() {
        let g = Graph::build(&[]);
        let result = k_core(&g, far_deadline());
        assert!(result.value.is_empty());
    }

    #[test]
    fn isolated_node_is_core_zero() {
        let issues = vec![issue("a", &[])];
        let g = Graph::build(&issues);
        let result = k_core(&g, far_deadline());
        assert_eq!(result.value["a"], 0);
    }

    #[test]
    fn linear_chain_is_all_core_one() {
        let issues = vec![issue("a", &[]), issue("b", &["a"]), issue("c", &["b"])];
        let g = Graph::build(&issues);
        let result = k_core(&g, far_deadline());
        assert_eq!(result.value["a"], 1);
        assert_eq!(result.value["b"], 1);
        assert_eq!(result.value["c"], 1);
    }

    #[test]
    fn triangle_is_core_two() {
        // a<->b<->c<->a as undirected, built from blocks edges a->b, b->c, c->a
        let issues = vec![
            issue("a", &[]),
            issue("b", &["a"]),
            issue("c", &["b", "a"]),
        ];
        let g = Graph::build(&issues);
        let result = k_core(&g, far_deadline());
        assert_eq!(result.value["a"], 2);
        assert_eq!(result.value["b"], 2);
        assert_eq!(result.value["c"], 2);
    }

    #[test]
    fn pendant_on_triangle_has_lower_core_than_triangle() {
        let issues = vec![
            issue("a", &[]),
            issue("b", &["a"]),
            issue("c", &["b", "a"]),
            issue("d", &["a"]),
        ];
        let g = Graph::build(&issues);
        let result = k_core(&g, far_deadline());
        assert_eq!(result.value["d"], 1, "d only touches the triangle once");
        assert_eq!(result.value["a"], 2);
    }
}
