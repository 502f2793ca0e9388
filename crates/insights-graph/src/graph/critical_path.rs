//! Critical path depth and slack (§4.3).
//!
//! `depth(v) = 1 + max(depth(u) for u in successors(v))`, computed in
//! reverse topological order (sinks first, so every successor's depth is
//! already known by the time a node is visited). `Slack(v) = max_depth −
//! depth(v)`; zero-slack nodes lie on the longest chain.
//!
//! Undefined when the graph contains a cycle — there is no topological
//! order to walk in reverse — so callers check `cycles_present` first and
//! report the metric as skipped rather than calling [`compute`].

use std::collections::HashMap;

use crate::graph::build::Graph;

/// Per-item critical path result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriticalPathStats {
    /// `depth(v)` for every node: length of the longest chain starting at
    /// `v` and following blocking edges forward.
    pub depth: HashMap<String, u32>,
    /// `Slack(v) = max_depth - depth(v)`.
    pub slack: HashMap<String, u32>,
    /// `max(depth)` over all nodes, 0 for an empty graph.
    pub max_depth: u32,
}

/// Compute [`CriticalPathStats`] by walking `topo_order` (a valid
/// topological order of `graph`) in reverse.
///
/// # Panics
///
/// Never — but the result is meaningless if `topo_order` is not a valid
/// topological order of `graph` (e.g. one obtained while cycles are
/// present). Callers must check `cycles_present` before calling this.
#[must_use]
pub fn compute(graph: &Graph, topo_order: &[String]) -> CriticalPathStats {
    let mut depth: HashMap<String, u32> = HashMap::with_capacity(topo_order.len());

    for id in topo_order.iter().rev() {
        let Some(idx) = graph.node_index(id) else {
            continue;
        };
        let max_successor_depth = graph
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .filter_map(|succ| graph.issue_id(succ))
            .filter_map(|succ_id| depth.get(succ_id).copied())
            .max()
            .unwrap_or(0);
        depth.insert(id.clone(), 1 + max_successor_depth);
    }

    let max_depth = depth.values().copied().max().unwrap_or(0);
    let slack = depth
        .iter()
        .map(|(id, d)| (id.clone(), max_depth - d))
        .collect();

    CriticalPathStats {
        depth,
        slack,
        max_depth,
    }
}
