//! Elementary cycle enumeration (§4.4) via Johnson's algorithm.
//!
//! Self-loops are excluded entirely — [`crate::graph::build::Graph`] never
//! materializes them as edges, so they can never surface here (§3: "ignored
//! but recorded as a data-quality note" elsewhere).
//!
//! Bounded by both a cycle-count cap and a wall-clock deadline (§4.4, size
//! tiers in [`crate::config::AnalysisConfig`]); either bound reaching first
//! sets `truncated` so drift comparisons don't mistake truncation for a
//! resolved cycle.

use std::collections::HashSet;
use std::time::Instant;

use petgraph::{Direction, graph::NodeIndex};

use crate::graph::build::Graph;

/// Result of an elementary-cycle enumeration pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Each entry is one elementary cycle, normalized (§8 invariant 5):
    /// rotated so its lexicographically smallest id is first, direction
    /// preserved. Sorted by normalized key for deterministic output.
    pub cycles: Vec<Vec<String>>,
    /// Set when the cap or deadline was hit before enumeration finished —
    /// `cycles` is a partial, not exhaustive, list.
    pub truncated: bool,
}

/// Enumerate all elementary cycles in `graph`, stopping once `cap` cycles
/// have been found or `deadline` passes.
#[must_use]
pub fn enumerate_cycles(graph: &Graph, cap: usize, deadline: Instant) -> CycleReport {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 || cap == 0 {
        return CycleReport {
            cycles: Vec::new(),
            truncated: cap == 0 && n > 0,
        };
    }

    let mut johnson = Johnson {
        graph: g,
        min_index: 0,
        blocked: vec![false; n],
        block_map: vec![HashSet::new(); n],
        stack: Vec::new(),
        found_cycles: Vec::new(),
        cap,
        deadline,
        truncated: false,
    };

    for s_idx in 0..n {
        if johnson.found_cycles.len() >= cap || Instant::now() >= deadline {
            johnson.truncated = true;
            break;
        }
        johnson.min_index = s_idx;
        johnson.blocked.iter_mut().for_each(|b| *b = false);
        johnson.block_map.iter_mut().for_each(HashSet::clear);
        let s = NodeIndex::new(s_idx);
        johnson.circuit(s, s);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut cycles: Vec<Vec<String>> = Vec::new();
    for raw in &johnson.found_cycles {
        let ids: Vec<String> = raw.iter().map(|idx| g[*idx].clone()).collect();
        let normalized = normalize_cycle(&ids);
        let key = normalized.join("\u{0}");
        if seen.insert(key) {
            cycles.push(normalized);
        }
    }
    cycles.sort();

    CycleReport {
        cycles,
        truncated: johnson.truncated,
    }
}

/// Rotate `ids` so its lexicographically smallest element is first,
/// preserving cyclic order (§8 invariant 5).
fn normalize_cycle(ids: &[String]) -> Vec<String> {
    let Some(min_pos) = ids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };

    let mut rotated = Vec::with_capacity(ids.len());
    rotated.extend_from_slice(&ids[min_pos..]);
    rotated.extend_from_slice(&ids[..min_pos]);
    rotated
}

struct Johnson<'g> {
    graph: &'g petgraph::graph::DiGraph<String, ()>,
    min_index: usize,
    blocked: Vec<bool>,
    block_map: Vec<HashSet<usize>>,
    stack: Vec<NodeIndex>,
    found_cycles: Vec<Vec<NodeIndex>>,
    cap: usize,
    deadline: Instant,
    truncated: bool,
}

impl Johnson<'_> {
    fn unblock(&mut self, u: usize) {
        self.blocked[u] = false;
        let dependents: Vec<usize> = self.block_map[u].drain().collect();
        for w in dependents {
            if self.blocked[w] {
                self.unblock(w);
            }
        }
    }

    /// Returns `true` if at least one cycle through `v` back to `start` was
    /// found in the subgraph restricted to node indices `>= self.min_index`.
    fn circuit(&mut self, v: NodeIndex, start: NodeIndex) -> bool {
        if self.found_cycles.len() >= self.cap || Instant::now() >= self.deadline {
            self.truncated = true;
            return false;
        }

        let mut found = false;
        self.stack.push(v);
        self.blocked[v.index()] = true;

        let mut successors: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(v, Direction::Outgoing)
            .filter(|w| w.index() >= self.min_index)
            .collect();
        successors.sort_by_key(|n| n.index());
        successors.dedup();

        for w in successors {
            if self.found_cycles.len() >= self.cap || Instant::now() >= self.deadline {
                self.truncated = true;
                break;
            }
            if w == start {
                self.found_cycles.push(self.stack.clone());
                found = true;
            } else if !self.blocked[w.index()] && self.circuit(w, start) {
                found = true;
            }
        }

        if found {
            self.unblock(v.index());
        } else {
            for w in self
                .graph
                .neighbors_directed(v, Direction::Outgoing)
                .filter(|w| w.index() >= self.min_index)
            {
                self.block_map[w.index()].insert(v.index());
            }
        }

        self.stack.pop();
        found
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
    fn acyclic_graph_has_no_cycles() {
        let issues = vec![issue("a", &[]), issue("b", &["a"]), issue("c", &["b"])];
        let g = Graph::build(&issues);
        let report = enumerate_cycles(&g, 500, far_deadline());
        assert!(report.cycles.is_empty());
        assert!(!report.truncated);
    }

    #[test]
    fn simple_two_cycle_normalized() {
        // A -> B -> A
        let issues = vec![issue("a", &["b"]), issue("b", &["a"])];
        let g = Graph::build(&issues);
        let report = enumerate_cycles(&g, 500, far_deadline());
        assert_eq!(report.cycles, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn rotation_yields_identical_normalized_cycle() {
        // A -> B -> C -> A, starting the enumeration walk at any member
        // should produce the same normalized key.
        let issues = vec![issue("a", &["c"]), issue("b", &["a"]), issue("c", &["b"])];
        let g = Graph::build(&issues);
        let report = enumerate_cycles(&g, 500, far_deadline());
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0][0], "a");
    }

    #[test]
    fn two_independent_cycles_both_found() {
        let issues = vec![
            issue("a", &["b"]),
            issue("b", &["a"]),
            issue("c", &["d"]),
            issue("d", &["c"]),
        ];
        let g = Graph::build(&issues);
        let report = enumerate_cycles(&g, 500, far_deadline());
        assert_eq!(report.cycles.len(), 2);
        assert!(!report.truncated);
    }

    #[test]
    fn overlapping_cycles_sharing_a_node() {
        // A<->B and A<->C: two distinct 2-cycles sharing node A.
        let issues = vec![
            issue("a", &["b", "c"]),
            issue("b", &["a"]),
            issue("c", &["a"]),
        ];
        let g = Graph::build(&issues);
        let report = enumerate_cycles(&g, 500, far_deadline());
        assert_eq!(report.cycles.len(), 2);
    }

    #[test]
    fn self_loops_never_appear_as_cycles() {
        let issues = vec![issue("a", &["a"])];
        let g = Graph::build(&issues);
        let report = enumerate_cycles(&g, 500, far_deadline());
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn cap_of_zero_truncates_immediately_when_nodes_exist() {
        let issues = vec![issue("a", &["b"]), issue("b", &["a"])];
        let g = Graph::build(&issues);
        let report = enumerate_cycles(&g, 0, far_deadline());
        assert!(report.truncated);
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn past_deadline_truncates() {
        let issues = vec![issue("a", &["b"]), issue("b", &["a"])];
        let g = Graph::build(&issues);
        let report = enumerate_cycles(&g, 500, Instant::now());
        assert!(report.truncated);
    }
}
