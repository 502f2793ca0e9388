//! Track partitioning (§4.7): group actionable issues that share a direct
//! or transitive dependency relation within the open subgraph, via
//! union-find over undirected reachability.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;

use crate::graph::build::Graph;
use crate::triage::TriageItem;

/// One connected group of actionable issues, sorted by priority ascending
/// (P0 first), then triage score descending, then id ascending (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub items: Vec<TriageItem>,
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

/// Partition `items` (already the ranked actionable set) into tracks by
/// connectivity within the undirected open subgraph.
#[must_use]
pub fn partition(items: &[TriageItem], graph: &Graph, open_ids: &HashSet<String>) -> Vec<Track> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut open_sorted: Vec<&String> = open_ids.iter().collect();
    open_sorted.sort_unstable();
    let index_of: HashMap<&str, usize> = open_sorted
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut uf = UnionFind::new(open_sorted.len());
    for id in &open_sorted {
        let Some(idx) = graph.node_index(id) else {
            continue;
        };
        for neighbor in graph
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .chain(graph.graph.neighbors_directed(idx, Direction::Incoming))
        {
            let Some(neighbor_id) = graph.issue_id(neighbor) else {
                continue;
            };
            if !open_ids.contains(neighbor_id) {
                continue;
            }
            uf.union(index_of[id.as_str()], index_of[neighbor_id]);
        }
    }

    let mut groups: HashMap<usize, Vec<TriageItem>> = HashMap::new();
    for item in items {
        let Some(&i) = index_of.get(item.issue_id.as_str()) else {
            continue;
        };
        let root = uf.find(i);
        groups.entry(root).or_default().push(item.clone());
    }

    let mut tracks: Vec<Track> = groups
        .into_values()
        .map(|mut members| {
            members.sort_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| b.triage_score.partial_cmp(&a.triage_score).unwrap_or(std::cmp::Ordering::Equal))
                    .then_with(|| a.issue_id.cmp(&b.issue_id))
            });
            Track { items: members }
        })
        .collect();

    tracks.sort_by(|a, b| a.items[0].issue_id.cmp(&b.items[0].issue_id));
    tracks
}
