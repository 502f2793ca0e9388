//! Actionable-set computation (§4.7): non-closed issues with no remaining
//! open blocking dependency, and what closing each one would unblock.

use std::collections::HashSet;

use crate::graph::build::Graph;
use crate::score::priority::{direct_unblocks, is_actionable};

/// Every non-closed issue in `open_ids` that has no open blocker, sorted by
/// id.
#[must_use]
pub fn actionable_ids(graph: &Graph, open_ids: &HashSet<String>) -> Vec<String> {
    let mut ids: Vec<String> = open_ids
        .iter()
        .filter(|id| is_actionable(id, graph, open_ids, None))
        .cloned()
        .collect();
    ids.sort_unstable();
    ids
}

/// Ids that would become actionable if `issue_id` closed (§4.7
/// `unblocks(v)`): open issues whose only remaining open blocker is `v`.
#[must_use]
pub fn unblocks(issue_id: &str, graph: &Graph, open_ids: &HashSet<String>) -> HashSet<String> {
    direct_unblocks(issue_id, graph, open_ids)
}
