//! Quick-Ref summary (§4.7): a terse top-of-triage view — three picks, a
//! short queue behind them, easy wins, the blockers worth clearing first,
//! and overall project health.

use std::collections::HashSet;

use crate::metrics::MetricStatus;
use crate::triage::TriageItem;

const TOP_PICKS: usize = 3;
const NEXT_UP: usize = 7;
/// An actionable item counts as a "quick win" when closing it is cheap:
/// few other things block on it yet, and it's not buried deep in a chain.
const QUICK_WIN_MAX_BLOCKER_COUNT: usize = 1;
const QUICK_WIN_MAX_DEPTH: u32 = 2;
const BLOCKERS_TO_CLEAR_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectHealth {
    pub open_count: usize,
    pub actionable_count: usize,
    pub metric_status: Vec<(&'static str, MetricStatus)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuickRef {
    pub top_picks: Vec<TriageItem>,
    pub next_up: Vec<TriageItem>,
    pub quick_wins: Vec<TriageItem>,
    pub blockers_to_clear: Vec<TriageItem>,
    pub project_health: ProjectHealth,
}

/// Build the Quick-Ref view from an already-ranked `items` list (triage
/// score descending, id ascending — see [`super::compute`]).
#[must_use]
pub fn build(
    items: &[TriageItem],
    open_count: usize,
    open_ids: &HashSet<String>,
    metric_status: &std::collections::HashMap<&'static str, MetricStatus>,
) -> QuickRef {
    let _ = open_ids;
    let top_picks = items.iter().take(TOP_PICKS).cloned().collect();
    let next_up = items.iter().skip(TOP_PICKS).take(NEXT_UP).cloned().collect();

    let quick_wins = items
        .iter()
        .filter(|i| i.blocker_count <= QUICK_WIN_MAX_BLOCKER_COUNT && i.depth <= QUICK_WIN_MAX_DEPTH)
        .cloned()
        .collect();

    let mut by_unblocks: Vec<TriageItem> = items.to_vec();
    by_unblocks.sort_by(|a, b| {
        b.unblocks
            .cmp(&a.unblocks)
            .then_with(|| a.issue_id.cmp(&b.issue_id))
    });
    let blockers_to_clear = by_unblocks.into_iter().take(BLOCKERS_TO_CLEAR_COUNT).collect();

    let mut status: Vec<(&'static str, MetricStatus)> = metric_status
        .iter()
        .map(|(k, v)| (*k, v.clone()))
        .collect();
    status.sort_by_key(|(k, _)| *k);

    QuickRef {
        top_picks,
        next_up,
        quick_wins,
        blockers_to_clear,
        project_health: ProjectHealth {
            open_count,
            actionable_count: items.len(),
            metric_status: status,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, score: f64, unblocks: usize, blocker_count: usize, depth: u32) -> TriageItem {
        TriageItem {
            issue_id: id.to_string(),
            priority: 2,
            impact_score: score,
            triage_score: score,
            unblocks,
            blocker_count,
            depth,
        }
    }

    #[test]
    fn top_picks_and_next_up_split_the_ranked_list() {
        let items: Vec<TriageItem> = (0..12)
            .map(|i| item(&format!("i{i}"), 1.0 - f64::from(i) * 0.01, 0, 0, 0))
            .collect();
        let quick_ref = build(&items, 12, &HashSet::new(), &std::collections::HashMap::new());
        assert_eq!(quick_ref.top_picks.len(), 3);
        assert_eq!(quick_ref.next_up.len(), 7);
        assert_eq!(quick_ref.top_picks[0].issue_id, "i0");
        assert_eq!(quick_ref.next_up[0].issue_id, "i3");
    }

    #[test]
    fn quick_wins_filters_on_blocker_count_and_depth() {
        let items = vec![
            item("easy", 0.5, 0, 0, 1),
            item("deep", 0.5, 0, 0, 5),
            item("fanned", 0.5, 0, 4, 0),
        ];
        let quick_ref = build(&items, 3, &HashSet::new(), &std::collections::HashMap::new());
        let ids: Vec<&str> = quick_ref.quick_wins.iter().map(|i| i.issue_id.as_str()).collect();
        assert_eq!(ids, vec!["easy"]);
    }

    #[test]
    fn blockers_to_clear_ranks_by_unblocks_desc() {
        let items = vec![item("a", 0.5, 1, 0, 0), item("b", 0.4, 5, 0, 0)];
        let quick_ref = build(&items, 2, &HashSet::new(), &std::collections::HashMap::new());
        assert_eq!(quick_ref.blockers_to_clear[0].issue_id, "b");
    }
}
