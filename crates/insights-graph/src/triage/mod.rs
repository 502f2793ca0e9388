//! Triage & execution plan (§4.7): rank the actionable set, partition it
//! into independent tracks, and summarize it for both a terse Quick-Ref and
//! a category-broken-out mega-triage view.

use std::collections::{HashMap, HashSet};

use insights_core::model::Issue;

use crate::graph::build::Graph;
use crate::score::impact::ImpactComponents;

pub mod actionable;
pub mod mega;
pub mod quickref;
pub mod tracks;

pub use actionable::{actionable_ids, unblocks};
pub use mega::MegaTriage;
pub use quickref::{ProjectHealth, QuickRef};
pub use tracks::Track;

/// Bonus applied to ImpactScore per issue `v` would unblock, forming the
/// triage score (§4.7: "ImpactScore(v) with a bonus proportional to
/// |unblocks(v)|"). Chosen so a handful of unblocks can outweigh a modest
/// ImpactScore gap without ever letting unblocks alone dominate priority.
const UNBLOCKS_BONUS_WEIGHT: f64 = 0.05;

/// One ranked actionable issue.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageItem {
    pub issue_id: String,
    pub priority: u8,
    pub impact_score: f64,
    pub triage_score: f64,
    pub unblocks: usize,
    pub blocker_count: usize,
    pub depth: u32,
}

/// The full triage computation: ranked actionable items, tracks, and the
/// two summary views (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub struct TriageReport {
    pub items: Vec<TriageItem>,
    pub tracks: Vec<Track>,
    pub quick_ref: QuickRef,
    pub mega: MegaTriage,
}

/// Compute the full triage report.
///
/// `impact` should already be restricted to open/in-progress issues (the
/// output of [`crate::score::impact::impact_scores`]); `critical_path_depth`
/// comes from [`crate::graph::critical_path::compute`]; `metric_status`
/// comes from the analyzer's [`crate::analyzer::DerivedStats`].
#[must_use]
pub fn compute(
    issues: &[Issue],
    graph: &Graph,
    impact: &HashMap<String, ImpactComponents>,
    critical_path_depth: &HashMap<String, u32>,
    metric_status: &HashMap<&'static str, crate::metrics::MetricStatus>,
) -> TriageReport {
    let open_ids: HashSet<String> = issues
        .iter()
        .filter(|i| i.status.is_open())
        .map(|i| i.id.clone())
        .collect();

    let actionable = actionable_ids(graph, &open_ids);

    let mut items: Vec<TriageItem> = actionable
        .iter()
        .map(|id| {
            let unblocked = unblocks(id, graph, &open_ids);
            let impact_score = impact.get(id).map_or(0.0, |c| c.score);
            let blocker_count = impact.get(id).map_or(0, |c| c.raw_blocker_count);
            let depth = critical_path_depth.get(id).copied().unwrap_or(0);
            let triage_score = (impact_score + UNBLOCKS_BONUS_WEIGHT * unblocked.len() as f64).min(1.0);
            TriageItem {
                issue_id: id.clone(),
                priority: issues
                    .iter()
                    .find(|i| &i.id == id)
                    .map_or(4, |i| i.priority),
                impact_score,
                triage_score,
                unblocks: unblocked.len(),
                blocker_count,
                depth,
            }
        })
        .collect();

    items.sort_by(|a, b| {
        b.triage_score
            .partial_cmp(&a.triage_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.issue_id.cmp(&b.issue_id))
    });

    let tracks = tracks::partition(&items, graph, &open_ids);
    let quick_ref = quickref::build(&items, issues.len(), &open_ids, metric_status);
    let mega = mega::build(&items, issues);

    TriageReport {
        items,
        tracks,
        quick_ref,
        mega,
    }
}
