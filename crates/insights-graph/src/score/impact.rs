//! ImpactScore: the weighted composite driving priority recommendations and
//! triage ordering (§4.6).
//!
//! `ImpactScore(v) = 0.30*PageRank + 0.30*Betweenness + 0.20*BlockerRatio +
//! 0.10*Staleness + 0.10*PriorityBoost`, computed for every open or
//! in-progress issue. PageRank and betweenness are min-max normalized
//! across the whole issue set first (§4.6: "components normalized into
//! `[0,1]` across V before weighting"); the other three components are
//! already ratios in `[0, 1]`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use insights_core::model::{Issue, Status};

use crate::metrics::basic::DegreeCentrality;
use crate::score::composite::{CompositeWeights, normalize_metric, normalize_unit, weighted_sum};

const STALENESS_WINDOW_DAYS: f64 = 30.0;
const MAX_PRIORITY: f64 = 4.0;

/// Per-issue component breakdown plus the final weighted score. Carried
/// through so priority recommendations can cite which components crossed
/// their threshold without recomputing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactComponents {
    pub pagerank: f64,
    pub betweenness: f64,
    pub blocker_ratio: f64,
    pub staleness: f64,
    pub priority_boost: f64,
    pub score: f64,
    /// Raw in-degree (blocker count), kept alongside the normalized
    /// `blocker_ratio` for the `blockers > 3` reason threshold (§4.6),
    /// which is stated in absolute counts, not the normalized ratio.
    pub raw_blocker_count: usize,
    /// Raw days since `staleness_anchor`, kept alongside the normalized
    /// `staleness` for the `stale > 14 days` reason threshold.
    pub raw_staleness_days: f64,
}

/// Compute [`ImpactComponents`] for every open/in-progress issue in
/// `issues`. Blocked and closed issues are excluded (§4.6).
#[must_use]
pub fn impact_scores(
    issues: &[Issue],
    pagerank: &HashMap<String, f64>,
    betweenness: &HashMap<String, f64>,
    degree: &DegreeCentrality,
    now: DateTime<Utc>,
) -> HashMap<String, ImpactComponents> {
    impact_scores_with_weights(
        issues,
        pagerank,
        betweenness,
        degree,
        now,
        &CompositeWeights::default(),
    )
}

/// [`impact_scores`] with caller-supplied weights, used by what-if
/// recomputation and tests.
#[must_use]
pub fn impact_scores_with_weights(
    issues: &[Issue],
    pagerank: &HashMap<String, f64>,
    betweenness: &HashMap<String, f64>,
    degree: &DegreeCentrality,
    now: DateTime<Utc>,
    weights: &CompositeWeights,
) -> HashMap<String, ImpactComponents> {
    let mut ordered_ids: Vec<&str> = issues.iter().map(|i| i.id.as_str()).collect();
    ordered_ids.sort_unstable();

    let raw_pagerank: Vec<f64> = ordered_ids
        .iter()
        .map(|id| pagerank.get(*id).copied().unwrap_or(0.0))
        .collect();
    let raw_betweenness: Vec<f64> = ordered_ids
        .iter()
        .map(|id| betweenness.get(*id).copied().unwrap_or(0.0))
        .collect();
    let norm_pagerank = normalize_metric(&raw_pagerank);
    let norm_betweenness = normalize_metric(&raw_betweenness);

    let pagerank_by_id: HashMap<&str, f64> = ordered_ids
        .iter()
        .copied()
        .zip(norm_pagerank)
        .collect();
    let betweenness_by_id: HashMap<&str, f64> = ordered_ids
        .iter()
        .copied()
        .zip(norm_betweenness)
        .collect();

    let max_indegree = degree
        .in_degree
        .values()
        .copied()
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    issues
        .iter()
        .filter(|issue| matches!(issue.status, Status::Open | Status::InProgress))
        .map(|issue| {
            let pr = pagerank_by_id.get(issue.id.as_str()).copied().unwrap_or(0.0);
            let bc = betweenness_by_id
                .get(issue.id.as_str())
                .copied()
                .unwrap_or(0.0);
            let raw_blocker_count = degree.in_degree.get(&issue.id).copied().unwrap_or(0);
            let in_deg = raw_blocker_count as f64;
            let blocker_ratio = normalize_unit(in_deg / max_indegree);
            let raw_staleness_days = staleness_days(issue, now);
            let staleness = normalize_unit(raw_staleness_days / STALENESS_WINDOW_DAYS);
            let priority_boost = normalize_unit((MAX_PRIORITY - f64::from(issue.priority)) / MAX_PRIORITY);

            let score = weighted_sum([pr, bc, blocker_ratio, staleness, priority_boost], weights);

            (
                issue.id.clone(),
                ImpactComponents {
                    pagerank: pr,
                    betweenness: bc,
                    blocker_ratio,
                    staleness,
                    priority_boost,
                    score,
                    raw_blocker_count,
                    raw_staleness_days,
                },
            )
        })
        .collect()
}

fn staleness_days(issue: &Issue, now: DateTime<Utc>) -> f64 {
    let Some(anchor) = issue.staleness_anchor() else {
        return 0.0;
    };
    ((now - anchor).num_seconds() as f64 / 86_400.0).max(0.0)
}
