//! Priority recommendations derived from [`ImpactScore`](super::impact) (§4.6).
//!
//! Bucket every open issue's `ImpactScore` into 5 quantile-equal priority
//! buckets (0 = highest urgency, 4 = lowest, matching [`Issue::priority`]'s
//! convention), compare against the issue's current priority, and emit a
//! recommendation only when confidence clears 0.30 and a clear direction
//! exists.

use std::collections::{HashMap, HashSet};

use insights_core::model::Issue;

use crate::graph::build::Graph;
use crate::score::impact::ImpactComponents;

const CONFIDENCE_THRESHOLD: f64 = 0.30;
const PAGERANK_REASON_THRESHOLD: f64 = 0.30;
const BETWEENNESS_REASON_THRESHOLD: f64 = 0.50;
const STALE_REASON_THRESHOLD_DAYS: f64 = 14.0;
const BLOCKERS_REASON_THRESHOLD: usize = 3;
const BUCKET_COUNT: usize = 5;

/// Which way a priority change is recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

/// What closing `issue_id` would unlock, used to justify urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WhatIf {
    /// Issues whose only remaining open blocker is this one.
    pub direct_unblocks: usize,
    /// Issues reachable via repeated unblocking after this one closes.
    pub transitive_unblocks: usize,
    /// Growth in the actionable-set size if this issue closed.
    pub parallelization_gain: i64,
}

/// One priority change suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityRecommendation {
    pub issue_id: String,
    pub current_priority: u8,
    pub recommended_priority: u8,
    pub direction: Direction,
    pub confidence: f64,
    /// Up to 3 component contributions that crossed their threshold,
    /// highest-magnitude first.
    pub reasons: Vec<String>,
    pub what_if: WhatIf,
}

/// Bucket `scores` (over the same issue set `impact` was computed from)
/// into 5 quantile-equal groups and map each to a priority 0-4, highest
/// score -> priority 0.
fn quantile_buckets(scores: &HashMap<String, ImpactComponents>) -> HashMap<String, u8> {
    let mut ranked: Vec<(&String, f64)> = scores.iter().map(|(id, c)| (id, c.score)).collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let n = ranked.len();
    let mut buckets = HashMap::with_capacity(n);
    for (rank, (id, _)) in ranked.into_iter().enumerate() {
        let quantile = if n <= 1 {
            0
        } else {
            (rank * BUCKET_COUNT) / n
        };
        let quantile = quantile.min(BUCKET_COUNT - 1);
        // quantile 0 = lowest score -> priority 4 (lowest urgency)
        let priority = u8::try_from(BUCKET_COUNT - 1 - quantile).unwrap_or(4);
        buckets.insert(id.clone(), priority);
    }
    buckets
}

/// Compute priority recommendations for every issue in `impact`.
#[must_use]
pub fn recommend_priorities(
    issues: &[Issue],
    impact: &HashMap<String, ImpactComponents>,
    graph: &Graph,
    open_ids: &HashSet<String>,
) -> Vec<PriorityRecommendation> {
    let buckets = quantile_buckets(impact);
    let issues_by_id: HashMap<&str, &Issue> = issues.iter().map(|i| (i.id.as_str(), i)).collect();

    let mut recommendations = Vec::new();
    let mut ids: Vec<&String> = impact.keys().collect();
    ids.sort_unstable();

    for id in ids {
        let Some(issue) = issues_by_id.get(id.as_str()) else {
            continue;
        };
        let components = &impact[id];
        let target = buckets.get(id).copied().unwrap_or(issue.priority);
        let distance = i32::from(issue.priority) - i32::from(target);

        if distance == 0 {
            continue;
        }
        let direction = if distance > 0 {
            Direction::Increase
        } else {
            Direction::Decrease
        };

        let signal_count = signal_count(components);
        let bucket_distance = distance.unsigned_abs() as f64 / (BUCKET_COUNT as f64 - 1.0);
        let confidence = (0.5 * components.score
            + 0.3 * (signal_count as f64 / 4.0)
            + 0.2 * bucket_distance)
            .clamp(0.0, 1.0);

        if confidence < CONFIDENCE_THRESHOLD {
            continue;
        }

        let reasons = reasons_for(components);
        let what_if = compute_what_if(id, graph, open_ids);

        recommendations.push(PriorityRecommendation {
            issue_id: id.clone(),
            current_priority: issue.priority,
            recommended_priority: target,
            direction,
            confidence,
            reasons,
            what_if,
        });
    }

    recommendations
}

fn signal_count(components: &ImpactComponents) -> u32 {
    let mut count = 0;
    if components.pagerank > PAGERANK_REASON_THRESHOLD {
        count += 1;
    }
    if components.betweenness > BETWEENNESS_REASON_THRESHOLD {
        count += 1;
    }
    if components.raw_staleness_days > STALE_REASON_THRESHOLD_DAYS {
        count += 1;
    }
    if components.raw_blocker_count > BLOCKERS_REASON_THRESHOLD {
        count += 1;
    }
    count
}

fn reasons_for(components: &ImpactComponents) -> Vec<String> {
    let mut candidates: Vec<(f64, String)> = Vec::new();
    if components.pagerank > PAGERANK_REASON_THRESHOLD {
        candidates.push((components.pagerank, format!("pagerank {:.2}", components.pagerank)));
    }
    if components.betweenness > BETWEENNESS_REASON_THRESHOLD {
        candidates.push((
            components.betweenness,
            format!("betweenness {:.2}", components.betweenness),
        ));
    }
    if components.raw_staleness_days > STALE_REASON_THRESHOLD_DAYS {
        candidates.push((
            components.staleness,
            format!("stale {:.0} days", components.raw_staleness_days),
        ));
    }
    if components.raw_blocker_count > BLOCKERS_REASON_THRESHOLD {
        candidates.push((
            components.blocker_ratio,
            format!("{} blockers", components.raw_blocker_count),
        ));
    }
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    candidates.into_iter().take(3).map(|(_, reason)| reason).collect()
}

fn compute_what_if(issue_id: &str, graph: &Graph, open_ids: &HashSet<String>) -> WhatIf {
    let direct_unblocks = direct_unblocks(issue_id, graph, open_ids);
    let transitive_unblocks = transitive_unblocks(issue_id, graph, open_ids);

    let before = actionable_count(graph, open_ids, None);
    let after = actionable_count(graph, open_ids, Some(issue_id));
    let parallelization_gain = i64::try_from(after).unwrap_or(i64::MAX)
        - i64::try_from(before).unwrap_or(i64::MAX);

    WhatIf {
        direct_unblocks: direct_unblocks.len(),
        transitive_unblocks,
        parallelization_gain,
    }
}

/// Ids whose only remaining open blocker is `issue_id`.
pub(crate) fn direct_unblocks(issue_id: &str, graph: &Graph, open_ids: &HashSet<String>) -> HashSet<String> {
    let mut result = HashSet::new();
    let Some(idx) = graph.node_index(issue_id) else {
        return result;
    };
    for succ in graph
        .graph
        .neighbors_directed(idx, petgraph::Direction::Outgoing)
    {
        let Some(succ_id) = graph.issue_id(succ) else {
            continue;
        };
        if !open_ids.contains(succ_id) {
            continue;
        }
        let other_open_blockers = graph
            .graph
            .neighbors_directed(succ, petgraph::Direction::Incoming)
            .filter_map(|blocker| graph.issue_id(blocker))
            .filter(|blocker_id| *blocker_id != issue_id && open_ids.contains(*blocker_id))
            .count();
        if other_open_blockers == 0 {
            result.insert(succ_id.to_string());
        }
    }
    result
}

/// Ids reachable by repeatedly unblocking starting from `issue_id`.
fn transitive_unblocks(issue_id: &str, graph: &Graph, open_ids: &HashSet<String>) -> usize {
    let mut closed: HashSet<String> = HashSet::new();
    closed.insert(issue_id.to_string());
    let mut frontier = direct_unblocks(issue_id, graph, open_ids);
    let mut total: HashSet<String> = frontier.clone();

    while !frontier.is_empty() {
        let mut next = HashSet::new();
        for id in &frontier {
            closed.insert(id.clone());
            for unblocked in direct_unblocks(id, graph, open_ids) {
                if !closed.contains(&unblocked) && total.insert(unblocked.clone()) {
                    next.insert(unblocked);
                }
            }
        }
        frontier = next;
    }

    total.len()
}

/// Whether `id` has no remaining open blocking dependency, optionally
/// pretending `closing` has already closed (§4.7 "actionable").
pub(crate) fn is_actionable(id: &str, graph: &Graph, open_ids: &HashSet<String>, closing: Option<&str>) -> bool {
    let Some(idx) = graph.node_index(id) else {
        return true;
    };
    graph
        .graph
        .neighbors_directed(idx, petgraph::Direction::Incoming)
        .filter_map(|blocker| graph.issue_id(blocker))
        .filter(|blocker_id| Some(*blocker_id) != closing)
        .all(|blocker_id| !open_ids.contains(blocker_id))
}

/// Size of the actionable set (non-closed, no open blocker), optionally
/// pretending `closing` has been closed.
fn actionable_count(graph: &Graph, open_ids: &HashSet<String>, closing: Option<&str>) -> usize {
    open_ids
        .iter()
        .filter(|id| id.as_str() != closing.unwrap_or(""))
        .filter(|id| is_actionable(id, graph, open_ids, closing))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use insights_core::model::{Dependency, DependencyType, Status};

    fn issue(id: &str, priority: u8) -> Issue {
        Issue {
            id: id.to_string(),
            title: id.to_string(),
            status: Status::Open,
            priority,
            ..Default::default()
        }
    }

    fn blocked_issue(id: &str, priority: u8, blocks_on: &[&str]) -> Issue {
        Issue {
            dependencies: blocks_on
                .iter()
                .map(|t| Dependency {
                    depends_on_id: (*t).to_string(),
                    dep_type: DependencyType::Blocks,
                })
                .collect(),
            ..issue(id, priority)
        }
    }

    #[test]
    fn quantile_buckets_map_highest_score_to_priority_zero() {
        let mut scores = HashMap::new();
        for (id, score) in [("a", 0.1), ("b", 0.5), ("c", 0.9)] {
            scores.insert(
                id.to_string(),
                ImpactComponents {
                    pagerank: 0.0,
                    betweenness: 0.0,
                    blocker_ratio: 0.0,
                    staleness: 0.0,
                    priority_boost: 0.0,
                    score,
                    raw_blocker_count: 0,
                    raw_staleness_days: 0.0,
                },
            );
        }
        let buckets = quantile_buckets(&scores);
        assert_eq!(buckets["c"], 0);
        assert_eq!(buckets["a"], 2);
    }

    #[test]
    fn no_recommendation_when_priority_already_matches_bucket() {
        let issues = vec![issue("a", 2)];
        let mut impact = HashMap::new();
        impact.insert(
            "a".to_string(),
            ImpactComponents {
                pagerank: 0.5,
                betweenness: 0.5,
                blocker_ratio: 0.5,
                staleness: 0.5,
                priority_boost: 0.5,
                score: 0.5,
                raw_blocker_count: 0,
                raw_staleness_days: 0.0,
            },
        );
        let g = Graph::build(&issues);
        let open: HashSet<String> = ["a".to_string()].into_iter().collect();
        let recs = recommend_priorities(&issues, &impact, &g, &open);
        assert!(recs.is_empty());
    }

    #[test]
    fn direct_unblocks_counts_issues_with_only_this_blocker() {
        let issues = vec![
            issue("a", 2),
            blocked_issue("b", 2, &["a"]),
            blocked_issue("c", 2, &["a", "other"]),
        ];
        let g = Graph::build(&issues);
        let open: HashSet<String> = ["a", "b", "c"].into_iter().map(String::from).collect();
        let unblocked = direct_unblocks("a", &g, &open);
        assert_eq!(unblocked, HashSet::from(["b".to_string()]));
    }

    #[test]
    fn parallelization_gain_reflects_closing_a_blocker() {
        let issues = vec![issue("a", 2), blocked_issue("b", 2, &["a"])];
        let g = Graph::build(&issues);
        let open: HashSet<String> = ["a", "b"].into_iter().map(String::from).collect();
        let before = actionable_count(&g, &open, None);
        let after = actionable_count(&g, &open, Some("a"));
        assert_eq!(before, 1, "only a is actionable before closing it");
        assert_eq!(after, 1, "b becomes actionable once a is excluded");
    }
}
