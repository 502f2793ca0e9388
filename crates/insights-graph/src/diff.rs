//! Snapshot diff (§4.9): pairs two issue sets by id and classifies what
//! changed between them, plus a structural cycles delta and an overall
//! health trend.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use insights_core::model::{Dependency, Issue, Status};

use crate::graph::build::Graph;
use crate::graph::cycles;

/// Margin by which closed issues must outnumber new issues for a diff to
/// count as improving (§4.9 "closed>new by margin") — chosen so a single
/// closed-then-reopened issue can't flip the trend on its own.
const HEALTH_TREND_MARGIN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: &'static str,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedIssue {
    pub id: String,
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTrend {
    Improving,
    Degrading,
    Stable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDiff {
    pub new_ids: Vec<String>,
    pub closed_ids: Vec<String>,
    pub reopened_ids: Vec<String>,
    pub removed_ids: Vec<String>,
    pub modified: Vec<ModifiedIssue>,
    pub cycles_added: Vec<Vec<String>>,
    pub cycles_removed: Vec<Vec<String>>,
    pub health_trend: HealthTrend,
}

/// Diff two issue snapshots, `from` the earlier and `to` the later.
#[must_use]
pub fn diff(from: &[Issue], to: &[Issue]) -> SnapshotDiff {
    let from_by_id: HashMap<&str, &Issue> = from.iter().map(|i| (i.id.as_str(), i)).collect();
    let to_by_id: HashMap<&str, &Issue> = to.iter().map(|i| (i.id.as_str(), i)).collect();
    let from_ids: HashSet<&str> = from_by_id.keys().copied().collect();
    let to_ids: HashSet<&str> = to_by_id.keys().copied().collect();

    let mut new_ids: Vec<String> = to_ids.difference(&from_ids).map(|s| (*s).to_string()).collect();
    let mut removed_ids: Vec<String> = from_ids.difference(&to_ids).map(|s| (*s).to_string()).collect();
    new_ids.sort_unstable();
    removed_ids.sort_unstable();

    let mut closed_ids = Vec::new();
    let mut reopened_ids = Vec::new();
    let mut modified = Vec::new();

    let mut common: Vec<&str> = from_ids.intersection(&to_ids).copied().collect();
    common.sort_unstable();

    for id in common {
        let before = from_by_id[id];
        let after = to_by_id[id];
        let was_closed = before.status == Status::Closed;
        let is_closed = after.status == Status::Closed;

        if !was_closed && is_closed {
            closed_ids.push(id.to_string());
        } else if was_closed && !is_closed {
            reopened_ids.push(id.to_string());
        }

        let changes = field_changes(before, after);
        if !changes.is_empty() {
            modified.push(ModifiedIssue {
                id: id.to_string(),
                changes,
            });
        }
    }

    let far_deadline = Instant::now() + Duration::from_secs(30);
    let from_cycles: HashSet<Vec<String>> = cycles::enumerate_cycles(&Graph::build(from), usize::MAX, far_deadline)
        .cycles
        .into_iter()
        .collect();
    let to_cycles: HashSet<Vec<String>> = cycles::enumerate_cycles(&Graph::build(to), usize::MAX, far_deadline)
        .cycles
        .into_iter()
        .collect();

    let mut cycles_added: Vec<Vec<String>> = to_cycles.difference(&from_cycles).cloned().collect();
    let mut cycles_removed: Vec<Vec<String>> = from_cycles.difference(&to_cycles).cloned().collect();
    cycles_added.sort();
    cycles_removed.sort();

    let blocked_from = from.iter().filter(|i| i.status == Status::Blocked).count();
    let blocked_to = to.iter().filter(|i| i.status == Status::Blocked).count();

    let health_trend = if !cycles_added.is_empty() || blocked_to > blocked_from {
        HealthTrend::Degrading
    } else if closed_ids.len() > new_ids.len() + HEALTH_TREND_MARGIN {
        HealthTrend::Improving
    } else {
        HealthTrend::Stable
    };

    SnapshotDiff {
        new_ids,
        closed_ids,
        reopened_ids,
        removed_ids,
        modified,
        cycles_added,
        cycles_removed,
        health_trend,
    }
}

fn field_changes(before: &Issue, after: &Issue) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if before.title != after.title {
        changes.push(FieldChange {
            field: "title",
            from: before.title.clone(),
            to: after.title.clone(),
        });
    }
    if before.status != after.status {
        changes.push(FieldChange {
            field: "status",
            from: before.status.to_string(),
            to: after.status.to_string(),
        });
    }
    if before.priority != after.priority {
        changes.push(FieldChange {
            field: "priority",
            from: before.priority.to_string(),
            to: after.priority.to_string(),
        });
    }
    if before.assignee != after.assignee {
        changes.push(FieldChange {
            field: "assignee",
            from: before.assignee.clone().unwrap_or_default(),
            to: after.assignee.clone().unwrap_or_default(),
        });
    }
    if sorted(&before.labels) != sorted(&after.labels) {
        changes.push(FieldChange {
            field: "labels",
            from: sorted(&before.labels).join(","),
            to: sorted(&after.labels).join(","),
        });
    }
    if dependency_set(&before.dependencies) != dependency_set(&after.dependencies) {
        let mut from_deps: Vec<String> = dependency_set(&before.dependencies).into_iter().collect();
        let mut to_deps: Vec<String> = dependency_set(&after.dependencies).into_iter().collect();
        from_deps.sort_unstable();
        to_deps.sort_unstable();
        changes.push(FieldChange {
            field: "dependencies",
            from: from_deps.join(","),
            to: to_deps.join(","),
        });
    }

    changes
}

fn sorted(values: &[String]) -> Vec<String> {
    let mut v = values.to_vec();
    v.sort_unstable();
    v
}

fn dependency_set(deps: &[Dependency]) -> HashSet<String> {
    deps.iter()
        .map(|d| format!("{}:{:?}", d.depends_on_id, d.dep_type))
        .collect()
}
