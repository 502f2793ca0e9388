//! Shared CLI plumbing (§6): loading issues, resolving analysis config, and
//! assembling the stable output envelope every subcommand emits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use insights_core::config::{AnalysisConfig, ProjectConfig};
use insights_core::error::InsightsError;
use insights_core::hash::DataHash;
use insights_core::model::Issue;
use insights_graph::analyzer::DerivedStats;
use insights_graph::metrics::MetricStatus;
use insights_graph::triage::{MegaTriage, QuickRef, Track, TriageItem, TriageReport};
use serde_json::{Map, Value, json};
use tracing::warn;

/// Caps how many entries a per-issue map (`pagerank`, `betweenness`, ...)
/// emits, highest value first, before the `--map-limit` override applies.
pub const DEFAULT_MAP_LIMIT: usize = 50;

/// Canonical `.insights/` paths under a project root.
pub fn baseline_path(project_root: &Path) -> PathBuf {
    project_root.join(".insights").join("baseline.json")
}

pub fn drift_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".insights").join("drift.json")
}

/// Load issues from `input` if given, else discover a canonical file under
/// `project_root`. Non-fatal load warnings are logged, never surfaced as
/// an error (§7: only `InputNotFound`/`NoUsableFile` are fatal).
pub fn load_issues(project_root: &Path, input: Option<&Path>) -> Result<Vec<Issue>, InsightsError> {
    let result = match input {
        Some(path) => insights_core::loader::load_file(path)?,
        None => insights_core::loader::load(project_root)?,
    };
    for warning in &result.warnings {
        warn!(%warning, "issue load warning");
    }
    Ok(result.issues)
}

/// Resolve the [`AnalysisConfig`] for `issues`: graph-size tiering unless
/// `force_full` or the project config's `analysis.force_full` opts in.
#[must_use]
pub fn resolve_analysis_config(issues: &[Issue], force_full: bool, project: &ProjectConfig) -> AnalysisConfig {
    AnalysisConfig::for_graph(issues.len(), force_full || project.analysis.force_full)
}

#[must_use]
pub fn open_ids(issues: &[Issue]) -> std::collections::HashSet<String> {
    issues
        .iter()
        .filter(|i| i.status.is_open())
        .map(|i| i.id.clone())
        .collect()
}

/// Truncate a by-id value map to the top `limit` entries, highest value
/// first and id ascending on ties (§6 stable-ordering rule), then return
/// it as a key-sorted JSON object so the truncation survives
/// [`crate::output::write_sorted_json`] unchanged.
pub fn limit_map(map: &HashMap<String, f64>, limit: Option<usize>) -> Value {
    let mut entries: Vec<(&String, &f64)> = map.iter().collect();
    entries.sort_by(|a, b| {
        b.1.partial_cmp(a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    let mut obj = Map::new();
    for (id, value) in entries {
        obj.insert(id.clone(), json!(value));
    }
    Value::Object(obj)
}

fn limit_map_u32(map: &HashMap<String, u32>, limit: Option<usize>) -> Value {
    let as_f64: HashMap<String, f64> = map.iter().map(|(k, v)| (k.clone(), f64::from(*v))).collect();
    limit_map(&as_f64, limit)
}

fn limit_map_usize(map: &HashMap<String, usize>, limit: Option<usize>) -> Value {
    let as_f64: HashMap<String, f64> = map
        .iter()
        .map(|(k, v)| (k.clone(), *v as f64))
        .collect();
    limit_map(&as_f64, limit)
}

fn metric_status_value(status: &MetricStatus) -> Value {
    match status {
        MetricStatus::Computed => json!({"state": "computed"}),
        MetricStatus::Approx { sample_size } => json!({"state": "approx", "sample_size": sample_size}),
        MetricStatus::Timeout => json!({"state": "timeout"}),
        MetricStatus::Skipped { reason } => json!({"state": "skipped", "reason": reason}),
    }
}

/// Build the `status` map every envelope carries: one entry per Phase 2
/// metric name (§6 "status (per-metric map)").
pub fn status_map(metric_status: &HashMap<&'static str, MetricStatus>) -> Value {
    let mut obj = Map::new();
    for (name, status) in metric_status {
        obj.insert((*name).to_string(), metric_status_value(status));
    }
    Value::Object(obj)
}

/// Flatten a [`DerivedStats`] into the JSON shape the `insights` payload
/// field carries, truncating per-issue maps to `map_limit`.
pub fn derived_stats_json(stats: &DerivedStats, map_limit: Option<usize>) -> Value {
    json!({
        "node_count": stats.node_count,
        "edge_count": stats.edge_count,
        "density": stats.density,
        "topological_order": stats.topological_order,
        "cycles_present": stats.cycles_present,
        "in_degree": limit_map_usize(&stats.in_degree, map_limit),
        "out_degree": limit_map_usize(&stats.out_degree, map_limit),
        "pagerank": limit_map(&stats.pagerank, map_limit),
        "betweenness": limit_map(&stats.betweenness, map_limit),
        "eigenvector": limit_map(&stats.eigenvector, map_limit),
        "hub_score": limit_map(&stats.hub_score, map_limit),
        "authority_score": limit_map(&stats.authority_score, map_limit),
        "critical_path_score": limit_map_u32(&stats.critical_path_score, map_limit),
        "core_number": limit_map_u32(&stats.core_number, map_limit),
        "slack": limit_map_u32(&stats.slack, map_limit),
        "articulation_points": stats.articulation_points,
        "cycles": stats.cycles,
        "cycles_truncated": stats.cycles_truncated,
    })
}

/// Assemble the shared output envelope (§6): every subcommand's JSON
/// response is this object plus exactly one payload field.
#[allow(clippy::too_many_arguments)]
pub fn build_envelope(
    data_hash: &DataHash,
    config: &AnalysisConfig,
    status: Value,
    label_scope: Option<&str>,
    usage_hints: &[&str],
    payload_field: &str,
    payload: Value,
) -> Value {
    let mut obj = Map::new();
    obj.insert("generated_at".to_string(), json!(chrono::Utc::now().to_rfc3339()));
    obj.insert("data_hash".to_string(), json!(data_hash.as_str()));
    obj.insert(
        "analysis_config".to_string(),
        serde_json::to_value(config).unwrap_or(Value::Null),
    );
    obj.insert("status".to_string(), status);
    if let Some(scope) = label_scope {
        obj.insert("label_scope".to_string(), json!(scope));
    }
    obj.insert("usage_hints".to_string(), json!(usage_hints));
    obj.insert(payload_field.to_string(), payload);
    Value::Object(obj)
}

fn triage_item_json(item: &TriageItem) -> Value {
    json!({
        "issue_id": item.issue_id,
        "priority": item.priority,
        "impact_score": item.impact_score,
        "triage_score": item.triage_score,
        "unblocks": item.unblocks,
        "blocker_count": item.blocker_count,
        "depth": item.depth,
    })
}

fn track_json(track: &Track) -> Value {
    json!({
        "items": track.items.iter().map(triage_item_json).collect::<Vec<_>>(),
    })
}

fn quick_ref_json(quick_ref: &QuickRef) -> Value {
    json!({
        "top_picks": quick_ref.top_picks.iter().map(triage_item_json).collect::<Vec<_>>(),
        "next_up": quick_ref.next_up.iter().map(triage_item_json).collect::<Vec<_>>(),
        "quick_wins": quick_ref.quick_wins.iter().map(triage_item_json).collect::<Vec<_>>(),
        "blockers_to_clear": quick_ref.blockers_to_clear.iter().map(triage_item_json).collect::<Vec<_>>(),
        "project_health": {
            "open_count": quick_ref.project_health.open_count,
            "actionable_count": quick_ref.project_health.actionable_count,
            "metric_status": quick_ref.project_health.metric_status.iter().map(|(name, status)| {
                json!({"name": name, "status": metric_status_value(status)})
            }).collect::<Vec<_>>(),
        },
    })
}

fn mega_triage_json(mega: &MegaTriage) -> Value {
    let category_json = |c: &insights_graph::triage::mega::Category| {
        json!({
            "name": c.name,
            "items": c.items.iter().map(triage_item_json).collect::<Vec<_>>(),
            "commands": c.commands,
        })
    };
    json!({
        "by_type": mega.by_type.iter().map(category_json).collect::<Vec<_>>(),
        "by_label": mega.by_label.iter().map(category_json).collect::<Vec<_>>(),
        "highest_impact": mega.highest_impact.as_ref().map(triage_item_json),
    })
}

/// Flatten a [`TriageReport`] into the JSON shape the `triage` payload
/// field carries.
pub fn triage_report_json(report: &TriageReport) -> Value {
    json!({
        "items": report.items.iter().map(triage_item_json).collect::<Vec<_>>(),
        "tracks": report.tracks.iter().map(track_json).collect::<Vec<_>>(),
        "quick_ref": quick_ref_json(&report.quick_ref),
        "mega": mega_triage_json(&report.mega),
    })
}

/// `map_limit` CLI override layered over the project config's default.
#[must_use]
pub fn resolve_map_limit(flag: Option<usize>, project: &ProjectConfig) -> Option<usize> {
    flag.or(project.analysis.map_limit).or(Some(DEFAULT_MAP_LIMIT))
}
