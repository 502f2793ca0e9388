//! `insights diff` (§6.1, §4.9): compare two issue snapshots directly,
//! independent of any saved baseline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use insights_core::error::InsightsError;
use insights_core::hash::DataHash;
use insights_graph::diff::{self, FieldChange, HealthTrend, ModifiedIssue, SnapshotDiff};
use serde_json::json;

use crate::output::{OutputMode, pretty_kv, pretty_section, write_sorted_json};

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Earlier issue snapshot.
    pub from: PathBuf,
    /// Later issue snapshot.
    pub to: PathBuf,
}

pub fn run(args: &DiffArgs, mode: OutputMode) -> Result<i32> {
    let from_issues = insights_core::loader::load_file(&args.from).map_err(InsightsError::from)?.issues;
    let to_issues = insights_core::loader::load_file(&args.to).map_err(InsightsError::from)?.issues;
    let data_hash = DataHash::compute(&to_issues);

    let result = diff::diff(&from_issues, &to_issues);

    let payload = snapshot_diff_json(&result);
    let envelope = json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "data_hash": data_hash.as_str(),
        "diff": payload,
    });

    render(mode, &result, &envelope)?;
    Ok(0)
}

fn field_change_json(change: &FieldChange) -> serde_json::Value {
    json!({
        "field": change.field,
        "from": change.from,
        "to": change.to,
    })
}

fn modified_issue_json(modified: &ModifiedIssue) -> serde_json::Value {
    json!({
        "id": modified.id,
        "changes": modified.changes.iter().map(field_change_json).collect::<Vec<_>>(),
    })
}

fn health_trend_str(trend: HealthTrend) -> &'static str {
    match trend {
        HealthTrend::Improving => "improving",
        HealthTrend::Degrading => "degrading",
        HealthTrend::Stable => "stable",
    }
}

fn snapshot_diff_json(result: &SnapshotDiff) -> serde_json::Value {
    json!({
        "new_ids": result.new_ids,
        "closed_ids": result.closed_ids,
        "reopened_ids": result.reopened_ids,
        "removed_ids": result.removed_ids,
        "modified": result.modified.iter().map(modified_issue_json).collect::<Vec<_>>(),
        "cycles_added": result.cycles_added,
        "cycles_removed": result.cycles_removed,
        "health_trend": health_trend_str(result.health_trend),
    })
}

fn render(mode: OutputMode, result: &SnapshotDiff, envelope: &serde_json::Value) -> Result<()> {
    let mut out = std::io::stdout();
    match mode {
        OutputMode::Json => write_sorted_json(&mut out, envelope)?,
        OutputMode::Pretty => {
            pretty_section(&mut out, "Snapshot Diff")?;
            pretty_kv(&mut out, "new", result.new_ids.len().to_string())?;
            pretty_kv(&mut out, "closed", result.closed_ids.len().to_string())?;
            pretty_kv(&mut out, "reopened", result.reopened_ids.len().to_string())?;
            pretty_kv(&mut out, "removed", result.removed_ids.len().to_string())?;
            pretty_kv(&mut out, "modified", result.modified.len().to_string())?;
            pretty_kv(&mut out, "health_trend", health_trend_str(result.health_trend).to_string())?;
        }
        OutputMode::Text => {
            use std::io::Write;
            writeln!(
                out,
                "new={} closed={} reopened={} removed={} modified={} trend={}",
                result.new_ids.len(),
                result.closed_ids.len(),
                result.reopened_ids.len(),
                result.removed_ids.len(),
                result.modified.len(),
                health_trend_str(result.health_trend)
            )?;
        }
    }
    Ok(())
}
