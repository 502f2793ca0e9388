//! `insights baseline save`/`show` (§6.1, §4.11): persist or display the
//! point-in-time snapshot `insights drift` compares against.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use insights_core::baseline::{Baseline, BaselineStats, TopMetricEntry, TopMetrics};
use insights_core::config::ProjectConfig;
use insights_core::error::InsightsError;
use insights_core::hash::DataHash;
use insights_core::model::Status;
use insights_graph::analyzer;
use insights_graph::graph::build::Graph;
use insights_graph::triage::actionable_ids;
use serde_json::json;

use crate::cmd::support;
use crate::output::{OutputMode, pretty_kv, pretty_section, write_sorted_json};

#[derive(Subcommand, Debug)]
pub enum BaselineAction {
    /// Compute the current graph stats and write them as the new baseline.
    Save {
        /// Free-text description stored alongside the baseline.
        #[arg(long, default_value = "")]
        description: String,
        /// Commit SHA to tag this baseline with, if known.
        #[arg(long)]
        commit_sha: Option<String>,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the currently saved baseline.
    Show,
}

#[derive(Args, Debug)]
pub struct BaselineArgs {
    #[command(subcommand)]
    pub action: BaselineAction,
}

const TOP_N: usize = 10;

pub fn run(args: &BaselineArgs, mode: OutputMode, force_full: bool) -> Result<i32> {
    let project_root = std::env::current_dir()?;
    let path = support::baseline_path(&project_root);

    match &args.action {
        BaselineAction::Save {
            description,
            commit_sha,
            input,
        } => save(&project_root, &path, description, commit_sha.as_deref(), input.as_deref(), mode, force_full),
        BaselineAction::Show => show(&path, mode),
    }
}

fn save(
    project_root: &std::path::Path,
    path: &std::path::Path,
    description: &str,
    commit_sha: Option<&str>,
    input: Option<&std::path::Path>,
    mode: OutputMode,
    force_full: bool,
) -> Result<i32> {
    let project = ProjectConfig::load(project_root);
    let issues = support::load_issues(project_root, input)?;
    let graph = Graph::build(&issues);
    let config = support::resolve_analysis_config(&issues, force_full, &project);
    let stats = analyzer::analyze_full(&graph, &issues, &config);
    let open_ids = support::open_ids(&issues);

    let open = issues.iter().filter(|i| i.status == Status::Open || i.status == Status::InProgress).count();
    let closed = issues.iter().filter(|i| i.status == Status::Closed).count();
    let blocked = issues.iter().filter(|i| i.status == Status::Blocked).count();
    let actionable = actionable_ids(&graph, &open_ids).len();

    let baseline = Baseline {
        schema_version: insights_core::baseline::SCHEMA_VERSION,
        created_at: chrono::Utc::now(),
        commit: commit_sha.map(|sha| insights_core::baseline::CommitRef {
            sha: sha.to_string(),
            summary: None,
        }),
        description: description.to_string(),
        stats: BaselineStats {
            node_count: stats.node_count,
            edge_count: stats.edge_count,
            density: stats.density,
            open,
            closed,
            blocked,
            cycle_count: stats.cycles.len(),
            actionable,
        },
        top_metrics: TopMetrics {
            pagerank: top_entries(&stats.pagerank),
            betweenness: top_entries(&stats.betweenness),
            critical_path: top_entries_u32(&stats.critical_path_score),
            hubs: top_entries(&stats.hub_score),
            authorities: top_entries(&stats.authority_score),
        },
        cycles: stats.cycles.clone(),
    };

    baseline.save(path).map_err(InsightsError::from)?;

    let envelope = json!({
        "generated_at": baseline.created_at.to_rfc3339(),
        "data_hash": DataHash::compute(&issues).as_str(),
        "baseline": serde_json::to_value(&baseline)?,
    });
    render(mode, &baseline, &envelope, "saved")?;
    Ok(0)
}

fn show(path: &std::path::Path, mode: OutputMode) -> Result<i32> {
    let baseline = Baseline::load(path).map_err(InsightsError::from)?;
    let envelope = json!({
        "generated_at": baseline.created_at.to_rfc3339(),
        "baseline": serde_json::to_value(&baseline)?,
    });
    render(mode, &baseline, &envelope, "loaded")?;
    Ok(0)
}

fn top_entries(map: &std::collections::HashMap<String, f64>) -> Vec<TopMetricEntry> {
    let mut entries: Vec<(&String, &f64)> = map.iter().collect();
    entries.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(TOP_N)
        .map(|(id, value)| TopMetricEntry {
            issue_id: id.clone(),
            value: *value,
        })
        .collect()
}

fn top_entries_u32(map: &std::collections::HashMap<String, u32>) -> Vec<TopMetricEntry> {
    let mut entries: Vec<(&String, &u32)> = map.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(TOP_N)
        .map(|(id, value)| TopMetricEntry {
            issue_id: id.clone(),
            value: f64::from(*value),
        })
        .collect()
}

fn render(mode: OutputMode, baseline: &Baseline, envelope: &serde_json::Value, verb: &str) -> Result<()> {
    let mut out = std::io::stdout();
    match mode {
        OutputMode::Json => write_sorted_json(&mut out, envelope)?,
        OutputMode::Pretty => {
            pretty_section(&mut out, &format!("Baseline {verb}"))?;
            pretty_kv(&mut out, "created_at", baseline.created_at.to_rfc3339())?;
            pretty_kv(&mut out, "nodes", baseline.stats.node_count.to_string())?;
            pretty_kv(&mut out, "edges", baseline.stats.edge_count.to_string())?;
            pretty_kv(&mut out, "cycles", baseline.stats.cycle_count.to_string())?;
            pretty_kv(&mut out, "actionable", baseline.stats.actionable.to_string())?;
        }
        OutputMode::Text => {
            use std::io::Write;
            writeln!(
                out,
                "nodes={} edges={} cycles={} actionable={}",
                baseline.stats.node_count, baseline.stats.edge_count, baseline.stats.cycle_count, baseline.stats.actionable
            )?;
        }
    }
    Ok(())
}
