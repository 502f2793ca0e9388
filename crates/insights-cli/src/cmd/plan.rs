//! `insights plan` (§6.1, §4.7): the execution plan, i.e. the same track
//! partitioning `triage` computes, optionally focused on one issue's track.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use insights_core::config::ProjectConfig;
use insights_core::hash::DataHash;
use insights_core::model::{Issue, Status};
use insights_graph::analyzer;
use insights_graph::graph::build::Graph;
use insights_graph::metrics::basic;
use insights_graph::score::impact;
use insights_graph::triage;
use serde_json::json;

use crate::cmd::support;
use crate::output::{OutputMode, pretty_kv, pretty_section, write_sorted_json};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Explicit path to an issue JSONL file, bypassing discovery.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Restrict the plan to the track containing this issue.
    #[arg(long)]
    pub focus: Option<String>,
}

pub fn run(args: &PlanArgs, mode: OutputMode, force_full: bool, map_limit: Option<usize>) -> Result<i32> {
    let project_root = std::env::current_dir()?;
    let project = ProjectConfig::load(&project_root);
    let issues = support::load_issues(&project_root, args.input.as_deref())?;
    let graph = Graph::build(&issues);
    let config = support::resolve_analysis_config(&issues, force_full, &project);
    let data_hash = DataHash::compute(&issues);

    let stats = analyzer::analyze_full(&graph, &issues, &config);
    let degree = basic::degree_centrality(&graph);
    let now = chrono::Utc::now();

    let scoring_scope: Vec<Issue> = issues
        .iter()
        .filter(|i| matches!(i.status, Status::Open | Status::InProgress))
        .cloned()
        .collect();
    let impact_scores = impact::impact_scores(&scoring_scope, &stats.pagerank, &stats.betweenness, &degree, now);

    let report = triage::compute(
        &issues,
        &graph,
        &impact_scores,
        &stats.critical_path_score,
        &stats.metric_status,
    );

    let _ = support::resolve_map_limit(map_limit, &project);

    let tracks: Vec<&triage::Track> = match &args.focus {
        Some(focus) => report
            .tracks
            .iter()
            .filter(|t| t.items.iter().any(|i| &i.issue_id == focus))
            .collect(),
        None => report.tracks.iter().collect(),
    };

    let payload = json!({
        "tracks": tracks
            .iter()
            .map(|t| json!({
                "items": t.items.iter().map(|i| json!({
                    "issue_id": i.issue_id,
                    "priority": i.priority,
                    "triage_score": i.triage_score,
                    "unblocks": i.unblocks,
                    "depth": i.depth,
                })).collect::<Vec<_>>(),
            }))
            .collect::<Vec<_>>(),
        "focus": args.focus,
    });
    let envelope = support::build_envelope(
        &data_hash,
        &config,
        support::status_map(&stats.metric_status),
        None,
        &["insights triage", "insights recommend"],
        "plan",
        payload,
    );

    render(mode, &tracks, &envelope)?;
    Ok(0)
}

fn render(mode: OutputMode, tracks: &[&triage::Track], envelope: &serde_json::Value) -> Result<()> {
    let mut out = std::io::stdout();
    match mode {
        OutputMode::Json => write_sorted_json(&mut out, envelope)?,
        OutputMode::Pretty => {
            pretty_section(&mut out, "Execution Plan")?;
            pretty_kv(&mut out, "tracks", tracks.len().to_string())?;
            for (i, track) in tracks.iter().enumerate() {
                let ids: Vec<&str> = track.items.iter().map(|item| item.issue_id.as_str()).collect();
                pretty_kv(&mut out, &format!("track {i}"), ids.join(", "))?;
            }
        }
        OutputMode::Text => {
            use std::io::Write;
            for (i, track) in tracks.iter().enumerate() {
                for item in &track.items {
                    writeln!(out, "{i}\t{}\tP{}", item.issue_id, item.priority)?;
                }
            }
        }
    }
    Ok(())
}
