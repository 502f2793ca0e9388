//! `insights triage` (§6.1, §4.7): rank the actionable set and emit the
//! Quick-Ref and mega-triage views as the `triage` payload.

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

use crate::cmd::support;
use crate::output::{OutputMode, pretty_kv, pretty_section, write_sorted_json};

#[derive(Args, Debug)]
pub struct TriageArgs {
    /// Explicit path to an issue JSONL file, bypassing discovery.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

pub fn run(args: &TriageArgs, mode: OutputMode, force_full: bool, map_limit: Option<usize>) -> Result<i32> {
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

    let _ = support::resolve_map_limit(map_limit, &project); // triage items carry no raw per-issue maps to truncate
    let payload = support::triage_report_json(&report);
    let envelope = support::build_envelope(
        &data_hash,
        &config,
        support::status_map(&stats.metric_status),
        None,
        &["insights plan", "insights recommend"],
        "triage",
        payload,
    );

    render(mode, &report, &envelope)?;
    Ok(0)
}

fn render(mode: OutputMode, report: &triage::TriageReport, envelope: &serde_json::Value) -> Result<()> {
    let mut out = std::io::stdout();
    match mode {
        OutputMode::Json => write_sorted_json(&mut out, envelope)?,
        OutputMode::Pretty => {
            pretty_section(&mut out, "Triage")?;
            pretty_kv(&mut out, "actionable", report.items.len().to_string())?;
            pretty_kv(&mut out, "tracks", report.tracks.len().to_string())?;
            for pick in &report.quick_ref.top_picks {
                pretty_kv(&mut out, "top pick", format!("{} (score {:.2})", pick.issue_id, pick.triage_score))?;
            }
        }
        OutputMode::Text => {
            use std::io::Write;
            for item in &report.items {
                writeln!(
                    out,
                    "{}\tP{}\t{:.3}\tunblocks={}",
                    item.issue_id, item.priority, item.triage_score, item.unblocks
                )?;
            }
        }
    }
    Ok(())
}
