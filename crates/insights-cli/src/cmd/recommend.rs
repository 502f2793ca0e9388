//! `insights recommend` (§6.1, §4.6): priority-change recommendations,
//! emitted as the `recommendations` payload.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use insights_core::config::ProjectConfig;
use insights_core::hash::DataHash;
use insights_core::model::{Issue, Status};
use insights_graph::analyzer;
use insights_graph::graph::build::Graph;
use insights_graph::metrics::basic;
use insights_graph::score::{impact, priority};
use serde_json::json;

use crate::cmd::support;
use crate::output::{OutputMode, pretty_kv, pretty_section, write_sorted_json};

#[derive(Args, Debug)]
pub struct RecommendArgs {
    /// Explicit path to an issue JSONL file, bypassing discovery.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

pub fn run(args: &RecommendArgs, mode: OutputMode, force_full: bool, map_limit: Option<usize>) -> Result<i32> {
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
    let open_ids = support::open_ids(&issues);

    let recommendations = priority::recommend_priorities(&issues, &impact_scores, &graph, &open_ids);

    let _ = support::resolve_map_limit(map_limit, &project);
    let payload = json!({
        "recommendations": recommendations
            .iter()
            .map(|r| json!({
                "issue_id": r.issue_id,
                "current_priority": r.current_priority,
                "recommended_priority": r.recommended_priority,
                "direction": match r.direction {
                    priority::Direction::Increase => "increase",
                    priority::Direction::Decrease => "decrease",
                },
                "confidence": r.confidence,
                "reasons": r.reasons,
                "what_if": {
                    "direct_unblocks": r.what_if.direct_unblocks,
                    "transitive_unblocks": r.what_if.transitive_unblocks,
                    "parallelization_gain": r.what_if.parallelization_gain,
                },
            }))
            .collect::<Vec<_>>(),
    });
    let envelope = support::build_envelope(
        &data_hash,
        &config,
        support::status_map(&stats.metric_status),
        None,
        &["insights triage"],
        "recommendations",
        payload,
    );

    render(mode, &recommendations, &envelope)?;
    Ok(0)
}

fn render(
    mode: OutputMode,
    recommendations: &[priority::PriorityRecommendation],
    envelope: &serde_json::Value,
) -> Result<()> {
    let mut out = std::io::stdout();
    match mode {
        OutputMode::Json => write_sorted_json(&mut out, envelope)?,
        OutputMode::Pretty => {
            pretty_section(&mut out, "Priority Recommendations")?;
            pretty_kv(&mut out, "count", recommendations.len().to_string())?;
            for rec in recommendations {
                let arrow = match rec.direction {
                    priority::Direction::Increase => "up",
                    priority::Direction::Decrease => "down",
                };
                pretty_kv(
                    &mut out,
                    &rec.issue_id,
                    format!(
                        "P{} -> P{} ({arrow}, confidence {:.2})",
                        rec.current_priority, rec.recommended_priority, rec.confidence
                    ),
                )?;
            }
        }
        OutputMode::Text => {
            use std::io::Write;
            for rec in recommendations {
                writeln!(
                    out,
                    "{}\tP{}->P{}\t{:.2}",
                    rec.issue_id, rec.current_priority, rec.recommended_priority, rec.confidence
                )?;
            }
        }
    }
    Ok(())
}
