//! `insights analyze` (§6.1): full two-phase analysis, emitted as the
//! `insights` payload.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use insights_core::config::ProjectConfig;
use insights_core::hash::DataHash;
use insights_graph::analyzer::{self, DerivedStats};
use insights_graph::cache::Cache;
use insights_graph::graph::build::Graph;

use crate::cmd::support;
use crate::output::{OutputMode, pretty_kv, pretty_section, write_sorted_json};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Explicit path to an issue JSONL file, bypassing discovery.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

pub fn run(args: &AnalyzeArgs, mode: OutputMode, force_full: bool, map_limit: Option<usize>) -> Result<i32> {
    let project_root = std::env::current_dir()?;
    let project = ProjectConfig::load(&project_root);

    let issues = support::load_issues(&project_root, args.input.as_deref())?;
    let graph = Graph::build(&issues);
    let config = support::resolve_analysis_config(&issues, force_full, &project);
    let data_hash = DataHash::compute(&issues);

    let cache = Cache::new(&project.cache);
    let stats = match cache.get(&data_hash, &config) {
        Some(cached) => cached,
        None => {
            let computed = analyzer::analyze_full(&graph, &issues, &config);
            cache.insert(&data_hash, &config, computed.clone());
            computed
        }
    };

    let limit = support::resolve_map_limit(map_limit, &project);
    let payload = support::derived_stats_json(&stats, limit);
    let envelope = support::build_envelope(
        &data_hash,
        &config,
        support::status_map(&stats.metric_status),
        None,
        &["insights triage", "insights baseline save"],
        "insights",
        payload,
    );

    render(mode, &stats, &envelope)?;
    Ok(0)
}

fn render(mode: OutputMode, stats: &DerivedStats, envelope: &serde_json::Value) -> Result<()> {
    let mut out = std::io::stdout();
    match mode {
        OutputMode::Json => write_sorted_json(&mut out, envelope)?,
        OutputMode::Pretty => {
            pretty_section(&mut out, "Dependency Graph Analysis")?;
            pretty_kv(&mut out, "nodes", stats.node_count.to_string())?;
            pretty_kv(&mut out, "edges", stats.edge_count.to_string())?;
            pretty_kv(&mut out, "density", format!("{:.4}", stats.density))?;
            pretty_kv(&mut out, "cycles", stats.cycles.len().to_string())?;
            pretty_kv(
                &mut out,
                "toposort",
                if stats.cycles_present {
                    "none (cycles present)".to_string()
                } else {
                    "ok".to_string()
                },
            )?;
        }
        OutputMode::Text => {
            use std::io::Write;
            writeln!(
                out,
                "nodes={} edges={} density={:.4} cycles={}",
                stats.node_count,
                stats.edge_count,
                stats.density,
                stats.cycles.len()
            )?;
        }
    }
    Ok(())
}
