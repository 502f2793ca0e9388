//! `insights drift` (§6.1, §4.8): compare the current graph against the
//! saved baseline and emit alerts, with the process exit code carrying the
//! worst severity found.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use insights_core::baseline::Baseline;
use insights_core::config::{DriftConfig, ProjectConfig};
use insights_core::error::InsightsError;
use insights_core::hash::DataHash;
use insights_graph::analyzer;
use insights_graph::drift::{self, Alert, Severity};
use insights_graph::graph::build::Graph;
use serde_json::json;

use crate::cmd::support;
use crate::output::{OutputMode, pretty_kv, pretty_section, write_sorted_json};

#[derive(Args, Debug)]
pub struct DriftArgs {
    /// Explicit path to an issue JSONL file, bypassing discovery.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

pub fn run(args: &DriftArgs, mode: OutputMode, force_full: bool) -> Result<i32> {
    let project_root = std::env::current_dir()?;
    let project = ProjectConfig::load(&project_root);

    let baseline = Baseline::load(&support::baseline_path(&project_root)).map_err(InsightsError::from)?;
    let drift_config = DriftConfig::load_or_default(&support::drift_config_path(&project_root));

    let issues = support::load_issues(&project_root, args.input.as_deref())?;
    let graph = Graph::build(&issues);
    let config = support::resolve_analysis_config(&issues, force_full, &project);
    let data_hash = DataHash::compute(&issues);
    let stats = analyzer::analyze_full(&graph, &issues, &config);
    let now = chrono::Utc::now();

    let alerts = drift::compute_alerts(&baseline, &stats, &issues, &graph, &drift_config, now);
    let exit_code = drift::exit_code(&alerts);

    let payload = json!({
        "alerts": alerts.iter().map(alert_json).collect::<Vec<_>>(),
        "baseline_created_at": baseline.created_at.to_rfc3339(),
    });
    let envelope = support::build_envelope(
        &data_hash,
        &config,
        support::status_map(&stats.metric_status),
        None,
        &["insights baseline save"],
        "drift",
        payload,
    );

    render(mode, &alerts, &envelope)?;
    Ok(exit_code)
}

fn severity_str(severity: &Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Critical => "critical",
    }
}

fn alert_json(alert: &Alert) -> serde_json::Value {
    json!({
        "kind": alert.kind,
        "severity": severity_str(&alert.severity),
        "message": alert.message,
        "issue_id": alert.issue_id,
        "baseline_value": alert.baseline_value,
        "current_value": alert.current_value,
        "delta": alert.delta,
        "downstream_count": alert.downstream_count,
        "priority_sum": alert.priority_sum,
    })
}

fn render(mode: OutputMode, alerts: &[Alert], envelope: &serde_json::Value) -> Result<()> {
    let mut out = std::io::stdout();
    match mode {
        OutputMode::Json => write_sorted_json(&mut out, envelope)?,
        OutputMode::Pretty => {
            pretty_section(&mut out, "Drift")?;
            pretty_kv(&mut out, "alerts", alerts.len().to_string())?;
            for alert in alerts {
                pretty_kv(&mut out, severity_str(&alert.severity), alert.message.clone())?;
            }
        }
        OutputMode::Text => {
            use std::io::Write;
            for alert in alerts {
                writeln!(out, "{}\t{}\t{}", severity_str(&alert.severity), alert.kind, alert.message)?;
            }
        }
    }
    Ok(())
}
