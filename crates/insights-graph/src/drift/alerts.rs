//! Alert types and thresholds (§4.8).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use insights_core::baseline::Baseline;
use insights_core::config::DriftConfig;
use insights_core::model::{Issue, Status};

use crate::analyzer::DerivedStats;
use crate::graph::build::Graph;
use crate::triage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: &'static str,
    pub severity: Severity,
    pub message: String,
    pub issue_id: Option<String>,
    pub baseline_value: Option<f64>,
    pub current_value: Option<f64>,
    pub delta: Option<f64>,
    pub downstream_count: Option<u32>,
    pub priority_sum: Option<u32>,
}

impl Alert {
    fn new(kind: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            issue_id: None,
            baseline_value: None,
            current_value: None,
            delta: None,
            downstream_count: None,
            priority_sum: None,
        }
    }

    fn for_issue(mut self, issue_id: impl Into<String>) -> Self {
        self.issue_id = Some(issue_id.into());
        self
    }

    /// Attach the raw baseline/current values and their delta (§4.8 growth
    /// and pagerank-shift alerts) so callers can correlate without
    /// re-parsing `message`.
    fn with_values(mut self, baseline: f64, current: f64) -> Self {
        self.baseline_value = Some(baseline);
        self.current_value = Some(current);
        self.delta = Some(current - baseline);
        self
    }

    /// Attach the downstream unblock count and priority sum a cascade alert
    /// is based on.
    fn with_cascade(mut self, downstream_count: u32, priority_sum: u32) -> Self {
        self.downstream_count = Some(downstream_count);
        self.priority_sum = Some(priority_sum);
        self
    }
}

/// Compute every enabled drift alert between `baseline` and the current
/// analysis. `issues` and `graph` are the current issue set/graph (used for
/// staleness and blocking-cascade alerts, which have no baseline
/// counterpart).
#[must_use]
pub fn compute_alerts(
    baseline: &Baseline,
    current: &DerivedStats,
    issues: &[Issue],
    graph: &Graph,
    config: &DriftConfig,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    push_enabled(&mut alerts, config, new_cycle_alerts(baseline, current));
    push_enabled(&mut alerts, config, density_growth_alert(baseline, current, config));
    push_enabled(&mut alerts, config, node_count_alert(baseline, current, config));
    push_enabled(&mut alerts, config, edge_count_alert(baseline, current, config));
    push_enabled(&mut alerts, config, blocked_increase_alert(baseline, issues, config));
    push_enabled(&mut alerts, config, actionable_change_alert(baseline, issues, graph, config));
    push_enabled(&mut alerts, config, pagerank_change_alerts(baseline, current, config));
    push_enabled(&mut alerts, config, stale_issue_alerts(issues, config, now));
    push_enabled(&mut alerts, config, blocking_cascade_alerts(issues, graph, config));

    alerts
}

fn push_enabled(alerts: &mut Vec<Alert>, config: &DriftConfig, new: Vec<Alert>) {
    alerts.extend(new.into_iter().filter(|a| !config.is_disabled(a.kind)));
}

/// Exit-code mapping for CI (§4.8): 0 none/info, 2 warning, 1 critical.
#[must_use]
pub fn exit_code(alerts: &[Alert]) -> i32 {
    if alerts.iter().any(|a| a.severity == Severity::Critical) {
        1
    } else if alerts.iter().any(|a| a.severity == Severity::Warning) {
        2
    } else {
        0
    }
}

fn pct_change(baseline: f64, current: f64) -> Option<f64> {
    if baseline.abs() <= f64::EPSILON {
        return if current.abs() <= f64::EPSILON {
            None
        } else {
            Some(f64::INFINITY)
        };
    }
    Some((current - baseline) / baseline * 100.0)
}

fn new_cycle_alerts(baseline: &Baseline, current: &DerivedStats) -> Vec<Alert> {
    let baseline_cycles: HashSet<Vec<String>> = baseline.cycles.iter().cloned().collect();
    current
        .cycles
        .iter()
        .filter(|cycle| !baseline_cycles.contains(*cycle))
        .map(|cycle| {
            Alert::new(
                "new_cycle",
                Severity::Critical,
                format!("new cycle: {}", cycle.join(" -> ")),
            )
        })
        .collect()
}

fn density_growth_alert(baseline: &Baseline, current: &DerivedStats, config: &DriftConfig) -> Vec<Alert> {
    let Some(growth) = pct_change(baseline.stats.density, current.density) else {
        return Vec::new();
    };
    let severity = if growth >= config.density_warning_pct {
        Severity::Warning
    } else if growth >= config.density_info_pct {
        Severity::Info
    } else {
        return Vec::new();
    };
    vec![
        Alert::new("density_growth", severity, format!("density grew {growth:.1}%"))
            .with_values(baseline.stats.density, current.density),
    ]
}

fn node_count_alert(baseline: &Baseline, current: &DerivedStats, config: &DriftConfig) -> Vec<Alert> {
    growth_alert(
        "node_count_change",
        baseline.stats.node_count as f64,
        current.node_count as f64,
        config.node_growth_info_pct,
        "node count",
    )
}

fn edge_count_alert(baseline: &Baseline, current: &DerivedStats, config: &DriftConfig) -> Vec<Alert> {
    growth_alert(
        "edge_count_change",
        baseline.stats.edge_count as f64,
        current.edge_count as f64,
        config.edge_growth_info_pct,
        "edge count",
    )
}

fn growth_alert(kind: &'static str, baseline: f64, current: f64, threshold_pct: f64, label: &str) -> Vec<Alert> {
    let Some(change) = pct_change(baseline, current) else {
        return Vec::new();
    };
    if change.abs() >= threshold_pct {
        vec![
            Alert::new(kind, Severity::Info, format!("{label} changed {change:.1}% ({baseline:.0} -> {current:.0})"))
                .with_values(baseline, current),
        ]
    } else {
        Vec::new()
    }
}

fn blocked_increase_alert(baseline: &Baseline, issues: &[Issue], config: &DriftConfig) -> Vec<Alert> {
    let current_blocked = issues.iter().filter(|i| i.status == Status::Blocked).count();
    if current_blocked <= baseline.stats.blocked {
        return Vec::new();
    }
    let delta = current_blocked - baseline.stats.blocked;
    if delta as u32 >= config.blocked_increase_threshold {
        vec![
            Alert::new(
                "blocked_increase",
                Severity::Warning,
                format!("blocked count rose by {delta} (now {current_blocked})"),
            )
            .with_values(baseline.stats.blocked as f64, current_blocked as f64),
        ]
    } else {
        Vec::new()
    }
}

fn actionable_change_alert(baseline: &Baseline, issues: &[Issue], graph: &Graph, config: &DriftConfig) -> Vec<Alert> {
    let open_ids: HashSet<String> = issues
        .iter()
        .filter(|i| i.status.is_open())
        .map(|i| i.id.clone())
        .collect();
    let current_actionable = triage::actionable_ids(graph, &open_ids).len();
    let Some(change) = pct_change(baseline.stats.actionable as f64, current_actionable as f64) else {
        return Vec::new();
    };

    let (severity, verb) = if change <= -config.actionable_decrease_warning_pct {
        (Severity::Warning, "shrank")
    } else if change >= config.actionable_increase_info_pct {
        (Severity::Info, "grew")
    } else {
        return Vec::new();
    };
    vec![
        Alert::new(
            "actionable_change",
            severity,
            format!("actionable set {verb} {change:.1}% (now {current_actionable})"),
        )
        .with_values(baseline.stats.actionable as f64, current_actionable as f64),
    ]
}

fn pagerank_change_alerts(baseline: &Baseline, current: &DerivedStats, config: &DriftConfig) -> Vec<Alert> {
    let top_n = baseline.top_metrics.pagerank.len();
    let mut current_ranked: Vec<(&String, f64)> = current.pagerank.iter().map(|(id, v)| (id, *v)).collect();
    current_ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(b.0)));
    let current_top: HashSet<&str> = current_ranked.iter().take(top_n).map(|(id, _)| id.as_str()).collect();
    let baseline_top: HashSet<&str> = baseline.top_metrics.pagerank.iter().map(|e| e.issue_id.as_str()).collect();

    let mut alerts = Vec::new();

    for entry in &baseline.top_metrics.pagerank {
        let Some(&current_value) = current.pagerank.get(&entry.issue_id) else {
            continue;
        };
        let Some(shift) = pct_change(entry.value, current_value) else {
            continue;
        };
        if shift.abs() >= config.pagerank_change_warning_pct {
            alerts.push(
                Alert::new("pagerank_change", Severity::Warning, format!("pagerank shifted {shift:.1}%"))
                    .for_issue(entry.issue_id.clone())
                    .with_values(entry.value, current_value),
            );
        }
    }

    for id in current_top.difference(&baseline_top) {
        alerts.push(
            Alert::new("pagerank_change", Severity::Warning, "entered pagerank top-N")
                .for_issue((*id).to_string()),
        );
    }
    for id in baseline_top.difference(&current_top) {
        alerts.push(
            Alert::new("pagerank_change", Severity::Warning, "exited pagerank top-N")
                .for_issue((*id).to_string()),
        );
    }

    alerts.sort_by(|a, b| a.issue_id.cmp(&b.issue_id));
    alerts
}

fn stale_issue_alerts(issues: &[Issue], config: &DriftConfig, now: DateTime<Utc>) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = issues
        .iter()
        .filter(|i| i.status.is_open())
        .filter_map(|issue| {
            let anchor = issue.staleness_anchor()?;
            let idle_days = (now - anchor).num_days().max(0) as f64;
            let label = issue.labels.first().map(String::as_str);
            let (warn_days, crit_days) = config.staleness_days_for_label(label);
            let multiplier = if issue.status == Status::InProgress {
                config.in_progress_staleness_multiplier
            } else {
                1.0
            };
            let warn_threshold = f64::from(warn_days) * multiplier;
            let crit_threshold = f64::from(crit_days) * multiplier;

            if idle_days >= crit_threshold {
                Some(
                    Alert::new(
                        "stale_issue",
                        Severity::Critical,
                        format!("idle {idle_days:.0} days (critical threshold {crit_threshold:.0})"),
                    )
                    .for_issue(issue.id.clone()),
                )
            } else if idle_days >= warn_threshold {
                Some(
                    Alert::new(
                        "stale_issue",
                        Severity::Warning,
                        format!("idle {idle_days:.0} days (warn threshold {warn_threshold:.0})"),
                    )
                    .for_issue(issue.id.clone()),
                )
            } else {
                None
            }
        })
        .collect();
    alerts.sort_by(|a, b| a.issue_id.cmp(&b.issue_id));
    alerts
}

fn blocking_cascade_alerts(issues: &[Issue], graph: &Graph, config: &DriftConfig) -> Vec<Alert> {
    let open_ids: HashSet<String> = issues
        .iter()
        .filter(|i| i.status.is_open())
        .map(|i| i.id.clone())
        .collect();
    let issues_by_id: std::collections::HashMap<&str, &Issue> =
        issues.iter().map(|i| (i.id.as_str(), i)).collect();

    let mut alerts: Vec<Alert> = triage::actionable_ids(graph, &open_ids)
        .into_iter()
        .filter_map(|id| {
            let unblocked = triage::unblocks(&id, graph, &open_ids);
            let count = u32::try_from(unblocked.len()).unwrap_or(u32::MAX);
            if count < config.blocking_cascade_info {
                return None;
            }
            let priority_sum: u32 = unblocked
                .iter()
                .filter_map(|uid| issues_by_id.get(uid.as_str()))
                .map(|i| u32::from(4u8.saturating_sub(i.priority)))
                .sum();
            let severity = if count >= config.blocking_cascade_warning {
                Severity::Warning
            } else {
                Severity::Info
            };
            Some(
                Alert::new(
                    "blocking_cascade",
                    severity,
                    format!("unblocks {count} issues (downstream urgency {priority_sum})"),
                )
                .for_issue(id)
                .with_cascade(count, priority_sum),
            )
        })
        .collect();
    alerts.sort_by(|a, b| a.issue_id.cmp(&b.issue_id));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_core::baseline::{BaselineStats, TopMetrics};
    use insights_core::model::{Dependency, DependencyType};

    fn baseline_with(stats: BaselineStats, cycles: Vec<Vec<String>>) -> Baseline {
        Baseline {
            schema_version: insights_core::baseline::SCHEMA_VERSION,
            created_at: Utc::now(),
            commit: None,
            description: String::new(),
            stats,
            top_metrics: TopMetrics::default(),
            cycles,
        }
    }

    fn base_stats() -> BaselineStats {
        BaselineStats {
            node_count: 10,
            edge_count: 10,
            density: 0.1,
            open: 5,
            closed: 5,
            blocked: 0,
            cycle_count: 0,
            actionable: 3,
        }
    }

    fn derived(node_count: usize, edge_count: usize, density: f64, cycles: Vec<Vec<String>>) -> DerivedStats {
        DerivedStats {
            node_count,
            edge_count,
            density,
            topological_order: None,
            cycles_present: !cycles.is_empty(),
            in_degree: Default::default(),
            out_degree: Default::default(),
            pagerank: Default::default(),
            betweenness: Default::default(),
            eigenvector: Default::default(),
            hub_score: Default::default(),
            authority_score: Default::default(),
            critical_path_score: Default::default(),
            core_number: Default::default(),
            slack: Default::default(),
            articulation_points: Vec::new(),
            cycles,
            cycles_truncated: false,
            metric_status: Default::default(),
            elapsed_ms: Default::default(),
        }
    }

    #[test]
    fn new_cycle_not_in_baseline_is_critical() {
        let baseline = baseline_with(base_stats(), vec![]);
        let current = derived(10, 10, 0.1, vec![vec!["a".to_string(), "b".to_string()]]);
        let alerts = new_cycle_alerts(&baseline, &current);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Critical);
    }

    #[test]
    fn cycle_already_in_baseline_does_not_alert() {
        let cycle = vec!["a".to_string(), "b".to_string()];
        let baseline = baseline_with(base_stats(), vec![cycle.clone()]);
        let current = derived(10, 10, 0.1, vec![cycle]);
        assert!(new_cycle_alerts(&baseline, &current).is_empty());
    }

    #[test]
    fn density_growth_past_warning_threshold() {
        let baseline = baseline_with(base_stats(), vec![]);
        let current = derived(10, 10, 0.2, vec![]);
        let config = DriftConfig::default();
        let alerts = density_growth_alert(&baseline, &current, &config);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[0].baseline_value, Some(0.1));
        assert_eq!(alerts[0].current_value, Some(0.2));
        assert!((alerts[0].delta.unwrap() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn blocked_increase_below_threshold_is_silent() {
        let baseline = baseline_with(base_stats(), vec![]);
        let issues = vec![Issue {
            status: Status::Blocked,
            ..Issue::default()
        }];
        let config = DriftConfig::default();
        assert!(blocked_increase_alert(&baseline, &issues, &config).is_empty());
    }

    #[test]
    fn exit_code_prioritizes_critical_over_warning() {
        let alerts = vec![
            Alert::new("a", Severity::Warning, "w"),
            Alert::new("b", Severity::Critical, "c"),
        ];
        assert_eq!(exit_code(&alerts), 1);
    }

    #[test]
    fn exit_code_is_two_for_warnings_only() {
        let alerts = vec![Alert::new("a", Severity::Warning, "w")];
        assert_eq!(exit_code(&alerts), 2);
    }

    #[test]
    fn exit_code_is_zero_for_no_alerts_or_info_only() {
        assert_eq!(exit_code(&[]), 0);
        let alerts = vec![Alert::new("a", Severity::Info, "i")];
        assert_eq!(exit_code(&alerts), 0);
    }

    #[test]
    fn disabled_alert_kind_is_filtered_out() {
        let mut config = DriftConfig::default();
        config.disabled_alerts.push("new_cycle".to_string());
        let baseline = baseline_with(base_stats(), vec![]);
        let current = derived(10, 10, 0.1, vec![vec!["a".to_string(), "b".to_string()]]);
        let issues = vec![];
        let graph = Graph::build(&issues);
        let alerts = compute_alerts(&baseline, &current, &issues, &graph, &config, Utc::now());
        assert!(!alerts.iter().any(|a| a.kind == "new_cycle"));
    }

    #[test]
    fn stale_open_issue_past_warn_threshold_alerts() {
        let config = DriftConfig::default();
        let issue = Issue {
            id: "a".to_string(),
            status: Status::Open,
            updated_at: Some(Utc::now() - chrono::Duration::days(20)),
            ..Issue::default()
        };
        let alerts = stale_issue_alerts(&[issue], &config, Utc::now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn blocking_cascade_counts_direct_unblocks() {
        let config = DriftConfig::default();
        let hub = Issue {
            id: "hub".to_string(),
            status: Status::Open,
            ..Issue::default()
        };
        let deps: Vec<Issue> = (0..3)
            .map(|i| Issue {
                id: format!("d{i}"),
                status: Status::Open,
                dependencies: vec![Dependency {
                    depends_on_id: "hub".to_string(),
                    dep_type: DependencyType::Blocks,
                }],
                ..Issue::default()
            })
            .collect();
        let mut issues = vec![hub];
        issues.extend(deps);
        let graph = Graph::build(&issues);
        let alerts = blocking_cascade_alerts(&issues, &graph, &config);
        let hub_alert = alerts.iter().find(|a| a.issue_id.as_deref() == Some("hub")).expect("hub alert");
        assert_eq!(hub_alert.downstream_count, Some(3));
        assert!(hub_alert.priority_sum.is_some());
    }
}
