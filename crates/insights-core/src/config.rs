//! Analysis and drift configuration.
//!
//! [`AnalysisConfig`] controls which Phase 2 metrics run, their timeouts,
//! and sampling toggles; it is selected purely from graph size (§4.5) but
//! can be overridden wholesale by `--force-full`. [`DriftConfig`] controls
//! alert thresholds for [`crate`]'s drift calculator and loads from an
//! optional JSON file the same way [`ProjectConfig`] loads its TOML file —
//! missing or malformed files fall back to [`Default`] with a warning,
//! never a hard error.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Graph-size tier driving metric selection (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeTier {
    Small,
    Medium,
    Large,
    Xl,
}

impl SizeTier {
    /// Tier for a graph with `node_count` nodes, per the documented bands:
    /// Small <100, Medium 100-499, Large 500-1999, XL >=2000.
    #[must_use]
    pub const fn for_node_count(node_count: usize) -> Self {
        match node_count {
            0..=99 => Self::Small,
            100..=499 => Self::Medium,
            500..=1999 => Self::Large,
            _ => Self::Xl,
        }
    }
}

/// Per-metric execution budget and sampling policy, selected from graph
/// size and carried in every JSON payload so callers can see what ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub tier: SizeTier,
    /// Per-metric deadline; default 500ms, raised 10x under `force_full`.
    pub metric_deadline: Duration,
    /// Sample betweenness over this many source nodes instead of all |V|.
    /// `None` means compute exactly.
    pub betweenness_sample: Option<usize>,
    /// Skip HITS entirely (dense XL graphs).
    pub skip_hits: bool,
    /// Density above which HITS is skipped on XL graphs (§9 open question c).
    pub hits_skip_density: f64,
    /// Elementary-cycle enumeration cap.
    pub cycle_cap: usize,
    /// Disables all skipping/sampling and raises timeouts 10x.
    pub force_full: bool,
}

const DEFAULT_METRIC_DEADLINE_MS: u64 = 500;
const BETWEENNESS_SAMPLE_THRESHOLD: usize = 500;
const DEFAULT_HITS_SKIP_DENSITY: f64 = 0.05;

impl AnalysisConfig {
    /// Select a tiered config from graph size (§4.5). `force_full` disables
    /// all skipping/sampling and multiplies every timeout by 10.
    #[must_use]
    pub fn for_graph(node_count: usize, force_full: bool) -> Self {
        let tier = SizeTier::for_node_count(node_count);
        let base_deadline = Duration::from_millis(DEFAULT_METRIC_DEADLINE_MS);
        let deadline = if force_full {
            base_deadline * 10
        } else {
            base_deadline
        };

        let betweenness_sample = if force_full {
            None
        } else {
            match tier {
                SizeTier::Small | SizeTier::Medium => None,
                SizeTier::Large | SizeTier::Xl => Some(BETWEENNESS_SAMPLE_THRESHOLD),
            }
        };

        let cycle_cap = if force_full {
            usize::MAX
        } else {
            match tier {
                SizeTier::Small | SizeTier::Medium => usize::MAX,
                SizeTier::Large => 500,
                SizeTier::Xl => 200,
            }
        };

        Self {
            tier,
            metric_deadline: deadline,
            betweenness_sample,
            skip_hits: !force_full && tier == SizeTier::Xl,
            hits_skip_density: DEFAULT_HITS_SKIP_DENSITY,
            cycle_cap,
            force_full,
        }
    }

    /// Whether HITS should actually be skipped for a graph of the given
    /// density, combining the tier toggle with the density threshold.
    #[must_use]
    pub fn should_skip_hits(&self, density: f64) -> bool {
        self.skip_hits && density > self.hits_skip_density
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::for_graph(0, false)
    }
}

/// Per-label staleness override (§6).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LabelOverride {
    pub warn_days: Option<u32>,
    pub critical_days: Option<u32>,
}

/// Drift/alert threshold configuration (§6, §4.8). Every field has a
/// documented default; an absent or unparseable config file yields
/// [`DriftConfig::default`] plus a logged warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub density_info_pct: f64,
    pub density_warning_pct: f64,
    pub node_growth_info_pct: f64,
    pub edge_growth_info_pct: f64,
    pub blocked_increase_threshold: u32,
    pub actionable_decrease_warning_pct: f64,
    pub actionable_increase_info_pct: f64,
    pub pagerank_change_warning_pct: f64,
    pub staleness_warn_days: u32,
    pub staleness_critical_days: u32,
    pub in_progress_staleness_multiplier: f64,
    pub blocking_cascade_info: u32,
    pub blocking_cascade_warning: u32,
    pub per_label_overrides: std::collections::BTreeMap<String, LabelOverride>,
    pub disabled_alerts: Vec<String>,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            density_info_pct: 10.0,
            density_warning_pct: 25.0,
            node_growth_info_pct: 20.0,
            edge_growth_info_pct: 20.0,
            blocked_increase_threshold: 3,
            actionable_decrease_warning_pct: 20.0,
            actionable_increase_info_pct: 20.0,
            pagerank_change_warning_pct: 50.0,
            staleness_warn_days: 14,
            staleness_critical_days: 30,
            in_progress_staleness_multiplier: 0.5,
            blocking_cascade_info: 3,
            blocking_cascade_warning: 8,
            per_label_overrides: std::collections::BTreeMap::new(),
            disabled_alerts: Vec::new(),
        }
    }
}

impl DriftConfig {
    /// Staleness thresholds for `label`, falling back to the global
    /// defaults when no override is configured.
    #[must_use]
    pub fn staleness_days_for_label(&self, label: Option<&str>) -> (u32, u32) {
        label
            .and_then(|l| self.per_label_overrides.get(l))
            .map_or((self.staleness_warn_days, self.staleness_critical_days), |o| {
                (
                    o.warn_days.unwrap_or(self.staleness_warn_days),
                    o.critical_days.unwrap_or(self.staleness_critical_days),
                )
            })
    }

    /// Whether an alert type named `kind` is suppressed.
    #[must_use]
    pub fn is_disabled(&self, kind: &str) -> bool {
        self.disabled_alerts.iter().any(|d| d == kind)
    }

    /// Load from a JSON file at `path`. Never returns an error for
    /// "file does not exist" (returns defaults); returns a [`ConfigError`]
    /// for unreadable or unparseable files so callers can log it, but
    /// never propagates past that — see [`Self::load_or_default`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|err| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// [`Self::load`], but logs and falls back to defaults instead of
    /// returning an error — the policy used everywhere drift config is
    /// actually consumed.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(%err, path = %path.display(), "falling back to default drift config");
                Self::default()
            }
        }
    }
}

/// Project-level settings loaded from `.insights/config.toml`, with the
/// same discovery and graceful-fallback behavior as [`DriftConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    pub analysis: ProjectAnalysisSection,
    pub cache: CacheSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectAnalysisSection {
    pub force_full: bool,
    pub map_limit: Option<usize>,
}

impl Default for ProjectAnalysisSection {
    fn default() -> Self {
        Self {
            force_full: false,
            map_limit: None,
        }
    }
}

/// Cache sizing and expiry (§5). Defaults: 5 minute TTL, unbounded size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub ttl_secs: u64,
    pub max_entries: Option<usize>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_entries: None,
        }
    }
}

impl ProjectConfig {
    /// Load `.insights/config.toml` under `project_root`, or defaults if
    /// absent. Parse failures are logged and degrade to defaults.
    #[must_use]
    pub fn load(project_root: &Path) -> Self {
        let path = project_root.join(".insights").join("config.toml");
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!(%err, path = %path.display(), "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(%err, path = %path.display(), "failed to read config, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_tier_bands_match_documented_thresholds() {
        assert_eq!(SizeTier::for_node_count(0), SizeTier::Small);
        assert_eq!(SizeTier::for_node_count(99), SizeTier::Small);
        assert_eq!(SizeTier::for_node_count(100), SizeTier::Medium);
        assert_eq!(SizeTier::for_node_count(499), SizeTier::Medium);
        assert_eq!(SizeTier::for_node_count(500), SizeTier::Large);
        assert_eq!(SizeTier::for_node_count(1999), SizeTier::Large);
        assert_eq!(SizeTier::for_node_count(2000), SizeTier::Xl);
    }

    #[test]
    fn large_tier_samples_betweenness_and_caps_cycles() {
        let cfg = AnalysisConfig::for_graph(800, false);
        assert_eq!(cfg.betweenness_sample, Some(500));
        assert_eq!(cfg.cycle_cap, 500);
        assert!(!cfg.skip_hits);
    }

    #[test]
    fn xl_tier_skips_hits_above_density_threshold() {
        let cfg = AnalysisConfig::for_graph(5000, false);
        assert_eq!(cfg.cycle_cap, 200);
        assert!(cfg.skip_hits);
        assert!(cfg.should_skip_hits(0.1));
        assert!(!cfg.should_skip_hits(0.01));
    }

    #[test]
    fn force_full_disables_skipping_and_raises_deadline() {
        let cfg = AnalysisConfig::for_graph(5000, true);
        assert_eq!(cfg.betweenness_sample, None);
        assert_eq!(cfg.cycle_cap, usize::MAX);
        assert!(!cfg.skip_hits);
        assert_eq!(
            cfg.metric_deadline,
            Duration::from_millis(DEFAULT_METRIC_DEADLINE_MS * 10)
        );
    }

    #[test]
    fn missing_drift_config_uses_defaults() {
        let cfg = DriftConfig::load_or_default(Path::new("/nonexistent/path/drift.json"));
        assert_eq!(cfg.staleness_warn_days, 14);
        assert!(cfg.disabled_alerts.is_empty());
    }

    #[test]
    fn label_override_falls_back_to_global_default() {
        let mut cfg = DriftConfig::default();
        cfg.per_label_overrides.insert(
            "urgent".to_string(),
            LabelOverride {
                warn_days: Some(3),
                critical_days: None,
            },
        );
        assert_eq!(cfg.staleness_days_for_label(Some("urgent")), (3, 30));
        assert_eq!(cfg.staleness_days_for_label(Some("other")), (14, 30));
        assert_eq!(cfg.staleness_days_for_label(None), (14, 30));
    }

    #[test]
    fn disabled_alert_is_recognized() {
        let mut cfg = DriftConfig::default();
        cfg.disabled_alerts.push("new_cycle".to_string());
        assert!(cfg.is_disabled("new_cycle"));
        assert!(!cfg.is_disabled("stale_issue"));
    }
}
