//! Baseline persistence (§4.11): a point-in-time snapshot of graph stats,
//! top metric items, and cycles that `insights drift` compares the current
//! analysis against.
//!
//! Saves write to a temp file in the baseline's directory and rename it
//! into place, so a crash mid-write can never leave a half-written
//! baseline on disk.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::BaselineError;

/// Current on-disk schema version. Bump when [`Baseline`]'s shape changes
/// in a way that breaks deserialization of older files.
pub const SCHEMA_VERSION: u32 = 1;

/// A commit a [`Baseline`] or drift alert can be tagged with. Resolved by
/// the CLI via a `CommitResolver`; the core never shells out to `git`
/// itself (§4.12).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    pub summary: Option<String>,
}

/// One entry in a baseline's top-N metric list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMetricEntry {
    pub issue_id: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub open: usize,
    pub closed: usize,
    pub blocked: usize,
    pub cycle_count: usize,
    pub actionable: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopMetrics {
    pub pagerank: Vec<TopMetricEntry>,
    pub betweenness: Vec<TopMetricEntry>,
    pub critical_path: Vec<TopMetricEntry>,
    pub hubs: Vec<TopMetricEntry>,
    pub authorities: Vec<TopMetricEntry>,
}

/// A persisted snapshot of graph stats, top metric items, and the cycle
/// list, used by `insights drift` as the comparison point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub commit: Option<CommitRef>,
    pub description: String,
    pub stats: BaselineStats,
    pub top_metrics: TopMetrics,
    pub cycles: Vec<Vec<String>>,
}

const fn default_schema_version() -> u32 {
    0 // deliberately not SCHEMA_VERSION: a file missing the field predates versioning
}

impl Baseline {
    /// Atomically write this baseline to `path`: write to a sibling temp
    /// file, then rename into place.
    ///
    /// # Errors
    ///
    /// [`BaselineError::WriteFailed`] on any I/O failure.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<(), BaselineError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|source| BaselineError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let json = serde_json::to_vec_pretty(self).map_err(|err| BaselineError::WriteFailed {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| {
            BaselineError::WriteFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;

        use std::io::Write;
        tmp.write_all(&json)
            .map_err(|source| BaselineError::WriteFailed {
                path: path.to_path_buf(),
                source,
            })?;

        tmp.persist(path)
            .map_err(|err| BaselineError::WriteFailed {
                path: path.to_path_buf(),
                source: err.error,
            })?;

        Ok(())
    }

    /// Load a baseline from `path`.
    ///
    /// # Errors
    ///
    /// [`BaselineError::Missing`] if the file does not exist.
    /// [`BaselineError::VersionMismatch`] if its `schema_version` field
    /// does not match [`SCHEMA_VERSION`] — checked before general JSON
    /// parsing so callers can distinguish "no baseline" from "baseline
    /// from an incompatible future version".
    /// [`BaselineError::Corrupt`] if the file fails to parse at all.
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, BaselineError> {
        if !path.exists() {
            return Err(BaselineError::Missing {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| BaselineError::Corrupt {
            path: path.to_path_buf(),
            reason: source.to_string(),
        })?;

        let raw: serde_json::Value =
            serde_json::from_str(&content).map_err(|err| BaselineError::Corrupt {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

        let found = raw
            .get("schema_version")
            .and_then(serde_json::Value::as_u64)
            .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX));

        if found != SCHEMA_VERSION {
            return Err(BaselineError::VersionMismatch {
                path: path.to_path_buf(),
                found,
                expected: SCHEMA_VERSION,
            });
        }

        serde_json::from_value(raw).map_err(|err| BaselineError::Corrupt {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}

/// Resolves the current HEAD commit, kept behind a trait so `insights-core`
/// never shells out to `git` itself (§4.12). The CLI provides a real
/// implementation that runs `git rev-parse HEAD` / `git log -1 --format=%s`.
pub trait CommitResolver {
    fn resolve_head(&self) -> Option<CommitRef>;
}

/// A resolver that never finds a commit, for contexts with no VCS
/// integration (tests, library consumers that don't care).
pub struct NoCommitResolver;

impl CommitResolver for NoCommitResolver {
    fn resolve_head(&self) -> Option<CommitRef> {
        None
    }
}
