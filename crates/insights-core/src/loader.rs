//! Tolerant JSONL issue-file loader (§4.1).
//!
//! Accepts a path to a line-delimited JSON file, or discovers one in a
//! directory by trying canonical names in order. Reads tolerantly: a line
//! that fails to parse or validate is skipped and counted rather than
//! aborting the whole load, the same way a replay of an append-only log
//! skips a malformed record with a warning instead of failing the whole
//! rebuild.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, instrument, warn};

use crate::error::LoaderError;
use crate::model::Issue;

/// Per-line buffer capacity. Issue descriptions can be long; 10 MiB keeps
/// pathological single-line records from truncating silently.
const LINE_BUFFER_CAPACITY: usize = 10 * 1024 * 1024;

/// Canonical issue-file names tried in order during directory discovery.
const CANONICAL_NAMES: &[&str] = &["beads.jsonl", "beads.base.jsonl", "issues.jsonl"];

/// A non-fatal problem noticed while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A line could not be parsed as JSON at all.
    MalformedLine { line_num: usize, reason: String },
    /// A line parsed as JSON but failed semantic validation (missing id,
    /// invalid status enum, etc).
    InvalidRecord { line_num: usize, reason: String },
    /// A dependency referenced an id not present in the loaded set.
    DanglingDependency { issue_id: String, target_id: String },
    /// An issue depends on itself.
    SelfLoop { issue_id: String },
    /// `closed_at` precedes `created_at`.
    NonMonotonicTimestamps { issue_id: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLine { line_num, reason } => {
                write!(f, "line {line_num}: malformed JSON ({reason})")
            }
            Self::InvalidRecord { line_num, reason } => {
                write!(f, "line {line_num}: invalid record ({reason})")
            }
            Self::DanglingDependency {
                issue_id,
                target_id,
            } => write!(f, "{issue_id}: dependency on unknown issue {target_id}"),
            Self::SelfLoop { issue_id } => write!(f, "{issue_id}: self-referential dependency"),
            Self::NonMonotonicTimestamps { issue_id } => {
                write!(f, "{issue_id}: closed_at precedes created_at")
            }
        }
    }
}

/// The result of a successful load: issues plus every non-fatal warning
/// noticed along the way.
#[derive(Debug, Clone, Default)]
pub struct LoadResult {
    pub issues: Vec<Issue>,
    pub warnings: Vec<Warning>,
}

/// Discover and load the issue file in `dir`.
///
/// Tries [`CANONICAL_NAMES`] in order, skipping backup/merge artifacts and
/// zero-byte files, then delegates to [`load_file`].
///
/// # Errors
///
/// [`LoaderError::NotFound`] if no candidate exists; propagates
/// [`LoaderError::Unreadable`] / [`LoaderError::NoUsableFile`] from the
/// chosen file.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load(dir: &Path) -> Result<LoadResult, LoaderError> {
    let path = discover(dir).ok_or_else(|| LoaderError::NotFound {
        dir: dir.to_path_buf(),
    })?;
    load_file(&path)
}

/// List discoverable candidate files in `dir`, in priority order, per the
/// exclusion rules in §4.1 (backup/merge artifacts and empty files never
/// count as a default even if they sort first).
#[must_use]
pub fn discover(dir: &Path) -> Option<PathBuf> {
    CANONICAL_NAMES.iter().find_map(|name| {
        let candidate = dir.join(name);
        is_usable_candidate(&candidate).then_some(candidate)
    })
}

fn is_usable_candidate(path: &Path) -> bool {
    if is_backup_artifact(path) {
        return false;
    }
    std::fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

/// `true` when `path`'s filename carries a backup/merge-artifact marker:
/// `.bak`, `.orig`, `.merge` suffixes, or the CLI's own
/// `issues.<timestamp>.jsonl` backup naming convention (ground: `bn sync`'s
/// backup files — see `cmd/sync.rs`).
#[must_use]
pub fn is_backup_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.ends_with(".bak") || name.ends_with(".orig") || name.ends_with(".merge") {
        return true;
    }
    // `<stem>.YYYY-MM-DDThh-mm-ss.jsonl`
    let Some(stripped) = name.strip_suffix(".jsonl") else {
        return false;
    };
    let Some((_, ts)) = stripped.rsplit_once('.') else {
        return false;
    };
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H-%M-%S").is_ok()
}

/// Load issues from an explicit file path, tolerating malformed and
/// semantically-invalid lines.
///
/// # Errors
///
/// [`LoaderError::Unreadable`] if the file cannot be opened.
/// [`LoaderError::NoUsableFile`] if every line was skipped.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_file(path: &Path) -> Result<LoadResult, LoaderError> {
    let file = std::fs::File::open(path).map_err(|source| LoaderError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = BufReader::with_capacity(LINE_BUFFER_CAPACITY, file);
    let mut issues = Vec::new();
    let mut warnings = Vec::new();
    let mut skipped = 0usize;

    for (idx, raw_line) in reader.lines().enumerate() {
        let line_num = idx + 1;
        let line = match raw_line {
            Ok(line) => line,
            Err(err) => {
                warnings.push(Warning::MalformedLine {
                    line_num,
                    reason: err.to_string(),
                });
                skipped += 1;
                continue;
            }
        };

        let line = if line_num == 1 { strip_bom(&line) } else { &line };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Issue>(trimmed) {
            Ok(issue) => match validate(&issue) {
                Ok(()) => issues.push(issue),
                Err(reason) => {
                    warnings.push(Warning::InvalidRecord { line_num, reason });
                    skipped += 1;
                }
            },
            Err(err) => {
                warnings.push(Warning::MalformedLine {
                    line_num,
                    reason: err.to_string(),
                });
                skipped += 1;
            }
        }
    }

    if issues.is_empty() {
        return Err(LoaderError::NoUsableFile {
            path: path.to_path_buf(),
            skipped,
        });
    }

    warnings.extend(post_load_warnings(&issues));
    debug!(loaded = issues.len(), skipped, "issue file loaded");

    Ok(LoadResult { issues, warnings })
}

fn strip_bom(line: &str) -> &str {
    line.strip_prefix('\u{feff}').unwrap_or(line)
}

fn validate(issue: &Issue) -> Result<(), String> {
    if issue.id.trim().is_empty() {
        return Err("missing id".to_string());
    }
    Ok(())
}

/// Cross-issue warnings: dangling dependencies, self-loops, and
/// non-monotonic timestamps. Computed once after every line has loaded so
/// forward references within the file resolve correctly.
fn post_load_warnings(issues: &[Issue]) -> Vec<Warning> {
    let known: std::collections::HashSet<&str> = issues.iter().map(|i| i.id.as_str()).collect();
    let mut warnings = Vec::new();

    for issue in issues {
        if !issue.has_monotonic_timestamps() {
            warnings.push(Warning::NonMonotonicTimestamps {
                issue_id: issue.id.clone(),
            });
        }
        for dep in &issue.dependencies {
            if dep.depends_on_id == issue.id {
                warnings.push(Warning::SelfLoop {
                    issue_id: issue.id.clone(),
                });
            } else if !known.contains(dep.depends_on_id.as_str()) {
                warnings.push(Warning::DanglingDependency {
                    issue_id: issue.id.clone(),
                    target_id: dep.depends_on_id.clone(),
                });
            }
        }
    }

    warnings
}
