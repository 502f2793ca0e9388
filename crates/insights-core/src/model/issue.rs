//! The `Issue` aggregate and its supporting enums.
//!
//! A superset of fields is tolerated on the wire (`#[serde(default)]`
//! everywhere) but the canonical in-memory model only keeps what the
//! analyzer and triage engine consume.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Blocked,
    Closed,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Closed => "closed",
        }
    }

    /// `true` for any state other than `closed`.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an enum value from loosely-typed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" | "in-progress" | "doing" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "closed" | "done" => Ok(Self::Closed),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

/// The relationship a [`Dependency`] expresses between two issues.
///
/// Only [`DependencyType::Blocks`] participates in the structural graph
/// (§3); everything else is carried for display purposes and ignored by
/// the analyzer. Serialized/deserialized by hand (rather than a derived
/// tagged enum) so unrecognized `type` strings round-trip losslessly into
/// [`DependencyType::Other`] instead of failing to parse — the schema says
/// `type ∈ {blocks, related, parent_of, …}` and that trailing ellipsis is
/// load-bearing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyType {
    Blocks,
    Related,
    ParentOf,
    Other(String),
}

impl DependencyType {
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Blocks)
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocks => f.write_str("blocks"),
            Self::Related => f.write_str("related"),
            Self::ParentOf => f.write_str("parent_of"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

impl Serialize for DependencyType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DependencyType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "blocks" => Self::Blocks,
            "related" | "related_to" => Self::Related,
            "parent_of" | "parent-of" => Self::ParentOf,
            _ => Self::Other(raw),
        })
    }
}

/// One edge in an issue's dependency list, prior to graph construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub depends_on_id: String,
    #[serde(rename = "type")]
    pub dep_type: DependencyType,
}

/// The canonical in-memory representation of one issue-tracker entry.
///
/// Constructed exclusively by [`crate::loader`]; every other module treats
/// it as an immutable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub status: Status,
    /// 0 (highest) through 4 (lowest).
    pub priority: u8,
    pub issue_type: String,
    pub assignee: Option<String>,
    pub labels: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub source_repo: Option<String>,
    pub description: Option<String>,
}

impl Default for Issue {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            status: Status::Open,
            priority: 2,
            issue_type: String::new(),
            assignee: None,
            labels: Vec::new(),
            dependencies: Vec::new(),
            created_at: None,
            updated_at: None,
            closed_at: None,
            source_repo: None,
            description: None,
        }
    }
}

impl Issue {
    /// Blocking-only dependency ids, in schema order (graph construction
    /// sorts separately; this preserves whatever the source line had).
    #[must_use]
    pub fn blocking_dependency_ids(&self) -> Vec<&str> {
        self.dependencies
            .iter()
            .filter(|d| d.dep_type.is_blocking())
            .map(|d| d.depends_on_id.as_str())
            .collect()
    }

    /// The timestamp staleness (§4.6, §9 open question b) is measured
    /// against: `updated_at`, falling back to `created_at` when absent.
    #[must_use]
    pub fn staleness_anchor(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }

    /// `true` when `closed_at` precedes `created_at` — a data-quality note,
    /// not a hard rejection (§3 invariant is "timestamps monotonic when
    /// present", but the loader tolerates violations rather than dropping
    /// the record; see `loader::Warning::NonMonotonicTimestamps`).
    #[must_use]
    pub fn has_monotonic_timestamps(&self) -> bool {
        match (self.created_at, self.closed_at) {
            (Some(created), Some(closed)) => closed >= created,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for s in [Status::Open, Status::InProgress, Status::Blocked, Status::Closed] {
            let parsed: Status = s.to_string().parse().unwrap();
            assert_eq!(parsed, s);
        }
    }

    #[test]
    fn status_accepts_legacy_spellings() {
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("doing".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("done".parse::<Status>().unwrap(), Status::Closed);
    }

    #[test]
    fn status_rejects_unknown_value() {
        assert!("wat".parse::<Status>().is_err());
    }

    #[test]
    fn blocking_dependency_ids_excludes_related() {
        let issue = Issue {
            dependencies: vec![
                Dependency {
                    depends_on_id: "a".into(),
                    dep_type: DependencyType::Blocks,
                },
                Dependency {
                    depends_on_id: "b".into(),
                    dep_type: DependencyType::Related,
                },
            ],
            ..Default::default()
        };
        assert_eq!(issue.blocking_dependency_ids(), vec!["a"]);
    }

    #[test]
    fn staleness_anchor_falls_back_to_created_at() {
        let created = Utc::now();
        let issue = Issue {
            created_at: Some(created),
            updated_at: None,
            ..Default::default()
        };
        assert_eq!(issue.staleness_anchor(), Some(created));
    }

    #[test]
    fn monotonic_timestamps_detects_violation() {
        let now = Utc::now();
        let issue = Issue {
            created_at: Some(now),
            closed_at: Some(now - chrono::Duration::days(1)),
            ..Default::default()
        };
        assert!(!issue.has_monotonic_timestamps());
    }
}
