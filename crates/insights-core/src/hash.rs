//! Content-addressed hashing of an issue set.
//!
//! Uses the `blake3:<hex>` format and content-covers-everything-relevant
//! discipline common to content-addressed manifests, adapted to hash an
//! unordered collection of issues rather than a single event: every issue
//! contributes a line built from its stable fields, dependency ids are
//! sorted so edge order in the source JSONL never changes the hash, and
//! the per-issue lines themselves are sorted by id before hashing so the
//! loader's file-read order is irrelevant too (§8 invariant 2).

use std::fmt;

use crate::model::Issue;

/// A `blake3:<hex>` content hash over an issue set, order-invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataHash(String);

impl DataHash {
    /// Hash `issues`. Two calls with the same issues in any order and in
    /// any [`Vec`] layout produce the same [`DataHash`].
    #[must_use]
    pub fn compute(issues: &[Issue]) -> Self {
        let mut lines: Vec<String> = issues.iter().map(issue_line).collect();
        lines.sort_unstable();

        let mut input = String::new();
        for line in &lines {
            input.push_str(line);
            input.push('\n');
        }

        let hash = blake3::hash(input.as_bytes());
        Self(format!("blake3:{hash}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for DataHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for DataHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self(String::deserialize(deserializer)?))
    }
}

fn issue_line(issue: &Issue) -> String {
    let mut dep_ids: Vec<&str> = issue
        .dependencies
        .iter()
        .map(|d| d.depends_on_id.as_str())
        .collect();
    dep_ids.sort_unstable();

    let updated_at = issue
        .updated_at
        .map_or_else(String::new, |t| t.to_rfc3339());

    format!(
        "{}\t{}\t{}\t{}\t{}",
        issue.id,
        issue.status,
        issue.priority,
        updated_at,
        dep_ids.join(",")
    )
}
