//! The canonical issue model loaded from the append-only datastore.
//!
//! Every other module in the workspace (graph builder, analyzer, triage,
//! drift) consumes [`Issue`] values only — nothing downstream touches the
//! on-disk JSONL representation directly.

pub mod issue;

pub use issue::{Dependency, DependencyType, Issue, Status};
