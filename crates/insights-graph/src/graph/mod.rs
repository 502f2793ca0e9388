//! Dependency graph module (§4.2–§4.4).
//!
//! # Pipeline
//!
//! ```text
//! Vec<Issue>
//!        ↓  build::Graph::build()
//! Graph (DiGraph<String, ()>, possibly cyclic)
//!        ↓  stats::GraphStats::compute()      — Phase 1
//!        ↓  toposort::topological_order()     — Phase 1
//!        ↓  cycles::enumerate_cycles()        — Phase 2
//!        ↓  critical_path::compute()          — Phase 2, only if acyclic
//! ```
//!
//! Nothing here condenses strongly connected components into a DAG first —
//! `TopoOrder` is reported null when cycles exist rather than computed on a
//! condensed projection (§4.3), and [`cycles::enumerate_cycles`] walks the
//! raw graph directly via Johnson's algorithm to produce genuine elementary
//! cycles rather than SCC memberships.

pub mod build;
pub mod critical_path;
pub mod cycles;
pub mod stats;
pub mod toposort;

pub use build::Graph;
pub use cycles::{CycleReport, enumerate_cycles};
pub use stats::GraphStats;
pub use toposort::topological_order;
