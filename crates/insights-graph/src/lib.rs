#![forbid(unsafe_code)]
//! Dependency-graph analysis engine for `insights` (§4).
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` for fallible entry points; structural
//!   parsing errors use [`insights_core::error`] types.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub use insights_core::config;

pub mod analyzer;
pub mod cache;
pub mod diff;
pub mod drift;
pub mod graph;
pub mod metrics;
pub mod score;
pub mod triage;

use tracing::{info, instrument};

#[instrument]
pub fn init() {
    info!("insights-graph initialized");
}
