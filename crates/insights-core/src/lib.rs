#![forbid(unsafe_code)]
//! insights-core: the read-only issue model, loader, config, and hashing
//! layer the graph and CLI crates build on.
//!
//! This crate deliberately performs no filesystem I/O beyond [`loader`]
//! (reading the issue file) and [`baseline`] (reading/writing the baseline
//! JSON it is explicitly pointed at) — everything else is pure data and
//! computation, so [`insights_graph`](../insights_graph/index.html) and the
//! CLI can drive it from any source.

pub mod baseline;
pub mod config;
pub mod error;
pub mod hash;
pub mod loader;
pub mod model;
pub mod timing;

use tracing::{info, instrument};

/// # Conventions
///
/// - **Errors**: category-specific `thiserror` enums in [`error`]; the CLI
///   composes them behind `anyhow::Result` with `.context(...)`.
/// - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`,
///   `#[instrument]`) at module boundaries and inside long-running loops.
#[instrument]
pub fn init() {
    info!("insights-core initialized");
}
