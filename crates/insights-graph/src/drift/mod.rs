//! Drift calculator (§4.8): compares a [`Baseline`](insights_core::baseline::Baseline)
//! against the current [`DerivedStats`](crate::analyzer::DerivedStats) and
//! issue set, emitting alerts a CI pipeline can gate on.

pub mod alerts;

pub use alerts::{Alert, Severity, compute_alerts, exit_code};
