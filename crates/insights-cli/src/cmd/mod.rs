pub mod analyze;
pub mod baseline;
pub mod completions;
pub mod diff;
pub mod drift;
pub mod plan;
pub mod recommend;
pub mod support;
pub mod triage;
