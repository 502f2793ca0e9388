//! Comprehensive error types for insights-core.
//!
//! Every error explains what went wrong, why, and how to fix it. Errors are
//! organized by category and carry stable machine-readable codes for
//! programmatic handling via `--json`.
//!
//! # Error Code Ranges
//!
//! | Range       | Category          |
//! |-------------|-------------------|
//! | E1xxx       | Input/config      |
//! | E2xxx       | Domain model      |
//! | E3xxx       | Baseline/integrity|
//! | E5xxx       | I/O and system    |
//! | E9xxx       | Internal          |
//!
//! Per the external-interfaces contract, only [`LoaderError::NotFound`],
//! [`LoaderError::NoUsableFile`], a required-but-missing [`BaselineError`],
//! and failure to serialize the final output envelope are ever fatal —
//! everything else degrades in place and surfaces as a warning instead.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Machine-readable error codes
// ---------------------------------------------------------------------------

/// Machine-readable error codes for `--json` consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InputNotFound,
    InputUnreadable,
    NoUsableFile,
    ConfigParseError,
    ConfigInvalidValue,
    InvalidEnumValue,
    UnknownDependencyTarget,
    BaselineMissing,
    BaselineVersionMismatch,
    BaselineWriteFailed,
    CacheCorrupt,
    SerializationFailure,
    AnalysisTimedOut,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InputNotFound => "E1001",
            Self::ConfigParseError => "E1002",
            Self::ConfigInvalidValue => "E1003",
            Self::InputUnreadable => "E1004",
            Self::NoUsableFile => "E1005",
            Self::InvalidEnumValue => "E2001",
            Self::UnknownDependencyTarget => "E2002",
            Self::BaselineMissing => "E3001",
            Self::BaselineVersionMismatch => "E3002",
            Self::BaselineWriteFailed => "E3003",
            Self::CacheCorrupt => "E3004",
            Self::SerializationFailure => "E5001",
            Self::AnalysisTimedOut => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InputNotFound => "No issue file found",
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigInvalidValue => "Invalid config value",
            Self::InputUnreadable => "Issue file could not be read",
            Self::NoUsableFile => "Issue file had no usable records",
            Self::InvalidEnumValue => "Invalid enum value in issue record",
            Self::UnknownDependencyTarget => "Dependency references unknown issue id",
            Self::BaselineMissing => "Baseline not found",
            Self::BaselineVersionMismatch => "Baseline schema version mismatch",
            Self::BaselineWriteFailed => "Failed to write baseline",
            Self::CacheCorrupt => "Analysis cache entry was corrupt",
            Self::SerializationFailure => "Failed to serialize output",
            Self::AnalysisTimedOut => "Analysis exceeded its deadline",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InputNotFound => {
                Some("Pass --input with an explicit path, or create beads.jsonl.")
            }
            Self::ConfigParseError => Some("Fix the TOML syntax in .insights/config.toml."),
            Self::ConfigInvalidValue => Some("Check .insights/config.toml for the invalid key."),
            Self::InputUnreadable => Some("Check file permissions on the issue file."),
            Self::NoUsableFile => Some("Inspect the file; every line failed to parse or validate."),
            Self::InvalidEnumValue => Some("Use one of the documented status/dependency values."),
            Self::UnknownDependencyTarget => {
                Some("The edge is dropped and reported; fix the source data if unintended.")
            }
            Self::BaselineMissing => Some("Run `insights baseline save` first."),
            Self::BaselineVersionMismatch => Some("Re-run `insights baseline save` to regenerate it."),
            Self::BaselineWriteFailed => Some("Check disk space and directory permissions."),
            Self::CacheCorrupt => Some("The entry is discarded and recomputed automatically."),
            Self::SerializationFailure => Some("Report a bug with the input that triggered it."),
            Self::AnalysisTimedOut => Some("Increase the deadline or use a smaller analysis tier."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// LoaderError
// ---------------------------------------------------------------------------

/// Errors raised while locating or reading the JSONL issue file.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error(
        "Error: No issue file found in {dir}\nCause: none of beads.jsonl, beads.base.jsonl, issues.jsonl exist (or all are empty/backup artifacts)\nFix: pass an explicit --input path, or create one of the canonical filenames"
    )]
    NotFound { dir: PathBuf },

    #[error(
        "Error: Could not read {path}\nCause: {source}\nFix: check file permissions and that the path is a regular file"
    )]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Error: {path} was found but contained no usable issue records\nCause: every line was blank, malformed JSON, or failed semantic validation\nFix: inspect the file for corruption; {skipped} line(s) were skipped"
    )]
    NoUsableFile { path: PathBuf, skipped: usize },
}

impl LoaderError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::InputNotFound,
            Self::Unreadable { .. } => ErrorCode::InputUnreadable,
            Self::NoUsableFile { .. } => ErrorCode::NoUsableFile,
        }
    }

    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code().hint().unwrap_or_default().to_string()
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors raised parsing an optional `.insights/config.toml`.
///
/// Per the error-handling design, these never propagate past
/// [`crate::config::AnalysisConfig::load`] — callers fall back to
/// [`Default`] and log a warning — but the type is public so the CLI can
/// report what was wrong when `--verbose` is set.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Error: Could not read config file {path}\nCause: {source}\nFix: check file permissions, or delete the file to use defaults"
    )]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Error: Failed to parse config file at {path}\nCause: {reason}\nFix: fix the TOML syntax, or delete the file to fall back to defaults"
    )]
    ParseFailed { path: PathBuf, reason: String },

    #[error(
        "Error: Invalid config value for '{key}': '{value}'\nCause: {reason}\nFix: edit {path} and correct the value for '{key}'"
    )]
    InvalidValue {
        path: PathBuf,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Unreadable { .. } => ErrorCode::InputUnreadable,
            Self::ParseFailed { .. } => ErrorCode::ConfigParseError,
            Self::InvalidValue { .. } => ErrorCode::ConfigInvalidValue,
        }
    }
}

// ---------------------------------------------------------------------------
// BaselineError
// ---------------------------------------------------------------------------

/// Errors raised loading or saving a persisted baseline.
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error(
        "Error: No baseline found at {path}\nCause: `insights baseline save` has not been run yet\nFix: run `insights baseline save` to create one, or pass --baseline with an explicit path"
    )]
    Missing { path: PathBuf },

    #[error(
        "Error: Baseline at {path} is schema version {found}, expected {expected}\nCause: the baseline was written by an incompatible version of this tool\nFix: re-run `insights baseline save` to regenerate it"
    )]
    VersionMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error(
        "Error: Failed to write baseline to {path}\nCause: {source}\nFix: check disk space and directory permissions"
    )]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Error: Baseline at {path} is corrupt\nCause: {reason}\nFix: delete it and run `insights baseline save` again"
    )]
    Corrupt { path: PathBuf, reason: String },
}

impl BaselineError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Missing { .. } => ErrorCode::BaselineMissing,
            Self::VersionMismatch { .. } => ErrorCode::BaselineVersionMismatch,
            Self::WriteFailed { .. } => ErrorCode::BaselineWriteFailed,
            Self::Corrupt { .. } => ErrorCode::CacheCorrupt,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level InsightsError
// ---------------------------------------------------------------------------

/// Top-level error type stitching the category errors together for callers
/// that want a single `?`-able type (mainly the CLI).
#[derive(Debug, thiserror::Error)]
pub enum InsightsError {
    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Baseline(#[from] BaselineError),

    #[error(
        "Error: Failed to serialize output JSON\nCause: {source}\nFix: this is an internal error; please report it with the input that triggered it"
    )]
    Serialization {
        #[source]
        source: serde_json::Error,
    },
}

impl InsightsError {
    /// Machine-readable error code for `--json` output (e.g., `"E1001"`).
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Loader(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Baseline(e) => e.error_code(),
            Self::Serialization { .. } => ErrorCode::SerializationFailure,
        }
    }

    /// Human-readable suggestion for how to fix the error.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code().hint().unwrap_or_default().to_string()
    }

    /// Structured error payload for JSON serialization.
    #[must_use]
    pub fn to_json_error(&self) -> JsonError {
        JsonError {
            error_code: self.error_code().code().to_string(),
            message: self.to_string(),
            suggestion: self.suggestion(),
        }
    }
}

/// JSON-serializable error payload for `--json` mode.
#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    pub error_code: String,
    pub message: String,
    pub suggestion: String,
}
