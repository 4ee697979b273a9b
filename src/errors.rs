//! Diagnostic error types for structure extraction
//!
//! This module defines [`ExtractError`], which represents every failure the
//! extractor can run into. None of them are fatal: the extractor resolves
//! each one locally (empty model, empty default, skipped construct kind) and
//! keeps the error only as a diagnostic on the returned
//! [`ParsedProgram`](crate::parser::records::ParsedProgram).

use crate::parser::patterns::ConstructKind;
use std::fmt;

/// Extraction diagnostics
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// Dialect tag not recognized by any pattern table
    UnsupportedDialect { tag: String },

    /// No source text was supplied
    EmptyInput,

    /// A match lacked a capture the construct cannot be recorded without
    MissingSlot {
        kind: ConstructKind,
        slot: &'static str,
        line: usize,
    },

    /// Any other failure while scanning one construct kind
    ScanFailure {
        kind: ConstructKind,
        message: String,
    },

    /// A rule pattern failed to compile
    InvalidPattern {
        kind: ConstructKind,
        message: String,
    },

    /// Step history exceeded its memory budget
    SnapshotLimitExceeded { current: usize, limit: usize },
}

impl ExtractError {
    /// Construct kind the error is isolated to, if any
    pub fn kind(&self) -> Option<ConstructKind> {
        match self {
            ExtractError::MissingSlot { kind, .. } => Some(*kind),
            ExtractError::ScanFailure { kind, .. } => Some(*kind),
            ExtractError::InvalidPattern { kind, .. } => Some(*kind),
            ExtractError::UnsupportedDialect { .. } => None,
            ExtractError::EmptyInput => None,
            ExtractError::SnapshotLimitExceeded { .. } => None,
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::UnsupportedDialect { tag } => {
                write!(f, "Unsupported language '{}'", tag)
            }
            ExtractError::EmptyInput => write!(f, "No code provided"),
            ExtractError::MissingSlot { kind, slot, line } => {
                write!(
                    f,
                    "{} match at line {} has no '{}' capture",
                    kind, line, slot
                )
            }
            ExtractError::ScanFailure { kind, message } => {
                write!(f, "Scanning {} constructs failed: {}", kind, message)
            }
            ExtractError::InvalidPattern { kind, message } => {
                write!(f, "Invalid {} pattern: {}", kind, message)
            }
            ExtractError::SnapshotLimitExceeded { current, limit } => {
                write!(
                    f,
                    "Snapshot memory limit exceeded: {} bytes used, limit is {}",
                    current, limit
                )
            }
        }
    }
}

impl std::error::Error for ExtractError {}
