//! Source structure extraction
//!
//! This module turns raw source text into a [`records::ParsedProgram`]:
//! - [`lines`]: offset → line conversion and body line records
//! - [`patterns`]: per-dialect rule tables ([`patterns::Dialect`], [`patterns::PatternTable`])
//! - [`scanner`]: the non-overlapping, cursor-advancing match loop
//! - [`extractor`]: runs one scan per construct kind and feeds the trace
//! - [`records`]: the structural model
//!
//! # Supported dialects
//!
//! JavaScript and Python. Anything else yields an empty model tagged
//! `unsupported`.
//!
//! # Scope
//!
//! This is a best-effort pattern scanner, not a parser: there is no syntax
//! tree, no scope resolution and no evaluation. Nested constructs are matched
//! independently by each kind's rule and may appear more than once.

pub mod extractor;
pub mod lines;
pub mod patterns;
pub mod records;
pub mod scanner;
