//! # Introduction
//!
//! tracelens scans a JavaScript or Python snippet for syntactic constructs
//! (functions, variables, loops, conditions, classes, arrays, imports and
//! comments) and builds a synthetic, step-by-step execution trace from what it
//! finds. The trace drives a visualization: it can be serialized into a
//! prompt payload, dumped as JSON, or replayed in a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//! Source → Pattern table → Scanner (× 9 kinds) → ParsedProgram + trace → consumers
//! ```
//!
//! 1. [`parser`]: rule tables, the scan loop and the structural model.
//! 2. [`snapshot`]: the running execution state, timing entries and the
//!    per-step replay history.
//! 3. [`orchestrator`]: top-level entry and consumer hooks.
//! 4. [`prompt`]: request payloads for a generative-text service.
//! 5. [`ui`]: ratatui-based replay viewer; not part of the stable library API.
//!
//! ## Caveats
//!
//! This is a pattern scanner, not a parser. Each construct kind is matched
//! independently, so nested constructs can produce overlapping records, and
//! the trace follows extraction order rather than the order in which the code
//! would actually run.
//!
//! ```
//! use tracelens::orchestrator::parse;
//! use tracelens::parser::patterns::Dialect;
//!
//! let program = parse("nums = [1, 2, 3]", Dialect::Python);
//! assert_eq!(program.arrays[0].elements, vec!["1", "2", "3"]);
//! assert_eq!(program.execution.timing.len(), program.record_count());
//! ```

pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod snapshot;
pub mod ui;
