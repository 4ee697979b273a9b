//! Structure extraction: one scan per construct kind
//!
//! The extractor runs the nine construct scans in the fixed order of
//! [`ConstructKind::ALL`]. Records of a kind are complete before the next kind
//! starts, while the trace builder is fed inline with every match. The
//! resulting timeline therefore follows extraction order, not the order in
//! which the program would run.
//!
//! Kinds are scanned independently, so nested constructs show up once per
//! kind that matches them (a `let` inside a function body is also a variable
//! record). This duplication is intentional.
//!
//! # Failure policy
//!
//! - empty source and unsupported dialects return an empty model immediately
//! - a failing kind is logged, recorded in `diagnostics` and skipped
//! - a panic while scanning one kind is caught; the half-recorded match is
//!   rolled back and the remaining kinds still run

use super::patterns::{slot, ConstructKind, Dialect, PatternTable};
use super::records::*;
use super::scanner::{scan, ScanHit};
use crate::config::ExtractOptions;
use crate::errors::ExtractError;
use crate::snapshot::{MemoryValue, StateUpdate, StepOrigin, TraceBuilder};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

/// Extracts a [`ParsedProgram`] from source text
#[derive(Debug, Clone, Default)]
pub struct StructureExtractor {
    options: ExtractOptions,
}

impl StructureExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        StructureExtractor { options }
    }

    /// Extract the structure of `source` using the built-in rules for
    /// `dialect`. Never fails; see the module docs for the failure policy.
    pub fn extract(&self, source: &str, dialect: Dialect) -> ParsedProgram {
        self.extract_with_table(source, dialect, PatternTable::for_dialect(dialect))
    }

    /// Same as [`extract`](Self::extract) with a caller-supplied rule table.
    ///
    /// An empty table is treated like an unsupported dialect.
    pub fn extract_with_table(
        &self,
        source: &str,
        dialect: Dialect,
        table: &PatternTable,
    ) -> ParsedProgram {
        let mut program = ParsedProgram::new(dialect, self.options.snapshot_memory_limit);

        if source.is_empty() {
            warn!("No code provided.");
            program.status = ParseStatus::EmptyInput;
            program.diagnostics.push(ExtractError::EmptyInput);
            return program;
        }

        if !dialect.is_supported() || table.is_empty() {
            warn!(language = %dialect, "Unsupported language.");
            program.language = Dialect::Unsupported;
            program.status = ParseStatus::UnsupportedDialect;
            program.diagnostics.push(ExtractError::UnsupportedDialect {
                tag: dialect.to_string(),
            });
            return program;
        }

        self.scan_all(&mut program, source, table, handle_match);
        program
    }

    fn scan_all<H>(
        &self,
        program: &mut ParsedProgram,
        source: &str,
        table: &PatternTable,
        mut on_hit: H,
    ) where
        H: FnMut(
            &mut ParsedProgram,
            &mut TraceBuilder,
            ConstructKind,
            ScanHit<'_>,
        ) -> Result<(), ExtractError>,
    {
        let mut tracer = TraceBuilder::new(&self.options);

        for kind in ConstructKind::ALL {
            let Some(rule) = table.rule(kind) else {
                debug!(%kind, "no rule for construct kind");
                continue;
            };

            let records_before = program.records_of(kind);
            let steps_before = program.execution.steps();

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                scan(source, rule, |hit| on_hit(&mut *program, &mut tracer, kind, hit))
            }));

            let result = outcome.unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                error!(%kind, %message, "construct scan panicked; continuing");
                discard_incomplete_match(program, kind, records_before, steps_before);
                Err(ExtractError::ScanFailure { kind, message })
            });

            match result {
                Ok(count) => debug!(%kind, count, "scanned construct kind"),
                Err(e) => {
                    warn!(%kind, error = %e, "construct scan failed; continuing");
                    program.status = ParseStatus::Partial;
                    program.diagnostics.push(e);
                }
            }
        }
    }
}

/// Keep only the matches of `kind` that got both a record and a step
fn discard_incomplete_match(
    program: &mut ParsedProgram,
    kind: ConstructKind,
    records_before: usize,
    steps_before: usize,
) {
    let records_added = program.records_of(kind).saturating_sub(records_before);
    let steps_added = program.execution.steps().saturating_sub(steps_before);
    let complete = records_added.min(steps_added);

    program.truncate_records(kind, records_before + complete);
    program.execution.timing.truncate(steps_before + complete);
    program.history.truncate_steps(steps_before + complete);
}

/// Record one match and feed the trace
fn handle_match(
    program: &mut ParsedProgram,
    tracer: &mut TraceBuilder,
    kind: ConstructKind,
    hit: ScanHit<'_>,
) -> Result<(), ExtractError> {
    let ScanHit {
        matched,
        start_line,
        end_line,
        body,
    } = hit;

    let required = |name: &'static str| {
        matched.slot(name).ok_or(ExtractError::MissingSlot {
            kind,
            slot: name,
            line: start_line,
        })
    };

    let update = match kind {
        ConstructKind::Function => {
            let name = required(slot::NAME)?.to_string();
            program.functions.push(FunctionRecord {
                name: name.clone(),
                start_line,
                end_line,
                parameters: split_list(matched.slot_or_empty(slot::PARAMS)),
                body,
            });

            let mut stack = program.execution.call_stack.clone();
            stack.push(name.clone());
            Some(StateUpdate::new().function(name).call_stack(stack))
        }
        ConstructKind::Variable => {
            let name = required(slot::NAME)?.to_string();
            program.variables.push(VariableRecord {
                name: name.clone(),
                line: start_line,
                value: UNKNOWN_VALUE.to_string(),
            });
            Some(StateUpdate::new().write(name, MemoryValue::Unknown))
        }
        ConstructKind::Loop => {
            let (header, label) = match matched.slot(slot::HEADER) {
                Some(raw) => {
                    let mut parts = raw.split(';');
                    let mut next = || parts.next().unwrap_or("").to_string();
                    let header = LoopHeader::Counting {
                        initialization: next(),
                        condition: next(),
                        increment: next(),
                    };
                    (header, format!("for ({})", raw))
                }
                None => {
                    let variable = matched.slot_or_empty(slot::VAR).to_string();
                    let iterable = matched.slot_or_empty(slot::ITER).to_string();
                    let label = format!("for {} in {}", variable, iterable);
                    (LoopHeader::Iterating { variable, iterable }, label)
                }
            };

            program.loops.push(LoopRecord {
                kind: LoopKind::For,
                start_line,
                end_line,
                header,
                body,
            });
            Some(StateUpdate::new().loop_header(label).line(start_line))
        }
        ConstructKind::Condition => {
            let condition = matched.slot_or_empty(slot::COND).trim().to_string();
            program.conditions.push(ConditionRecord {
                kind: ConditionKind::If,
                start_line,
                end_line,
                condition: condition.clone(),
                body,
            });
            Some(StateUpdate::new().condition(condition).line(start_line))
        }
        ConstructKind::Class => {
            let name = required(slot::NAME)?.to_string();
            program.classes.push(ClassRecord {
                name: name.clone(),
                start_line,
                end_line,
                methods: Vec::new(),
            });
            Some(StateUpdate::new().class(name))
        }
        ConstructKind::Array => {
            let name = required(slot::NAME)?.to_string();
            let elements = split_list(matched.slot_or_empty(slot::ELEMENTS));
            program.arrays.push(ArrayRecord {
                name: name.clone(),
                size: elements.len(),
                elements: elements.clone(),
                start_line,
                end_line,
            });
            Some(StateUpdate::new().write(name, MemoryValue::Elements(elements)))
        }
        ConstructKind::Import => {
            program.imports.push(ImportRecord {
                module: required(slot::MODULE)?.to_string(),
                line: start_line,
            });
            None
        }
        ConstructKind::SingleLineComment => {
            program.comments.push(CommentRecord {
                kind: CommentKind::SingleLine,
                content: matched.slot_or_empty(slot::CONTENT).trim().to_string(),
                span: CommentSpan::Line { line: start_line },
            });
            None
        }
        ConstructKind::MultiLineComment => {
            program.comments.push(CommentRecord {
                kind: CommentKind::MultiLine,
                content: matched.slot_or_empty(slot::CONTENT).trim().to_string(),
                span: CommentSpan::Block {
                    start_line,
                    end_line,
                },
            });
            None
        }
    };

    let origin = StepOrigin {
        kind,
        start_line,
        end_line,
    };
    tracer.on_match(program, origin, update);
    Ok(())
}

/// Split a comma-separated capture into trimmed items; blank input is empty
fn split_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::patterns::RuleSpec;

    fn extractor() -> StructureExtractor {
        StructureExtractor::new(ExtractOptions::default().with_seed(1))
    }

    #[test]
    fn test_split_list() {
        assert!(split_list("").is_empty());
        assert!(split_list("   ").is_empty());
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("1,"), vec!["1", ""]);
    }

    #[test]
    fn test_function_without_parameters() {
        let program = extractor().extract("function f() {}", Dialect::JavaScript);
        assert_eq!(program.functions.len(), 1);
        assert!(program.functions[0].parameters.is_empty());
        assert!(program.functions[0].body.is_empty());
    }

    #[test]
    fn test_loop_header_missing_pieces_default_to_empty() {
        let program = extractor().extract("for (x of xs) {\n}", Dialect::JavaScript);
        assert_eq!(program.loops.len(), 1);
        assert_eq!(
            program.loops[0].header,
            LoopHeader::Counting {
                initialization: "x of xs".to_string(),
                condition: String::new(),
                increment: String::new(),
            }
        );
        assert_eq!(
            program.execution.current_loop.as_deref(),
            Some("for (x of xs)")
        );
    }

    #[test]
    fn test_missing_required_slot_skips_only_that_kind() {
        let table = PatternTable::from_specs(&[
            RuleSpec::new(ConstructKind::Function, r"fn\s+\w+"),
            RuleSpec::new(ConstructKind::Import, r"use\s+(?P<module>\w+)"),
        ])
        .unwrap();

        let source = "use alpha\nfn one\nuse beta";
        let program = extractor().extract_with_table(source, Dialect::JavaScript, &table);

        assert_eq!(program.status, ParseStatus::Partial);
        assert!(program.functions.is_empty());
        assert_eq!(program.imports.len(), 2);
        assert_eq!(program.execution.timing.len(), 2);
        assert!(matches!(
            program.diagnostics[0],
            ExtractError::MissingSlot {
                kind: ConstructKind::Function,
                slot: "name",
                line: 2
            }
        ));
    }

    #[test]
    fn test_panicking_kind_does_not_stop_later_kinds() {
        let source = "function f(a) {\n}\nfor (;;) {\n}\nfor (;;) {\n}\nif (x) {\n}\n// note";
        let table = PatternTable::for_dialect(Dialect::JavaScript);
        let mut program = ParsedProgram::new(Dialect::JavaScript, usize::MAX);

        let mut loop_hits = 0;
        extractor().scan_all(&mut program, source, table, |program, tracer, kind, hit| {
            if kind == ConstructKind::Loop {
                loop_hits += 1;
                if loop_hits == 2 {
                    // Half-recorded match: record pushed, no step yet
                    let copy = program.loops[0].clone();
                    program.loops.push(copy);
                    panic!("loop handler failed");
                }
            }
            handle_match(program, tracer, kind, hit)
        });

        assert_eq!(program.status, ParseStatus::Partial);
        assert_eq!(
            program.diagnostics,
            vec![ExtractError::ScanFailure {
                kind: ConstructKind::Loop,
                message: "loop handler failed".to_string(),
            }]
        );

        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.loops.len(), 1);
        assert_eq!(program.conditions.len(), 1);
        assert_eq!(program.comments.len(), 1);
        assert_eq!(program.execution.timing.len(), program.record_count());
        assert_eq!(program.history.len(), program.record_count());
        assert_eq!(program.history.get(2).map(|s| s.origin.kind), Some(ConstructKind::Condition));
    }

    #[test]
    fn test_empty_table_is_unsupported() {
        let table = PatternTable::from_specs(&[]).unwrap();
        let program = extractor().extract_with_table("let x", Dialect::JavaScript, &table);
        assert_eq!(program.language, Dialect::Unsupported);
        assert_eq!(program.status, ParseStatus::UnsupportedDialect);
    }
}
