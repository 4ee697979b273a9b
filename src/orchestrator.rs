//! Top-level entry point and consumer hooks

use crate::config::ExtractOptions;
use crate::parser::extractor::StructureExtractor;
use crate::parser::patterns::Dialect;
use crate::parser::records::{ParseStatus, ParsedProgram};

/// Receives finished models
///
/// Closures taking `&ParsedProgram` implement this trait as a completion hook.
pub trait ParseConsumer {
    /// Called with the finished model when extraction actually ran (every
    /// kind scanned, possibly with some kinds skipped after a failure).
    fn on_parse_complete(&mut self, program: &ParsedProgram);

    /// Called with every result, including empty and interrupted ones
    fn set_parsed_data(&mut self, _program: &ParsedProgram) {}
}

impl<F> ParseConsumer for F
where
    F: FnMut(&ParsedProgram),
{
    fn on_parse_complete(&mut self, program: &ParsedProgram) {
        self(program)
    }
}

/// Runs extractions and hands results to consumers
///
/// Holds only immutable options, so one orchestrator can serve any number of
/// calls, including concurrent ones; every call gets its own model.
#[derive(Debug, Clone, Default)]
pub struct ParseOrchestrator {
    extractor: StructureExtractor,
}

impl ParseOrchestrator {
    pub fn new(options: ExtractOptions) -> Self {
        ParseOrchestrator {
            extractor: StructureExtractor::new(options),
        }
    }

    /// Extract `source` and return the model
    pub fn run(&self, source: &str, dialect: Dialect) -> ParsedProgram {
        self.extractor.extract(source, dialect)
    }

    /// Extract `source`, notify `consumer`, then return the same model
    pub fn run_with<C>(&self, source: &str, dialect: Dialect, consumer: &mut C) -> ParsedProgram
    where
        C: ParseConsumer + ?Sized,
    {
        let program = self.run(source, dialect);

        if matches!(program.status, ParseStatus::Complete | ParseStatus::Partial) {
            consumer.on_parse_complete(&program);
        }
        consumer.set_parsed_data(&program);

        program
    }
}

/// Extract with default options
pub fn parse(source: &str, dialect: Dialect) -> ParsedProgram {
    ParseOrchestrator::default().run(source, dialect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        completed: Vec<usize>,
        set: usize,
    }

    impl ParseConsumer for Recorder {
        fn on_parse_complete(&mut self, program: &ParsedProgram) {
            self.completed.push(program.record_count());
        }

        fn set_parsed_data(&mut self, _program: &ParsedProgram) {
            self.set += 1;
        }
    }

    #[test]
    fn test_closure_hook_sees_the_returned_model() {
        let orchestrator = ParseOrchestrator::default();
        let mut seen = None;
        let program = orchestrator.run_with("import os", Dialect::Python, &mut |p: &ParsedProgram| {
            seen = Some(p.imports.len());
        });

        assert_eq!(seen, Some(1));
        assert_eq!(program.imports[0].module, "os");
    }

    #[test]
    fn test_hooks_on_short_circuit() {
        let orchestrator = ParseOrchestrator::default();
        let mut recorder = Recorder::default();

        orchestrator.run_with("", Dialect::JavaScript, &mut recorder);
        orchestrator.run_with("x = 1", Dialect::Unsupported, &mut recorder);
        orchestrator.run_with("let y", Dialect::JavaScript, &mut recorder);

        assert_eq!(recorder.completed, vec![1]);
        assert_eq!(recorder.set, 3);
    }
}
