// Integration tests for the execution trace, step history and payloads

use tracelens::config::{ExtractOptions, DEFAULT_MAX_STEP_MS};
use tracelens::errors::ExtractError;
use tracelens::orchestrator::{parse, ParseConsumer, ParseOrchestrator};
use tracelens::parser::extractor::StructureExtractor;
use tracelens::parser::patterns::{ConstructKind, Dialect, PatternTable, RuleSpec};
use tracelens::parser::records::{ParseStatus, ParsedProgram};
use tracelens::prompt::{build_request, PromptKind};
use tracelens::snapshot::MemoryValue;

const SAMPLE: &str = "import fs from 'fs';\n\
                      // sum things\n\
                      function sum(xs) {\n  return xs;\n}\n\
                      const data = [4, 5];\n\
                      if (data) {\n  sum(data);\n}\n\
                      /* end */";

#[test]
fn test_timing_steps_are_sequential() {
    let program = parse(SAMPLE, Dialect::JavaScript);

    let steps: Vec<usize> = program.execution.timing.iter().map(|t| t.step).collect();
    let expected: Vec<usize> = (1..=program.record_count()).collect();
    assert_eq!(steps, expected);

    for entry in &program.execution.timing {
        assert!(
            (0.0..DEFAULT_MAX_STEP_MS).contains(&entry.execution_time_ms),
            "duration out of range: {:?}",
            entry
        );
    }
}

#[test]
fn test_serialized_field_names() {
    let program = parse(SAMPLE, Dialect::JavaScript);
    let value: serde_json::Value = serde_json::from_str(&program.to_json().unwrap()).unwrap();

    assert_eq!(value["language"], "javascript");

    let function = &value["functions"][0];
    assert_eq!(function["name"], "sum");
    assert_eq!(function["startLine"], 3);
    assert_eq!(function["endLine"], 5);
    assert_eq!(function["parameters"][0], "xs");
    assert_eq!(function["body"][1]["trimmed"], "return xs;");

    assert_eq!(value["variables"][0]["name"], "data");
    assert_eq!(value["variables"][0]["value"], "unknown");
    assert_eq!(value["conditions"][0]["type"], "if");
    assert_eq!(value["conditions"][0]["condition"], "data");
    assert_eq!(value["imports"][0]["module"], "fs");
    assert_eq!(value["arrays"][0]["size"], 2);

    let comments = value["comments"].as_array().unwrap();
    assert_eq!(comments[0]["type"], "singleLine");
    assert_eq!(comments[0]["line"], 2);
    assert_eq!(comments[1]["type"], "multiLine");
    assert_eq!(comments[1]["startLine"], 10);
    assert_eq!(comments[1]["endLine"], 10);

    let execution = &value["execution"];
    assert_eq!(execution["currentFunction"], "sum");
    assert_eq!(execution["currentCondition"], "data");
    assert_eq!(execution["currentLine"], 7);
    assert!(execution["currentLoop"].is_null());
    assert_eq!(execution["callStack"][0], "sum");
    assert_eq!(execution["memoryState"]["data"][1], "5");
    assert_eq!(execution["timing"][0]["step"], 1);
    assert!(execution["timing"][0]["executionTimeMs"].is_f64());

    for hidden in ["status", "diagnostics", "history"] {
        assert!(value.get(hidden).is_none(), "{} should not be serialized", hidden);
    }
}

#[test]
fn test_loop_record_shapes() {
    let js = parse("for (let i = 0; i < 2; i++) {\n}", Dialect::JavaScript);
    let value = serde_json::to_value(&js).unwrap();
    let lp = &value["loops"][0];
    assert_eq!(lp["type"], "for");
    assert_eq!(lp["initialization"], "let i = 0");
    assert_eq!(lp["condition"], " i < 2");
    assert_eq!(lp["increment"], " i++");
    assert!(lp.get("variable").is_none());

    let py = parse("for n in nums:\n    print(n)", Dialect::Python);
    let value = serde_json::to_value(&py).unwrap();
    let lp = &value["loops"][0];
    assert_eq!(lp["type"], "for");
    assert_eq!(lp["variable"], "n");
    assert_eq!(lp["iterable"], "nums");
    assert!(lp.get("initialization").is_none());
}

#[test]
fn test_history_replays_every_step() {
    let program = parse(SAMPLE, Dialect::JavaScript);
    assert_eq!(program.history.len(), program.execution.steps());
    assert!(!program.history.is_truncated());

    // Variables are scanned before arrays, so `data` is first unknown
    let first_write = program
        .history
        .iter()
        .find(|s| s.memory_state.contains_key("data"))
        .expect("variable step");
    assert_eq!(first_write.origin.kind, ConstructKind::Variable);
    assert_eq!(first_write.memory_state["data"], MemoryValue::Unknown);

    let last = program.history.get(program.history.len() - 1).unwrap();
    assert_eq!(last.step, program.execution.steps());
    assert_eq!(last.memory_state, program.execution.memory_state);
    assert_eq!(last.origin.kind, ConstructKind::MultiLineComment);
}

#[test]
fn test_history_can_be_disabled() {
    let orchestrator = ParseOrchestrator::new(ExtractOptions::default().without_history());
    let program = orchestrator.run(SAMPLE, Dialect::JavaScript);
    assert!(program.history.is_empty());
    assert_eq!(program.execution.steps(), program.record_count());
}

#[test]
fn test_history_budget_truncates_without_losing_steps() {
    let options = ExtractOptions {
        snapshot_memory_limit: 400,
        ..ExtractOptions::default()
    };
    let program = ParseOrchestrator::new(options).run("let a;\nlet b;\nlet c;", Dialect::JavaScript);

    assert_eq!(program.status, ParseStatus::Complete);
    assert_eq!(program.execution.timing.len(), 3);
    assert_eq!(program.history.len(), 1);
    assert!(program.history.is_truncated());
    assert_eq!(program.history.memory_usage(), 177);
    assert_eq!(program.history.memory_limit(), 400);
    assert_eq!(
        program.diagnostics,
        vec![ExtractError::SnapshotLimitExceeded {
            current: 177,
            limit: 400
        }]
    );
}

#[test]
fn test_custom_table_skips_kinds_without_rules() {
    let specs = [RuleSpec::new(
        ConstructKind::Import,
        r#"require\(['"](?P<module>[^'"]+)['"]\)"#,
    )];
    let table = PatternTable::from_specs(&specs).unwrap();
    let extractor = StructureExtractor::new(ExtractOptions::default());

    let program = extractor.extract_with_table(
        "const fs = require('fs');\nlet x = [1];",
        Dialect::JavaScript,
        &table,
    );
    assert_eq!(program.status, ParseStatus::Complete);
    assert_eq!(program.imports.len(), 1);
    assert_eq!(program.imports[0].module, "fs");
    assert_eq!(program.record_count(), 1);
    assert_eq!(program.execution.timing.len(), 1);
}

#[test]
fn test_invalid_custom_pattern_is_rejected() {
    let specs = [RuleSpec::new(ConstructKind::Class, r"class (?P<name>")];
    match PatternTable::from_specs(&specs) {
        Err(ExtractError::InvalidPattern { kind, .. }) => assert_eq!(kind, ConstructKind::Class),
        other => panic!("expected InvalidPattern, got {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn test_consumer_receives_the_returned_model() {
    struct Collector {
        completed: Vec<usize>,
        latest_status: Option<ParseStatus>,
    }

    impl ParseConsumer for Collector {
        fn on_parse_complete(&mut self, program: &ParsedProgram) {
            self.completed.push(program.execution.steps());
        }

        fn set_parsed_data(&mut self, program: &ParsedProgram) {
            self.latest_status = Some(program.status);
        }
    }

    let orchestrator = ParseOrchestrator::default();
    let mut collector = Collector {
        completed: Vec::new(),
        latest_status: None,
    };

    let program = orchestrator.run_with(SAMPLE, Dialect::JavaScript, &mut collector);
    assert_eq!(collector.completed, vec![program.execution.steps()]);
    assert_eq!(collector.latest_status, Some(ParseStatus::Complete));

    orchestrator.run_with("", Dialect::Python, &mut collector);
    assert_eq!(collector.completed.len(), 1);
    assert_eq!(collector.latest_status, Some(ParseStatus::EmptyInput));
}

#[test]
fn test_request_bodies() {
    let source = "values = [3, 1, 2]\nfor v in values:\n    print(v)";
    let program = parse(source, Dialect::Python);

    let body = build_request(PromptKind::Visualize, &program, source).unwrap();
    let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    let prompt: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(prompt["fileFormat"], "html");
    assert_eq!(prompt["code"], source);
    assert_eq!(prompt["parsedData"]["arrays"][0]["elements"][0], "3");
    assert_eq!(prompt["parsedData"]["loops"][0]["iterable"], "values");

    let body = build_request(PromptKind::Explain, &program, source).unwrap();
    let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    let prompt: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(prompt["language"], "python");
    assert!(prompt.get("parsedData").is_none());
}
