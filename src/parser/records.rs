//! Structural model produced by the extractor
//!
//! A [`ParsedProgram`] is created fresh for every extraction call and owns
//! all of its records together with the [`ExecutionState`]. The serialized
//! form (camelCase keys) is the payload handed to downstream consumers.

use super::lines::BodyLine;
use super::patterns::{ConstructKind, Dialect};
use crate::errors::ExtractError;
use crate::snapshot::{ExecutionState, SnapshotManager};
use serde::Serialize;

/// Placeholder value for variables; the extractor never evaluates code
pub const UNKNOWN_VALUE: &str = "unknown";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionRecord {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub parameters: Vec<String>,
    pub body: Vec<BodyLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRecord {
    pub name: String,
    pub line: usize,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopKind {
    For,
}

/// Dialect-specific loop header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LoopHeader {
    /// `for (init; cond; step)`; pieces are kept raw, untrimmed
    Counting {
        initialization: String,
        condition: String,
        increment: String,
    },
    /// `for var in iterable`
    Iterating { variable: String, iterable: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopRecord {
    #[serde(rename = "type")]
    pub kind: LoopKind,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(flatten)]
    pub header: LoopHeader,
    pub body: Vec<BodyLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    If,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRecord {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    pub start_line: usize,
    pub end_line: usize,
    pub condition: String,
    pub body: Vec<BodyLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    /// Never populated; method extraction is not performed
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub module: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentKind {
    SingleLine,
    MultiLine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommentSpan {
    Line {
        line: usize,
    },
    Block {
        #[serde(rename = "startLine")]
        start_line: usize,
        #[serde(rename = "endLine")]
        end_line: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub content: String,
    #[serde(flatten)]
    pub span: CommentSpan,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayRecord {
    pub name: String,
    pub size: usize,
    pub elements: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
}

/// How an extraction call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseStatus {
    /// Every construct kind was scanned without failure
    #[default]
    Complete,
    /// At least one construct kind failed; its remaining matches were skipped
    Partial,
    EmptyInput,
    UnsupportedDialect,
}

/// Root result of one extraction call
///
/// Note that `execution.timing` narrates *extraction order* (construct kind
/// first, match order second), not program execution order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProgram {
    pub language: Dialect,
    pub functions: Vec<FunctionRecord>,
    pub variables: Vec<VariableRecord>,
    pub loops: Vec<LoopRecord>,
    pub conditions: Vec<ConditionRecord>,
    pub classes: Vec<ClassRecord>,
    pub imports: Vec<ImportRecord>,
    pub comments: Vec<CommentRecord>,
    pub arrays: Vec<ArrayRecord>,
    pub execution: ExecutionState,

    #[serde(skip)]
    pub status: ParseStatus,
    #[serde(skip)]
    pub diagnostics: Vec<ExtractError>,
    /// Per-step state for replay
    #[serde(skip)]
    pub history: SnapshotManager,
}

impl ParsedProgram {
    pub fn new(language: Dialect, snapshot_memory_limit: usize) -> Self {
        ParsedProgram {
            language,
            functions: Vec::new(),
            variables: Vec::new(),
            loops: Vec::new(),
            conditions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            comments: Vec::new(),
            arrays: Vec::new(),
            execution: ExecutionState::default(),
            status: ParseStatus::Complete,
            diagnostics: Vec::new(),
            history: SnapshotManager::new(snapshot_memory_limit),
        }
    }

    /// Total number of structural records across all construct kinds
    pub fn record_count(&self) -> usize {
        self.functions.len()
            + self.variables.len()
            + self.loops.len()
            + self.conditions.len()
            + self.classes.len()
            + self.imports.len()
            + self.comments.len()
            + self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Length of the collection `kind` records into. Both comment kinds share
    /// `comments`.
    pub(crate) fn records_of(&self, kind: ConstructKind) -> usize {
        match kind {
            ConstructKind::Function => self.functions.len(),
            ConstructKind::Variable => self.variables.len(),
            ConstructKind::Loop => self.loops.len(),
            ConstructKind::Condition => self.conditions.len(),
            ConstructKind::Class => self.classes.len(),
            ConstructKind::Array => self.arrays.len(),
            ConstructKind::Import => self.imports.len(),
            ConstructKind::SingleLineComment | ConstructKind::MultiLineComment => {
                self.comments.len()
            }
        }
    }

    pub(crate) fn truncate_records(&mut self, kind: ConstructKind, len: usize) {
        match kind {
            ConstructKind::Function => self.functions.truncate(len),
            ConstructKind::Variable => self.variables.truncate(len),
            ConstructKind::Loop => self.loops.truncate(len),
            ConstructKind::Condition => self.conditions.truncate(len),
            ConstructKind::Class => self.classes.truncate(len),
            ConstructKind::Array => self.arrays.truncate(len),
            ConstructKind::Import => self.imports.truncate(len),
            ConstructKind::SingleLineComment | ConstructKind::MultiLineComment => {
                self.comments.truncate(len)
            }
        }
    }

    /// Serialize the consumer-facing model as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
