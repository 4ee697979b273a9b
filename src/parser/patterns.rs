//! Per-dialect construct pattern tables
//!
//! Each supported dialect is described by a static list of [`RuleSpec`]s, one
//! per [`ConstructKind`]. The specs are compiled once into a [`PatternTable`]
//! of [`MatchRule`]s; everything downstream (scanner, extractor, trace) is
//! dialect-agnostic and only sees the table.
//!
//! # Capture slots
//!
//! Rules expose their sub-captures through named groups. The recognized slot
//! names are listed in [`slot`]; a rule only needs the slots that make sense
//! for its kind.
//!
//! # Block bodies
//!
//! Brace-delimited bodies are captured directly by the pattern (lazily up to
//! the first closing brace). Indentation-delimited bodies cannot be expressed
//! that way, so such rules carry a `terminator` pattern: the body starts where
//! the head pattern ends and runs until the start of the first terminator
//! match, or to the end of the text.

use crate::errors::ExtractError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

/// Source dialect of the text being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    JavaScript,
    Python,
    Unsupported,
}

impl Dialect {
    /// Resolve a dialect tag such as `"javascript"` or `"py"`.
    ///
    /// Never fails: anything unrecognized selects [`Dialect::Unsupported`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" => Dialect::JavaScript,
            "python" | "py" => Dialect::Python,
            _ => Dialect::Unsupported,
        }
    }

    /// Guess the dialect from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Some(Dialect::JavaScript),
            "py" => Some(Dialect::Python),
            _ => None,
        }
    }

    pub fn is_supported(self) -> bool {
        self != Dialect::Unsupported
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::JavaScript => "javascript",
            Dialect::Python => "python",
            Dialect::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactic category a rule extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructKind {
    Function,
    Variable,
    Loop,
    Condition,
    Class,
    Array,
    Import,
    SingleLineComment,
    MultiLineComment,
}

impl ConstructKind {
    /// Fixed scan order used by the extractor
    pub const ALL: [ConstructKind; 9] = [
        ConstructKind::Function,
        ConstructKind::Variable,
        ConstructKind::Loop,
        ConstructKind::Condition,
        ConstructKind::Class,
        ConstructKind::Array,
        ConstructKind::Import,
        ConstructKind::SingleLineComment,
        ConstructKind::MultiLineComment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConstructKind::Function => "function",
            ConstructKind::Variable => "variable",
            ConstructKind::Loop => "loop",
            ConstructKind::Condition => "condition",
            ConstructKind::Class => "class",
            ConstructKind::Array => "array",
            ConstructKind::Import => "import",
            ConstructKind::SingleLineComment => "single-line comment",
            ConstructKind::MultiLineComment => "multi-line comment",
        }
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Capture slot names understood by the extractor
pub mod slot {
    pub const NAME: &str = "name";
    pub const PARAMS: &str = "params";
    pub const BODY: &str = "body";
    pub const COND: &str = "cond";
    pub const HEADER: &str = "header";
    pub const VAR: &str = "var";
    pub const ITER: &str = "iter";
    pub const MODULE: &str = "module";
    pub const CONTENT: &str = "content";
    pub const ELEMENTS: &str = "elements";

    pub(crate) const ALL: [&str; 10] = [
        NAME, PARAMS, BODY, COND, HEADER, VAR, ITER, MODULE, CONTENT, ELEMENTS,
    ];
}

/// Uncompiled rule data
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub kind: ConstructKind,
    pub pattern: &'static str,
    /// Body terminator for indentation-delimited blocks
    pub terminator: Option<&'static str>,
    /// A head match directly followed by this character is discarded
    pub not_followed_by: Option<char>,
}

impl RuleSpec {
    pub const fn new(kind: ConstructKind, pattern: &'static str) -> Self {
        RuleSpec {
            kind,
            pattern,
            terminator: None,
            not_followed_by: None,
        }
    }

    pub const fn terminated_by(self, terminator: &'static str) -> Self {
        RuleSpec {
            terminator: Some(terminator),
            ..self
        }
    }

    pub const fn not_followed_by(self, c: char) -> Self {
        RuleSpec {
            not_followed_by: Some(c),
            ..self
        }
    }
}

const JAVASCRIPT_RULES: &[RuleSpec] = &[
    RuleSpec::new(
        ConstructKind::Function,
        r"\bfunction\s+(?P<name>\w+)\s*\((?P<params>[^)]*)\)\s*\{(?P<body>[\s\S]*?)\}",
    ),
    RuleSpec::new(ConstructKind::Variable, r"\b(?:const|let|var)\s+(?P<name>\w+)"),
    RuleSpec::new(
        ConstructKind::Loop,
        r"\bfor\s*\((?P<header>[^)]*)\)\s*\{(?P<body>[\s\S]*?)\}",
    ),
    RuleSpec::new(
        ConstructKind::Condition,
        r"\bif\s*\((?P<cond>[^)]*)\)\s*\{(?P<body>[\s\S]*?)\}",
    ),
    RuleSpec::new(
        ConstructKind::Class,
        r"\bclass\s+(?P<name>\w+)\s*\{(?P<body>[\s\S]*?)\}",
    ),
    RuleSpec::new(
        ConstructKind::Array,
        r"(?P<name>\w+)\s*=\s*\[(?P<elements>.*?)\]",
    ),
    RuleSpec::new(
        ConstructKind::Import,
        r#"\bimport\s+(?:\w+\s+from\s+)?['"](?P<module>[^'"]+)['"]"#,
    ),
    RuleSpec::new(ConstructKind::SingleLineComment, r"//(?P<content>.+)"),
    RuleSpec::new(ConstructKind::MultiLineComment, r"/\*(?P<content>[\s\S]*?)\*/"),
];

const PYTHON_RULES: &[RuleSpec] = &[
    RuleSpec::new(
        ConstructKind::Function,
        r"\bdef\s+(?P<name>\w+)\s*\((?P<params>[^)]*)\)\s*(?:->\s*[^:\n]+)?:[ \t]*",
    )
    .terminated_by(r"\ndef\b"),
    // `==` is a comparison, not an assignment
    RuleSpec::new(ConstructKind::Variable, r"\b(?P<name>[A-Za-z_]\w*)\s*=").not_followed_by('='),
    RuleSpec::new(
        ConstructKind::Loop,
        r"\bfor\s+(?P<var>\w+)\s+in\s+(?P<iter>[^\n]*?)\s*:[ \t]*",
    )
    .terminated_by(r"\n\w"),
    RuleSpec::new(
        ConstructKind::Condition,
        r"\b(?:el)?if\s+(?P<cond>[^\n]*?)\s*:[ \t]*",
    )
    .terminated_by(r"\n\w"),
    RuleSpec::new(
        ConstructKind::Class,
        r"\bclass\s+(?P<name>\w+)\s*(?:\([^)]*\))?\s*:[ \t]*",
    )
    .terminated_by(r"\n\w"),
    RuleSpec::new(
        ConstructKind::Array,
        r"(?P<name>\w+)\s*=\s*\[(?P<elements>.*?)\]",
    ),
    RuleSpec::new(ConstructKind::Import, r"\bimport\s+(?P<module>\w+)"),
    RuleSpec::new(ConstructKind::SingleLineComment, r"#(?P<content>.+)"),
    RuleSpec::new(
        ConstructKind::MultiLineComment,
        r#""""\s*(?P<content>[\s\S]*?)\s*""""#,
    ),
];

static JAVASCRIPT_TABLE: LazyLock<PatternTable> = LazyLock::new(|| {
    PatternTable::from_specs(JAVASCRIPT_RULES).expect("built-in JavaScript rules must compile")
});

static PYTHON_TABLE: LazyLock<PatternTable> = LazyLock::new(|| {
    PatternTable::from_specs(PYTHON_RULES).expect("built-in Python rules must compile")
});

static EMPTY_TABLE: PatternTable = PatternTable { rules: Vec::new() };

/// One located occurrence of a rule in the text
#[derive(Debug, Clone)]
pub struct RuleMatch<'t> {
    /// Byte offset of the first matched character
    pub start: usize,
    /// Byte offset one past the last matched character
    pub end: usize,
    slots: Vec<(&'static str, &'t str)>,
}

impl<'t> RuleMatch<'t> {
    /// Text captured for `slot`, if the rule captured it
    pub fn slot(&self, slot: &str) -> Option<&'t str> {
        self.slots
            .iter()
            .find(|(name, _)| *name == slot)
            .map(|(_, text)| *text)
    }

    /// Text captured for `slot`, or `""` when absent
    pub fn slot_or_empty(&self, slot: &str) -> &'t str {
        self.slot(slot).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A compiled rule for one construct kind
#[derive(Debug)]
pub struct MatchRule {
    kind: ConstructKind,
    head: Regex,
    terminator: Option<Regex>,
    not_followed_by: Option<char>,
}

impl MatchRule {
    pub fn compile(spec: &RuleSpec) -> Result<Self, ExtractError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ExtractError::InvalidPattern {
                kind: spec.kind,
                message: e.to_string(),
            })
        };

        Ok(MatchRule {
            kind: spec.kind,
            head: compile(spec.pattern)?,
            terminator: spec.terminator.map(compile).transpose()?,
            not_followed_by: spec.not_followed_by,
        })
    }

    pub fn kind(&self) -> ConstructKind {
        self.kind
    }

    /// Find the next match starting at or after `cursor`
    pub fn find_at<'t>(&self, text: &'t str, cursor: usize) -> Option<RuleMatch<'t>> {
        if cursor > text.len() {
            return None;
        }

        let mut from = cursor;
        let (caps, whole) = loop {
            let caps = self.head.captures_at(text, from)?;
            let whole = caps.get(0)?;
            match self.not_followed_by {
                Some(c) if text[whole.end()..].starts_with(c) => {
                    // Retry one character further so shorter heads are not skipped
                    from = text[whole.start()..]
                        .chars()
                        .next()
                        .map_or(text.len() + 1, |ch| whole.start() + ch.len_utf8());
                    if from > text.len() {
                        return None;
                    }
                }
                _ => break (caps, whole),
            }
        };

        let mut slots: Vec<(&'static str, &'t str)> = slot::ALL
            .iter()
            .filter_map(|&name| caps.name(name).map(|m| (name, m.as_str())))
            .collect();

        let mut end = whole.end();
        if let Some(terminator) = &self.terminator {
            let body_end = match terminator.find_at(text, end) {
                Some(m) => m.start(),
                // The final line break belongs to no line of the body
                None if text.len() > end && text.ends_with('\n') => text.len() - 1,
                None => text.len(),
            };
            slots.retain(|(name, _)| *name != slot::BODY);
            slots.push((slot::BODY, &text[end..body_end]));
            end = body_end;
        }

        Some(RuleMatch {
            start: whole.start(),
            end,
            slots,
        })
    }
}

/// Ordered construct rules for one dialect
#[derive(Debug)]
pub struct PatternTable {
    rules: Vec<MatchRule>,
}

impl PatternTable {
    /// Built-in table for `dialect`; empty for [`Dialect::Unsupported`]
    pub fn for_dialect(dialect: Dialect) -> &'static PatternTable {
        match dialect {
            Dialect::JavaScript => &*JAVASCRIPT_TABLE,
            Dialect::Python => &*PYTHON_TABLE,
            Dialect::Unsupported => &EMPTY_TABLE,
        }
    }

    /// Compile a table from rule data. Later specs for the same kind win.
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self, ExtractError> {
        let mut rules: Vec<MatchRule> = Vec::with_capacity(specs.len());
        for spec in specs {
            let rule = MatchRule::compile(spec)?;
            rules.retain(|r| r.kind != rule.kind);
            rules.push(rule);
        }
        Ok(PatternTable { rules })
    }

    pub fn rule(&self, kind: ConstructKind) -> Option<&MatchRule> {
        self.rules.iter().find(|r| r.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
