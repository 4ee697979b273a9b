// Synthetic execution trace and per-step history

use crate::config::ExtractOptions;
use crate::errors::ExtractError;
use crate::parser::patterns::ConstructKind;
use crate::parser::records::{ParsedProgram, UNKNOWN_VALUE};
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

/// Last known value of a tracked name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryValue {
    /// Serialized as the `"unknown"` sentinel
    Unknown,
    /// Raw element texts of an array literal
    Elements(Vec<String>),
}

impl Serialize for MemoryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MemoryValue::Unknown => serializer.serialize_str(UNKNOWN_VALUE),
            MemoryValue::Elements(elements) => elements.serialize(serializer),
        }
    }
}

/// One synthetic timeline entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingEntry {
    pub step: usize,
    pub execution_time_ms: f64,
}

/// Running execution record, mutated once per match
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    pub current_line: Option<usize>,
    pub current_function: Option<String>,
    pub current_loop: Option<String>,
    pub current_condition: Option<String>,
    pub current_class: Option<String>,
    pub call_stack: Vec<String>,
    pub memory_state: FxHashMap<String, MemoryValue>,
    pub timing: Vec<TimingEntry>,
}

impl ExecutionState {
    /// Merge a partial update field by field.
    ///
    /// Scalars replace, the call stack is replaced whole, memory writes add or
    /// overwrite by key and never delete.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(line) = update.current_line {
            self.current_line = Some(line);
        }
        if let Some(name) = update.current_function {
            self.current_function = Some(name);
        }
        if let Some(header) = update.current_loop {
            self.current_loop = Some(header);
        }
        if let Some(condition) = update.current_condition {
            self.current_condition = Some(condition);
        }
        if let Some(name) = update.current_class {
            self.current_class = Some(name);
        }
        if let Some(stack) = update.call_stack {
            self.call_stack = stack;
        }
        for (name, value) in update.memory_writes {
            self.memory_state.insert(name, value);
        }
    }

    /// Number of steps recorded so far
    pub fn steps(&self) -> usize {
        self.timing.len()
    }
}

/// Partial state change attached to one match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub current_line: Option<usize>,
    pub current_function: Option<String>,
    pub current_loop: Option<String>,
    pub current_condition: Option<String>,
    pub current_class: Option<String>,
    pub call_stack: Option<Vec<String>>,
    pub memory_writes: Vec<(String, MemoryValue)>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, line: usize) -> Self {
        self.current_line = Some(line);
        self
    }

    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.current_function = Some(name.into());
        self
    }

    pub fn loop_header(mut self, header: impl Into<String>) -> Self {
        self.current_loop = Some(header.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.current_condition = Some(condition.into());
        self
    }

    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.current_class = Some(name.into());
        self
    }

    pub fn call_stack(mut self, stack: Vec<String>) -> Self {
        self.call_stack = Some(stack);
        self
    }

    pub fn write(mut self, name: impl Into<String>, value: MemoryValue) -> Self {
        self.memory_writes.push((name.into(), value));
        self
    }
}

/// The construct a step was produced by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOrigin {
    pub kind: ConstructKind,
    pub start_line: usize,
    pub end_line: usize,
}

/// Snapshot of the execution record right after one step
#[derive(Debug, Clone)]
pub struct StepSnapshot {
    pub step: usize,
    pub origin: StepOrigin,
    pub current_line: Option<usize>,
    pub current_function: Option<String>,
    pub current_loop: Option<String>,
    pub current_condition: Option<String>,
    pub current_class: Option<String>,
    pub call_stack: Vec<String>,
    pub memory_state: FxHashMap<String, MemoryValue>,
    pub execution_time_ms: f64,
}

impl StepSnapshot {
    pub fn capture(origin: StepOrigin, state: &ExecutionState) -> Self {
        let (step, execution_time_ms) = state
            .timing
            .last()
            .map_or((0, 0.0), |t| (t.step, t.execution_time_ms));

        StepSnapshot {
            step,
            origin,
            current_line: state.current_line,
            current_function: state.current_function.clone(),
            current_loop: state.current_loop.clone(),
            current_condition: state.current_condition.clone(),
            current_class: state.current_class.clone(),
            call_stack: state.call_stack.clone(),
            memory_state: state.memory_state.clone(),
            execution_time_ms,
        }
    }

    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        // Rough: fixed overhead plus string payloads
        let strings = [
            &self.current_function,
            &self.current_loop,
            &self.current_condition,
            &self.current_class,
        ]
        .iter()
        .map(|s| s.as_ref().map_or(0, |s| s.len()))
        .sum::<usize>();

        let stack: usize = self.call_stack.iter().map(|s| s.len() + 24).sum();

        let memory: usize = self
            .memory_state
            .iter()
            .map(|(name, value)| {
                name.len()
                    + 48
                    + match value {
                        MemoryValue::Unknown => 0,
                        MemoryValue::Elements(e) => e.iter().map(|s| s.len() + 24).sum(),
                    }
            })
            .sum();

        128 + strings + stack + memory
    }
}

/// Per-step history with a memory budget
#[derive(Debug, Clone, Default)]
pub struct SnapshotManager {
    snapshots: Vec<StepSnapshot>,
    max_memory: usize,
    current_memory: usize,
    truncated: bool,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
            truncated: false,
        }
    }

    /// Add a snapshot to history.
    ///
    /// Once the budget is exceeded the history is marked truncated and every
    /// later push is refused.
    pub fn push(&mut self, snapshot: StepSnapshot) -> Result<(), ExtractError> {
        let snapshot_size = snapshot.estimated_size();

        if self.truncated || self.current_memory + snapshot_size > self.max_memory {
            self.truncated = true;
            return Err(ExtractError::SnapshotLimitExceeded {
                current: self.current_memory,
                limit: self.max_memory,
            });
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Drop snapshots of steps after `last_step`
    pub fn truncate_steps(&mut self, last_step: usize) {
        self.snapshots.retain(|s| s.step <= last_step);
        self.current_memory = self.snapshots.iter().map(|s| s.estimated_size()).sum();
    }

    pub fn get(&self, index: usize) -> Option<&StepSnapshot> {
        self.snapshots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepSnapshot> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Whether snapshots were dropped for exceeding the budget
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}

/// Appends one timing entry per match and merges state updates
///
/// Built fresh for each extraction call; it owns only the duration generator.
#[derive(Debug)]
pub struct TraceBuilder {
    rng: fastrand::Rng,
    max_step_ms: f64,
    record_history: bool,
}

impl TraceBuilder {
    pub fn new(options: &ExtractOptions) -> Self {
        let rng = match options.timing_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        TraceBuilder {
            rng,
            max_step_ms: options.max_step_ms.max(0.0),
            record_history: options.record_history,
        }
    }

    /// Record one discovered construct
    pub fn on_match(
        &mut self,
        program: &mut ParsedProgram,
        origin: StepOrigin,
        update: Option<StateUpdate>,
    ) {
        let step = program.execution.timing.len() + 1;
        let execution_time_ms = self.rng.f64() * self.max_step_ms;
        program.execution.timing.push(TimingEntry {
            step,
            execution_time_ms,
        });

        if let Some(update) = update {
            program.execution.apply(update);
        }

        if self.record_history && !program.history.is_truncated() {
            let snapshot = StepSnapshot::capture(origin, &program.execution);
            if let Err(e) = program.history.push(snapshot) {
                tracing::warn!(step, error = %e, "step history truncated");
                program.diagnostics.push(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::patterns::Dialect;

    fn origin() -> StepOrigin {
        StepOrigin {
            kind: ConstructKind::Function,
            start_line: 1,
            end_line: 2,
        }
    }

    #[test]
    fn test_steps_are_sequential() {
        let mut program = ParsedProgram::new(Dialect::JavaScript, usize::MAX);
        let mut tracer = TraceBuilder::new(&ExtractOptions::default().with_seed(7));

        for _ in 0..5 {
            tracer.on_match(&mut program, origin(), None);
        }

        let steps: Vec<usize> = program.execution.timing.iter().map(|t| t.step).collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5]);
        assert!(program
            .execution
            .timing
            .iter()
            .all(|t| (0.0..10.0).contains(&t.execution_time_ms)));
        assert_eq!(program.history.len(), 5);
    }

    #[test]
    fn test_apply_merges_field_wise() {
        let mut state = ExecutionState::default();
        state.apply(
            StateUpdate::new()
                .function("main")
                .call_stack(vec!["main".to_string()])
                .write("x", MemoryValue::Unknown),
        );
        state.apply(
            StateUpdate::new()
                .line(4)
                .write("x", MemoryValue::Elements(vec!["1".to_string()]))
                .write("y", MemoryValue::Unknown),
        );

        assert_eq!(state.current_function.as_deref(), Some("main"));
        assert_eq!(state.current_line, Some(4));
        assert_eq!(state.call_stack, vec!["main"]);
        assert_eq!(state.memory_state.len(), 2);
        assert_eq!(
            state.memory_state["x"],
            MemoryValue::Elements(vec!["1".to_string()])
        );
    }

    #[test]
    fn test_history_budget_truncates_without_touching_timing() {
        let mut program = ParsedProgram::new(Dialect::Python, 300);
        let mut tracer = TraceBuilder::new(&ExtractOptions::default());

        for _ in 0..10 {
            tracer.on_match(&mut program, origin(), None);
        }

        assert_eq!(program.execution.timing.len(), 10);
        assert!(program.history.is_truncated());
        assert!(program.history.len() < 10);
        // Reported once, not once per refused push
        assert_eq!(program.diagnostics.len(), 1);
    }

    #[test]
    fn test_memory_value_serialization() {
        let unknown = serde_json::to_value(MemoryValue::Unknown).unwrap();
        assert_eq!(unknown, serde_json::json!("unknown"));

        let elements =
            serde_json::to_value(MemoryValue::Elements(vec!["1".into(), "2".into()])).unwrap();
        assert_eq!(elements, serde_json::json!(["1", "2"]));
    }
}
