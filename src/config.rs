//! Extraction options and shared constants

/// Upper bound (exclusive) of a synthetic step duration, in milliseconds
pub const DEFAULT_MAX_STEP_MS: f64 = 10.0;

/// Memory budget for the per-step replay history (64 MB)
pub const DEFAULT_SNAPSHOT_MEMORY_LIMIT: usize = 64 * 1024 * 1024;

/// Auto-play interval of the replay UI, in milliseconds
pub const PLAY_INTERVAL_MS: u64 = 600;

/// Knobs for one extraction call
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Synthetic durations are drawn uniformly from `[0, max_step_ms)`
    pub max_step_ms: f64,
    /// Seed for the duration generator; `None` seeds from entropy
    pub timing_seed: Option<u64>,
    /// Capture a [`StepSnapshot`](crate::snapshot::StepSnapshot) per step
    pub record_history: bool,
    pub snapshot_memory_limit: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            max_step_ms: DEFAULT_MAX_STEP_MS,
            timing_seed: None,
            record_history: true,
            snapshot_memory_limit: DEFAULT_SNAPSHOT_MEMORY_LIMIT,
        }
    }
}

impl ExtractOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.timing_seed = Some(seed);
        self
    }

    pub fn without_history(mut self) -> Self {
        self.record_history = false;
        self
    }
}
