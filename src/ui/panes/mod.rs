//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code with the current step's construct highlighted
//! - [`state`]: Focus fields, call stack and memory state at the current step
//! - [`structure`]: All extracted records grouped by construct kind
//! - [`status`]: Status bar with keybindings and replay position
//!
//! Each pane module exports a primary `render_*` function plus the scroll
//! state it keeps between frames.

pub mod source;
pub mod state;
pub mod status;
pub mod structure;

pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use state::{render_state_pane, StateScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use structure::{render_structure_pane, StructureScrollState};
