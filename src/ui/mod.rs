//! Terminal replay viewer built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: replay cursor, keyboard event loop, pane focus, auto-play
//! - **[`panes`]**: render functions for each visible pane (source, state,
//!   structure, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`ParsedProgram`] and its source, then call [`App::run`].
//!
//! [`ParsedProgram`]: crate::parser::records::ParsedProgram
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
