//! Main TUI application state and logic

use crate::config::PLAY_INTERVAL_MS;
use crate::parser::records::ParsedProgram;
use crate::snapshot::StepSnapshot;
use crate::ui::panes::{
    self, SourceRenderData, SourceScrollState, StateScrollState, StatusRenderData,
    StructureScrollState,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    State,
    Structure,
}

impl FocusedPane {
    /// Move focus to the next pane (source -> state -> structure)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::State,
            FocusedPane::State => FocusedPane::Structure,
            FocusedPane::Structure => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    pub program: ParsedProgram,
    pub source_code: String,

    /// Current position in the step history
    pub position: usize,

    pub focused_pane: FocusedPane,
    pub source_scroll: SourceScrollState,
    pub state_scroll: StateScrollState,
    pub structure_scroll: StructureScrollState,

    pub should_quit: bool,
    pub status_message: String,
    pub is_playing: bool,
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(program: ParsedProgram, source_code: String) -> Self {
        let status_message = if program.history.is_empty() {
            String::from("Nothing to replay")
        } else {
            String::from("Ready!")
        };

        App {
            program,
            source_code,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState {
                offset: 0,
                target_line_row: None,
            },
            state_scroll: StateScrollState { offset: 0 },
            structure_scroll: StructureScrollState { offset: 0 },
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or(Instant::now()),
        }
    }

    /// Snapshot at the current position
    pub fn current(&self) -> Option<&StepSnapshot> {
        self.program.history.get(self.position)
    }

    pub fn total_steps(&self) -> usize {
        self.program.history.len()
    }

    /// Advance one step; false when already at the end
    pub fn step_forward(&mut self) -> bool {
        if self.position + 1 < self.total_steps() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Go back one step; false when already at the start
    pub fn step_backward(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    pub fn rewind_to_start(&mut self) {
        self.position = 0;
    }

    pub fn jump_to_end(&mut self) {
        self.position = self.total_steps().saturating_sub(1);
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing
                && self.last_play_time.elapsed() >= Duration::from_millis(PLAY_INTERVAL_MS)
            {
                if self.step_forward() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        let snapshot = self.program.history.get(self.position);
        let origin = snapshot.map(|s| s.origin);

        panes::render_source_pane(
            frame,
            columns[0],
            SourceRenderData {
                source_code: &self.source_code,
                dialect: self.program.language,
                span: origin.map(|o| (o.start_line, o.end_line)),
            },
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_state_pane(
            frame,
            right_rows[0],
            snapshot,
            self.focused_pane == FocusedPane::State,
            &mut self.state_scroll,
        );

        panes::render_structure_pane(
            frame,
            right_rows[1],
            &self.program,
            origin,
            self.focused_pane == FocusedPane::Structure,
            &mut self.structure_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                language: self.program.language,
                origin,
                current_step: self.position,
                total_steps: self.program.history.len(),
                truncated: self.program.history.is_truncated(),
                history_usage: (
                    self.program.history.memory_usage(),
                    self.program.history.memory_limit(),
                ),
                is_playing: self.is_playing,
            },
        );
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let stepped = (0..n).take_while(|_| self.step_forward()).count();
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.step_backward() {
                    "Stepped backward".to_string()
                } else {
                    "Cannot step backward: already at the first step".to_string()
                };
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Cannot step forward: no more steps".to_string()
                };
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::State => {
                    self.state_scroll.offset = self.state_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Structure => {
                    self.structure_scroll.offset = self.structure_scroll.offset.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::State => {
                    self.state_scroll.offset = self.state_scroll.offset.saturating_add(1);
                }
                FocusedPane::Structure => {
                    self.structure_scroll.offset = self.structure_scroll.offset.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play (200ms debounce against key repeat)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(Duration::from_millis(PLAY_INTERVAL_MS))
                            .unwrap_or(Instant::now());
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.jump_to_end();
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.rewind_to_start();
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::parse;
    use crate::parser::patterns::{ConstructKind, Dialect};
    use crossterm::event::KeyModifiers;

    fn app(source: &str, dialect: Dialect) -> App {
        App::new(parse(source, dialect), source.to_string())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_stepping_stays_in_bounds() {
        let mut app = app("let a;\nlet b;\nlet c;", Dialect::JavaScript);
        assert_eq!(app.total_steps(), 3);

        assert!(!app.step_backward());
        assert!(app.step_forward());
        assert!(app.step_forward());
        assert!(!app.step_forward());
        assert_eq!(app.position, 2);

        app.rewind_to_start();
        assert_eq!(app.current().map(|s| s.origin.start_line), Some(1));
    }

    #[test]
    fn test_number_keys_step_multiple() {
        let mut app = app("import a\nimport b\nimport c\nimport d", Dialect::Python);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.position, 2);

        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.position, 3);
        assert_eq!(app.status_message, "Stepped forward 1 step(s)");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.position, 0);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.current().map(|s| s.origin.kind), Some(ConstructKind::Import));
        assert_eq!(app.current().map(|s| s.step), Some(4));
    }

    #[test]
    fn test_empty_replay() {
        let mut app = app("", Dialect::JavaScript);
        assert!(app.current().is_none());
        assert!(!app.step_forward());
        app.jump_to_end();
        assert_eq!(app.position, 0);
        assert_eq!(app.status_message, "Nothing to replay");
    }

    #[test]
    fn test_focus_cycle_and_quit() {
        let mut app = app("x = 1", Dialect::Python);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::State);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Source);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
