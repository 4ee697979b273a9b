//! Status bar: replay position, current construct and key hints

use crate::parser::patterns::Dialect;
use crate::snapshot::StepOrigin;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const KEY_HINTS: [(&str, &str); 5] = [
    (" ←/→ ", " step "),
    (" 1-9 ", " skip "),
    (" ⎵ ", " play "),
    (" ↵/⌫ ", " end/start "),
    (" q ", " quit "),
];

/// Data needed to render the status bar
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub language: Dialect,
    /// Construct that produced the step on screen
    pub origin: Option<StepOrigin>,
    /// Zero-based replay position
    pub current_step: usize,
    pub total_steps: usize,
    /// History was cut short by its memory budget
    pub truncated: bool,
    /// Bytes used by the step history and its budget
    pub history_usage: (usize, usize),
    pub is_playing: bool,
}

fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn position_label(data: &StatusRenderData) -> String {
    if data.total_steps == 0 {
        return " 0/0 ".to_string();
    }
    let more = if data.truncated { "+" } else { "" };
    format!(" {}/{}{} ", data.current_step + 1, data.total_steps, more)
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let bar = Style::default().bg(DEFAULT_THEME.focus_bg);
    let badge = |color: Color| {
        Style::default()
            .bg(color)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    };

    let position_color = if data.truncated {
        DEFAULT_THEME.accent
    } else {
        DEFAULT_THEME.primary
    };
    let mut left = vec![
        Span::styled(format!(" {} ", data.language), badge(DEFAULT_THEME.muted)),
        Span::styled(position_label(&data), badge(position_color)),
    ];
    if let Some(origin) = data.origin {
        left.push(Span::styled(
            format!(" {} ", origin.kind),
            badge(DEFAULT_THEME.kind_color(origin.kind)),
        ));
    }
    let (used, limit) = data.history_usage;
    left.push(Span::styled(
        format!(" {}/{} ", format_bytes(used), format_bytes(limit)),
        bar.fg(if data.truncated {
            DEFAULT_THEME.accent
        } else {
            DEFAULT_THEME.muted
        }),
    ));
    left.push(Span::styled(
        format!(" {} ", data.message),
        bar.fg(DEFAULT_THEME.fg),
    ));

    frame.render_widget(
        Paragraph::new(Line::from(left))
            .style(bar)
            .alignment(Alignment::Left),
        halves[0],
    );

    let mut right = Vec::new();
    for (i, (key, desc)) in KEY_HINTS.iter().enumerate() {
        if i > 0 {
            right.push(Span::styled("│", bar.fg(DEFAULT_THEME.muted)));
        }
        right.push(Span::styled(*key, bar.bg(DEFAULT_THEME.muted).fg(Color::Black)));
        right.push(Span::styled(*desc, bar.fg(DEFAULT_THEME.fg)));
    }

    let indicator = if data.is_playing {
        Some((" ▶ PLAYING ", DEFAULT_THEME.accent))
    } else if data.total_steps > 0 && data.current_step + 1 >= data.total_steps {
        Some((" END ", DEFAULT_THEME.at_end))
    } else if data.current_step == 0 {
        Some((" START ", DEFAULT_THEME.at_start))
    } else {
        None
    };
    if let Some((label, color)) = indicator {
        right.push(Span::styled("│", bar.fg(DEFAULT_THEME.muted)));
        right.push(Span::styled(label, badge(color)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right))
            .style(bar)
            .alignment(Alignment::Right),
        halves[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(current_step: usize, total_steps: usize, truncated: bool) -> StatusRenderData<'static> {
        StatusRenderData {
            message: "",
            language: Dialect::Python,
            origin: None,
            current_step,
            total_steps,
            truncated,
            history_usage: (0, 0),
            is_playing: false,
        }
    }

    #[test]
    fn test_position_label() {
        assert_eq!(position_label(&data(0, 0, false)), " 0/0 ");
        assert_eq!(position_label(&data(2, 5, false)), " 3/5 ");
        assert_eq!(position_label(&data(0, 3, true)), " 1/3+ ");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(64 * 1024 * 1024), "64.0 MB");
    }
}
