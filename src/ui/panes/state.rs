//! Execution state pane: focus, call stack and memory at the current step
//!
//! Mirrors what a visualization would show for one step of the synthetic
//! trace: the construct that produced the step, the constructs in focus, the
//! call stack (innermost entry last, shown on top) and the tracked names.

use crate::snapshot::{MemoryValue, StepSnapshot};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Scroll state for the state pane
pub struct StateScrollState {
    pub offset: usize,
}

/// Render the execution state pane
pub fn render_state_pane(
    frame: &mut Frame,
    area: Rect,
    snapshot: Option<&StepSnapshot>,
    is_focused: bool,
    scroll_state: &mut StateScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Execution State ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let items = match snapshot {
        Some(snapshot) => state_items(snapshot),
        None => vec![ListItem::new(Line::from(Span::styled(
            "(no steps recorded)",
            Style::default().fg(DEFAULT_THEME.muted),
        )))],
    };

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if items.len() > visible_height {
        scroll_state.offset = scroll_state.offset.min(items.len() - visible_height);
    } else {
        scroll_state.offset = 0;
    }

    let visible: Vec<ListItem> = items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible).block(block), area);
}

fn heading(text: &str) -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD),
    )))
}

fn field(label: &str, value: Option<&str>) -> ListItem<'static> {
    let value_span = match value {
        Some(v) => Span::styled(v.to_string(), Style::default().fg(DEFAULT_THEME.fg)),
        None => Span::styled("-", Style::default().fg(DEFAULT_THEME.muted)),
    };
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("  {:<10}", label),
            Style::default().fg(DEFAULT_THEME.muted),
        ),
        value_span,
    ]))
}

fn state_items(snapshot: &StepSnapshot) -> Vec<ListItem<'static>> {
    let mut items = Vec::new();

    let origin = snapshot.origin;
    let span = if origin.start_line == origin.end_line {
        format!("line {}", origin.start_line)
    } else {
        format!("lines {}-{}", origin.start_line, origin.end_line)
    };
    items.push(ListItem::new(Line::from(vec![
        Span::styled(
            format!("Step {} ", snapshot.step),
            Style::default()
                .fg(DEFAULT_THEME.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            origin.kind.to_string(),
            Style::default().fg(DEFAULT_THEME.kind_color(origin.kind)),
        ),
        Span::styled(format!(" @ {}", span), Style::default().fg(DEFAULT_THEME.fg)),
        Span::styled(
            format!("  ({:.2} ms)", snapshot.execution_time_ms),
            Style::default().fg(DEFAULT_THEME.muted),
        ),
    ])));
    items.push(ListItem::new(""));

    items.push(heading("Focus"));
    let line = snapshot.current_line.map(|l| l.to_string());
    items.push(field("line", line.as_deref()));
    items.push(field("function", snapshot.current_function.as_deref()));
    items.push(field("loop", snapshot.current_loop.as_deref()));
    items.push(field("condition", snapshot.current_condition.as_deref()));
    items.push(field("class", snapshot.current_class.as_deref()));
    items.push(ListItem::new(""));

    items.push(heading(&format!("Call Stack ({})", snapshot.call_stack.len())));
    if snapshot.call_stack.is_empty() {
        items.push(ListItem::new(Span::styled(
            "  (empty)",
            Style::default().fg(DEFAULT_THEME.muted),
        )));
    }
    for (depth, name) in snapshot.call_stack.iter().enumerate().rev() {
        let is_top = depth + 1 == snapshot.call_stack.len();
        let style = if is_top {
            Style::default()
                .fg(DEFAULT_THEME.callable)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DEFAULT_THEME.outer_call)
        };
        items.push(ListItem::new(Line::from(vec![
            Span::styled(
                format!("  #{:<3}", depth),
                Style::default().fg(DEFAULT_THEME.muted),
            ),
            Span::styled(format!("{}()", name), style),
        ])));
    }
    items.push(ListItem::new(""));

    items.push(heading(&format!("Memory ({})", snapshot.memory_state.len())));
    let mut names: Vec<&String> = snapshot.memory_state.keys().collect();
    names.sort();
    for name in names {
        let value = match &snapshot.memory_state[name] {
            MemoryValue::Unknown => {
                Span::styled("unknown", Style::default().fg(DEFAULT_THEME.muted))
            }
            MemoryValue::Elements(elements) => Span::styled(
                format!("[{}]", elements.join(", ")),
                Style::default().fg(DEFAULT_THEME.literal),
            ),
        };
        items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("  {} = ", name), Style::default().fg(DEFAULT_THEME.fg)),
            value,
        ])));
    }

    items
}
