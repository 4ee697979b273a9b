//! Structure pane: every extracted record, grouped by construct kind

use crate::parser::patterns::ConstructKind;
use crate::parser::records::{CommentSpan, LoopHeader, ParsedProgram};
use crate::snapshot::StepOrigin;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Scroll state for the structure pane
pub struct StructureScrollState {
    pub offset: usize,
}

struct Entry {
    kind: ConstructKind,
    start_line: usize,
    label: String,
}

fn span_label(start: usize, end: usize) -> String {
    if start == end {
        format!("{:>4}", start)
    } else {
        format!("{:>4}-{}", start, end)
    }
}

fn entries(program: &ParsedProgram) -> Vec<(&'static str, ConstructKind, Vec<Entry>)> {
    let functions: Vec<Entry> = program
        .functions
        .iter()
        .map(|f| Entry {
            kind: ConstructKind::Function,
            start_line: f.start_line,
            label: format!(
                "{}  {}({})",
                span_label(f.start_line, f.end_line),
                f.name,
                f.parameters.join(", ")
            ),
        })
        .collect();

    let variables: Vec<Entry> = program
        .variables
        .iter()
        .map(|v| Entry {
            kind: ConstructKind::Variable,
            start_line: v.line,
            label: format!("{}  {}", span_label(v.line, v.line), v.name),
        })
        .collect();

    let loops: Vec<Entry> = program
        .loops
        .iter()
        .map(|l| {
            let header = match &l.header {
                LoopHeader::Counting {
                    initialization,
                    condition,
                    increment,
                } => format!("for ({};{};{})", initialization, condition, increment),
                LoopHeader::Iterating { variable, iterable } => {
                    format!("for {} in {}", variable, iterable)
                }
            };
            Entry {
                kind: ConstructKind::Loop,
                start_line: l.start_line,
                label: format!("{}  {}", span_label(l.start_line, l.end_line), header),
            }
        })
        .collect();

    let conditions: Vec<Entry> = program
        .conditions
        .iter()
        .map(|c| Entry {
            kind: ConstructKind::Condition,
            start_line: c.start_line,
            label: format!(
                "{}  if {}",
                span_label(c.start_line, c.end_line),
                c.condition
            ),
        })
        .collect();

    let classes: Vec<Entry> = program
        .classes
        .iter()
        .map(|c| Entry {
            kind: ConstructKind::Class,
            start_line: c.start_line,
            label: format!("{}  {}", span_label(c.start_line, c.end_line), c.name),
        })
        .collect();

    let arrays: Vec<Entry> = program
        .arrays
        .iter()
        .map(|a| Entry {
            kind: ConstructKind::Array,
            start_line: a.start_line,
            label: format!(
                "{}  {}[{}]",
                span_label(a.start_line, a.end_line),
                a.name,
                a.size
            ),
        })
        .collect();

    let imports: Vec<Entry> = program
        .imports
        .iter()
        .map(|i| Entry {
            kind: ConstructKind::Import,
            start_line: i.line,
            label: format!("{}  {}", span_label(i.line, i.line), i.module),
        })
        .collect();

    let comments: Vec<Entry> = program
        .comments
        .iter()
        .map(|c| {
            let (kind, start, end) = match c.span {
                CommentSpan::Line { line } => (ConstructKind::SingleLineComment, line, line),
                CommentSpan::Block {
                    start_line,
                    end_line,
                } => (ConstructKind::MultiLineComment, start_line, end_line),
            };
            Entry {
                kind,
                start_line: start,
                label: format!("{}  {}", span_label(start, end), c.content),
            }
        })
        .collect();

    vec![
        ("Functions", ConstructKind::Function, functions),
        ("Variables", ConstructKind::Variable, variables),
        ("Loops", ConstructKind::Loop, loops),
        ("Conditions", ConstructKind::Condition, conditions),
        ("Classes", ConstructKind::Class, classes),
        ("Arrays", ConstructKind::Array, arrays),
        ("Imports", ConstructKind::Import, imports),
        ("Comments", ConstructKind::SingleLineComment, comments),
    ]
}

/// Render the structure pane
pub fn render_structure_pane(
    frame: &mut Frame,
    area: Rect,
    program: &ParsedProgram,
    current: Option<StepOrigin>,
    is_focused: bool,
    scroll_state: &mut StructureScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Structure ({} records) ", program.record_count()))
        .borders(Borders::ALL)
        .border_style(border_style);

    let mut items: Vec<ListItem> = Vec::new();
    for (title, kind, group) in entries(program) {
        if group.is_empty() {
            continue;
        }
        items.push(ListItem::new(Line::from(vec![
            Span::styled("■ ", Style::default().fg(DEFAULT_THEME.kind_color(kind))),
            Span::styled(
                format!("{} ({})", title, group.len()),
                Style::default()
                    .fg(DEFAULT_THEME.primary)
                    .add_modifier(Modifier::BOLD),
            ),
        ])));

        for entry in group {
            let is_current = current
                .is_some_and(|o| o.kind == entry.kind && o.start_line == entry.start_line);
            let style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.accent)
                    .bg(DEFAULT_THEME.focus_bg)
                    .add_modifier(Modifier::BOLD)
            } else if entry.kind == ConstructKind::Class {
                Style::default().fg(DEFAULT_THEME.class_name)
            } else if entry.kind == ConstructKind::MultiLineComment
                || entry.kind == ConstructKind::SingleLineComment
            {
                Style::default().fg(DEFAULT_THEME.muted)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            items.push(ListItem::new(Span::styled(format!(" {}", entry.label), style)));
        }
    }

    if items.is_empty() {
        items.push(ListItem::new(Span::styled(
            "(nothing extracted)",
            Style::default().fg(DEFAULT_THEME.muted),
        )));
    }

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
