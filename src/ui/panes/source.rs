//! Source code pane rendering with syntax highlighting
//!
//! Displays the scanned source with the construct of the current step
//! highlighted: its first line gets the current-line style, the rest of its
//! span a softer background.
//!
//! The pane uses a simple character-by-character tokenizer to apply syntax
//! highlighting styles without requiring a full lexer.

use crate::parser::patterns::Dialect;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Simple syntax highlighting for JavaScript and Python
fn highlight_source_code(line: &str, dialect: Dialect) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, n)| n);

        let starts_comment = match dialect {
            Dialect::Python => c == '#',
            _ => c == '/' && next == Some('/'),
        };
        if starts_comment {
            flush_word(&mut spans, &mut current_word, false, dialect);
            spans.push(Span::styled(
                line[offset..].to_string(),
                Style::default().fg(DEFAULT_THEME.muted),
            ));
            return Line::from(spans);
        }

        if c == '"' || c == '\'' || c == '`' {
            flush_word(&mut spans, &mut current_word, false, dialect);
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != c {
                end += if chars[end].1 == '\\' { 2 } else { 1 };
            }
            end = (end + 1).min(chars.len());
            let end_offset = chars.get(end).map_or(line.len(), |&(o, _)| o);
            spans.push(Span::styled(
                line[offset..end_offset].to_string(),
                Style::default().fg(DEFAULT_THEME.literal),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            flush_word(&mut spans, &mut current_word, c == '(', dialect);
            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word, false, dialect);
    Line::from(spans)
}

fn flush_word(spans: &mut Vec<Span<'_>>, word: &mut String, is_call: bool, dialect: Dialect) {
    if word.is_empty() {
        return;
    }
    let style = get_keyword_style(word, is_call, dialect);
    spans.push(Span::styled(std::mem::take(word), style));
}

fn get_keyword_style(word: &str, is_function: bool, dialect: Dialect) -> Style {
    let is_keyword = match dialect {
        Dialect::Python => matches!(
            word,
            "def" | "class" | "return" | "if" | "elif" | "else" | "for" | "while" | "in"
                | "import" | "from" | "as" | "pass" | "break" | "continue" | "and" | "or"
                | "not" | "lambda" | "with" | "try" | "except" | "finally" | "yield"
        ),
        _ => matches!(
            word,
            "function" | "class" | "return" | "if" | "else" | "for" | "while" | "do"
                | "const" | "let" | "var" | "import" | "from" | "export" | "new" | "break"
                | "continue" | "switch" | "case" | "default" | "of" | "in" | "try" | "catch"
        ),
    };

    if is_keyword {
        return Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD);
    }

    match word {
        "true" | "false" | "null" | "undefined" | "True" | "False" | "None" => {
            Style::default().fg(DEFAULT_THEME.literal)
        }
        _ if word.chars().all(|c| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.literal)
        }
        _ if is_function => Style::default().fg(DEFAULT_THEME.callable),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Scroll state for the source pane
pub struct SourceScrollState {
    pub offset: usize,
    pub target_line_row: Option<usize>,
}

/// Data needed to render the source pane
pub struct SourceRenderData<'a> {
    pub source_code: &'a str,
    pub dialect: Dialect,
    /// Inclusive line span of the current step's construct, if any
    pub span: Option<(usize, usize)>,
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    data: SourceRenderData,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Source ({}) ", data.dialect))
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = data.source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if scroll_state.target_line_row.is_none() {
        scroll_state.target_line_row = Some(visible_height / 3);
    }
    let target_row = scroll_state
        .target_line_row
        .unwrap_or(0)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    let current_line = data.span.map_or(0, |(start, _)| start);

    // Keep the first line of the current construct at the target row
    if current_line > 0 && current_line <= total_lines {
        scroll_state.offset = (current_line - 1).saturating_sub(target_row);
        if total_lines > visible_height {
            scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
        } else {
            scroll_state.offset = 0;
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = line_num == current_line;
            let in_span = data
                .span
                .is_some_and(|(start, end)| line_num >= start && line_num <= end);

            let (marker, num_style, background) = if is_current {
                (
                    "▶",
                    Style::default()
                        .fg(DEFAULT_THEME.accent)
                        .add_modifier(Modifier::BOLD),
                    Some(Style::default().bg(DEFAULT_THEME.focus_bg)),
                )
            } else if in_span {
                (
                    "│",
                    Style::default().fg(DEFAULT_THEME.accent),
                    Some(Style::default().bg(DEFAULT_THEME.span_bg)),
                )
            } else {
                (" ", Style::default().fg(DEFAULT_THEME.muted), None)
            };

            let mut content_line = highlight_source_code(line, data.dialect);
            if let Some(background) = background {
                for span in &mut content_line.spans {
                    span.style = span.style.patch(background);
                }
            }

            let mut final_spans = vec![Span::styled(
                format!("{}{:4} ", marker, line_num),
                num_style,
            )];
            final_spans.extend(content_line.spans);
            Line::from(final_spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_preserves_text() {
        for (src, dialect) in [
            ("const s = 'a\\'b'; // note", Dialect::JavaScript),
            ("for x in xs:  # ünïcode", Dialect::Python),
            ("print(\"unterminated", Dialect::Python),
        ] {
            assert_eq!(text_of(&highlight_source_code(src, dialect)), src);
        }
    }

    #[test]
    fn test_comment_style_follows_dialect() {
        let py = highlight_source_code("x # c", Dialect::Python);
        let last = py.spans.last().unwrap();
        assert_eq!(last.content, "# c");
        assert_eq!(last.style.fg, Some(DEFAULT_THEME.muted));

        let js = highlight_source_code("x # c", Dialect::JavaScript);
        assert_ne!(js.spans.last().unwrap().content, "# c");
    }
}
