//! Cursor-advancing scan loop for a single construct kind

use super::lines::{line_of, split_body, BodyLine};
use super::patterns::{slot, MatchRule, RuleMatch};
use crate::errors::ExtractError;

/// One match handed to a scan handler
#[derive(Debug)]
pub struct ScanHit<'t> {
    pub matched: RuleMatch<'t>,
    pub start_line: usize,
    pub end_line: usize,
    /// The `body` slot split into lines; empty when the rule has no body
    pub body: Vec<BodyLine>,
}

/// Run `rule` over `text` from the beginning, calling `handler` for every
/// non-overlapping match in left-to-right order.
///
/// Each search restarts at the end of the previous match. A zero-length match
/// still moves the cursor forward by one character, so the loop always
/// terminates. A handler error stops the scan and is returned; otherwise the
/// number of handled matches is returned.
pub fn scan<'t, F>(text: &'t str, rule: &MatchRule, mut handler: F) -> Result<usize, ExtractError>
where
    F: FnMut(ScanHit<'t>) -> Result<(), ExtractError>,
{
    let mut cursor = 0;
    let mut count = 0;

    while let Some(matched) = rule.find_at(text, cursor) {
        let next_cursor = if matched.is_empty() {
            next_char_boundary(text, matched.start)
        } else {
            matched.end
        };

        let start_line = line_of(text, matched.start);
        let end_line = line_of(text, matched.end).max(start_line);
        let body = split_body(matched.slot_or_empty(slot::BODY));

        handler(ScanHit {
            matched,
            start_line,
            end_line,
            body,
        })?;
        count += 1;

        if next_cursor > text.len() {
            break;
        }
        cursor = next_cursor;
    }

    Ok(count)
}

/// Offset of the character after the one starting at `offset`
fn next_char_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .chars()
        .next()
        .map_or(offset + 1, |c| offset + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::patterns::{ConstructKind, Dialect, PatternTable, RuleSpec};

    #[test]
    fn test_scan_collects_spans_in_order() {
        let table = PatternTable::for_dialect(Dialect::JavaScript);
        let rule = table.rule(ConstructKind::Loop).unwrap();
        let text = "for (;;) {\n  a();\n}\n\nfor (x of y) {\n}";

        let mut spans = Vec::new();
        let count = scan(text, rule, |hit| {
            spans.push((hit.start_line, hit.end_line, hit.body.len()));
            Ok(())
        })
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(spans, vec![(1, 3, 3), (5, 6, 2)]);
    }

    #[test]
    fn test_zero_length_rule_terminates() {
        let table = PatternTable::from_specs(&[RuleSpec::new(ConstructKind::Variable, r"x*")])
            .unwrap();
        let rule = table.rule(ConstructKind::Variable).unwrap();

        // One empty match per position plus one at the very end
        let count = scan("ab→", rule, |_| Ok(())).unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_handler_error_stops_scan() {
        let table = PatternTable::for_dialect(Dialect::Python);
        let rule = table.rule(ConstructKind::Import).unwrap();
        let text = "import os\nimport sys\nimport re";

        let mut seen = 0;
        let result = scan(text, rule, |hit| {
            seen += 1;
            if hit.start_line == 2 {
                return Err(ExtractError::ScanFailure {
                    kind: ConstructKind::Import,
                    message: "boom".to_string(),
                });
            }
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(seen, 2);
    }
}
