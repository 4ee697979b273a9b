use crate::parser::patterns::ConstructKind;
use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color, // Blue
    pub accent: Color,  // Orange
    pub muted: Color,   // Grey
    pub at_start: Color,
    pub at_end: Color,
    pub keyword: Color,
    pub literal: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub focus_bg: Color,
    pub span_bg: Color,
    pub callable: Color,
    pub outer_call: Color, // Muted yellow for outer call stack entries
    pub class_name: Color,
    pub loop_kind: Color,
    pub condition_kind: Color,
    pub import_kind: Color,
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),
    accent: Color::Rgb(250, 179, 135),
    muted: Color::Rgb(108, 112, 134),
    at_start: Color::Rgb(166, 227, 161),      // Green
    at_end: Color::Rgb(243, 139, 168),        // Red
    keyword: Color::Rgb(137, 180, 250),
    literal: Color::Rgb(250, 179, 135),
    border_focused: Color::Rgb(249, 226, 175),
    border_normal: Color::Rgb(108, 112, 134),
    focus_bg: Color::Rgb(50, 50, 70),         // First line of the current construct
    span_bg: Color::Rgb(40, 40, 58),          // Rest of the current construct
    callable: Color::Rgb(249, 226, 175),      // Yellow
    outer_call: Color::Rgb(180, 165, 120),
    class_name: Color::Rgb(148, 226, 213),    // Teal
    loop_kind: Color::Rgb(203, 166, 247),     // Mauve
    condition_kind: Color::Rgb(245, 194, 231), // Pink
    import_kind: Color::Rgb(116, 199, 236),   // Sapphire
};

impl Theme {
    /// Color used to tag records and steps of `kind`
    pub fn kind_color(&self, kind: ConstructKind) -> Color {
        match kind {
            ConstructKind::Function => self.callable,
            ConstructKind::Variable | ConstructKind::Array => self.literal,
            ConstructKind::Loop => self.loop_kind,
            ConstructKind::Condition => self.condition_kind,
            ConstructKind::Class => self.class_name,
            ConstructKind::Import => self.import_kind,
            ConstructKind::SingleLineComment | ConstructKind::MultiLineComment => self.muted,
        }
    }
}
