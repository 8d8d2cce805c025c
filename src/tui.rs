use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::models::{CONDITION, IN_OUT, STATUS_IN, STATUS_IN_TRANSIT, STATUS_OUT};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const CURSOR_HEADER_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

const GOOD_STYLE: Style = Style::new().fg(Color::Rgb(250, 250, 51));
const BAD_STYLE: Style = Style::new().fg(Color::Rgb(194, 65, 12));
const DESTROYED_STYLE: Style = Style::new().fg(Color::Rgb(185, 28, 28));
const IN_STYLE: Style = Style::new().fg(Color::Rgb(59, 130, 246));
const OUT_STYLE: Style = Style::new().fg(Color::Rgb(245, 158, 11));
const TRANSIT_STYLE: Style = Style::new().fg(Color::Rgb(139, 92, 246));

pub fn condition_style(condition: &str) -> Style {
    match condition {
        "Good" => GOOD_STYLE,
        "Bad" => BAD_STYLE,
        "Destroyed" => DESTROYED_STYLE,
        _ => Style::new(),
    }
}

pub fn status_style(status: &str) -> Style {
    match status {
        STATUS_IN => IN_STYLE,
        STATUS_OUT => OUT_STYLE,
        STATUS_IN_TRANSIT => TRANSIT_STYLE,
        _ => Style::new(),
    }
}

/// A table cell, coloured when the column is one of the derived status fields.
pub fn cell_span(column: &str, text: String) -> Span<'static> {
    let style = match column {
        CONDITION => condition_style(&text),
        IN_OUT => status_style(&text),
        _ => Style::new(),
    };
    Span::styled(text, style)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}
