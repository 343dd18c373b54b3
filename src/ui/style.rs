//! Theming and color definitions.
//!
//! Uses ANSI colors that adapt to the terminal's color palette.

use ratatui::style::{Color, Modifier, Style};

use crate::document::{InlineStyle, LineType};

/// Get the style for a given line type.
pub fn style_for_line_type(line_type: &LineType) -> Style {
    match line_type {
        LineType::Heading(1) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineType::Heading(2) => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        LineType::Heading(3) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        LineType::Heading(_) => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD),

        LineType::CodeBlock => Style::default()
            .fg(Color::Indexed(245))
            .add_modifier(Modifier::DIM),

        LineType::BlockQuote => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::ITALIC),

        LineType::HorizontalRule => Style::default()
            .fg(Color::Indexed(240))
            .add_modifier(Modifier::DIM),

        // Placeholder text until the real picture would be drawn
        LineType::Image => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::ITALIC),

        LineType::Summary(_) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),

        LineType::ListItem(_) | LineType::Table | LineType::Paragraph | LineType::Empty => {
            Style::default()
        }
    }
}

/// Get the style for an inline span, merged with a base line style.
pub fn style_for_inline(base: Style, inline: InlineStyle) -> Style {
    let mut style = base;
    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.code {
        style = style.fg(Color::LightRed);
    }
    if inline.link {
        style = style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
    }
    style
}

/// Column separating the panes.
pub fn separator_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Source rows; padding rows stay blank.
pub fn source_style() -> Style {
    Style::default()
}
