//! Parrot/neon theme tokens for the PriceLens dashboard.
//!
//! Neon accents on a dark background; each chart series gets a fixed color
//! from `SERIES_PALETTE` by position, so a series keeps its color while the
//! selection above it is unchanged.

use ratatui::style::{Color, Modifier, Style};

pub const BACKGROUND: Color = Color::Rgb(18, 18, 20);
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT_PRIMARY: Color = Color::White;
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

/// Line colors, cycled when there are more series than entries.
pub const SERIES_PALETTE: [Color; 8] = [
    ACCENT,
    WARNING,
    POSITIVE,
    NEGATIVE,
    NEUTRAL,
    Color::Rgb(255, 255, 102),
    MUTED,
    Color::Rgb(255, 160, 122),
];

pub fn series_color(index: usize) -> Color {
    SERIES_PALETTE[index % SERIES_PALETTE.len()]
}

pub fn panel_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn panel_title(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_SECONDARY)
    }
}

pub fn text() -> Style {
    Style::default().fg(TEXT_PRIMARY)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn heading() -> Style {
    Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn header_row() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Table cell color: day-over-day changes are signed, the non-trading
/// marker is muted, prices are plain.
pub fn cell(value: &str, is_change: bool) -> Style {
    if value == pricelens_core::shape::NON_TRADING {
        return muted();
    }
    if is_change {
        return if value.starts_with('-') {
            Style::default().fg(NEGATIVE)
        } else {
            Style::default().fg(POSITIVE)
        };
    }
    text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        assert_eq!(series_color(0), ACCENT);
        assert_eq!(series_color(SERIES_PALETTE.len()), ACCENT);
        assert_ne!(series_color(0), series_color(1));
    }

    #[test]
    fn change_cells_are_signed() {
        assert_eq!(cell("-1.25", true).fg, Some(NEGATIVE));
        assert_eq!(cell("2.00", true).fg, Some(POSITIVE));
        assert_eq!(cell("185.00", false).fg, Some(TEXT_PRIMARY));
        assert_eq!(cell("non-trading", true).fg, Some(MUTED));
    }

    #[test]
    fn focus_changes_border() {
        assert_ne!(panel_border(true), panel_border(false));
    }
}
