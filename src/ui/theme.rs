//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::core::color::{self, Rgb};

/// Central theme — change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── cards ──────────────────────────────────────────────────
    /// Background for cards without a colour of their own.
    pub const CARD_BG: Color = Color::Rgb(0x26, 0x28, 0x33);

    pub fn card_text_style() -> Style {
        Style::default().fg(Color::White).bg(Self::CARD_BG)
    }

    pub fn focused_border_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn like_style(liked: bool) -> Style {
        if liked {
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    pub fn placeholder_style() -> Style {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn skeleton_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn dim_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn to_color(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb(r, g, b)
}

/// Background of row `row` (of `height`) for a card painted `hex`.
/// Gradient cards fade from the colour towards a darker tone top to bottom.
/// Returns `None` for cards without a usable colour.
pub fn card_background(hex: Option<&str>, gradient: bool, row: u16, height: u16) -> Option<Color> {
    let base = color::parse_hex(hex?)?;
    if !gradient || height <= 1 {
        return Some(to_color(base));
    }
    let t = f64::from(row.min(height - 1)) / f64::from(height - 1);
    Some(to_color(color::darken(base, 0.6 * t)))
}

/// Text style for a card painted `hex`, readable on its background.
pub fn card_style(hex: Option<&str>, gradient: bool, row: u16, height: u16) -> Style {
    match card_background(hex, gradient, row, height) {
        Some(bg) => {
            let fg = color::pick_text_color(hex).map_or(Color::White, to_color);
            Style::default().fg(fg).bg(bg)
        }
        None => Theme::card_text_style(),
    }
}
