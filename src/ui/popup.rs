//! Popup overlay widgets: compose, card preview, and help.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::app::state::{ComposeState, PreviewState, MAX_WISH_CHARS, PALETTE};
use crate::config::{Action, AppConfig};
use crate::core::color;

use super::theme::{self, Theme};
use super::tilt::MAX_TILT;
use super::wall_widget::wrap;

fn popup_block(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
}

// ───────────────────────────────────────── compose popup ─────

/// New-wish editor overlay.
pub struct ComposePopup<'a> {
    pub compose: &'a ComposeState,
    /// Frame counter (blinks the cursor).
    pub frame: u64,
}

impl Widget for ComposePopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered_fixed(58, 16, area);
        Clear.render(popup, buf);

        let block = popup_block("Write a Wish");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let dim = Theme::dim_style();
        let color = self.compose.color();

        let cursor = if (self.frame / 15) % 2 == 0 { "▏" } else { " " };
        let mut lines = vec![Line::raw("")];

        // ── Text area, painted in the chosen colour ─────────────
        let text_width = usize::from(inner.width.saturating_sub(4)).max(1);
        let text_rows = 6;
        let mut body = wrap(&format!("{}{cursor}", self.compose.text), text_width, text_rows);
        body.resize(text_rows, String::new());
        for (i, row) in body.iter().enumerate() {
            let style = theme::card_style(Some(color), self.compose.gradient, i as u16, text_rows as u16);
            let padded = format!(" {row:<text_width$} ");
            lines.push(Line::from(vec![Span::raw(" "), Span::styled(padded, style)]));
        }
        lines.push(Line::from(Span::styled(
            format!(
                "  {}/{MAX_WISH_CHARS}",
                self.compose.text.chars().count()
            ),
            dim,
        )));

        // ── Palette ─────────────────────────────────────────────
        let mut swatches = vec![Span::raw("  colour ")];
        for (i, &hex) in PALETTE.iter().enumerate() {
            let bg = color::parse_hex(hex).map_or(Color::Reset, theme::to_color);
            let fg = color::pick_text_color(Some(hex)).map_or(Color::White, theme::to_color);
            let mark = if i == self.compose.palette_index % PALETTE.len() {
                "▼"
            } else {
                " "
            };
            swatches.push(Span::styled(
                format!(" {mark} "),
                Style::default().bg(bg).fg(fg),
            ));
        }
        lines.push(Line::from(swatches));
        lines.push(Line::from(vec![
            Span::raw("  gradient "),
            if self.compose.gradient {
                Span::styled("[ON]", Style::default().fg(Color::Green))
            } else {
                Span::styled("[OFF]", dim)
            },
        ]));

        match &self.compose.error {
            Some(err) => lines.push(Line::from(Span::styled(
                format!("  {err}"),
                Style::default().fg(Color::LightRed),
            ))),
            None => lines.push(Line::raw("")),
        }
        lines.push(Line::from(Span::styled(
            "  Enter: post  Alt+Enter: newline  Esc: cancel",
            dim,
        )));
        lines.push(Line::from(Span::styled(
            "  Tab/Shift+Tab: colour  Ctrl+g: gradient",
            dim,
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── preview popup ─────

/// Area of the preview card for `area` (also used for pointer tilt).
pub fn preview_card_area(area: Rect) -> Rect {
    centered_fixed(44, 15, area)
}

/// Opened card with pointer tilt.
pub struct PreviewPopup<'a> {
    pub preview: &'a PreviewState,
}

impl Widget for PreviewPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let card = preview_card_area(area);
        // Leave room for the lean on both sides.
        let backdrop = Rect {
            x: card.x.saturating_sub(3),
            width: (card.width + 6).min(area.width),
            ..card
        }
        .intersection(area);
        Clear.render(backdrop, buf);

        let sel = &self.preview.selection;
        let tilt = &self.preview.tilt;
        let (rx, ry) = tilt.angles();
        let height = card.height;
        let inner_w = usize::from(card.width.saturating_sub(4)).max(1);

        // Preview splits on line breaks and runs of spaces, like paragraphs.
        let mut rows: Vec<String> = Vec::new();
        let body_rows = usize::from(height.saturating_sub(5));
        for block in split_blocks(&sel.text) {
            if !rows.is_empty() {
                rows.push(String::new());
            }
            rows.extend(wrap(block, inner_w, body_rows.saturating_sub(rows.len())));
            if rows.len() >= body_rows {
                break;
            }
        }
        rows.truncate(body_rows);
        let footer = if sel.signature.is_some() { "✎ signed" } else { "" };

        // Sheen row follows the pointer's vertical position.
        let mid = f64::from(height.saturating_sub(1)) / 2.0;
        let sheen = (mid - rx / MAX_TILT * mid).round() as u16;

        for r in 0..height {
            let style = theme::card_style(sel.color.as_deref(), sel.gradient, r, height);
            let style = if r == sheen {
                style.add_modifier(Modifier::BOLD)
            } else {
                style
            };
            let content = match r {
                0 => format!("╭{}╮", "─".repeat(usize::from(card.width.saturating_sub(2)))),
                r if r + 1 == height => {
                    format!("╰{}╯", "─".repeat(usize::from(card.width.saturating_sub(2))))
                }
                r if r + 2 == height => format!("│ {footer:>inner_w$} │"),
                r => {
                    let text = usize::from(r)
                        .checked_sub(2)
                        .and_then(|i| rows.get(i))
                        .map_or("", String::as_str);
                    format!("│ {text:^inner_w$} │")
                }
            };
            let shift = tilt.row_shift((f64::from(r) - mid) * 2.0);
            let x = i32::from(card.x) + i32::from(shift);
            let lo = i32::from(backdrop.x);
            let hi = i32::from(backdrop.right().saturating_sub(card.width)).max(lo);
            let x = x.max(lo).min(hi);
            buf.set_stringn(x as u16, card.y + r, &content, usize::from(card.width), style);
        }

        let caption = format!(" ↕ {rx:+.1}°  ↔ {ry:+.1}°   Esc: close ");
        let y = card.bottom();
        if y < area.bottom() {
            let w = caption.chars().count() as u16;
            let x = card.x + card.width.saturating_sub(w) / 2;
            buf.set_stringn(x, y, &caption, usize::from(card.width), Theme::dim_style());
        }
    }
}

/// Split a wish into display blocks at line breaks and runs of two or
/// more spaces.
pub fn split_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    for line in text.split('\n') {
        let mut rest = line;
        while let Some(pos) = rest.find("  ") {
            blocks.push(&rest[..pos]);
            rest = rest[pos..].trim_start_matches(' ');
        }
        blocks.push(rest);
    }
    let blocks: Vec<&str> = blocks
        .into_iter()
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();
    if blocks.is_empty() {
        vec![text]
    } else {
        blocks
    }
}

// ───────────────────────────────────────── help popup ────────

/// Keybinding reference overlay.
pub struct HelpPopup<'a> {
    pub config: &'a AppConfig,
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Action rows + 2 blanks + 2 mouse rows + 1 hint + 2 border
        let height = (Action::ALL.len() as u16) + 8;
        let popup = centered_fixed(52, height, area);
        Clear.render(popup, buf);

        let block = popup_block("Controls");
        let inner = block.inner(popup);
        block.render(popup, buf);

        let dim = Theme::dim_style();
        let key_style = Style::default().fg(Color::Yellow);
        let mut lines = vec![Line::raw("")];

        for &action in Action::ALL {
            // Fixed-width columns: label left-aligned, keys right-aligned.
            let label_col = format!("   {:<22}", action.label());
            let keys_width = usize::from(inner.width)
                .saturating_sub(label_col.chars().count() + 1)
                .max(1);
            let keys_col = format!("{:>keys_width$}", self.config.display_bindings(action));
            lines.push(Line::from(vec![
                Span::raw(label_col),
                Span::styled(keys_col, key_style),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::raw("   Click a card to open it")));
        lines.push(Line::from(Span::raw("   Click ♥ to like")));
        lines.push(Line::from(Span::styled("  Esc: close", dim)));

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
