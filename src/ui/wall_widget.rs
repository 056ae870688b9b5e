//! Custom Ratatui widget that draws the drifting wall: each mounted
//! [`Column`]'s visible cards, clipped to its viewport, or skeleton cards
//! while the wish list is still loading.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::bucket::Slot;
use crate::core::column::{Column, RenderedCard};
use crate::core::item::Item;
use crate::core::store::WishStore;
use crate::core::wall::Wall;

use super::theme::{self, Theme};

const PLACEHOLDER_TEXT: &str = "No wishes yet. Press c to write the first one.";

/// Skeleton cards drawn per column while loading.
const SKELETON_CARDS: usize = 4;

// ───────────────────────────────────────── geometry ──────────

/// Row inside a card slot that carries the like counter, if the card is tall
/// enough to have one.  Slots are `card_height` rows: the bordered card and
/// a one-row gap below it.
pub fn like_row_offset(card_height: u16) -> Option<u16> {
    (card_height >= 5).then(|| card_height - 3)
}

/// Cards are drawn at `floor(top)`.  Map a terminal row (relative to the
/// column top) to the position that hit-tests against the same card.
pub fn hit_row(row: u16, scroll_offset: f64) -> f64 {
    let frac = if scroll_offset.is_finite() {
        (-scroll_offset).rem_euclid(1.0)
    } else {
        0.0
    };
    f64::from(row) + frac
}

/// Row of `row` relative to the first line of `card`.
pub fn row_in_card(card: &RenderedCard, row: u16) -> i32 {
    i32::from(row) - card.top.floor() as i32
}

/// Hit-test position of the middle row of `column`.  Keyboard actions
/// apply to whatever card sits there.
pub fn focus_row(column: &Column) -> Option<f64> {
    let extent = column.viewport_extent();
    if !(extent >= 1.0) {
        return None;
    }
    let middle = (extent / 2.0).floor() as u16;
    Some(hit_row(middle, column.scroll_offset()))
}

pub fn focused_card(column: &Column) -> Option<RenderedCard> {
    column.card_at(focus_row(column)?)
}

// ───────────────────────────────────────── widget ────────────

/// The wall widget — created fresh each frame.
pub struct WallWidget<'a> {
    wall: &'a Wall,
    store: &'a WishStore,
    areas: &'a [Rect],
    focused: Option<usize>,
    frame: u64,
}

impl<'a> WallWidget<'a> {
    /// `areas` are the column viewports, left to right.
    pub fn new(wall: &'a Wall, store: &'a WishStore, areas: &'a [Rect]) -> Self {
        Self {
            wall,
            store,
            areas,
            focused: None,
            frame: 0,
        }
    }

    pub fn focused(mut self, column: usize) -> Self {
        self.focused = Some(column);
        self
    }

    /// Frame counter (drives the skeleton shimmer).
    pub fn frame(mut self, frame: u64) -> Self {
        self.frame = frame;
        self
    }

    fn render_column(&self, column: &Column, area: Rect, buf: &mut Buffer) {
        let card_height = column.card_height().round().max(1.0) as u16;
        let focus_key = (self.focused == Some(column.index()))
            .then(|| focused_card(column).map(|c| c.key))
            .flatten();

        for card in column.visible_cards() {
            let lines = match card.slot {
                Slot::Item(index) => match self.store.get(index) {
                    Some(item) => item_card_lines(
                        item,
                        self.store.has_liked(index),
                        area.width,
                        card_height,
                        focus_key == Some(card.key),
                    ),
                    None => continue,
                },
                // Only the sentinel column carries the empty-state message;
                // columns with an empty bucket loop blank outlines.
                Slot::Placeholder if column.bucket().is_empty() => {
                    placeholder_card_lines("", area.width, card_height)
                }
                Slot::Placeholder => placeholder_card_lines(PLACEHOLDER_TEXT, area.width, card_height),
            };
            let top = card.top.floor() as i32;
            blit_lines(&lines, top, area, buf);
        }
    }

    fn render_skeleton(&self, index: usize, area: Rect, buf: &mut Buffer) {
        let card_height = self.wall.tuning().card_height.max(1);
        // Alternate columns are staggered by half a card.
        let stagger = if index % 2 == 1 { i32::from(card_height / 2) } else { 0 };
        for slot in 0..SKELETON_CARDS {
            let phase = (self.frame / 4 + slot as u64 + index as u64) % 3;
            let lines = skeleton_card_lines(area.width, card_height, phase);
            let top = slot as i32 * i32::from(card_height) - stagger;
            blit_lines(&lines, top, area, buf);
        }
    }
}

impl Widget for WallWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.wall.is_loading() {
            for (i, col_area) in self.areas.iter().enumerate() {
                self.render_skeleton(i, col_area.intersection(area), buf);
            }
            return;
        }
        for (column, col_area) in self.wall.columns().iter().zip(self.areas) {
            self.render_column(column, col_area.intersection(area), buf);
        }
    }
}

// ───────────────────────────────────────── card drawing ──────

/// Copy `lines` into `area` starting `top` rows below its top edge, dropping
/// whatever falls outside.
fn blit_lines(lines: &[Line<'_>], top: i32, area: Rect, buf: &mut Buffer) {
    for (i, line) in lines.iter().enumerate() {
        let row = top + i as i32;
        if row < 0 || row >= i32::from(area.height) {
            continue;
        }
        buf.set_line(area.x, area.y + row as u16, line, area.width);
    }
}

fn item_card_lines(
    item: &Item,
    liked: bool,
    width: u16,
    card_height: u16,
    focused: bool,
) -> Vec<Line<'static>> {
    let box_height = card_height.saturating_sub(1).max(1);
    let hex = item.color.as_deref();
    let gradient = item.is_gradient();
    let style_at = |row: u16| theme::card_style(hex, gradient, row, box_height);
    let border = if focused {
        Some(Theme::focused_border_style())
    } else {
        None
    };

    let likes = like_row_offset(card_height).map(|_| {
        let mut spans = vec![Span::styled(
            format!("♥ {}", item.like_count()),
            Theme::like_style(liked),
        )];
        if item.signature.is_some() {
            spans.push(Span::raw("  ✎"));
        }
        spans
    });
    boxed_card(&item.text, likes, width, box_height, style_at, border)
}

fn placeholder_card_lines(text: &str, width: u16, card_height: u16) -> Vec<Line<'static>> {
    let box_height = card_height.saturating_sub(1).max(1);
    boxed_card(
        text,
        None,
        width,
        box_height,
        |_| Theme::placeholder_style(),
        None,
    )
}

fn skeleton_card_lines(width: u16, card_height: u16, phase: u64) -> Vec<Line<'static>> {
    let box_height = card_height.saturating_sub(1).max(1);
    let fill = ["░", "▒", "░"][phase as usize % 3];
    let inner = usize::from(width.saturating_sub(4));
    let bar = |len: usize| fill.repeat(len);
    let body: Vec<String> = (0..box_height.saturating_sub(2))
        .map(|i| if i % 2 == 0 { bar(inner) } else { bar(inner * 2 / 3) })
        .collect();
    boxed_card(
        &body.join("\n"),
        None,
        width,
        box_height,
        |_| Theme::skeleton_style(),
        None,
    )
}

/// A rounded box exactly `width` × `box_height` cells.  `likes` is drawn on
/// the last inner row.  Narrow or short boxes drop the border.
fn boxed_card<F>(
    text: &str,
    likes: Option<Vec<Span<'static>>>,
    width: u16,
    box_height: u16,
    style_at: F,
    border: Option<Style>,
) -> Vec<Line<'static>>
where
    F: Fn(u16) -> Style,
{
    let w = usize::from(width);
    if w == 0 {
        return Vec::new();
    }
    let bordered = width >= 4 && box_height >= 3;
    let inner_w = if bordered { w - 4 } else { w };
    let inner_rows = if bordered { box_height - 2 } else { box_height };
    let text_rows = usize::from(inner_rows) - usize::from(likes.is_some() && inner_rows > 1);

    let mut body = wrap(text, inner_w.max(1), text_rows);
    body.resize(text_rows, String::new());

    let mut lines = Vec::with_capacity(usize::from(box_height));
    let mut row: u16 = 0;
    let mut push = |content: Vec<Span<'static>>, row: &mut u16| {
        lines.push(Line::from(content).style(style_at(*row)));
        *row += 1;
    };

    if !bordered {
        for text in body {
            push(vec![Span::raw(pad(&text, w))], &mut row);
        }
        if let Some(likes) = likes.filter(|_| inner_rows > 1) {
            push(pad_spans(likes, w), &mut row);
        }
        return lines;
    }

    let edge = |s: &'static str| match border {
        Some(b) => Span::styled(s, b),
        None => Span::raw(s),
    };
    let rule = "─".repeat(w - 2);
    push(
        vec![edge("╭"), edge_owned(rule.clone(), border), edge("╮")],
        &mut row,
    );
    for text in body {
        push(
            vec![edge("│ "), Span::raw(pad(&text, inner_w)), edge(" │")],
            &mut row,
        );
    }
    if let Some(likes) = likes.filter(|_| inner_rows > 1) {
        let mut spans = vec![edge("│ ")];
        spans.extend(pad_spans(likes, inner_w));
        spans.push(edge(" │"));
        push(spans, &mut row);
    }
    push(vec![edge("╰"), edge_owned(rule, border), edge("╯")], &mut row);
    lines
}

fn edge_owned(s: String, border: Option<Style>) -> Span<'static> {
    match border {
        Some(b) => Span::styled(s, b),
        None => Span::raw(s),
    }
}

/// Greedy word wrap into at most `max_rows` rows of `width` characters.  The
/// last row gets an ellipsis when text is cut off.
pub fn wrap(text: &str, width: usize, max_rows: usize) -> Vec<String> {
    let mut rows: Vec<String> = Vec::new();
    if max_rows == 0 || width == 0 {
        return rows;
    }
    let mut truncated = false;
    'outer: for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let used = current.chars().count();
                let sep = usize::from(used > 0);
                if used + sep + word.len() <= width {
                    if sep == 1 {
                        current.push(' ');
                    }
                    current.extend(word.iter());
                    break;
                }
                if used > 0 {
                    rows.push(std::mem::take(&mut current));
                } else {
                    // A single word wider than the row: hard-split it.
                    let rest = word.split_off(width);
                    rows.push(word.iter().collect());
                    word = rest;
                }
                if rows.len() == max_rows {
                    truncated = true;
                    break 'outer;
                }
            }
        }
        if !current.is_empty() {
            rows.push(current);
            if rows.len() == max_rows {
                truncated = true;
                break;
            }
        }
    }
    if truncated && rows_remaining(text, &rows) {
        if let Some(last) = rows.last_mut() {
            let mut chars: Vec<char> = last.chars().collect();
            chars.truncate(width.saturating_sub(1));
            *last = chars.into_iter().collect::<String>() + "…";
        }
    }
    rows
}

/// Whether `rows` leaves any non-blank text of `text` unshown.
fn rows_remaining(text: &str, rows: &[String]) -> bool {
    let shown: usize = rows
        .iter()
        .map(|r| r.chars().filter(|c| !c.is_whitespace()).count())
        .sum();
    let total = text.chars().filter(|c| !c.is_whitespace()).count();
    shown < total
}

fn pad(text: &str, width: usize) -> String {
    let mut s: String = text.chars().take(width).collect();
    let len = s.chars().count();
    s.extend(std::iter::repeat(' ').take(width - len));
    s
}

fn pad_spans(mut spans: Vec<Span<'static>>, width: usize) -> Vec<Span<'static>> {
    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    if used < width {
        spans.push(Span::raw(" ".repeat(width - used)));
    }
    spans
}
