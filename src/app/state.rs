//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::path::PathBuf;
use std::time::Instant;

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::{
    clock::FrameClock,
    item::{Item, NewWish},
    store::{StoreError, WishStore},
    wall::{columns_for_width, Selection, Wall, WallEvent},
};
use crate::ui::{layout, tilt::Tilt};

/// Colours offered by the compose overlay.  The first is the default.
pub const PALETTE: &[&str] = &[
    "#6b8bff", "#ffe066", "#ff8fab", "#8ce99a", "#845ef7", "#ffa94d", "#3bc9db", "#f1f3f5",
];

/// Longest wish accepted by the compose overlay, in characters.
pub const MAX_WISH_CHARS: usize = 280;

/// Which view / overlay is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Wall,
    Compose,
    Preview,
    Help,
}

// ───────────────────────────────────────── compose ───────────

/// Draft of a new wish.
#[derive(Debug, Clone, Default)]
pub struct ComposeState {
    pub text: String,
    pub palette_index: usize,
    pub gradient: bool,
    /// Validation message shown under the input.
    pub error: Option<String>,
}

impl ComposeState {
    pub fn color(&self) -> &'static str {
        PALETTE[self.palette_index % PALETTE.len()]
    }

    /// Step through the palette; negative steps go backwards.
    pub fn cycle_color(&mut self, step: isize) {
        let len = PALETTE.len() as isize;
        self.palette_index = (self.palette_index as isize + step).rem_euclid(len) as usize;
    }

    pub fn insert(&mut self, text: &str) {
        let room = MAX_WISH_CHARS.saturating_sub(self.text.chars().count());
        self.text.extend(text.chars().filter(|c| !c.is_control() || *c == '\n').take(room));
        self.error = None;
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn to_new_wish(&self) -> NewWish {
        NewWish {
            text: self.text.clone(),
            color: Some(self.color().to_string()),
            gradient: Some(self.gradient),
            signature: None,
        }
    }
}

// ───────────────────────────────────────── preview ───────────

/// The card currently opened in the preview overlay.
#[derive(Debug, Clone)]
pub struct PreviewState {
    pub selection: Selection,
    pub tilt: Tilt,
}

// ───────────────────────────────────────── state ─────────────

/// Top-level application state.
pub struct AppState {
    /// The wish list.
    pub store: WishStore,
    /// Where wishes are persisted.
    pub store_path: PathBuf,
    /// `false` after a failed load, so an unreadable file is never clobbered.
    pub persist: bool,
    /// Set by event handlers to request a background save.
    pub needs_save: bool,
    /// All columns and their drivers.
    pub wall: Wall,
    /// User-configurable keybindings and tuning.
    pub config: AppConfig,
    /// Fixed column count from the command line; `None` follows the width.
    pub fixed_columns: Option<usize>,
    /// Full terminal area from the last draw.
    pub terminal_area: Rect,
    /// Column viewports from the last layout pass (for mouse hit-testing).
    pub column_areas: Vec<Rect>,
    /// Column targeted by keyboard actions.
    pub focused_column: usize,
    pub clock: FrameClock,
    /// Monotonic frame counter (drives spinners).
    pub frame: u64,
    /// Which view / overlay is currently shown.
    pub active_view: ActiveView,
    pub compose: ComposeState,
    pub preview: Option<PreviewState>,
    /// Cell where the left button went down, cleared once the press turns
    /// into a drag.  Releasing on it counts as a click.
    pub press: Option<(u16, u16)>,
    /// Last row seen while the left button is held, for touch-style scrolling.
    pub drag_row: Option<u16>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig, store_path: PathBuf, fixed_columns: Option<usize>) -> Self {
        let mut wall = Wall::new(config.wall.clone());
        wall.set_loading(true);
        Self {
            store: WishStore::default(),
            store_path,
            persist: true,
            needs_save: false,
            wall,
            config,
            fixed_columns: fixed_columns.filter(|&n| n > 0),
            terminal_area: Rect::default(),
            column_areas: Vec::new(),
            focused_column: 0,
            clock: FrameClock::new(),
            frame: 0,
            active_view: ActiveView::default(),
            compose: ComposeState::default(),
            preview: None,
            press: None,
            drag_row: None,
            should_quit: false,
            status_message: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.wall.is_loading()
    }

    /// Column count for a wall `width` cells wide.
    pub fn column_count_for(&self, width: u16) -> usize {
        self.fixed_columns
            .unwrap_or_else(|| columns_for_width(width, self.config.wall.breakpoints))
    }

    /// Lay the wall out in `wall_area`: pick the column count, rebucket if
    /// needed, and report each column's height.
    pub fn layout_wall(&mut self, wall_area: Rect) {
        let count = self.column_count_for(wall_area.width);
        self.column_areas = layout::column_areas(wall_area, count);
        self.wall.sync(self.store.len(), count);
        let extents: Vec<f64> = self
            .column_areas
            .iter()
            .map(|r| f64::from(r.height))
            .collect();
        self.wall.set_viewport_extents(&extents);
        if self.focused_column >= count {
            self.focused_column = count - 1;
        }
    }

    /// Advance every animation by one frame.
    pub fn advance_frame(&mut self, now: Instant) {
        self.frame = self.frame.wrapping_add(1);
        let dt = self.clock.tick(now);
        self.wall.tick(dt);
        if let Some(preview) = &mut self.preview {
            preview.tilt.tick();
        }
    }

    /// The load finished.  `None` means no wish file exists yet.
    pub fn finish_loading(&mut self, loaded: Result<Option<Vec<Item>>, StoreError>) {
        match loaded {
            Ok(Some(items)) => {
                tracing::info!(count = items.len(), "wishes loaded");
                self.store.replace(items);
            }
            Ok(None) => {
                tracing::info!(path = %self.store_path.display(), "no wish file, using seeds");
                self.store = WishStore::seeded();
                self.needs_save = true;
            }
            Err(e) => {
                tracing::warn!("failed to load wishes: {e}");
                self.persist = false;
                self.store = WishStore::seeded();
                self.status_message = Some(format!("{e} (changes will not be saved)"));
            }
        }
        let count = self.wall.column_count().max(1);
        self.wall.sync(self.store.len(), count);
        self.wall.set_loading(false);
    }

    /// Feed a wall output into the rest of the app.
    pub fn apply_wall_event(&mut self, event: WallEvent) {
        match event {
            WallEvent::Selected(selection) => {
                tracing::debug!(index = selection.index, "card opened");
                self.preview = Some(PreviewState {
                    selection,
                    tilt: Tilt::default(),
                });
                self.active_view = ActiveView::Preview;
            }
            WallEvent::LikeRequested { index } => match self.store.like(index) {
                Some(likes) => {
                    self.status_message = Some(format!("♥ {likes}"));
                    self.needs_save = true;
                }
                None => {
                    self.status_message = Some("Already liked".into());
                }
            },
        }
    }

    /// Submit the compose draft.  On success the overlay closes and the new
    /// card joins the wall; on failure the draft stays open with an error.
    pub fn submit_compose(&mut self) {
        match self.store.add(self.compose.to_new_wish()) {
            Ok(item) => {
                tracing::info!(id = item.id, "wish added");
                self.compose = ComposeState::default();
                self.active_view = ActiveView::Wall;
                self.status_message = Some("Your wish is on the wall".into());
                self.needs_save = true;
                let count = self.wall.column_count().max(1);
                self.wall.sync(self.store.len(), count);
            }
            Err(e) => {
                self.compose.error = Some(e.to_string());
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        let paused = !self.clock.is_paused();
        self.clock.set_paused(paused);
        self.status_message = Some(if paused { "Paused" } else { "Resumed" }.into());
    }

    /// Column viewport containing the terminal cell, with the row relative
    /// to the column top.
    pub fn column_at(&self, column: u16, row: u16) -> Option<(usize, u16)> {
        self.column_areas.iter().enumerate().find_map(|(i, r)| {
            let inside = column >= r.x && column < r.right() && row >= r.y && row < r.bottom();
            inside.then(|| (i, row - r.y))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), PathBuf::from("unused.json"), None)
    }

    fn loaded(texts: &[&str]) -> AppState {
        let mut s = state();
        s.layout_wall(Rect::new(0, 1, 80, 24));
        let items = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Item::new(i as u64 + 1, *t))
            .collect();
        s.finish_loading(Ok(Some(items)));
        s.layout_wall(Rect::new(0, 1, 80, 24));
        s
    }

    #[test]
    fn starts_loading_with_skeletons() {
        let mut s = state();
        s.layout_wall(Rect::new(0, 1, 80, 24));
        assert!(s.is_loading());
        assert_eq!(s.column_areas.len(), 3);
        assert!(s.wall.columns().is_empty());
    }

    #[test]
    fn missing_file_falls_back_to_seeds_and_saves() {
        let mut s = state();
        s.finish_loading(Ok(None));
        assert!(!s.is_loading());
        assert!(!s.store.is_empty());
        assert!(s.needs_save);
        assert!(s.persist);
    }

    #[test]
    fn unreadable_file_disables_saving() {
        let mut s = state();
        s.finish_loading(Err(StoreError::EmptyText));
        assert!(!s.persist);
        assert!(s.status_message.is_some());
    }

    #[test]
    fn submit_rejects_blank_and_keeps_the_draft_open() {
        let mut s = loaded(&["a"]);
        s.active_view = ActiveView::Compose;
        s.compose.insert("   ");
        s.submit_compose();
        assert_eq!(s.active_view, ActiveView::Compose);
        assert!(s.compose.error.is_some());
        assert_eq!(s.store.len(), 1);
    }

    #[test]
    fn submit_prepends_and_rebuckets() {
        let mut s = loaded(&["a", "b"]);
        s.active_view = ActiveView::Compose;
        s.compose.insert("fresh wish");
        s.compose.cycle_color(1);
        s.submit_compose();
        assert_eq!(s.active_view, ActiveView::Wall);
        assert_eq!(s.store.items()[0].text, "fresh wish");
        assert_eq!(s.store.items()[0].color.as_deref(), Some(PALETTE[1]));
        assert_eq!(s.wall.item_count(), 3);
        assert!(s.needs_save);
    }

    #[test]
    fn compose_caps_length_and_drops_control_chars() {
        let mut c = ComposeState::default();
        c.insert("a\tb\u{7}c\nd");
        assert_eq!(c.text, "abc\nd");
        c.insert(&"x".repeat(MAX_WISH_CHARS));
        assert_eq!(c.text.chars().count(), MAX_WISH_CHARS);
        c.cycle_color(-1);
        assert_eq!(c.color(), PALETTE[PALETTE.len() - 1]);
    }

    #[test]
    fn like_is_counted_once() {
        let mut s = loaded(&["a"]);
        s.apply_wall_event(WallEvent::LikeRequested { index: 0 });
        s.apply_wall_event(WallEvent::LikeRequested { index: 0 });
        assert_eq!(s.store.items()[0].like_count(), 1);
        assert_eq!(s.status_message.as_deref(), Some("Already liked"));
    }

    #[test]
    fn fixed_columns_override_the_width() {
        let mut s = AppState::new(AppConfig::default(), PathBuf::new(), Some(2));
        s.focused_column = 4;
        s.layout_wall(Rect::new(0, 0, 200, 20));
        assert_eq!(s.column_areas.len(), 2);
        assert_eq!(s.focused_column, 1);
        assert_eq!(s.column_at(0, 5), Some((0, 5)));
        assert_eq!(s.column_at(199, 19), Some((1, 19)));
        assert_eq!(s.column_at(0, 20), None);
    }

    #[test]
    fn pause_freezes_the_clock() {
        let mut s = loaded(&["a", "b", "c"]);
        let t0 = Instant::now();
        s.advance_frame(t0);
        s.toggle_pause();
        assert!(s.clock.is_paused());
        let before = s.wall.columns()[0].scroll_offset();
        s.advance_frame(t0 + std::time::Duration::from_millis(100));
        assert_eq!(s.wall.columns()[0].scroll_offset(), before);
    }
}
