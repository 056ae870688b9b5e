//! Input handling — maps key/mouse events to state mutations.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::Action;
use crate::core::suppress::ScrollInput;
use crate::core::wall::WallEvent;
use crate::ui::popup::preview_card_area;
use crate::ui::wall_widget::{focus_row, hit_row, like_row_offset, row_in_card};

use super::state::{ActiveView, AppState, ComposeState};

/// Rows per wheel notch reported to the column surface.
const WHEEL_ROWS: f64 = 3.0;

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    match state.active_view {
        ActiveView::Wall => handle_wall_key(state, key),
        ActiveView::Compose => handle_compose_key(state, key),
        ActiveView::Preview => handle_preview_key(state, key),
        ActiveView::Help => handle_help_key(state, key),
    }
}

/// Bracketed paste goes straight into the compose draft.
pub fn handle_paste(state: &mut AppState, text: &str) {
    if state.active_view == ActiveView::Compose {
        state.compose.insert(&text.replace("\r\n", "\n").replace('\r', "\n"));
    }
}

// ── Wall view (configurable bindings) ───────────────────────────

fn handle_wall_key(state: &mut AppState, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        state.status_message = None;
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };

    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::Compose => {
            state.compose = ComposeState::default();
            state.active_view = ActiveView::Compose;
        }
        Action::Preview => {
            if let Some(event) = focused_event(state, false) {
                state.apply_wall_event(event);
            }
        }
        Action::Like => {
            if let Some(event) = focused_event(state, true) {
                state.apply_wall_event(event);
            }
        }
        Action::NextColumn => cycle_focus(state, 1),
        Action::PrevColumn => cycle_focus(state, -1),
        Action::TogglePause => state.toggle_pause(),
        Action::Help => {
            state.active_view = ActiveView::Help;
        }
    }
}

/// Select or like the card in the middle of the focused column.
fn focused_event(state: &AppState, like: bool) -> Option<WallEvent> {
    let index = state.focused_column;
    let row = focus_row(state.wall.columns().get(index)?)?;
    if like {
        state.wall.like(index, row)
    } else {
        state.wall.select(index, row, state.store.items())
    }
}

fn cycle_focus(state: &mut AppState, step: isize) {
    let count = state.wall.column_count().max(1) as isize;
    state.focused_column = (state.focused_column as isize + step).rem_euclid(count) as usize;
}

// ── Overlays (fixed keys) ───────────────────────────────────────

fn handle_compose_key(state: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Esc => {
            state.active_view = ActiveView::Wall;
        }
        KeyCode::Enter if alt => state.compose.insert("\n"),
        KeyCode::Enter => state.submit_compose(),
        KeyCode::Tab => state.compose.cycle_color(1),
        KeyCode::BackTab => state.compose.cycle_color(-1),
        KeyCode::Backspace => state.compose.backspace(),
        KeyCode::Char('g') if ctrl => state.compose.gradient = !state.compose.gradient,
        KeyCode::Char('u') if ctrl => state.compose.text.clear(),
        KeyCode::Char('c') if ctrl => state.should_quit = true,
        KeyCode::Char(c) if !ctrl && !alt => {
            let mut buf = [0u8; 4];
            state.compose.insert(c.encode_utf8(&mut buf));
        }
        _ => {}
    }
}

fn handle_preview_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => close_preview(state),
        _ => match state.config.match_key(key) {
            Some(Action::Like) => {
                if let Some(index) = state.preview.as_ref().map(|p| p.selection.index) {
                    state.apply_wall_event(WallEvent::LikeRequested { index });
                }
            }
            Some(Action::Quit) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                state.should_quit = true;
            }
            _ => {}
        },
    }
}

fn handle_help_key(state: &mut AppState, key: KeyEvent) {
    let is_help = state.config.match_key(key) == Some(Action::Help);
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => state.active_view = ActiveView::Wall,
        _ if is_help => state.active_view = ActiveView::Wall,
        _ => {}
    }
}

fn close_preview(state: &mut AppState) {
    state.preview = None;
    state.active_view = ActiveView::Wall;
}

// ── Mouse ───────────────────────────────────────────────────────

pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    match state.active_view {
        ActiveView::Wall => handle_wall_mouse(state, mouse),
        ActiveView::Preview => handle_preview_mouse(state, mouse),
        ActiveView::Compose | ActiveView::Help => {}
    }
}

fn handle_wall_mouse(state: &mut AppState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            let delta = if mouse.kind == MouseEventKind::ScrollUp {
                -WHEEL_ROWS
            } else {
                WHEEL_ROWS
            };
            scroll_input(state, mouse.column, mouse.row, ScrollInput::Wheel { delta });
        }
        MouseEventKind::Down(MouseButton::Left) => {
            state.press = Some((mouse.column, mouse.row));
            state.drag_row = Some(mouse.row);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let Some(last) = state.drag_row else {
                return;
            };
            let delta = f64::from(mouse.row) - f64::from(last);
            if delta != 0.0 {
                state.press = None;
                state.drag_row = Some(mouse.row);
                scroll_input(state, mouse.column, mouse.row, ScrollInput::TouchMove { delta });
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            state.drag_row = None;
            if let Some((column, row)) = state.press.take() {
                click(state, column, row);
            }
        }
        _ => {}
    }
}

/// Pointer input over a column.  The column's suppressor swallows scrolls.
fn scroll_input(state: &mut AppState, column: u16, row: u16, input: ScrollInput) {
    let Some((index, _)) = state.column_at(column, row) else {
        return;
    };
    let disposition = state.wall.dispatch_input(index, input);
    tracing::trace!(column = index, ?disposition, "pointer scroll");
}

/// A click on a card opens it; a click on its heart row likes it.
fn click(state: &mut AppState, column: u16, row: u16) {
    let Some((index, local_row)) = state.column_at(column, row) else {
        return;
    };
    state.focused_column = index;
    // Clicks pass through the suppressor untouched.
    scroll_input(state, column, row, ScrollInput::Click);
    let Some(col) = state.wall.columns().get(index) else {
        return;
    };
    let position = hit_row(local_row, col.scroll_offset());
    let card_height = col.card_height().round() as u16;
    let Some(card) = col.card_at(position) else {
        return;
    };

    let on_heart = like_row_offset(card_height)
        .is_some_and(|heart| row_in_card(&card, local_row) == i32::from(heart));
    let event = if on_heart {
        state.wall.like(index, position)
    } else {
        state.wall.select(index, position, state.store.items())
    };
    if let Some(event) = event {
        state.apply_wall_event(event);
    }
}

fn handle_preview_mouse(state: &mut AppState, mouse: MouseEvent) {
    let card = preview_card_area(state.terminal_area);
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            if let Some(preview) = &mut state.preview {
                preview.tilt.point_at(mouse.column, mouse.row, card);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let inside = mouse.column >= card.x
                && mouse.column < card.right()
                && mouse.row >= card.y
                && mouse.row < card.bottom();
            if !inside {
                close_preview(state);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;
    use std::path::PathBuf;
    use std::time::Instant;

    use crate::config::AppConfig;
    use crate::core::item::Item;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Five items over two 20-row columns starting at terminal row 1.
    fn wall_state() -> AppState {
        let mut s = AppState::new(AppConfig::default(), PathBuf::new(), Some(2));
        s.terminal_area = Rect::new(0, 0, 41, 22);
        s.layout_wall(Rect::new(0, 1, 41, 20));
        let items = ["A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(i, t)| Item::new(i as u64 + 1, *t))
            .collect();
        s.finish_loading(Ok(Some(items)));
        s.layout_wall(Rect::new(0, 1, 41, 20));
        s.advance_frame(Instant::now());
        s
    }

    fn click_at(s: &mut AppState, column: u16, row: u16) {
        handle_mouse(s, mouse(MouseEventKind::Down(MouseButton::Left), column, row));
        handle_mouse(s, mouse(MouseEventKind::Up(MouseButton::Left), column, row));
    }

    #[test]
    fn clicking_a_card_opens_the_preview() {
        let mut s = wall_state();
        // Column 0 rests at offset 0: terminal row 2 is inside card A.
        click_at(&mut s, 3, 2);
        assert_eq!(s.active_view, ActiveView::Preview);
        let preview = s.preview.as_ref().unwrap();
        assert_eq!(preview.selection.text, "A");
        assert_eq!(preview.selection.index, 0);
    }

    #[test]
    fn clicking_the_heart_likes_instead() {
        let mut s = wall_state();
        // Heart row is three rows into the card slot.
        click_at(&mut s, 3, 1 + 3);
        assert_eq!(s.active_view, ActiveView::Wall);
        assert_eq!(s.store.items()[0].like_count(), 1);
        assert!(s.needs_save);
    }

    #[test]
    fn drags_and_wheels_never_move_the_column() {
        let mut s = wall_state();
        let before = s.wall.columns()[0].scroll_offset();
        handle_mouse(&mut s, mouse(MouseEventKind::ScrollDown, 3, 5));
        handle_mouse(&mut s, mouse(MouseEventKind::Down(MouseButton::Left), 3, 5));
        handle_mouse(&mut s, mouse(MouseEventKind::Drag(MouseButton::Left), 3, 9));
        handle_mouse(&mut s, mouse(MouseEventKind::Up(MouseButton::Left), 3, 9));
        assert_eq!(s.wall.columns()[0].scroll_offset(), before);
        // The press became a drag, so nothing opened.
        assert_eq!(s.active_view, ActiveView::Wall);
    }

    #[test]
    fn keyboard_focus_cycles_and_opens_the_middle_card() {
        let mut s = wall_state();
        handle_key(&mut s, key(KeyCode::Left));
        assert_eq!(s.focused_column, 1);
        handle_key(&mut s, key(KeyCode::Right));
        assert_eq!(s.focused_column, 0);
        handle_key(&mut s, key(KeyCode::Enter));
        assert_eq!(s.active_view, ActiveView::Preview);
        handle_key(&mut s, key(KeyCode::Esc));
        assert_eq!(s.active_view, ActiveView::Wall);
        assert!(s.preview.is_none());
    }

    #[test]
    fn compose_flow_adds_a_wish() {
        let mut s = wall_state();
        handle_key(&mut s, key(KeyCode::Char('c')));
        assert_eq!(s.active_view, ActiveView::Compose);
        for c in "hi!".chars() {
            handle_key(&mut s, key(KeyCode::Char(c)));
        }
        handle_key(&mut s, KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL));
        handle_key(&mut s, key(KeyCode::Tab));
        handle_key(&mut s, key(KeyCode::Backspace));
        handle_paste(&mut s, " there\r\nfriend");
        handle_key(&mut s, key(KeyCode::Enter));
        assert_eq!(s.active_view, ActiveView::Wall);
        let first = &s.store.items()[0];
        assert_eq!(first.text, "hi there\nfriend");
        assert!(first.is_gradient());
        assert_eq!(s.store.len(), 6);
    }

    #[test]
    fn releases_are_ignored() {
        let mut s = wall_state();
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        release.state = KeyEventState::NONE;
        handle_key(&mut s, release);
        assert!(!s.should_quit);
        handle_key(&mut s, key(KeyCode::Char('q')));
        assert!(s.should_quit);
    }

    #[test]
    fn pointer_tilts_the_preview_and_outside_click_closes() {
        let mut s = wall_state();
        click_at(&mut s, 3, 2);
        let card = preview_card_area(s.terminal_area);
        handle_mouse(&mut s, mouse(MouseEventKind::Moved, card.x, card.y));
        for _ in 0..50 {
            s.advance_frame(Instant::now());
        }
        let (rx, ry) = s.preview.as_ref().unwrap().tilt.angles();
        assert!(rx > 0.0 && ry < 0.0);

        handle_mouse(&mut s, mouse(MouseEventKind::Down(MouseButton::Left), 0, 0));
        assert_eq!(s.active_view, ActiveView::Wall);
    }
}
