//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout: title bar, the wall, and a bottom status bar.
pub struct AppLayout {
    pub header_area: Rect,
    pub wall_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title bar
                Constraint::Min(3),    // wall (takes all remaining space)
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            header_area: chunks[0],
            wall_area: chunks[1],
            status_area: chunks[2],
        }
    }
}

/// Equal-width column viewports across `area`, separated by a one-cell gutter.
pub fn column_areas(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    Layout::horizontal(vec![Constraint::Fill(1); count])
        .spacing(1)
        .split(area)
        .to_vec()
}
