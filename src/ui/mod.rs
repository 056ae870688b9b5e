//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* wall and store and turns them into cells on
//! the terminal.  No file I/O happens here.

pub mod layout;
pub mod popup;
pub mod spinner;
pub mod theme;
pub mod tilt;
pub mod wall_widget;
