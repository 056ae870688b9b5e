//! Core algorithms – bucket assignment, windowing, recycling, and the
//! per-column scroll driver, plus the wish store they read from.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod bucket;
pub mod clock;
pub mod color;
pub mod column;
pub mod driver;
pub mod item;
pub mod recycler;
pub mod resize;
pub mod store;
pub mod suppress;
pub mod viewport;
pub mod wall;
pub mod window;
