//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background task that
//! forwards them over a channel so the main loop stays non-blocking.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Paste(String),
}

impl AppEvent {
    fn from_crossterm(ev: CtEvent) -> Option<Self> {
        match ev {
            CtEvent::Key(k) => Some(Self::Key(k)),
            CtEvent::Mouse(m) => Some(Self::Mouse(m)),
            CtEvent::Resize(w, h) => Some(Self::Resize(w, h)),
            CtEvent::Paste(text) => Some(Self::Paste(text)),
            CtEvent::FocusGained | CtEvent::FocusLost => None,
        }
    }
}

/// Spawns a blocking reader that polls the terminal and sends events through
/// the returned channel.  The reader exits once the receiver is dropped.
pub fn spawn_event_reader(poll_timeout: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            // Poll with a timeout so a dropped receiver is noticed even when
            // the terminal is idle.
            match event::poll(poll_timeout) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::error!("terminal poll failed: {e}");
                    break;
                }
            }
            match event::read() {
                Ok(ev) => {
                    if let Some(app_event) = AppEvent::from_crossterm(ev) {
                        if tx.send(app_event).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => tracing::warn!("terminal read failed: {e}"),
            }
        }
        tracing::debug!("event reader stopped");
    });

    rx
}
