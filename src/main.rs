//! A drifting wall of wish cards for the terminal.
//!
//! Each column scrolls forever on its own; click a card to open it, click
//! its heart to like it, press `c` to pin a new wish.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr, Stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::{ActiveView, AppState},
    store_runtime::{self, StoreUpdate},
};
use crate::ui::{
    layout::AppLayout,
    popup,
    spinner::ActivityIndicator,
    theme::Theme,
    wall_widget::WallWidget,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "A drifting wall of wish cards")]
struct Cli {
    /// Wish file (defaults to `$XDG_DATA_HOME/wish-wall/wishes.json`).
    #[arg(long)]
    store: Option<PathBuf>,

    /// Fix the number of columns instead of following the terminal width.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=12))]
    columns: Option<u16>,

    /// Animation frames per second.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=120))]
    fps: Option<u64>,

    /// Write logs to this file instead of stderr.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Write the current configuration (defaults included) and exit.
    #[arg(long = "write-config")]
    write_config: bool,
}

type Tui = Terminal<CrosstermBackend<Stderr>>;

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            // Only in debug builds / when RUST_LOG is set.
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();
    state.terminal_area = area;
    let layout = AppLayout::from_area(area);
    state.layout_wall(layout.wall_area);
    let state = &*state;

    let mut header = vec![Span::styled(" ✦ wish wall ", Theme::title_style())];
    if !state.is_loading() {
        header.push(Span::styled(
            format!("· {} wishes ", state.store.len()),
            Theme::dim_style(),
        ));
    }
    if state.clock.is_paused() {
        header.push(Span::styled("· paused ", Theme::dim_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), layout.header_area);
    frame.render_widget(
        ActivityIndicator {
            visible: state.is_loading(),
            tick: state.frame,
            label: "loading wishes",
        },
        layout.header_area,
    );

    let mut wall = WallWidget::new(&state.wall, &state.store, &state.column_areas)
        .frame(state.frame);
    if state.active_view == ActiveView::Wall {
        wall = wall.focused(state.focused_column);
    }
    frame.render_widget(wall, layout.wall_area);

    let hint = state.config.status_bar_hint();
    let status_text = match state.active_view {
        ActiveView::Wall => state.status_message.as_deref().unwrap_or(&hint),
        ActiveView::Compose | ActiveView::Preview | ActiveView::Help => "",
    };
    let status = Paragraph::new(status_text).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);

    match state.active_view {
        ActiveView::Compose => frame.render_widget(
            popup::ComposePopup {
                compose: &state.compose,
                frame: state.frame,
            },
            area,
        ),
        ActiveView::Preview => {
            if let Some(preview) = &state.preview {
                frame.render_widget(popup::PreviewPopup { preview }, area);
            }
        }
        ActiveView::Help => frame.render_widget(
            popup::HelpPopup {
                config: &state.config,
            },
            area,
        ),
        ActiveView::Wall => {}
    }
}

// ───────────────────────────────────────── event loop ────────

async fn run(terminal: &mut Tui, state: &mut AppState) -> Result<()> {
    let mut events = spawn_event_reader(Duration::from_millis(100));
    let (store_tx, mut store_rx) = mpsc::unbounded_channel::<StoreUpdate>();
    store_runtime::spawn_load(store_tx.clone(), state.store_path.clone());
    let saver = store_runtime::spawn_saver(store_tx, state.store_path.clone());

    let mut frames = tokio::time::interval(Duration::from_millis(state.config.wall.frame_ms.max(1)));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal.draw(|frame| draw(frame, state))?;
        store_runtime::flush_save(state, &saver);

        if state.should_quit {
            break;
        }

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m),
                    AppEvent::Paste(text) => handler::handle_paste(state, &text),
                    AppEvent::Resize(_, _) => {}
                }
            }

            Some(update) = store_rx.recv() => {
                store_runtime::apply_store_update(state, update);
            }

            _ = frames.tick() => {
                state.advance_frame(Instant::now());
            }
        }
    }

    // Let the saver finish whatever is queued before the process exits.
    drop(saver);
    while let Some(update) = store_rx.recv().await {
        if let StoreUpdate::Saved(Err(e)) = &update {
            tracing::error!("final save failed: {e}");
        }
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let mut user_config = config::AppConfig::load();
    if let Some(fps) = cli.fps {
        user_config.wall.frame_ms = (1000 / fps).max(1);
    }

    if cli.write_config {
        let path = user_config.save()?;
        println!("{}", path.display());
        return Ok(());
    }

    let store_path = cli.store.unwrap_or_else(config::default_store_path);
    let mut state = AppState::new(
        user_config,
        store_path,
        cli.columns.map(usize::from),
    );

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(
        stderr(),
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut state).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}
