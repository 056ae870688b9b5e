//! Background wish-file jobs to keep the UI thread responsive.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::core::{
    item::Item,
    store::{self, StoreError},
};

#[derive(Debug)]
pub enum StoreUpdate {
    Loaded(Result<Option<Vec<Item>>, StoreError>),
    Saved(Result<usize, StoreError>),
}

pub fn spawn_load(tx: mpsc::UnboundedSender<StoreUpdate>, path: PathBuf) {
    std::thread::spawn(move || {
        let _ = tx.send(StoreUpdate::Loaded(store::load(&path)));
    });
}

/// Start the saver thread.  Snapshots sent to the returned channel are
/// written in order; a backlog collapses to the newest snapshot.
pub fn spawn_saver(
    tx: mpsc::UnboundedSender<StoreUpdate>,
    path: PathBuf,
) -> mpsc::UnboundedSender<Vec<Item>> {
    let (snapshot_tx, mut snapshot_rx) = mpsc::unbounded_channel::<Vec<Item>>();
    std::thread::spawn(move || {
        while let Some(mut items) = snapshot_rx.blocking_recv() {
            while let Ok(newer) = snapshot_rx.try_recv() {
                items = newer;
            }
            let result = store::save(&path, &items).map(|()| items.len());
            if tx.send(StoreUpdate::Saved(result)).is_err() {
                break;
            }
        }
    });
    snapshot_tx
}

/// Queue a save if one was requested and saving is allowed.
pub fn flush_save(state: &mut AppState, saver: &mpsc::UnboundedSender<Vec<Item>>) {
    if !state.needs_save {
        return;
    }
    state.needs_save = false;
    if !state.persist {
        return;
    }
    if saver.send(state.store.items().to_vec()).is_err() {
        tracing::warn!("saver stopped, wishes will not be written");
        state.persist = false;
    }
}

pub fn apply_store_update(state: &mut AppState, update: StoreUpdate) {
    match update {
        StoreUpdate::Loaded(result) => state.finish_loading(result),
        StoreUpdate::Saved(Ok(count)) => {
            tracing::debug!(count, path = %state.store_path.display(), "wishes saved");
        }
        StoreUpdate::Saved(Err(e)) => {
            tracing::warn!("failed to save wishes: {e}");
            state.status_message = Some(format!("Save failed: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("wish-wall-runtime-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn save_then_load_through_the_runtime() {
        let path = scratch("wishes.json");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut state = AppState::new(AppConfig::default(), path.clone(), None);
        state.finish_loading(Ok(None));
        assert!(state.needs_save);

        let saver = spawn_saver(tx.clone(), path.clone());
        flush_save(&mut state, &saver);
        assert!(!state.needs_save);
        let saved = rx.blocking_recv().unwrap();
        assert!(matches!(saved, StoreUpdate::Saved(Ok(n)) if n == state.store.len()));

        spawn_load(tx, path.clone());
        let mut fresh = AppState::new(AppConfig::default(), path.clone(), None);
        apply_store_update(&mut fresh, rx.blocking_recv().unwrap());
        assert!(!fresh.is_loading());
        assert_eq!(fresh.store.len(), state.store.len());
        assert!(!fresh.needs_save);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unreadable_load_blocks_saving() {
        let mut state = AppState::new(AppConfig::default(), scratch("never.json"), None);
        apply_store_update(&mut state, StoreUpdate::Loaded(Err(StoreError::EmptyText)));
        state.needs_save = true;

        let (saver, mut snapshots) = mpsc::unbounded_channel();
        flush_save(&mut state, &saver);
        assert!(snapshots.try_recv().is_err());
        assert!(!state.needs_save);
    }
}
