//! Wish persistence – an ordered, newest-first list kept in a JSON file.
//!
//! The store is the single owner of the item list.  File I/O here is
//! blocking; `app::store_runtime` moves it off the UI task.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use super::item::{Item, NewWish};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a valid wish file: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("a wish needs some text")]
    EmptyText,
}

/// In-memory wish list plus the set of ids liked during this session.
#[derive(Debug, Clone, Default)]
pub struct WishStore {
    items: Vec<Item>,
    liked: HashSet<u64>,
    next_id: u64,
}

impl WishStore {
    pub fn new(items: Vec<Item>) -> Self {
        let next_id = items.iter().map(|i| i.id).max().map_or(1, |m| m.saturating_add(1));
        Self {
            items,
            liked: HashSet::new(),
            next_id,
        }
    }

    /// The built-in starter wall used when no wish file exists yet.
    pub fn seeded() -> Self {
        Self::new(seed_items())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Swap in a freshly loaded list.  Likes recorded this session survive.
    pub fn replace(&mut self, items: Vec<Item>) {
        let liked = std::mem::take(&mut self.liked);
        *self = Self::new(items);
        self.liked = liked;
    }

    /// Prepend a new wish.  Blank text is rejected.
    pub fn add(&mut self, wish: NewWish) -> Result<&Item, StoreError> {
        let text = wish.text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }
        let item = Item {
            id: self.next_id,
            text: text.to_string(),
            color: wish.color.filter(|c| !c.trim().is_empty()),
            gradient: wish.gradient,
            signature: wish.signature,
            likes: Some(0),
            created_at: Some(Utc::now()),
        };
        self.next_id = self.next_id.saturating_add(1);
        self.items.insert(0, item);
        Ok(&self.items[0])
    }

    /// Increment the like count of the item at `index`.
    ///
    /// Returns the new count, or `None` when the index is out of range or the
    /// item was already liked in this session.
    pub fn like(&mut self, index: usize) -> Option<u32> {
        let item = self.items.get_mut(index)?;
        if !self.liked.insert(item.id) {
            return None;
        }
        let likes = item.like_count().saturating_add(1);
        item.likes = Some(likes);
        Some(likes)
    }

    pub fn has_liked(&self, index: usize) -> bool {
        self.items
            .get(index)
            .is_some_and(|item| self.liked.contains(&item.id))
    }
}

/// Read the wish file.  A missing file is `Ok(None)`, not an error.
pub fn load(path: &Path) -> Result<Option<Vec<Item>>, StoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if raw.trim().is_empty() {
        return Ok(Some(Vec::new()));
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the whole list, replacing the file atomically.
pub fn save(path: &Path, items: &[Item]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(items).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)
}

pub fn seed_items() -> Vec<Item> {
    const SEEDS: &[(&str, Option<&str>, bool)] = &[
        ("I hope everyone here finds a little peace this year.", None, false),
        ("Pass the driving test on the first try!", Some("#ffe066"), false),
        ("More long walks, fewer late nights.", Some("#6b8bff"), true),
        ("May my grandmother stay healthy.", Some("#ff8fab"), false),
        ("Finish the novel I started three winters ago.", None, false),
        ("Learn to bake bread that actually rises.", Some("#8ce99a"), false),
        ("See the northern lights once.", Some("#845ef7"), true),
        ("Call my friends more often.", None, false),
        ("Ship the side project.", Some("#ffa94d"), false),
        ("Sleep eight hours. Just once.", Some("#3bc9db"), true),
        ("Find the courage to sing in public.", None, false),
        ("A quiet, happy year for all of us.", Some("#f783ac"), false),
    ];
    SEEDS
        .iter()
        .enumerate()
        .map(|(i, &(text, color, gradient))| {
            let mut item = Item::new(i as u64 + 1, text);
            item.color = color.map(str::to_string);
            item.gradient = gradient.then_some(true);
            item.likes = Some(((i * 7) % 13) as u32);
            item
        })
        .collect()
}
