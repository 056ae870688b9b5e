//! The wish record shown on each card.
//!
//! Items are owned by the store; the wall only ever reads them by index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single wish card's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity (used for like idempotency).
    pub id: u64,
    pub text: String,
    /// Card background as `#rgb` / `#rrggbb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<bool>,
    /// Opaque signature image (typically a data URL). Carried, never decoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Item {
    /// A plain card with only text.
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            color: None,
            gradient: None,
            signature: None,
            likes: None,
            created_at: None,
        }
    }

    #[cfg(test)]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[cfg(test)]
    pub fn with_gradient(mut self, gradient: bool) -> Self {
        self.gradient = Some(gradient);
        self
    }

    pub fn is_gradient(&self) -> bool {
        self.gradient.unwrap_or(false)
    }

    pub fn like_count(&self) -> u32 {
        self.likes.unwrap_or(0)
    }
}

/// A new wish coming out of the compose overlay, before it gets an id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewWish {
    pub text: String,
    pub color: Option<String>,
    pub gradient: Option<bool>,
    pub signature: Option<String>,
}
