//! Caption model and the recent-caption store
//!
//! Captions arrive in two stages: a `caption_result` carries the recognized
//! original text, and later `caption_update`s fill in translation and
//! simplification as the service finishes them. Identity is the caption id;
//! a later message with a known id updates the stored record in place.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::network::messages::CaptionUpdate;

/// How many captions the recent store keeps
pub const RECENT_CAPACITY: usize = 5;

/// One caption produced by the captioning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Opaque identity assigned by the service
    pub id: String,

    /// Recognized text in the source language
    pub original: String,

    /// Translation into the target language, once available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,

    /// Deaf-friendly simplified rendition, once available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplified: Option<String>,

    /// Recognition confidence reported with the result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Service-side timestamp (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Caption {
    /// Create a caption with only the recognized original text
    pub fn new(id: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original: original.into(),
            translated: None,
            simplified: None,
            confidence: None,
            timestamp: None,
        }
    }

    /// Merge a partial update into this caption.
    ///
    /// Fields present in the update override; absent fields are preserved.
    pub fn apply_update(&mut self, update: &CaptionUpdate) {
        if let Some(original) = &update.original {
            self.original = original.clone();
        }
        if let Some(translated) = &update.translated {
            self.translated = Some(translated.clone());
        }
        if let Some(simplified) = &update.simplified {
            self.simplified = Some(simplified.clone());
        }
    }
}

/// Bounded most-recent-first caption store
///
/// Holds at most [`RECENT_CAPACITY`] captions; inserting past capacity
/// evicts the oldest. Mutated only by insert-or-update-by-id, and only from
/// the coordinator's context.
#[derive(Debug, Default)]
pub struct RecentCaptions {
    captions: VecDeque<Caption>,
}

impl RecentCaptions {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            captions: VecDeque::with_capacity(RECENT_CAPACITY),
        }
    }

    /// Insert a new caption at the head, evicting the oldest past capacity.
    ///
    /// If a caption with the same id already exists it is updated in place
    /// instead, keeping one record per identity.
    pub fn insert(&mut self, caption: Caption) {
        if let Some(existing) = self.captions.iter_mut().find(|c| c.id == caption.id) {
            *existing = caption;
            return;
        }

        self.captions.push_front(caption);
        while self.captions.len() > RECENT_CAPACITY {
            self.captions.pop_back();
        }
    }

    /// Merge a partial update into the caption with the matching id.
    ///
    /// Returns the merged caption, or `None` if the id is unknown (updates
    /// never insert: an update carries derivative fields only).
    pub fn apply_update(&mut self, update: &CaptionUpdate) -> Option<Caption> {
        let caption = self.captions.iter_mut().find(|c| c.id == update.id)?;
        caption.apply_update(update);
        Some(caption.clone())
    }

    /// Snapshot of the stored captions, most-recent-first
    pub fn snapshot(&self) -> Vec<Caption> {
        self.captions.iter().cloned().collect()
    }

    /// Number of stored captions
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Remove all captions
    pub fn clear(&mut self) {
        self.captions.clear();
    }
}
