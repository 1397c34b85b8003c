//! User-defined emoji collections.
//!
//! List-level rules are pure functions over `Vec<Collection>`; the
//! [`UserStore`] wrappers apply them as a read-modify-write of the whole
//! persisted list.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::EmojidexResult,
    store::{KvStore, UserStore},
};

/// Glyphs offered when creating a collection
pub const COLLECTION_GLYPHS: [&str; 12] = [
    "📁", "⭐", "❤️", "🎨", "💼", "🎯", "🎮", "🎵", "🍕", "✈️", "💡", "🔥",
];

pub use crate::colors::theme::collection::PALETTE as COLLECTION_COLORS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
    #[serde(default)]
    pub emoji_codepoints: Vec<String>,
    /// Unix milliseconds
    pub created_at: i64,
}

impl Collection {
    /// Builds a new, empty collection. Returns `None` for a blank name.
    pub fn new(name: &str, emoji: &str, color: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
            color: color.to_string(),
            emoji_codepoints: Vec::new(),
            created_at: Utc::now().timestamp_millis(),
        })
    }

    pub fn contains(&self, codepoint: &str) -> bool {
        self.emoji_codepoints.iter().any(|cp| cp == codepoint)
    }
}

pub fn delete(mut collections: Vec<Collection>, id: &str) -> Vec<Collection> {
    collections.retain(|c| c.id != id);
    collections
}

pub fn add_member(mut collections: Vec<Collection>, id: &str, codepoint: &str) -> Vec<Collection> {
    if let Some(collection) = collections.iter_mut().find(|c| c.id == id) {
        if !collection.contains(codepoint) {
            collection.emoji_codepoints.push(codepoint.to_string());
        }
    }
    collections
}

pub fn remove_member(
    mut collections: Vec<Collection>,
    id: &str,
    codepoint: &str,
) -> Vec<Collection> {
    if let Some(collection) = collections.iter_mut().find(|c| c.id == id) {
        collection.emoji_codepoints.retain(|cp| cp != codepoint);
    }
    collections
}

/// Ids of every collection holding `codepoint`
pub fn containing<'a>(collections: &'a [Collection], codepoint: &str) -> Vec<&'a str> {
    collections
        .iter()
        .filter(|c| c.contains(codepoint))
        .map(|c| c.id.as_str())
        .collect()
}

impl<K: KvStore> UserStore<K> {
    /// Creates and persists a collection. A blank name is a no-op and yields
    /// `Ok(None)`.
    pub fn create_collection(
        &mut self,
        name: &str,
        emoji: &str,
        color: &str,
    ) -> EmojidexResult<Option<Collection>> {
        let Some(collection) = Collection::new(name, emoji, color) else {
            return Ok(None);
        };

        let created = collection.clone();
        self.update_collections(|mut collections| {
            collections.push(collection);
            collections
        })?;
        debug!(id = %created.id, name = %created.name, "created collection");
        Ok(Some(created))
    }

    /// Returns whether a collection was removed
    pub fn delete_collection(&mut self, id: &str) -> EmojidexResult<bool> {
        if self.collection(id).is_none() {
            return Ok(false);
        }
        self.update_collections(|collections| delete(collections, id))?;
        debug!(id, "deleted collection");
        Ok(true)
    }

    pub fn add_to_collection(&mut self, id: &str, codepoint: &str) -> EmojidexResult<()> {
        self.update_collections(|collections| add_member(collections, id, codepoint))?;
        Ok(())
    }

    pub fn remove_from_collection(&mut self, id: &str, codepoint: &str) -> EmojidexResult<()> {
        self.update_collections(|collections| remove_member(collections, id, codepoint))?;
        Ok(())
    }

    /// Adds `codepoint` if absent, removes it if present. Returns membership
    /// after the change, or `None` if the collection does not exist.
    pub fn toggle_collection_member(
        &mut self,
        id: &str,
        codepoint: &str,
    ) -> EmojidexResult<Option<bool>> {
        let Some(collection) = self.collection(id) else {
            return Ok(None);
        };

        if collection.contains(codepoint) {
            self.remove_from_collection(id, codepoint)?;
            Ok(Some(false))
        } else {
            self.add_to_collection(id, codepoint)?;
            Ok(Some(true))
        }
    }
}
