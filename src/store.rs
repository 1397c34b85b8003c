//! Persisted user state.
//!
//! Three independent slices live behind a [`KvStore`]: favorite codepoints,
//! recently viewed codepoints and collections. Each slice is a JSON document
//! under its own key. Reads never fail: a missing, unreadable or malformed
//! document yields the empty default. Writes replace the whole slice and only
//! commit to memory once the backing store accepted them.

use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::{
    collections::Collection,
    error::{EmojidexError, EmojidexResult},
};

pub const FAVORITES_KEY: &str = "emoji-favorites";
pub const RECENTS_KEY: &str = "emoji-recents";
pub const COLLECTIONS_KEY: &str = "emoji-collections";

/// Maximum length of the recently viewed list
pub const MAX_RECENTS: usize = 20;

/// String key to JSON text persistence.
pub trait KvStore: Send + Sync + Debug {
    /// Returns the raw document for `key`, or `None` if it was never written
    fn load(&self, key: &str) -> EmojidexResult<Option<String>>;

    /// Replaces the document for `key`
    fn save(&self, key: &str, json: &str) -> EmojidexResult<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn load(&self, key: &str) -> EmojidexResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EmojidexError::io(path, format!("Failed to read: {}", e)).into()),
        }
    }

    fn save(&self, key: &str, json: &str) -> EmojidexResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            EmojidexError::io(&self.dir, format!("Failed to create data directory: {}", e))
        })?;

        // Readers only ever see a complete slice.
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, json)
            .map_err(|e| EmojidexError::io(&tmp, format!("Failed to write: {}", e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| EmojidexError::io(&path, format!("Failed to replace: {}", e)))?;

        debug!(key, path = %path.display(), bytes = json.len(), "persisted slice");
        Ok(())
    }
}

/// In-process store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `key` with a raw document
    pub fn with_entry(self, key: &str, json: &str) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), json.to_string());
        }
        self
    }
}

impl KvStore for MemoryStore {
    fn load(&self, key: &str) -> EmojidexResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| EmojidexError::storage(key, key, (0, key.len()), "store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, json: &str) -> EmojidexResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| EmojidexError::storage(key, key, (0, key.len()), "store lock poisoned"))?;
        entries.insert(key.to_string(), json.to_string());
        Ok(())
    }
}

impl<K: KvStore + ?Sized> KvStore for Box<K> {
    fn load(&self, key: &str) -> EmojidexResult<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, json: &str) -> EmojidexResult<()> {
        (**self).save(key, json)
    }
}

/// Typed access to the three persisted slices.
#[derive(Debug)]
pub struct UserStore<K: KvStore> {
    kv: K,
    favorites: Vec<String>,
    recents: Vec<String>,
    collections: Vec<Collection>,
}

impl<K: KvStore> UserStore<K> {
    /// Loads every slice from `kv`, substituting empty defaults
    pub fn open(kv: K) -> Self {
        let favorites = read_slice(&kv, FAVORITES_KEY);
        let recents = read_slice(&kv, RECENTS_KEY);
        let collections = read_slice(&kv, COLLECTIONS_KEY);
        Self {
            kv,
            favorites,
            recents,
            collections,
        }
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn recents(&self) -> &[String] {
        &self.recents
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn is_favorite(&self, codepoint: &str) -> bool {
        self.favorites.iter().any(|cp| cp == codepoint)
    }

    pub fn update_favorites<F>(&mut self, transform: F) -> EmojidexResult<&[String]>
    where
        F: FnOnce(Vec<String>) -> Vec<String>,
    {
        let next = transform(self.favorites.clone());
        write_slice(&self.kv, FAVORITES_KEY, &next)?;
        self.favorites = next;
        Ok(&self.favorites)
    }

    pub fn update_recents<F>(&mut self, transform: F) -> EmojidexResult<&[String]>
    where
        F: FnOnce(Vec<String>) -> Vec<String>,
    {
        let next = transform(self.recents.clone());
        write_slice(&self.kv, RECENTS_KEY, &next)?;
        self.recents = next;
        Ok(&self.recents)
    }

    pub fn update_collections<F>(&mut self, transform: F) -> EmojidexResult<&[Collection]>
    where
        F: FnOnce(Vec<Collection>) -> Vec<Collection>,
    {
        let next = transform(self.collections.clone());
        write_slice(&self.kv, COLLECTIONS_KEY, &next)?;
        self.collections = next;
        Ok(&self.collections)
    }

    /// Flips favorite membership; returns whether `codepoint` is now a favorite
    pub fn toggle_favorite(&mut self, codepoint: &str) -> EmojidexResult<bool> {
        let favorites = self.update_favorites(|favorites| toggle_favorite(favorites, codepoint))?;
        Ok(favorites.iter().any(|cp| cp == codepoint))
    }

    pub fn record_recent(&mut self, codepoint: &str) -> EmojidexResult<()> {
        self.update_recents(|recents| record_recent(recents, codepoint))?;
        Ok(())
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }
}

/// Removes `codepoint` if present, appends it otherwise.
pub fn toggle_favorite(mut favorites: Vec<String>, codepoint: &str) -> Vec<String> {
    if favorites.iter().any(|cp| cp == codepoint) {
        favorites.retain(|cp| cp != codepoint);
    } else {
        favorites.push(codepoint.to_string());
    }
    favorites
}

/// Moves `codepoint` to the front, then caps the list at [`MAX_RECENTS`].
pub fn record_recent(mut recents: Vec<String>, codepoint: &str) -> Vec<String> {
    recents.retain(|cp| cp != codepoint);
    recents.insert(0, codepoint.to_string());
    recents.truncate(MAX_RECENTS);
    recents
}

fn read_slice<K, T>(kv: &K, key: &str) -> Vec<T>
where
    K: KvStore + ?Sized,
    T: DeserializeOwned,
{
    let text = match kv.load(key) {
        Ok(Some(text)) => text,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted slice, using empty default");
            return Vec::new();
        }
    };

    match serde_json::from_str(&text) {
        Ok(values) => values,
        Err(e) => {
            warn!(key, error = %e, "malformed persisted slice, using empty default");
            Vec::new()
        }
    }
}

fn write_slice<K, T>(kv: &K, key: &str, values: &[T]) -> EmojidexResult<()>
where
    K: KvStore + ?Sized,
    T: Serialize,
{
    let json = serde_json::to_string_pretty(values).map_err(|e| {
        EmojidexError::storage(key, key, (0, key.len()), format!("Failed to encode: {}", e))
    })?;
    kv.save(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_toggle_favorite_scenario() {
        let mut store = UserStore::open(MemoryStore::new());

        assert!(store.toggle_favorite("U+1F600").unwrap());
        assert_eq!(store.favorites(), strings(&["U+1F600"]).as_slice());

        assert!(!store.toggle_favorite("U+1F600").unwrap());
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn test_record_recent_scenario() {
        let mut store = UserStore::open(MemoryStore::new());
        store.record_recent("A").unwrap();
        store.record_recent("B").unwrap();
        store.record_recent("A").unwrap();
        assert_eq!(store.recents(), strings(&["A", "B"]).as_slice());
    }

    #[test]
    fn test_recents_are_capped() {
        let recents = (0..30).fold(Vec::new(), |acc, i| record_recent(acc, &format!("U+{i}")));
        assert_eq!(recents.len(), MAX_RECENTS);
        assert_eq!(recents[0], "U+29");
        assert_eq!(recents[MAX_RECENTS - 1], "U+10");
    }

    #[test]
    fn test_rerecording_at_capacity_keeps_the_tail() {
        let full: Vec<String> = (0..20).map(|i| format!("U+{i}")).collect();
        let recents = record_recent(full, "U+19");
        assert_eq!(recents.len(), MAX_RECENTS);
        assert_eq!(recents[0], "U+19");
        assert_eq!(recents[19], "U+18");
    }

    #[test]
    fn test_missing_and_malformed_slices_default_to_empty() {
        let kv = MemoryStore::new()
            .with_entry(FAVORITES_KEY, "{not json")
            .with_entry(RECENTS_KEY, r#"{"wrong": "shape"}"#);
        let store = UserStore::open(kv);

        assert!(store.favorites().is_empty());
        assert!(store.recents().is_empty());
        assert!(store.collections().is_empty());
    }

    #[test]
    fn test_updates_are_persisted() {
        let mut store = UserStore::open(MemoryStore::new());
        store.toggle_favorite("U+1F355").unwrap();
        store.record_recent("U+1F355").unwrap();

        let reopened = UserStore::open(store.kv);
        assert_eq!(reopened.favorites(), strings(&["U+1F355"]).as_slice());
        assert_eq!(reopened.recents(), strings(&["U+1F355"]).as_slice());
    }

    #[derive(Debug)]
    struct ReadOnlyStore;

    impl KvStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> EmojidexResult<Option<String>> {
            Ok(Some(r#"["U+2764"]"#.to_string()))
        }

        fn save(&self, key: &str, _json: &str) -> EmojidexResult<()> {
            Err(EmojidexError::storage(key, key, (0, key.len()), "read-only").into())
        }
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let mut store = UserStore::open(ReadOnlyStore);
        assert!(store.toggle_favorite("U+1F600").is_err());
        assert_eq!(store.favorites(), strings(&["U+2764"]).as_slice());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileStore::new(dir.path().join("nested"));

        assert_eq!(kv.load(FAVORITES_KEY).unwrap(), None);
        kv.save(FAVORITES_KEY, r#"["U+1F600"]"#).unwrap();
        assert_eq!(
            kv.load(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["U+1F600"]"#)
        );
        assert!(dir.path().join("nested/emoji-favorites.json").exists());
        assert!(!dir.path().join("nested/.emoji-favorites.json.tmp").exists());
    }

    #[test]
    fn test_file_store_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("emoji-recents.json"), "[1, 2,").unwrap();

        let store = UserStore::open(FileStore::new(dir.path()));
        assert!(store.recents().is_empty());
    }

    proptest! {
        #[test]
        fn prop_toggle_twice_restores(
            existing in proptest::collection::vec("U\\+[0-9A-F]{4}", 0..10),
            codepoint in "U\\+[0-9A-F]{4}",
        ) {
            let mut initial = Vec::new();
            for cp in existing {
                if !initial.contains(&cp) {
                    initial.push(cp);
                }
            }
            let toggled = toggle_favorite(toggle_favorite(initial.clone(), &codepoint), &codepoint);
            let without: Vec<_> = initial.iter().filter(|cp| **cp != codepoint).collect();
            let toggled_without: Vec<_> = toggled.iter().filter(|cp| **cp != codepoint).collect();

            prop_assert_eq!(toggled.contains(&codepoint), initial.contains(&codepoint));
            prop_assert_eq!(without, toggled_without);
        }

        #[test]
        fn prop_recents_bounded_unique_latest_first(
            sequence in proptest::collection::vec("[A-Z]{1,2}", 1..60),
        ) {
            let mut recents = Vec::new();
            for cp in &sequence {
                recents = record_recent(recents, cp);
                prop_assert!(recents.len() <= MAX_RECENTS);
                prop_assert_eq!(&recents[0], cp);
                let mut seen = std::collections::HashSet::new();
                prop_assert!(recents.iter().all(|r| seen.insert(r.clone())));
            }
        }
    }
}
