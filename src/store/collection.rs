//! Bounded, de-duplicated, persisted lists of generated entries.
//!
//! Both history and favorites are a [`PersistedCollection`]: most recent
//! first, capped, and keyed by [`EntryKey`]. Every mutation goes through the
//! same four steps (key, filter, prepend, truncate) and then writes the whole
//! list back to storage.

use std::sync::Arc;

use parking_lot::Mutex;

use super::Storage;
use crate::source::{EntryKey, GeneratedEntry};

pub const HISTORY_KEY: &str = "nh.history";
pub const FAVORITES_KEY: &str = "nh.favorites";
pub const HISTORY_CAPACITY: usize = 80;
pub const FAVORITES_CAPACITY: usize = 150;

pub struct PersistedCollection {
    key: String,
    capacity: usize,
    entries: Vec<GeneratedEntry>,
    store: Arc<dyn Storage>,
}

impl PersistedCollection {
    /// Load the collection stored under `key`. Missing or corrupt data gives
    /// an empty collection.
    pub fn load(store: Arc<dyn Storage>, key: impl Into<String>, capacity: usize) -> Self {
        let key = key.into();
        let mut entries: Vec<GeneratedEntry> = match store.get(&key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "discarding unreadable collection");
                Vec::new()
            }),
            None => Vec::new(),
        };
        entries.truncate(capacity);
        tracing::debug!(key, len = entries.len(), "loaded collection");

        Self {
            key,
            capacity,
            entries,
            store,
        }
    }

    pub fn entries(&self) -> &[GeneratedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        self.entries.iter().any(|e| e.key() == *key)
    }

    /// Insert `entry` at the front, replacing any entry with the same key and
    /// evicting the oldest past capacity.
    pub fn push(&mut self, entry: GeneratedEntry) {
        let key = entry.key();
        self.entries.retain(|e| e.key() != key);
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
        self.persist();
    }

    /// Remove the entry with `key`. Returns whether anything was removed.
    pub fn remove(&mut self, key: &EntryKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key() != *key);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Flip membership of `entry`; returns whether it is now present.
    pub fn toggle(&mut self, entry: GeneratedEntry) -> bool {
        let key = entry.key();
        if self.contains(&key) {
            self.remove(&key);
            false
        } else {
            self.push(entry);
            true
        }
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.entries) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to serialize collection");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &raw) {
            tracing::warn!(key = %self.key, error = %e, "failed to persist collection");
        }
    }
}

// ---------------------------------------------------------------------------
// Library: history and favorites
// ---------------------------------------------------------------------------

/// History and favorites, shared between the UI thread and generation tasks.
///
/// Locks are held only for the duration of one synchronous mutation.
pub struct Library {
    history: Mutex<PersistedCollection>,
    favorites: Mutex<PersistedCollection>,
}

impl Library {
    pub fn load(store: Arc<dyn Storage>) -> Self {
        Self {
            history: Mutex::new(PersistedCollection::load(
                Arc::clone(&store),
                HISTORY_KEY,
                HISTORY_CAPACITY,
            )),
            favorites: Mutex::new(PersistedCollection::load(
                store,
                FAVORITES_KEY,
                FAVORITES_CAPACITY,
            )),
        }
    }

    pub fn record(&self, entry: GeneratedEntry) {
        self.history.lock().push(entry);
    }

    pub fn is_favorite(&self, entry: &GeneratedEntry) -> bool {
        self.favorites.lock().contains(&entry.key())
    }

    pub fn toggle_favorite(&self, entry: GeneratedEntry) -> bool {
        self.favorites.lock().toggle(entry)
    }

    /// Add to favorites unless already there. Returns whether it was added.
    pub fn add_favorite(&self, entry: GeneratedEntry) -> bool {
        let mut favorites = self.favorites.lock();
        if favorites.contains(&entry.key()) {
            return false;
        }
        favorites.push(entry);
        true
    }

    pub fn remove_favorite(&self, key: &EntryKey) -> bool {
        self.favorites.lock().remove(key)
    }

    pub fn history(&self) -> Vec<GeneratedEntry> {
        self.history.lock().entries().to_vec()
    }

    pub fn favorites(&self) -> Vec<GeneratedEntry> {
        self.favorites.lock().entries().to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn favorites_len(&self) -> usize {
        self.favorites.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::entry;

    fn history(store: &Arc<MemoryStore>) -> PersistedCollection {
        PersistedCollection::load(store.clone(), HISTORY_KEY, HISTORY_CAPACITY)
    }

    #[test]
    fn toggle_twice_adds_then_removes() {
        let store = Arc::new(MemoryStore::new());
        let mut favorites = PersistedCollection::load(store, FAVORITES_KEY, FAVORITES_CAPACITY);
        let e = entry("Storm", "poem");

        assert!(favorites.toggle(e.clone()));
        assert!(favorites.contains(&e.key()));
        assert!(!favorites.toggle(e.clone()));
        assert!(!favorites.contains(&e.key()));
        assert!(favorites.entries().is_empty());
    }

    #[test]
    fn push_past_capacity_evicts_oldest() {
        let store = Arc::new(MemoryStore::new());
        let mut history = history(&store);
        for i in 0..=HISTORY_CAPACITY {
            history.push(entry(&format!("headline {i}"), "poem"));
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.entries()[0].title, "headline 80");
        assert_eq!(history.entries()[HISTORY_CAPACITY - 1].title, "headline 1");
        assert!(!history.entries().iter().any(|e| e.title == "headline 0"));
    }

    #[test]
    fn duplicate_push_moves_to_front_without_growth() {
        let store = Arc::new(MemoryStore::new());
        let mut history = history(&store);
        history.push(entry("a", "poem"));
        history.push(entry("b", "poem"));
        history.push(entry("c", "poem"));

        history.push(entry("A", "POEM"));

        let titles: Vec<_> = history.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["A", "c", "b"]);
    }

    #[test]
    fn mutations_persist_across_reload() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut history = history(&store);
            history.push(entry("kept", "poem"));
            history.push(entry("gone", "poem"));
            assert!(history.remove(&entry("gone", "poem").key()));
        }

        let reloaded = history(&store);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.entries()[0].title, "kept");
    }

    #[test]
    fn corrupt_storage_loads_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, "{not json").unwrap();
        assert!(history(&store).entries().is_empty());
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let mut history = history(&store);
        assert!(!history.remove(&entry("nope", "poem").key()));
        assert_eq!(store.get(HISTORY_KEY), None, "nothing written");
    }

    #[test]
    fn library_add_favorite_is_idempotent() {
        let library = Library::load(Arc::new(MemoryStore::new()));
        let e = entry("Storm", "poem");

        assert!(library.add_favorite(e.clone()));
        assert!(!library.add_favorite(e.clone()));
        assert_eq!(library.favorites_len(), 1);
        assert!(library.is_favorite(&e));
        assert!(library.remove_favorite(&e.key()));
        assert!(!library.is_favorite(&e));
    }

    #[test]
    fn library_keeps_history_and_favorites_apart() {
        let library = Library::load(Arc::new(MemoryStore::new()));
        library.record(entry("one", "poem"));
        assert_eq!(library.history_len(), 1);
        assert_eq!(library.favorites_len(), 0);
        assert!(library.toggle_favorite(entry("one", "poem")));
        assert_eq!(library.history()[0].title, library.favorites()[0].title);
    }
}
