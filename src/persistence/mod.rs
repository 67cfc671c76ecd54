//! Best-effort key-value persistence for scores and save-states
//!
//! Features:
//! - Keys namespaced as `<app>_<game>_<suffix>_<user>`
//! - Numbers and JSON blobs stored as text
//! - Reads degrade to a fallback, writes are dropped on failure
//!
//! This is a cache, not a durability guarantee: games stay playable even
//! when no backend is reachable.

mod backend;
#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local_storage;

pub use backend::{MemoryBackend, StorageBackend, UnavailableBackend};
#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileBackend;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageBackend;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::consts::APP_NAMESPACE;

/// Suffix under which best scores are stored
pub const BEST_SUFFIX: &str = "best";
/// Suffix under which game save-states are stored
pub const SAVE_SUFFIX: &str = "save";

/// Score and save-state store over a pluggable backend
pub struct ScoreStore {
    namespace: String,
    backend: Box<dyn StorageBackend>,
}

impl ScoreStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::with_namespace(APP_NAMESPACE, backend)
    }

    pub fn with_namespace(namespace: impl Into<String>, backend: impl StorageBackend + 'static) -> Self {
        Self {
            namespace: namespace.into(),
            backend: Box::new(backend),
        }
    }

    /// In-memory store, mostly for tests and headless runs
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    /// Build the storage key for a scope (game id or "arcade"), suffix and user
    pub fn key(&self, scope: &str, suffix: &str, user: &str) -> String {
        format!("{}_{}_{}_{}", self.namespace, scope, suffix, user)
    }

    /// Stored best score, or 0 if none (or unreadable)
    pub fn read_best(&self, scope: &str, user: &str) -> u64 {
        self.read_json(scope, BEST_SUFFIX, user, 0u64)
    }

    /// Store `score` only if it beats the current best. Returns true if written.
    pub fn write_best(&self, scope: &str, user: &str, score: u64) -> bool {
        let stored = self.read_best(scope, user);
        if score <= stored {
            return false;
        }
        let key = self.key(scope, BEST_SUFFIX, user);
        match self.backend.set(&key, &score.to_string()) {
            Ok(()) => {
                log::debug!("Best score {} -> {} for {}", stored, score, key);
                true
            }
            Err(err) => {
                log::warn!("Dropping best score write for {}: {}", key, err);
                false
            }
        }
    }

    /// Read and decode a JSON blob, falling back on any failure
    pub fn read_json<T: DeserializeOwned>(&self, scope: &str, suffix: &str, user: &str, fallback: T) -> T {
        let key = self.key(scope, suffix, user);
        match self.backend.get(&key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("Ignoring malformed value under {}: {}", key, err);
                    fallback
                }
            },
            Ok(None) => fallback,
            Err(err) => {
                log::warn!("Read of {} failed, using fallback: {}", key, err);
                fallback
            }
        }
    }

    /// Encode and store a JSON blob; failures are logged and dropped
    pub fn write_json<T: Serialize>(&self, scope: &str, suffix: &str, user: &str, value: &T) {
        let key = self.key(scope, suffix, user);
        let result = serde_json::to_string(value)
            .map_err(crate::StorageError::from)
            .and_then(|text| self.backend.set(&key, &text));
        if let Err(err) = result {
            log::warn!("Dropping write of {}: {}", key, err);
        }
    }
}

impl std::fmt::Debug for ScoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[test]
    fn test_key_layout() {
        let store = ScoreStore::in_memory();
        assert_eq!(store.key("snake", "best", "guest"), "pocket_arcade_snake_best_guest");
    }

    #[test]
    fn test_read_best_defaults_to_zero() {
        let store = ScoreStore::in_memory();
        assert_eq!(store.read_best("breaker", "alice"), 0);
    }

    #[test]
    fn test_write_best_is_monotonic() {
        let store = ScoreStore::in_memory();
        assert!(store.write_best("breaker", "alice", 42));
        assert!(!store.write_best("breaker", "alice", 17));
        assert_eq!(store.read_best("breaker", "alice"), 42);
        assert!(!store.write_best("breaker", "alice", 42));
        assert!(store.write_best("breaker", "alice", 43));
        assert_eq!(store.read_best("breaker", "alice"), 43);
    }

    #[test]
    fn test_scores_are_isolated_per_user_and_game() {
        let store = ScoreStore::in_memory();
        store.write_best("snake", "alice", 30);
        assert_eq!(store.read_best("snake", "bob"), 0);
        assert_eq!(store.read_best("shooter", "alice"), 0);
    }

    #[test]
    fn test_unavailable_backend_degrades_silently() {
        let store = ScoreStore::new(UnavailableBackend);
        assert!(!store.write_best("snake", "guest", 10));
        assert_eq!(store.read_best("snake", "guest"), 0);
        store.write_json("idle", SAVE_SUFFIX, "guest", &vec![1, 2, 3]);
        let restored: Vec<i32> = store.read_json("idle", SAVE_SUFFIX, "guest", vec![9]);
        assert_eq!(restored, vec![9]);
    }

    #[test]
    fn test_json_round_trip_and_malformed_fallback() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Save {
            balance: f64,
        }

        let backend = MemoryBackend::default();
        let store = ScoreStore::new(backend.clone());
        store.write_json("idle", SAVE_SUFFIX, "guest", &Save { balance: 12.5 });
        let save = store.read_json("idle", SAVE_SUFFIX, "guest", Save { balance: 0.0 });
        assert_eq!(save, Save { balance: 12.5 });

        backend
            .set(&store.key("idle", SAVE_SUFFIX, "guest"), "{not json")
            .expect("memory backend accepts writes");
        let save = store.read_json("idle", SAVE_SUFFIX, "guest", Save { balance: 1.0 });
        assert_eq!(save, Save { balance: 1.0 });
    }

    proptest! {
        #[test]
        fn prop_best_never_decreases(scores in proptest::collection::vec(0u64..10_000, 1..40)) {
            let store = ScoreStore::in_memory();
            let mut expected = 0;
            for score in scores {
                store.write_best("memory", "guest", score);
                expected = expected.max(score);
                prop_assert_eq!(store.read_best("memory", "guest"), expected);
            }
        }
    }
}
