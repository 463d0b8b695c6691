//! Best combined score, persisted under a fixed storage key

use crate::consts::HIGH_SCORE_KEY;
use crate::error::StorageError;
use crate::persistence::KeyValueStore;

/// Reads and writes the high score through a key-value store
#[derive(Debug)]
pub struct HighScoreStore<S> {
    store: S,
}

impl<S: KeyValueStore> HighScoreStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored high score; 0 when missing, unreadable or garbage
    pub fn load(&self) -> u64 {
        match self.store.get(HIGH_SCORE_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<u64>() {
                Ok(score) => {
                    log::info!("Loaded high score {score}");
                    score
                }
                Err(_) => {
                    log::warn!("Ignoring malformed high score {raw:?}");
                    0
                }
            },
            Ok(None) => {
                log::info!("No high score found, starting fresh");
                0
            }
            Err(err) => {
                log::warn!("High score unavailable: {err}");
                0
            }
        }
    }

    pub fn save(&self, score: u64) -> Result<(), StorageError> {
        self.store.set(HIGH_SCORE_KEY, &score.to_string())
    }

    pub fn reset(&self) -> Result<(), StorageError> {
        self.save(0)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_missing_is_zero() {
        let scores = HighScoreStore::new(MemoryStore::new());
        assert_eq!(scores.load(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let scores = HighScoreStore::new(MemoryStore::new());
        scores.save(42).unwrap();
        assert_eq!(scores.load(), 42);
        assert_eq!(scores.store().get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn test_garbage_is_zero() {
        let store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "not a number").unwrap();
        let scores = HighScoreStore::new(store);
        assert_eq!(scores.load(), 0);
    }

    #[test]
    fn test_reset_writes_zero() {
        let scores = HighScoreStore::new(MemoryStore::new());
        scores.save(99).unwrap();
        scores.reset().unwrap();
        assert_eq!(scores.load(), 0);
    }
}
