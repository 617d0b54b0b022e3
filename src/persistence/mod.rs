//! High score persistence
//!
//! The engine never depends on storage succeeding. Loading degrades to an
//! empty board when data is missing or malformed; saving reports a
//! [`StoreError`] for the caller to log.

use crate::error::StoreError;
use crate::highscores::HighScores;

/// Storage key / file stem shared by every backend
pub const STORAGE_KEY: &str = "mushroomHighScores";

/// Where the leaderboard lives between sessions
pub trait ScoreStore {
    /// Current board, or an empty one if nothing usable is stored
    fn load(&self) -> HighScores;

    fn save(&mut self, scores: &HighScores) -> Result<(), StoreError>;

    /// Add a finished session's score and persist the board if it changed
    ///
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    fn record(&mut self, name: &str, score: u64, timestamp: f64) -> Result<Option<usize>, StoreError> {
        let mut scores = self.load();
        let rank = scores.add_score(name, score, timestamp);
        if rank.is_some() {
            self.save(&scores)?;
        }
        Ok(rank)
    }
}

/// Decode stored JSON, falling back to an empty board
fn decode(json: &str) -> HighScores {
    match serde_json::from_str::<HighScores>(json) {
        Ok(mut scores) => {
            scores.normalize();
            scores
        }
        Err(e) => {
            log::warn!("Ignoring malformed high scores: {e}");
            HighScores::new()
        }
    }
}

/// In-process store (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    scores: HighScores,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> HighScores {
        self.scores.clone()
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), StoreError> {
        self.scores = scores.clone();
        Ok(())
    }
}

/// JSON file on disk (native)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ScoreStore for JsonFileStore {
    fn load(&self) -> HighScores {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => {
                let scores = decode(&json);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                HighScores::new()
            }
            Err(e) => {
                log::warn!("Could not read {}: {e}", self.path.display());
                HighScores::new()
            }
        }
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(scores)?;
        // Write beside the target then rename, so a crash never truncates the board
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::info!("High scores saved ({} entries)", scores.entries.len());
        Ok(())
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageStore {
    fn load(&self) -> HighScores {
        match Self::storage().and_then(|s| s.get_item(STORAGE_KEY).ok().flatten()) {
            Some(json) => decode(&json),
            None => {
                log::info!("No high scores found, starting fresh");
                HighScores::new()
            }
        }
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), StoreError> {
        let storage = Self::storage().ok_or(StoreError::Unavailable)?;
        let json = serde_json::to_string(scores)?;
        storage
            .set_item(STORAGE_KEY, &json)
            .map_err(|_| StoreError::Unavailable)?;
        log::info!("High scores saved ({} entries)", scores.entries.len());
        Ok(())
    }
}
