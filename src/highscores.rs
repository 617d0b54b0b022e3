//! High score leaderboard system
//!
//! Keeps the top 5 named scores, best first. Storage lives in
//! [`crate::persistence`].

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// Name recorded when the player leaves the field blank
pub const ANONYMOUS: &str = "Anonymous";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    #[serde(default)]
    pub timestamp: f64,
}

/// High score leaderboard, stored as a bare JSON array of entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score earns a place on the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, name: &str, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let name = name.trim();
        let entry = HighScoreEntry {
            name: if name.is_empty() { ANONYMOUS.to_string() } else { name.to_string() },
            score,
            timestamp,
        };

        // Find insertion point (sorted descending; ties go after older entries)
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Restore the board invariants on data read from storage
    pub fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_accepts_anything() {
        let board = HighScores::new();
        assert!(board.qualifies(0));
    }

    #[test]
    fn test_keeps_top_five_descending() {
        let mut board = HighScores::new();
        for (i, score) in [50, 300, 10, 120, 80, 200].into_iter().enumerate() {
            board.add_score(&format!("p{i}"), score, i as f64);
        }
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 120, 80, 50]);
        assert_eq!(board.top_score(), Some(300));
    }

    #[test]
    fn test_full_board_rejects_low_score() {
        let mut board = HighScores::new();
        for score in [100, 90, 80, 70, 60] {
            board.add_score("x", score, 0.0);
        }
        assert!(!board.qualifies(60));
        assert_eq!(board.add_score("late", 60, 0.0), None);
        assert_eq!(board.add_score("better", 61, 0.0), Some(5));
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
    }

    #[test]
    fn test_tie_ranks_after_existing() {
        let mut board = HighScores::new();
        board.add_score("first", 100, 0.0);
        assert_eq!(board.add_score("second", 100, 1.0), Some(2));
        assert_eq!(board.entries[0].name, "first");
    }

    #[test]
    fn test_blank_name_becomes_anonymous() {
        let mut board = HighScores::new();
        board.add_score("   ", 40, 0.0);
        board.add_score("  Kino ", 20, 0.0);
        assert_eq!(board.entries[0].name, ANONYMOUS);
        assert_eq!(board.entries[1].name, "Kino");
    }

    #[test]
    fn test_normalize_sorts_and_trims() {
        let mut board = HighScores {
            entries: (0..8)
                .map(|i| HighScoreEntry {
                    name: format!("p{i}"),
                    score: i * 10,
                    timestamp: 0.0,
                })
                .collect(),
        };
        board.normalize();
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![70, 60, 50, 40, 30]);
    }
}
