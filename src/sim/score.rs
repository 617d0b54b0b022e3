//! Score ledger

use serde::{Deserialize, Serialize};

/// Running total for one session. Only ever grows while a session is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLedger {
    total: u64,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.total = 0;
    }

    /// Add fusion points and return the new total
    pub fn add(&mut self, delta: u64) -> u64 {
        self.total = self.total.saturating_add(delta);
        self.total
    }

    #[inline]
    pub fn current(&self) -> u64 {
        self.total
    }
}
