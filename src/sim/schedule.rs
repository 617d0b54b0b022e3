//! Deferred tasks keyed by session generation
//!
//! Every session start bumps the generation. A task only fires if it was
//! scheduled under the generation that is current when it comes due, so a
//! callback left over from an earlier session can never act on a new one.

use serde::{Deserialize, Serialize};

/// Work deferred to a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Advance the spawn queue and hang the next held object
    SpawnNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ScheduledTask {
    due_tick: u64,
    generation: u32,
    task: Task,
}

/// Single-threaded deferred task queue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    pending: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_tick: u64, generation: u32, task: Task) {
        self.pending.push(ScheduledTask {
            due_tick,
            generation,
            task,
        });
    }

    /// Remove every task due at or before `now`, returning those that belong
    /// to `generation` in the order they were scheduled. Stale tasks are dropped.
    pub fn take_due(&mut self, now: u64, generation: u32) -> Vec<Task> {
        let mut due = Vec::new();
        self.pending.retain(|t| {
            if t.generation != generation {
                log::debug!("Discarding stale {:?} from generation {}", t.task, t.generation);
                return false;
            }
            if t.due_tick <= now {
                due.push(t.task);
                return false;
            }
            true
        });
        due
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
