//! Drop controller
//!
//! Owns the single held object and the cooldown gate. The held object is not
//! a physics body; it only becomes one when the drop is committed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_to_band;
use crate::tuning::ArenaConfig;

/// The not-yet-dropped object the player is positioning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeldObject {
    pub class_index: usize,
    pub pos: Vec2,
}

/// What the session must turn into a physics body after a committed drop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropRequest {
    pub class_index: usize,
    pub pos: Vec2,
}

/// Held object + cooldown gate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropController {
    held: Option<HeldObject>,
    can_drop: bool,
}

impl DropController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the held object and close the gate
    pub fn reset(&mut self) {
        self.held = None;
        self.can_drop = false;
    }

    #[inline]
    pub fn held(&self) -> Option<&HeldObject> {
        self.held.as_ref()
    }

    #[inline]
    pub fn can_drop(&self) -> bool {
        self.can_drop
    }

    /// Hang a new held object at the top center and open the gate
    ///
    /// Ignored once the session is over, which is what keeps a spawn that was
    /// scheduled before game over from resurrecting play.
    pub fn spawn_held(&mut self, class_index: usize, arena: &ArenaConfig, session_over: bool) -> bool {
        if session_over {
            return false;
        }
        self.held = Some(HeldObject {
            class_index,
            pos: Vec2::new(arena.center_x(), arena.spawn_y),
        });
        self.can_drop = true;
        true
    }

    /// Follow the pointer, clamped to the band between the wall margins
    pub fn move_held(&mut self, pointer_x: f32, arena: &ArenaConfig, session_over: bool) {
        if session_over || !self.can_drop {
            return;
        }
        if let Some(held) = self.held.as_mut() {
            held.pos.x = clamp_to_band(pointer_x, arena.wall_margin, arena.width);
        }
    }

    /// Release the held object
    ///
    /// Closes the gate until the next `spawn_held`, so a second call before
    /// the replacement appears does nothing.
    pub fn commit_drop(&mut self, session_over: bool) -> Option<DropRequest> {
        if session_over || !self.can_drop {
            return None;
        }
        let held = self.held.take()?;
        self.can_drop = false;
        Some(DropRequest {
            class_index: held.class_index,
            pos: held.pos,
        })
    }
}
