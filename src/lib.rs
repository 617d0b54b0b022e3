//! Mushroom Merge - a drop-and-merge arcade game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (classes, spawning, fusion, game over)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Top-5 leaderboard
//! - `persistence`: Score stores (memory, JSON file, browser storage)
//! - `error`: Configuration and persistence errors

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, StoreError};
pub use highscores::HighScores;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, velocities are in units per step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Simulation steps per second of game time
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Arena dimensions (y grows downward, top is open)
    pub const ARENA_WIDTH: f32 = 360.0;
    pub const ARENA_HEIGHT: f32 = 476.0;
    pub const WALL_THICKNESS: f32 = 30.0;
    /// Horizontal inset of the held object from either wall
    pub const WALL_MARGIN: f32 = 30.0;
    /// Height at which the held object hangs before the drop
    pub const SPAWN_Y: f32 = 30.0;
    /// A settled object above this line ends the game
    pub const DANGER_LINE_Y: f32 = 100.0;

    /// Gravity in units/step² (downward)
    pub const GRAVITY: f32 = 0.17;
    pub const RESTITUTION: f32 = 0.3;
    pub const FRICTION: f32 = 0.1;
    /// Density of freshly dropped objects
    pub const DROP_DENSITY: f32 = 0.01;
    /// Density used when a body does not specify one (fusion products)
    pub const DEFAULT_DENSITY: f32 = 0.001;
    /// Fraction of velocity lost to drag every step
    pub const AIR_FRICTION: f32 = 0.01;

    /// Next objects are drawn from this many smallest classes
    pub const SPAWN_POOL: usize = 3;
    /// Pause between a drop and the next held object (1 second)
    pub const DROP_DELAY_TICKS: u32 = TICKS_PER_SECOND;
    /// Per-axis speed below which a body counts as settled
    pub const SETTLE_SPEED: f32 = 0.1;
}

/// Clamp a pointer x coordinate into the playable band between the walls
#[inline]
pub fn clamp_to_band(x: f32, margin: f32, width: f32) -> f32 {
    x.clamp(margin, width - margin)
}
