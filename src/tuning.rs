//! Data-driven game balance
//!
//! Every number the rules depend on lives here so a session can be retuned
//! from a JSON file without recompiling. Missing fields fall back to the
//! shipped defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::classes::ClassTable;

/// Arena geometry (y grows downward, the top edge is open)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    pub wall_thickness: f32,
    /// Inset of the held object from either wall
    pub wall_margin: f32,
    /// y of the held object before it is dropped
    pub spawn_y: f32,
    /// A settled object with y below this value ends the game
    pub danger_line_y: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            wall_margin: WALL_MARGIN,
            spawn_y: SPAWN_Y,
            danger_line_y: DANGER_LINE_Y,
        }
    }
}

impl ArenaConfig {
    /// Horizontal center of the arena
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

/// Physical properties handed to the physics world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in units/step²
    pub gravity: f32,
    pub restitution: f32,
    pub friction: f32,
    /// Density applied to dropped objects only
    pub drop_density: f32,
    /// Density of bodies created without one (fusion products)
    pub default_density: f32,
    /// Fraction of velocity lost to drag every step
    pub air_friction: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            restitution: RESTITUTION,
            friction: FRICTION,
            drop_density: DROP_DENSITY,
            default_density: DEFAULT_DENSITY,
            air_friction: AIR_FRICTION,
        }
    }
}

/// Pacing and thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Next objects are drawn uniformly from this many smallest classes
    pub spawn_pool: usize,
    /// Ticks between a drop and the next held object
    pub drop_delay_ticks: u32,
    /// Per-axis speed (units/step) below which a body is settled
    pub settle_speed: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            spawn_pool: SPAWN_POOL,
            drop_delay_ticks: DROP_DELAY_TICKS,
            settle_speed: SETTLE_SPEED,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaConfig,
    pub physics: PhysicsConfig,
    pub rules: RulesConfig,
    pub classes: ClassTable,
}

impl Tuning {
    /// Parse and validate tuning JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the rules cannot play with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let arena = &self.arena;
        if arena.width <= 0.0 || arena.height <= 0.0 {
            return Err(ConfigError::invalid("arena", "width and height must be positive"));
        }
        if arena.wall_margin < 0.0 || arena.wall_margin * 2.0 >= arena.width {
            return Err(ConfigError::invalid(
                "arena.wall_margin",
                format!("must leave a playable band inside width {}", arena.width),
            ));
        }
        if !(0.0..arena.height).contains(&arena.danger_line_y) {
            return Err(ConfigError::invalid(
                "arena.danger_line_y",
                format!("must lie inside the arena height {}", arena.height),
            ));
        }

        if self.classes.len() < 2 {
            return Err(ConfigError::invalid("classes", "need at least two classes to merge"));
        }
        if !self.classes.is_strictly_increasing() {
            return Err(ConfigError::invalid(
                "classes",
                "score values and visual scales must strictly increase",
            ));
        }
        if self.classes.iter().any(|c| c.collision_radius() <= 0.0) {
            return Err(ConfigError::invalid("classes", "every class needs a positive radius"));
        }

        let rules = &self.rules;
        if rules.spawn_pool == 0 || rules.spawn_pool > self.classes.len() {
            return Err(ConfigError::invalid(
                "rules.spawn_pool",
                format!("must be within 1..={}", self.classes.len()),
            ));
        }
        if rules.settle_speed <= 0.0 {
            return Err(ConfigError::invalid("rules.settle_speed", "must be positive"));
        }
        Ok(())
    }
}
