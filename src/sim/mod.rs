//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering or platform dependencies

pub mod classes;
pub mod dropper;
pub mod fusion;
pub mod monitor;
pub mod physics;
pub mod schedule;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use classes::{ClassTable, ObjectClass};
pub use dropper::{DropController, DropRequest, HeldObject};
pub use fusion::fuse_pairs;
pub use monitor::{find_settled_above_line, is_settled};
pub use physics::{
    BodyDesc, BodyId, BodyType, ColliderDesc, ColliderMaterial, CollisionPair, PhysicsWorld,
};
pub use schedule::{Scheduler, Task};
pub use score::ScoreLedger;
pub use spawn::SpawnQueue;
pub use state::{BodyTag, GameEvent, GameSession, MergeObject, ObjectView, SessionPhase};
pub use tick::{TickInput, tick};
pub use world::RapierWorld;
