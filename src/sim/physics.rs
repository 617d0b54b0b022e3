//! Physics world adapter contract
//!
//! The merge rules sit on top of a rigid-body simulation they treat as a
//! black box. Anything that can create circular bodies, report positions and
//! velocities, and hand back collision-start pairs once per step can host a
//! session. [`super::world::RapierWorld`] is the built-in implementation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque handle to a body owned by the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// The kind of rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

/// Shape description for a collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderDesc {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

/// Physical material properties for a collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    /// `None` lets the world apply its default density
    pub density: Option<f32>,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: crate::consts::RESTITUTION,
            friction: crate::consts::FRICTION,
            density: None,
        }
    }
}

/// Description of a body before creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub collider: ColliderDesc,
    pub material: ColliderMaterial,
}

impl BodyDesc {
    /// Dynamic circle at the origin
    pub fn dynamic_circle(radius: f32) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            collider: ColliderDesc::Circle { radius },
            material: ColliderMaterial::default(),
        }
    }

    /// Immovable box (arena wall)
    pub fn fixed_rect(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            body_type: BodyType::Fixed,
            position: center,
            collider: ColliderDesc::Rect { half_extents },
            material: ColliderMaterial::default(),
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_material(mut self, material: ColliderMaterial) -> Self {
        self.material = material;
        self
    }
}

/// Two bodies that began touching during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair {
    pub body_a: BodyId,
    pub body_b: BodyId,
}

impl CollisionPair {
    /// Pair with the lower id first, so the same contact always compares equal
    pub fn new(a: BodyId, b: BodyId) -> Self {
        if a <= b {
            Self { body_a: a, body_b: b }
        } else {
            Self { body_a: b, body_b: a }
        }
    }
}

/// Rigid-body simulation hosting a session
pub trait PhysicsWorld {
    /// Remove every body.
    fn clear(&mut self);

    /// Create a body and return its handle.
    fn create_body(&mut self, desc: &BodyDesc) -> BodyId;

    /// Remove a body. Returns `false` if it was already gone.
    fn remove_body(&mut self, id: BodyId) -> bool;

    /// Advance one step and append the collision-start pairs of this step.
    fn step_into(&mut self, collisions: &mut Vec<CollisionPair>);

    fn position(&self, id: BodyId) -> Option<Vec2>;

    /// Linear velocity in units per step.
    fn velocity(&self, id: BodyId) -> Option<Vec2>;

    /// Shape the body was created with.
    fn collider_shape(&self, id: BodyId) -> Option<ColliderDesc>;

    fn is_static(&self, id: BodyId) -> bool;

    fn body_count(&self) -> usize;
}
