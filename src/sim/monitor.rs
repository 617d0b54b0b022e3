//! Game-over monitor
//!
//! A body that has come to rest above the danger line means the stack has
//! reached the top of the arena.

use glam::Vec2;

use super::physics::{BodyId, PhysicsWorld};
use super::state::{BodyTag, GameSession};

/// True when both velocity components are below `threshold`
#[inline]
pub fn is_settled(vel: Vec2, threshold: f32) -> bool {
    vel.x.abs() < threshold && vel.y.abs() < threshold
}

/// First active, non-static mergeable body (in id order) that is settled
/// above the danger line
pub fn find_settled_above_line<W: PhysicsWorld>(session: &GameSession<W>) -> Option<BodyId> {
    let danger_y = session.tuning.arena.danger_line_y;
    let threshold = session.tuning.rules.settle_speed;

    session.bodies.iter().find_map(|(&id, tag)| {
        let BodyTag::Mergeable(obj) = tag else {
            return None;
        };
        if !obj.active || session.world.is_static(id) {
            return None;
        }
        let pos = session.world.position(id)?;
        let vel = session.world.velocity(id)?;
        (pos.y < danger_y && is_settled(vel, threshold)).then_some(id)
    })
}
