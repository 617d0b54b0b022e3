//! Built-in physics world backed by Rapier
//!
//! The rules speak in units per step (velocities) and units per step²
//! (gravity); Rapier integrates in seconds. Conversions happen here and
//! nowhere else.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use glam::Vec2;
use rapier2d::prelude::*;

use super::physics::{BodyDesc, BodyId, BodyType, ColliderDesc, CollisionPair, PhysicsWorld};
use crate::consts::{SIM_DT, TICKS_PER_SECOND};
use crate::tuning::PhysicsConfig;

const STEPS_PER_SECOND: f32 = TICKS_PER_SECOND as f32;

fn vec2_to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn na_to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Collects collision events during a pipeline step (no crossbeam on wasm)
struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        let mut guard = self.collisions.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *guard)
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

#[derive(Debug, Clone, Copy)]
struct Handles {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

/// Rapier2D pipeline hosting circles and wall boxes
pub struct RapierWorld {
    gravity: Vector<Real>,
    linear_damping: f32,
    default_density: f32,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    /// Ids in creation order; ids are never reused, even across `clear`
    handles: BTreeMap<BodyId, Handles>,
    next_id: u32,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl RapierWorld {
    pub fn new(config: &PhysicsConfig) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: SIM_DT,
            ..Default::default()
        };

        // Per-step drag factor (1 - f) expressed as Rapier's damping coefficient
        let keep = (1.0 - config.air_friction).clamp(0.01, 1.0);
        let linear_damping = (1.0 / keep - 1.0) * STEPS_PER_SECOND;

        Self {
            gravity: vector![0.0, config.gravity * STEPS_PER_SECOND * STEPS_PER_SECOND],
            linear_damping,
            default_density: config.default_density,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            handles: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Set the linear velocity of a body (units per step).
    #[cfg(test)]
    pub(crate) fn set_velocity(&mut self, id: BodyId, vel: Vec2) {
        let Some(h) = self.handles.get(&id) else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(h.body) {
            rb.set_linvel(vec2_to_na(vel * STEPS_PER_SECOND), true);
        }
    }

    /// Mass of a body's collider
    #[cfg(test)]
    pub(crate) fn mass(&self, id: BodyId) -> Option<f32> {
        let h = self.handles.get(&id)?;
        self.colliders.get(h.collider).map(|c| c.mass())
    }

    fn body_id(&self, collider: ColliderHandle) -> Option<BodyId> {
        let parent = self.colliders.get(collider)?.parent()?;
        let body = self.bodies.get(parent)?;
        Some(BodyId(body.user_data as u32))
    }

    fn rigid_body(&self, id: BodyId) -> Option<&RigidBody> {
        let h = self.handles.get(&id)?;
        self.bodies.get(h.body)
    }
}

impl PhysicsWorld for RapierWorld {
    fn clear(&mut self) {
        self.island_manager = IslandManager::new();
        self.broad_phase = DefaultBroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.bodies = RigidBodySet::new();
        self.colliders = ColliderSet::new();
        self.impulse_joints = ImpulseJointSet::new();
        self.multibody_joints = MultibodyJointSet::new();
        self.ccd_solver = CCDSolver::new();
        self.query_pipeline = QueryPipeline::new();
        self.event_collector.drain_collisions();
        self.handles.clear();
    }

    fn create_body(&mut self, desc: &BodyDesc) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;

        let builder = match desc.body_type {
            BodyType::Dynamic => RigidBodyBuilder::dynamic()
                .linear_damping(self.linear_damping)
                // A body resting on one that fuses away must keep falling
                .can_sleep(false),
            BodyType::Fixed => RigidBodyBuilder::fixed(),
        };
        let rb = builder
            .translation(vec2_to_na(desc.position))
            .user_data(u128::from(id.0))
            .build();
        let body = self.bodies.insert(rb);

        let shape = match desc.collider {
            ColliderDesc::Circle { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Rect { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            }
        };
        let material = desc.material;
        let collider = shape
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density.unwrap_or(self.default_density))
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        self.handles.insert(id, Handles { body, collider });
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(h) = self.handles.remove(&id) else {
            return false;
        };
        self.bodies
            .remove(
                h.body,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn step_into(&mut self, collisions: &mut Vec<CollisionPair>) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        let mut started: Vec<CollisionPair> = self
            .event_collector
            .drain_collisions()
            .into_iter()
            .filter_map(|event| match event {
                CollisionEvent::Started(h1, h2, _) => {
                    Some(CollisionPair::new(self.body_id(h1)?, self.body_id(h2)?))
                }
                CollisionEvent::Stopped(..) => None,
            })
            .collect();
        // Rules process the batch in id order
        started.sort_unstable();
        started.dedup();
        collisions.extend(started);
    }

    fn position(&self, id: BodyId) -> Option<Vec2> {
        self.rigid_body(id).map(|rb| na_to_vec2(rb.translation()))
    }

    fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.rigid_body(id)
            .map(|rb| na_to_vec2(rb.linvel()) / STEPS_PER_SECOND)
    }

    fn collider_shape(&self, id: BodyId) -> Option<ColliderDesc> {
        let h = self.handles.get(&id)?;
        let shape = self.colliders.get(h.collider)?.shape();
        if let Some(ball) = shape.as_ball() {
            Some(ColliderDesc::Circle { radius: ball.radius })
        } else {
            shape.as_cuboid().map(|cuboid| ColliderDesc::Rect {
                half_extents: na_to_vec2(&cuboid.half_extents),
            })
        }
    }

    fn is_static(&self, id: BodyId) -> bool {
        self.rigid_body(id).is_some_and(RigidBody::is_fixed)
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }
}
