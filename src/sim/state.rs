//! Session state and core simulation types
//!
//! A [`GameSession`] is the single aggregate holding everything one
//! play-through mutates: phase, score, spawn queue, held object, the body
//! registry and the deferred task queue. Nothing is global, so any number of
//! sessions can run side by side.

use std::collections::BTreeMap;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::dropper::DropController;
use super::physics::{BodyDesc, BodyId, ColliderDesc, ColliderMaterial, PhysicsWorld};
use super::schedule::{Scheduler, Task};
use super::score::ScoreLedger;
use super::spawn::SpawnQueue;
use super::world::RapierWorld;
use crate::tuning::Tuning;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Created, never started
    Idle,
    /// Play in progress
    Active,
    /// Ended by the game-over monitor or a forfeit
    Over,
}

/// Game metadata attached to a mergeable body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeObject {
    pub class_index: usize,
    /// Cleared the moment a fusion consumes the body
    pub active: bool,
}

/// What a physics body is, as far as the rules are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyTag {
    Wall,
    Mergeable(MergeObject),
}

/// Notifications for the presentation, audio and persistence layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SessionStarted { generation: u32 },
    /// Class shown in the "next" preview
    NextClassChanged(usize),
    ScoreChanged(u64),
    HeldSpawned { class_index: usize, x: f32 },
    Dropped { class_index: usize, x: f32 },
    Fused { from_class: usize, to_class: usize, position: Vec2 },
    GameOver { final_score: u64 },
}

/// Snapshot of one mergeable body for hosts and renderers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectView {
    pub id: BodyId,
    pub class_index: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

/// One play session on top of a physics world
pub struct GameSession<W: PhysicsWorld = RapierWorld> {
    pub(crate) tuning: Tuning,
    pub(crate) world: W,
    pub(crate) phase: SessionPhase,
    /// Bumped on every start; deferred tasks carry it
    pub(crate) generation: u32,
    /// Simulation ticks since the session started
    pub(crate) time_ticks: u64,
    pub(crate) score: ScoreLedger,
    pub(crate) queue: SpawnQueue,
    pub(crate) dropper: DropController,
    pub(crate) bodies: BTreeMap<BodyId, BodyTag>,
    pub(crate) scheduler: Scheduler,
    /// Rendered sprite extent per class, when the host has measured one
    sprite_extents: Vec<Option<f32>>,
    events: Vec<GameEvent>,
    seed: u64,
}

impl<W: PhysicsWorld> GameSession<W> {
    /// Create an idle session. `seed` fixes every random draw of every
    /// session started from it.
    pub fn new(tuning: Tuning, world: W, seed: u64) -> Self {
        let class_count = tuning.classes.len();
        let pool = spawn_pool(&tuning);
        Self {
            tuning,
            world,
            phase: SessionPhase::Idle,
            generation: 0,
            time_ticks: 0,
            score: ScoreLedger::new(),
            queue: SpawnQueue::new(Pcg32::new(seed, 0), pool),
            dropper: DropController::new(),
            bodies: BTreeMap::new(),
            scheduler: Scheduler::new(),
            sprite_extents: vec![None; class_count],
            events: Vec::new(),
            seed,
        }
    }

    /// Start (or restart) a session from a clean slate
    ///
    /// Valid from any phase. Pending tasks of the previous session are
    /// invalidated by the generation bump.
    pub fn start_session(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.queue = SpawnQueue::new(
            Pcg32::new(self.seed, u64::from(self.generation)),
            spawn_pool(&self.tuning),
        );
        self.world.clear();
        self.bodies.clear();
        self.scheduler.clear();
        self.dropper.reset();
        self.score.reset();
        self.time_ticks = 0;
        self.build_walls();
        self.phase = SessionPhase::Active;

        log::info!("Session {} started (seed {})", self.generation, self.seed);
        self.events.push(GameEvent::SessionStarted {
            generation: self.generation,
        });
        self.events.push(GameEvent::ScoreChanged(0));

        self.queue.initialize();
        self.spawn_next();
    }

    /// Left wall, right wall and floor; the top stays open
    fn build_walls(&mut self) {
        let arena = &self.tuning.arena;
        let (w, h, t) = (arena.width, arena.height, arena.wall_thickness);
        let side = Vec2::new(t / 2.0, h / 2.0 + t);
        let walls = [
            BodyDesc::fixed_rect(Vec2::new(-t / 2.0, h / 2.0), side),
            BodyDesc::fixed_rect(Vec2::new(w + t / 2.0, h / 2.0), side),
            BodyDesc::fixed_rect(Vec2::new(w / 2.0, h + t / 2.0), Vec2::new(w / 2.0 + t, t / 2.0)),
        ];
        for desc in &walls {
            let id = self.world.create_body(desc);
            self.bodies.insert(id, BodyTag::Wall);
        }
    }

    /// Present the queued class as the new held object
    pub(crate) fn spawn_next(&mut self) {
        if self.phase != SessionPhase::Active {
            return;
        }
        let (presented, next) = self.queue.advance();
        if self.dropper.spawn_held(presented, &self.tuning.arena, false) {
            self.events.push(GameEvent::HeldSpawned {
                class_index: presented,
                x: self.tuning.arena.center_x(),
            });
            self.events.push(GameEvent::NextClassChanged(next));
        }
    }

    /// Run deferred tasks that are due this tick
    pub(crate) fn run_due_tasks(&mut self) {
        for task in self.scheduler.take_due(self.time_ticks, self.generation) {
            match task {
                Task::SpawnNext => self.spawn_next(),
            }
        }
    }

    /// Move the held object toward the pointer
    pub fn pointer_move(&mut self, x: f32) {
        let over = self.phase != SessionPhase::Active;
        self.dropper.move_held(x, &self.tuning.arena, over);
    }

    /// Drop the held object. Returns `true` if a body was created.
    pub fn pointer_down(&mut self) -> bool {
        let over = self.phase != SessionPhase::Active;
        let Some(request) = self.dropper.commit_drop(over) else {
            return false;
        };

        let density = Some(self.tuning.physics.drop_density);
        let created = self
            .spawn_body(request.class_index, request.pos, density)
            .is_some();
        if created {
            self.events.push(GameEvent::Dropped {
                class_index: request.class_index,
                x: request.pos.x,
            });
            log::debug!("Dropped class {} at x={:.1}", request.class_index, request.pos.x);
        } else {
            log::warn!("Class {} has no body; skipping the drop", request.class_index);
        }

        // The gate is closed either way, so the next held object must still come
        let due = self.time_ticks + u64::from(self.tuning.rules.drop_delay_ticks);
        self.scheduler.schedule(due, self.generation, Task::SpawnNext);
        created
    }

    /// Manual forfeit
    pub fn end_session_early(&mut self) {
        if self.phase == SessionPhase::Active {
            log::info!("Session {} forfeited", self.generation);
            self.declare_game_over();
        }
    }

    pub(crate) fn declare_game_over(&mut self) {
        self.phase = SessionPhase::Over;
        self.dropper.reset();
        self.scheduler.clear();
        let final_score = self.score.current();
        log::info!("Game over: final score {final_score}");
        self.events.push(GameEvent::GameOver { final_score });
    }

    /// Report the rendered size of a class sprite
    ///
    /// Radii of bodies created afterwards follow the measured size, so merges
    /// stay consistent with the art even if the assets change.
    pub fn set_sprite_extent(&mut self, class_index: usize, width: f32, height: f32) {
        if !width.is_finite() || !height.is_finite() {
            return;
        }
        let extent = width.max(height);
        if extent <= 0.0 {
            return;
        }
        if let Some(slot) = self.sprite_extents.get_mut(class_index) {
            *slot = Some(extent);
        }
    }

    /// Collision radius used for new bodies of a class
    pub fn collision_radius(&self, class_index: usize) -> Option<f32> {
        let class = self.tuning.classes.get(class_index)?;
        let extent = self
            .sprite_extents
            .get(class_index)
            .copied()
            .flatten()
            .unwrap_or(class.source_size);
        Some(class.radius_for_extent(extent))
    }

    /// Create a mergeable body. `density: None` leaves the world default.
    pub(crate) fn spawn_body(
        &mut self,
        class_index: usize,
        pos: Vec2,
        density: Option<f32>,
    ) -> Option<BodyId> {
        let radius = self.collision_radius(class_index)?;
        let material = ColliderMaterial {
            restitution: self.tuning.physics.restitution,
            friction: self.tuning.physics.friction,
            density,
        };
        let desc = BodyDesc::dynamic_circle(radius)
            .with_position(pos)
            .with_material(material);
        let id = self.world.create_body(&desc);
        self.bodies.insert(
            id,
            BodyTag::Mergeable(MergeObject {
                class_index,
                active: true,
            }),
        );
        Some(id)
    }

    /// Place an object directly, as a fusion would (no density override)
    pub fn spawn_object(&mut self, class_index: usize, pos: Vec2) -> Option<BodyId> {
        self.spawn_body(class_index, pos, None)
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Active mergeable bodies in id order
    ///
    /// `radius` is the radius the body was created with, which can differ
    /// from [`Self::collision_radius`] after a sprite extent change.
    pub fn objects(&self) -> impl Iterator<Item = ObjectView> + '_ {
        self.bodies.iter().filter_map(|(&id, tag)| match tag {
            BodyTag::Mergeable(obj) if obj.active => {
                let ColliderDesc::Circle { radius } = self.world.collider_shape(id)? else {
                    return None;
                };
                Some(ObjectView {
                    id,
                    class_index: obj.class_index,
                    pos: self.world.position(id)?,
                    vel: self.world.velocity(id)?,
                    radius,
                })
            }
            _ => None,
        })
    }

    pub fn object_count(&self) -> usize {
        self.objects().count()
    }

    pub fn tag(&self, id: BodyId) -> Option<BodyTag> {
        self.bodies.get(&id).copied()
    }

    #[inline]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::Over
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score.current()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn next_class(&self) -> usize {
        self.queue.peek()
    }

    pub fn dropper(&self) -> &DropController {
        &self.dropper
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }
}

/// Draw pool size the table can actually serve
fn spawn_pool(tuning: &Tuning) -> usize {
    tuning.rules.spawn_pool.min(tuning.classes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::classes::ClassTable;

    fn session() -> GameSession {
        GameSession::new(Tuning::default(), RapierWorld::default(), 1234)
    }

    #[test]
    fn test_new_session_is_idle() {
        let mut s = session();
        assert_eq!(s.phase(), SessionPhase::Idle);
        // Commands before start are ignored
        assert!(!s.pointer_down());
        s.end_session_early();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_start_spawns_held_and_walls() {
        let mut s = session();
        s.start_session();
        assert_eq!(s.phase(), SessionPhase::Active);
        assert_eq!(s.world().body_count(), 3);
        let held = s.dropper().held().copied().unwrap();
        assert!(held.class_index <= 2);
        assert!(s.next_class() <= 2);

        let events = s.drain_events();
        assert_eq!(events[0], GameEvent::SessionStarted { generation: 1 });
        assert!(events.contains(&GameEvent::ScoreChanged(0)));
        assert!(events.contains(&GameEvent::NextClassChanged(s.next_class())));
    }

    #[test]
    fn test_drop_creates_body_and_schedules_spawn() {
        let mut s = session();
        s.start_session();
        s.pointer_move(100.0);
        assert!(s.pointer_down());
        assert!(!s.pointer_down());
        assert_eq!(s.object_count(), 1);
        assert_eq!(s.pending_tasks(), 1);
        assert!(s.dropper().held().is_none());

        let obj = s.objects().next().unwrap();
        assert_eq!(obj.pos, Vec2::new(100.0, 30.0));
    }

    #[test]
    fn test_dropped_bodies_are_denser_than_fused() {
        let mut s = session();
        s.start_session();
        let class = s.dropper().held().unwrap().class_index;
        s.pointer_down();
        let dropped = s.objects().next().unwrap().id;
        let fused = s.spawn_object(class, Vec2::new(100.0, 300.0)).unwrap();
        let ratio = s.world().mass(dropped).unwrap() / s.world().mass(fused).unwrap();
        assert!((ratio - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_forfeit_reports_score() {
        let mut s = session();
        s.start_session();
        s.drain_events();
        s.end_session_early();
        assert!(s.is_over());
        assert_eq!(s.drain_events(), vec![GameEvent::GameOver { final_score: 0 }]);
        // Second forfeit is a no-op
        s.end_session_early();
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_sprite_extent_changes_radius() {
        let mut s = session();
        assert_eq!(s.collision_radius(0), Some(20.0));
        s.set_sprite_extent(0, 2048.0, 1024.0);
        assert_eq!(s.collision_radius(0), Some(40.0));
        // Unknown class and non-positive sizes are ignored
        s.set_sprite_extent(99, 10.0, 10.0);
        s.set_sprite_extent(1, 0.0, 0.0);
        assert_eq!(s.collision_radius(1), Some(25.0));
        assert_eq!(s.collision_radius(99), None);
    }

    #[test]
    fn test_sprite_extent_rejects_non_finite() {
        let mut s = session();
        s.set_sprite_extent(0, f32::NAN, 512.0);
        s.set_sprite_extent(0, 512.0, f32::INFINITY);
        assert_eq!(s.collision_radius(0), Some(20.0));
    }

    #[test]
    fn test_object_keeps_radius_it_was_created_with() {
        let mut s = session();
        s.start_session();
        let id = s.spawn_object(0, Vec2::new(100.0, 300.0)).unwrap();
        s.set_sprite_extent(0, 2048.0, 2048.0);
        let view = s.objects().find(|o| o.id == id).unwrap();
        assert_eq!(view.radius, 20.0);
        assert_eq!(s.collision_radius(0), Some(40.0));
    }

    #[test]
    fn test_oversized_pool_only_offers_known_classes() {
        let mut tuning = Tuning::default();
        tuning.rules.spawn_pool = 10;
        let class_count = tuning.classes.len();
        let mut s = GameSession::new(tuning, RapierWorld::default(), 77);
        for _ in 0..50 {
            s.start_session();
            assert!(s.dropper().held().unwrap().class_index < class_count);
            assert!(s.next_class() < class_count);
            assert!(s.pointer_down());
        }
    }

    #[test]
    fn test_failed_drop_still_schedules_next_spawn() {
        let tuning = Tuning {
            classes: ClassTable::new(Vec::new()),
            ..Tuning::default()
        };
        let mut s = GameSession::new(tuning, RapierWorld::default(), 3);
        s.start_session();
        assert!(s.dropper().held().is_some());

        assert!(!s.pointer_down());
        assert_eq!(s.object_count(), 0);
        assert_eq!(s.pending_tasks(), 1);
        assert!(!s.dropper().can_drop());
    }

    #[test]
    fn test_restart_invalidates_pending_spawn() {
        let mut s = session();
        s.start_session();
        s.pointer_down();
        assert_eq!(s.pending_tasks(), 1);
        s.start_session();
        assert_eq!(s.pending_tasks(), 0);
        assert_eq!(s.generation(), 2);
        assert_eq!(s.object_count(), 0);
    }
}
