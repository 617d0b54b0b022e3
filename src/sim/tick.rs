//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically.

use super::fusion::fuse_pairs;
use super::monitor::find_settled_above_line;
use super::physics::PhysicsWorld;
use super::state::{GameSession, SessionPhase};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer x in arena coordinates (mouse/touch)
    pub pointer_x: Option<f32>,
    /// Drop the held object (click/tap/space)
    pub drop: bool,
    /// Idle/demo mode - AI plays the game
    pub autoplay: bool,
}

/// Advance the session by one fixed timestep
///
/// Order within a tick: pointer, drop, due deferred tasks, physics step,
/// fusion of this step's collision batch, then the game-over scan. Fusion
/// always finishes before the scan, so the scan sees merged bodies.
pub fn tick<W: PhysicsWorld>(session: &mut GameSession<W>, input: &TickInput) {
    if session.phase != SessionPhase::Active {
        return;
    }
    session.time_ticks += 1;

    let input = if input.autoplay {
        autoplay_input(session)
    } else {
        input.clone()
    };

    if let Some(x) = input.pointer_x {
        session.pointer_move(x);
    }
    if input.drop {
        session.pointer_down();
    }

    session.run_due_tasks();

    let mut collisions = Vec::new();
    session.world.step_into(&mut collisions);
    fuse_pairs(session, &collisions);

    if let Some(id) = find_settled_above_line(session) {
        log::debug!("Body {:?} settled above the danger line", id);
        session.declare_game_over();
    }
}

/// Pick a drop position for demo mode
///
/// Aims at the highest resting object of the held class so drops tend to
/// merge, otherwise sweeps back and forth across the arena.
fn autoplay_input<W: PhysicsWorld>(session: &GameSession<W>) -> TickInput {
    let Some(held) = session.dropper.held() else {
        return TickInput::default();
    };
    let arena = &session.tuning.arena;
    let threshold = session.tuning.rules.settle_speed * 10.0;

    let target = session
        .objects()
        .filter(|o| o.class_index == held.class_index && o.vel.length() < threshold)
        .min_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal))
        .map(|o| o.pos.x);

    let x = target.unwrap_or_else(|| {
        // Oscillating sweep based on time to create variety
        let t = session.time_ticks as f32 * 0.037;
        let half_band = arena.width / 2.0 - arena.wall_margin;
        arena.center_x() + (t.sin() * 0.7 + (t * 2.3).sin() * 0.3) * half_band
    });

    TickInput {
        pointer_x: Some(x),
        drop: session.dropper.can_drop(),
        autoplay: true,
    }
}
