//! Fusion engine
//!
//! Consumes the collision-start batch of one physics step. Two active bodies
//! of the same class are replaced by one body of the next class at their
//! midpoint. Terminal-class pairs are left alone: the largest class is a
//! stable sink.

use super::physics::{CollisionPair, PhysicsWorld};
use super::state::{BodyTag, GameEvent, GameSession, MergeObject};

/// Apply every fusion in a collision batch, in batch order
///
/// The `active` flags are checked as each pair is processed, so a body that
/// an earlier pair consumed cannot be consumed again. Returns the number of
/// fusions performed.
pub fn fuse_pairs<W: PhysicsWorld>(session: &mut GameSession<W>, pairs: &[CollisionPair]) -> usize {
    let mut fusions = 0;

    for pair in pairs {
        let (a, b) = (pair.body_a, pair.body_b);
        let (Some(BodyTag::Mergeable(obj_a)), Some(BodyTag::Mergeable(obj_b))) =
            (session.tag(a), session.tag(b))
        else {
            // Walls and unknown bodies never merge
            continue;
        };
        if obj_a.class_index != obj_b.class_index || !obj_a.active || !obj_b.active {
            continue;
        }

        let from_class = obj_a.class_index;
        let Some(to_class) = session.tuning.classes.promotion(from_class) else {
            continue;
        };
        let (Some(pos_a), Some(pos_b)) = (session.world.position(a), session.world.position(b))
        else {
            continue;
        };
        let midpoint = (pos_a + pos_b) / 2.0;

        for id in [a, b] {
            session.bodies.insert(
                id,
                BodyTag::Mergeable(MergeObject {
                    class_index: from_class,
                    active: false,
                }),
            );
            session.world.remove_body(id);
        }

        if session.spawn_body(to_class, midpoint, None).is_none() {
            continue;
        }
        let points = session
            .tuning
            .classes
            .get(to_class)
            .map(|c| c.score_value)
            .unwrap_or(0);
        let total = session.score.add(points);

        log::debug!("Fused class {from_class} -> {to_class} at {midpoint} (+{points})");
        session.emit(GameEvent::Fused {
            from_class,
            to_class,
            position: midpoint,
        });
        session.emit(GameEvent::ScoreChanged(total));
        fusions += 1;
    }

    // Consumed bodies are gone from the world; drop their metadata too
    session
        .bodies
        .retain(|_, tag| !matches!(tag, BodyTag::Mergeable(obj) if !obj.active));

    fusions
}
