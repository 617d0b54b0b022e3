//! Mushroom Merge entry point
//!
//! Native builds run one autoplay session headless and record the result.
//! The browser build drives the library from the host page instead.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use mushroom_merge::consts::{SIM_DT, TICKS_PER_SECOND};
    use mushroom_merge::highscores::now_millis;
    use mushroom_merge::persistence::{JsonFileStore, ScoreStore};
    use mushroom_merge::sim::{GameEvent, GameSession, RapierWorld, TickInput, tick};
    use mushroom_merge::Tuning;

    /// Give up on sessions that never top out (10 minutes of game time)
    const MAX_TICKS: u64 = 10 * 60 * TICKS_PER_SECOND as u64;
    const SCORE_FILE: &str = "highscores.json";
    const PLAYER_NAME: &str = "Autoplay";

    fn load_tuning() -> Tuning {
        let Ok(path) = std::env::var("MUSHROOM_TUNING") else {
            return Tuning::default();
        };
        match Tuning::from_path(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning file {path}: {e}");
                Tuning::default()
            }
        }
    }

    fn seed_from_args() -> u64 {
        std::env::args()
            .nth(1)
            .and_then(|arg| match arg.parse() {
                Ok(seed) => Some(seed),
                Err(_) => {
                    log::warn!("Seed {arg:?} is not a number, using the clock");
                    None
                }
            })
            .unwrap_or_else(|| now_millis() as u64)
    }

    pub fn run() {
        env_logger::init();
        log::info!("Mushroom Merge (native) starting...");

        let tuning = load_tuning();
        let seed = seed_from_args();
        let world = RapierWorld::new(&tuning.physics);
        let mut session = GameSession::new(tuning, world, seed);
        session.start_session();

        let input = TickInput {
            autoplay: true,
            ..Default::default()
        };
        let mut fusions = 0u32;
        let mut drops = 0u32;
        while !session.is_over() && session.time_ticks() < MAX_TICKS {
            tick(&mut session, &input);
            for event in session.drain_events() {
                match event {
                    GameEvent::Fused { from_class, to_class, .. } => {
                        fusions += 1;
                        log::debug!("Fused {from_class} -> {to_class}");
                    }
                    GameEvent::Dropped { .. } => drops += 1,
                    _ => {}
                }
            }
        }
        if !session.is_over() {
            log::info!("Tick limit reached, ending session");
            session.end_session_early();
        }

        let score = session.score();
        let seconds = session.time_ticks() as f32 * SIM_DT;
        log::info!(
            "Session finished: score {score}, {drops} drops, {fusions} fusions, {seconds:.1}s game time"
        );
        println!("Seed {seed}: scored {score} in {seconds:.1}s");

        let mut store = JsonFileStore::new(SCORE_FILE);
        match store.record(PLAYER_NAME, score, now_millis()) {
            Ok(Some(rank)) => println!("New high score! Rank #{rank}"),
            Ok(None) => {}
            Err(e) => log::warn!("Could not save high scores: {e}"),
        }

        for (i, entry) in store.load().entries.iter().enumerate() {
            println!("{:>2}. {:<12} {:>6}", i + 1, entry.name, entry.score);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The host page drives the library directly
}
