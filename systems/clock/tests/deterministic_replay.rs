use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use road_defence_core::{
    CellCoord, Event, GameConfig, Phase, Placement, RoadShape, SessionOutcome, TowerKind,
};
use road_defence_system_clock::SimulationClock;
use road_defence_world::{query, World};

const FRAME: Duration = Duration::from_millis(16);

fn config() -> GameConfig {
    GameConfig {
        columns: 7,
        rows: 3,
        starting_gold: 20,
        final_wave: 2,
        tick_hz: 30,
        ..GameConfig::default()
    }
}

fn defended_world() -> World {
    let mut world = World::new(config()).expect("valid config");
    let mut events = Vec::new();
    for column in 1..6 {
        world
            .place(
                CellCoord::new(column, 1),
                Placement::Road(RoadShape::Straight),
                &mut events,
            )
            .expect("straight road");
    }
    for column in [1, 3, 5] {
        world
            .place(
                CellCoord::new(column, 0),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower beside the road");
    }
    world
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    events: Vec<String>,
    gold: u32,
    base_hp: u32,
    phase: Phase,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

fn replay(frames: usize) -> ReplayOutcome {
    let config = config();
    let mut world = defended_world();
    let mut clock = SimulationClock::new(&config);
    let mut log = Vec::new();

    for _ in 0..frames {
        let mut events = Vec::new();
        let _ = clock.advance(&mut world, FRAME, &mut events);
        log.extend(events.iter().map(|event| format!("{event:?}")));
        if query::wave_active(&world) || query::phase(&world) == Phase::End {
            continue;
        }
        let mut events = Vec::new();
        let _ = world.start_next_wave(&mut events);
        log.extend(events.iter().map(|event| format!("{event:?}")));
    }

    ReplayOutcome {
        events: log,
        gold: query::gold(&world),
        base_hp: query::base_hp(&world),
        phase: query::phase(&world),
    }
}

#[test]
fn deterministic_replay_reaches_the_same_end() {
    let first = replay(2_000);
    let second = replay(2_000);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.phase, Phase::End, "two waves finish within the budget");
    assert!(first
        .events
        .iter()
        .any(|event| event.starts_with("ProjectileHit")));
}

#[test]
fn session_ends_exactly_once() {
    let config = config();
    let mut world = defended_world();
    let mut clock = SimulationClock::new(&config);
    let mut events = Vec::new();

    for _ in 0..2_000 {
        let _ = clock.advance(&mut world, FRAME, &mut events);
        if !query::wave_active(&world) && query::phase(&world) != Phase::End {
            let _ = world.start_next_wave(&mut events);
        }
    }

    let endings: Vec<SessionOutcome> = events
        .iter()
        .filter_map(|event| match event {
            Event::SessionEnded { summary } => Some(summary.outcome),
            _ => None,
        })
        .collect();
    assert_eq!(endings.len(), 1);
    let summary = query::outcome(&world).expect("summary recorded");
    assert_eq!(summary.outcome, endings[0]);
    assert_eq!(summary.towers, 3);
    if summary.outcome == SessionOutcome::Victory {
        assert_eq!(summary.wave_reached, 2);
    }
}
