#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-timestep driver for the Road Defence simulation.
//!
//! The clock accumulates wall time and, for every whole step, advances the
//! wave, lets the pure targeting and combat systems issue firing commands,
//! resolves projectiles and finally checks whether the session is over.

use std::time::Duration;

use road_defence_core::{Command, Event, GameConfig, Phase, SessionOutcome, TowerTarget};
use road_defence_system_tower_combat::TowerCombat;
use road_defence_system_tower_targeting::TowerTargeting;
use road_defence_world::{self as world, query, World};
use tracing::{debug, info};

/// Accumulator-based simulation clock owning the per-step systems.
#[derive(Debug)]
pub struct SimulationClock {
    step: Duration,
    accumulator: Duration,
    final_wave: u32,
    auto_start_first_wave: bool,
    steps: u64,
    targeting: TowerTargeting,
    combat: TowerCombat,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
}

impl SimulationClock {
    /// Creates a clock stepping at the configured tick rate.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            step: config.fixed_step(),
            accumulator: Duration::ZERO,
            final_wave: config.final_wave,
            auto_start_first_wave: config.auto_start_first_wave,
            steps: 0,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            targets: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Duration simulated by a single step.
    #[must_use]
    pub const fn fixed_step(&self) -> Duration {
        self.step
    }

    /// Number of steps run since the clock was created.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Adds `elapsed` to the accumulator and runs every whole step it covers.
    ///
    /// Returns the number of steps run. Leftover time carries over to the
    /// next call. Nothing runs once the session has ended.
    pub fn advance(
        &mut self,
        world: &mut World,
        elapsed: Duration,
        out_events: &mut Vec<Event>,
    ) -> u32 {
        if query::phase(world) == Phase::End {
            self.accumulator = Duration::ZERO;
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        let mut ran = 0;
        while self.accumulator >= self.step && !self.step.is_zero() {
            self.accumulator -= self.step;
            self.step_once(world, out_events);
            ran += 1;
            if query::phase(world) == Phase::End {
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        ran
    }

    /// Runs exactly one fixed step regardless of the accumulator.
    pub fn step_once(&mut self, world: &mut World, out_events: &mut Vec<Event>) {
        if query::phase(world) == Phase::End {
            return;
        }
        self.steps = self.steps.saturating_add(1);
        let dt = self.step;

        if self.should_auto_start(world) {
            debug!(step = self.steps, "auto-starting first wave");
            world::apply(world, Command::StartWave, out_events);
        }

        world::apply(world, Command::Tick { dt }, out_events);

        let phase = query::phase(world);
        self.targeting.handle(
            phase,
            &query::tower_view(world),
            &query::enemy_view(world),
            &mut self.targets,
        );
        self.commands.clear();
        self.combat.handle(
            phase,
            &query::tower_cooldowns(world),
            &self.targets,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(world, command, out_events);
        }

        world::apply(world, Command::ResolveProjectiles { dt }, out_events);

        if let Some(outcome) = self.terminal_outcome(world) {
            info!(?outcome, step = self.steps, "session decided");
            world::apply(world, Command::EndSession { outcome }, out_events);
        }
    }

    /// Wave one has not run yet while the counter still reads one and nothing is active.
    fn should_auto_start(&self, world: &World) -> bool {
        self.auto_start_first_wave
            && query::current_wave(world) == 1
            && !query::wave_active(world)
            && query::path(world).len() >= 2
    }

    fn terminal_outcome(&self, world: &World) -> Option<SessionOutcome> {
        if query::base_hp(world) == 0 {
            return Some(SessionOutcome::Defeat);
        }
        if query::current_wave(world) > self.final_wave && !query::wave_active(world) {
            return Some(SessionOutcome::Victory);
        }
        None
    }
}
