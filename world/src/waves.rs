//! Wave spawning and enemy locomotion along the committed path.

use std::time::Duration;

use road_defence_core::{CellCoord, CellPoint, EnemyId, EnemySnapshot, Event, Phase, WaveError};
use tracing::{debug, info};

use crate::World;

/// Time between consecutive spawns of a wave.
pub(crate) const SPAWN_INTERVAL: Duration = Duration::from_millis(800);
/// Window a bleed keeps ticking after the most recent hit.
pub(crate) const BLEED_DURATION: Duration = Duration::from_millis(2500);
/// Walking speed of every enemy in cells per second.
pub(crate) const ENEMY_SPEED: f32 = 1.5;
/// Gold granted for each kill.
pub(crate) const GOLD_PER_KILL: u32 = 1;

const ESCAPE_DAMAGE: u32 = 1;
const SPAWN_OFFSET: f32 = 0.01;

/// Number of enemies spawned by the one-based `wave`.
#[must_use]
pub(crate) const fn enemy_count(wave: u32) -> u32 {
    5 + wave.saturating_sub(1) * 2
}

/// Hit points of every enemy spawned by the one-based `wave`.
#[must_use]
pub(crate) const fn enemy_hp(wave: u32) -> u32 {
    5 + wave.saturating_sub(1) / 2
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct WaveState {
    pub(crate) active: bool,
    pub(crate) enemies_to_spawn: u32,
    pub(crate) since_last_spawn: Duration,
    pub(crate) enemy_hp: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) max_hp: f32,
    pub(crate) hp: f32,
    pub(crate) speed: f32,
    pub(crate) speed_multiplier: f32,
    pub(crate) bleed_dps: f32,
    pub(crate) bleed_remaining: Duration,
    pub(crate) path_index: usize,
    pub(crate) t: f32,
    pub(crate) position: CellPoint,
}

impl Enemy {
    /// Creates an enemy at the start of `path`, nudged toward the second cell.
    pub(crate) fn spawn(id: EnemyId, hp: u32, path: &[CellCoord]) -> Self {
        let position = match path {
            [first, second, ..] => first.to_point().lerp(second.to_point(), SPAWN_OFFSET),
            [first] => first.to_point(),
            [] => CellPoint::default(),
        };
        Self {
            id,
            max_hp: hp as f32,
            hp: hp as f32,
            speed: ENEMY_SPEED,
            speed_multiplier: 1.0,
            bleed_dps: 0.0,
            bleed_remaining: Duration::ZERO,
            path_index: 0,
            t: 0.0,
            position,
        }
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    fn apply_bleed(&mut self, dt: Duration) {
        if self.bleed_remaining.is_zero() {
            return;
        }
        let span = dt.min(self.bleed_remaining);
        self.hp -= self.bleed_dps * span.as_secs_f32();
        self.bleed_remaining -= span;
        if self.bleed_remaining.is_zero() {
            self.bleed_dps = 0.0;
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            path_index: self.path_index,
            t: self.t,
            hp: self.hp,
            max_hp: self.max_hp,
            speed_multiplier: self.speed_multiplier,
        }
    }
}

/// Result of spending a distance budget along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stride {
    Walking,
    Arrived,
}

/// Walks `budget` cells along a path of unit-length segments.
///
/// Crosses as many segments as the budget covers, resetting `t` whenever a
/// segment is exhausted. Reports [`Stride::Arrived`] once the final cell is reached.
pub(crate) fn advance_along_path(
    path_len: usize,
    path_index: &mut usize,
    t: &mut f32,
    mut budget: f32,
) -> Stride {
    let last = path_len.saturating_sub(1);
    while budget > 0.0 && *path_index < last {
        let remaining = 1.0 - *t;
        if budget < remaining {
            *t += budget;
            budget = 0.0;
        } else {
            budget -= remaining;
            *path_index += 1;
            *t = 0.0;
        }
    }

    if *path_index >= last {
        Stride::Arrived
    } else {
        Stride::Walking
    }
}

/// Continuous position at fraction `t` of the segment starting at `path_index`.
pub(crate) fn position_on_path(path: &[CellCoord], path_index: usize, t: f32) -> CellPoint {
    match (path.get(path_index), path.get(path_index + 1)) {
        (Some(from), Some(to)) => from.to_point().lerp(to.to_point(), t),
        (Some(from), None) => from.to_point(),
        _ => CellPoint::default(),
    }
}

impl World {
    /// Starts the next wave, scaling enemy count and hit points with its number.
    pub fn start_next_wave(&mut self, out_events: &mut Vec<Event>) -> Result<(), WaveError> {
        if self.phase == Phase::End {
            return Err(WaveError::SessionOver);
        }
        if self.wave.active {
            return Err(WaveError::WaveActive);
        }
        if self.path.len() < 2 {
            return Err(WaveError::PathIncomplete);
        }

        let wave = self.current_wave;
        self.wave = WaveState {
            active: true,
            enemies_to_spawn: enemy_count(wave),
            since_last_spawn: Duration::ZERO,
            enemy_hp: enemy_hp(wave),
        };
        self.cards.clear();
        self.enter_phase(Phase::Wave, out_events);

        info!(
            wave,
            enemies = self.wave.enemies_to_spawn,
            enemy_hp = self.wave.enemy_hp,
            "wave started"
        );
        out_events.push(Event::WaveStarted {
            wave,
            enemies: self.wave.enemies_to_spawn,
            enemy_hp: self.wave.enemy_hp,
        });
        Ok(())
    }

    /// Spawns, bleeds and walks enemies for one tick, then checks for wave completion.
    pub(crate) fn step_wave(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.wave.active || self.path.len() < 2 {
            return;
        }

        self.wave.since_last_spawn += dt;
        while self.wave.enemies_to_spawn > 0 && self.wave.since_last_spawn >= SPAWN_INTERVAL {
            self.wave.since_last_spawn -= SPAWN_INTERVAL;
            self.wave.enemies_to_spawn -= 1;
            self.spawn_enemy(out_events);
        }

        for enemy in &mut self.enemies {
            enemy.apply_bleed(dt);
        }
        self.remove_dead_enemies(out_events);

        let mut escaped = Vec::new();
        for enemy in &mut self.enemies {
            let budget = enemy.speed * enemy.speed_multiplier * dt.as_secs_f32();
            let stride =
                advance_along_path(self.path.len(), &mut enemy.path_index, &mut enemy.t, budget);
            match stride {
                Stride::Arrived => escaped.push(enemy.id),
                Stride::Walking => {
                    enemy.position = position_on_path(&self.path, enemy.path_index, enemy.t);
                }
            }
        }
        for enemy in escaped {
            self.escape(enemy, out_events);
        }

        if self.wave.enemies_to_spawn == 0 && self.enemies.is_empty() {
            self.complete_wave(out_events);
        }
    }

    fn spawn_enemy(&mut self, out_events: &mut Vec<Event>) {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        self.enemies
            .push(Enemy::spawn(id, self.wave.enemy_hp, &self.path));
        out_events.push(Event::EnemySpawned { enemy: id });
    }

    fn escape(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(index) = self.enemy_index(enemy) else {
            return;
        };
        let _ = self.enemies.remove(index);
        self.base_hp = self.base_hp.saturating_sub(ESCAPE_DAMAGE);
        debug!(enemy = enemy.get(), base_hp = self.base_hp, "enemy escaped");
        out_events.push(Event::EnemyEscaped {
            enemy,
            base_hp: self.base_hp,
        });
    }

    /// Removes enemies at or below zero hit points, paying the kill reward.
    pub(crate) fn remove_dead_enemies(&mut self, out_events: &mut Vec<Event>) {
        let mut index = 0;
        while index < self.enemies.len() {
            if self.enemies[index].is_dead() {
                let enemy = self.enemies.remove(index);
                self.reward_kill(enemy.id, out_events);
            } else {
                index += 1;
            }
        }
    }

    pub(crate) fn reward_kill(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        self.ledger.add(GOLD_PER_KILL);
        debug!(enemy = enemy.get(), gold = self.ledger.gold(), "enemy killed");
        out_events.push(Event::EnemyKilled {
            enemy,
            reward: GOLD_PER_KILL,
        });
    }

    fn complete_wave(&mut self, out_events: &mut Vec<Event>) {
        let wave = self.current_wave;
        self.wave.active = false;
        self.current_wave = self.current_wave.saturating_add(1);
        info!(wave, "wave completed");
        out_events.push(Event::WaveCompleted { wave });
        self.offer_cards(out_events);
    }

    pub(crate) fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies
            .binary_search_by_key(&enemy, |candidate| candidate.id)
            .ok()
    }
}
