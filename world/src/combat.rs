//! Projectile flight and hit resolution.

use std::time::Duration;

use road_defence_core::{
    CellCoord, CellPoint, EnemyId, Event, HitMultiplier, Phase, ProjectileId, ProjectileSnapshot,
    RandomSource, TowerId,
};
use tracing::trace;

use crate::{waves::BLEED_DURATION, World};

/// Distance at which a projectile counts as touching its target.
const HIT_RADIUS: f32 = 0.1;
/// Radius searched for a bounce target after a ricochet hit.
const RICOCHET_RADIUS: f32 = 3.0;
/// Upper bound on bonus damage accumulated by ramping towers.
const RAMP_CAP: f32 = 3.0;

/// Projectile in flight, carrying a copy of its tower's modifiers at launch.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) source: TowerId,
    pub(crate) target: EnemyId,
    pub(crate) position: CellPoint,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) crit_chance: f32,
    pub(crate) headshot_chance: f32,
    pub(crate) turn_bonus_damage: f32,
    pub(crate) slow_multiplier: f32,
    pub(crate) bleed_damage: f32,
    pub(crate) pierce_remaining: u32,
    pub(crate) ricochet: bool,
}

impl Projectile {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            source: self.source,
            target: self.target,
            position: self.position,
            damage: self.damage,
        }
    }

    /// Moves toward `goal`, snapping onto it when the step would overshoot.
    fn fly_toward(&mut self, goal: CellPoint, dt: Duration) {
        let distance = self.position.distance(goal);
        let step = self.speed * dt.as_secs_f32();
        if step >= distance {
            self.position = goal;
        } else {
            self.position = self.position.lerp(goal, step / distance);
        }
    }
}

/// What happens to a projectile after it lands a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fate {
    Continue,
    Retarget(EnemyId),
    Spent,
}

/// Rolls the damage multiplier; the headshot roll goes first and wins.
pub(crate) fn roll_multiplier(
    random: &mut dyn RandomSource,
    headshot_chance: f32,
    crit_chance: f32,
) -> HitMultiplier {
    if headshot_chance > 0.0 && random.next_unit() < headshot_chance {
        return HitMultiplier::Headshot;
    }
    if crit_chance > 0.0 && random.next_unit() < crit_chance {
        return HitMultiplier::Crit;
    }
    HitMultiplier::Normal
}

/// Reports whether the path cell nearest to `(path_index, t)` is a turn.
///
/// A turn is an interior path cell whose incoming and outgoing steps differ.
pub(crate) fn on_turn(path: &[CellCoord], path_index: usize, t: f32) -> bool {
    let nearest = if t < 0.5 { path_index } else { path_index + 1 };
    if nearest == 0 || nearest + 1 >= path.len() {
        return false;
    }
    let incoming = path[nearest - 1].direction_to(path[nearest]);
    let outgoing = path[nearest].direction_to(path[nearest + 1]);
    incoming != outgoing
}

impl World {
    /// Launches a projectile from `tower` toward `target`.
    ///
    /// The request is ignored unless the tower is ready and the target is
    /// alive and within range.
    pub(crate) fn fire_projectile(
        &mut self,
        tower: TowerId,
        target: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase == Phase::End {
            return;
        }
        let Some(enemy_position) = self
            .enemy_index(target)
            .map(|index| self.enemies[index].position)
        else {
            return;
        };
        let Some(entry) = self.towers.get_mut(tower) else {
            return;
        };
        if !entry.cooldown.is_zero() {
            return;
        }
        let origin = entry.position();
        if origin.distance_squared(enemy_position) > entry.range * entry.range {
            return;
        }

        entry.cooldown = entry.fire_interval();
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        let modifiers = entry.modifiers;
        self.projectiles.push(Projectile {
            id,
            source: tower,
            target,
            position: origin,
            speed: entry.kind.projectile_speed(),
            damage: entry.damage + modifiers.ramp_stacks,
            crit_chance: modifiers.crit_chance,
            headshot_chance: modifiers.headshot_chance,
            turn_bonus_damage: modifiers.turn_bonus_damage,
            slow_multiplier: modifiers.slow_on_hit,
            bleed_damage: modifiers.bleed_damage,
            pierce_remaining: modifiers.pierce.max(1),
            ricochet: modifiers.ricochet,
        });
        out_events.push(Event::ProjectileFired {
            projectile: id,
            tower,
            target,
        });
    }

    /// Advances every projectile by `dt` and resolves the hits that land.
    pub(crate) fn resolve_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.phase == Phase::End {
            return;
        }
        let in_flight = std::mem::take(&mut self.projectiles);
        let mut remaining = Vec::with_capacity(in_flight.len());

        for mut projectile in in_flight {
            let Some(index) = self.enemy_index(projectile.target) else {
                continue;
            };
            projectile.fly_toward(self.enemies[index].position, dt);
            if projectile.position.distance(self.enemies[index].position) > HIT_RADIUS {
                remaining.push(projectile);
                continue;
            }

            match self.strike(&mut projectile, index, out_events) {
                Fate::Continue => remaining.push(projectile),
                Fate::Retarget(enemy) => {
                    projectile.target = enemy;
                    projectile.ricochet = false;
                    remaining.push(projectile);
                }
                Fate::Spent => {}
            }
        }

        self.projectiles = remaining;
    }

    fn strike(
        &mut self,
        projectile: &mut Projectile,
        index: usize,
        out_events: &mut Vec<Event>,
    ) -> Fate {
        let enemy = &self.enemies[index];
        let mut damage = projectile.damage;
        if projectile.turn_bonus_damage > 0.0 && on_turn(&self.path, enemy.path_index, enemy.t) {
            damage += projectile.turn_bonus_damage;
        }
        let multiplier = roll_multiplier(
            self.random.as_mut(),
            projectile.headshot_chance,
            projectile.crit_chance,
        );
        damage *= multiplier.factor();

        let enemy = &mut self.enemies[index];
        let enemy_id = enemy.id;
        enemy.hp -= damage;
        if projectile.slow_multiplier < enemy.speed_multiplier {
            enemy.speed_multiplier = projectile.slow_multiplier;
        }
        if projectile.bleed_damage > 0.0 {
            enemy.bleed_dps += projectile.bleed_damage;
            enemy.bleed_remaining = BLEED_DURATION;
        }
        let killed = enemy.is_dead();

        if let Some(tower) = self.towers.get_mut(projectile.source) {
            let modifiers = &mut tower.modifiers;
            if modifiers.ramp_per_hit > 0.0 {
                modifiers.ramp_stacks = (modifiers.ramp_stacks + modifiers.ramp_per_hit).min(RAMP_CAP);
            }
        }

        trace!(
            projectile = projectile.id.get(),
            enemy = enemy_id.get(),
            damage,
            ?multiplier,
            "projectile hit"
        );
        out_events.push(Event::ProjectileHit {
            projectile: projectile.id,
            enemy: enemy_id,
            damage,
            multiplier,
        });

        if killed {
            let _ = self.enemies.remove(index);
            self.reward_kill(enemy_id, out_events);
        }

        if projectile.pierce_remaining > 1 {
            projectile.pierce_remaining -= 1;
            return Fate::Continue;
        }
        if projectile.ricochet {
            if let Some(next) = self.bounce_target(projectile.position, enemy_id) {
                return Fate::Retarget(next);
            }
        }
        Fate::Spent
    }

    /// Nearest live enemy other than `struck` strictly within the ricochet radius.
    fn bounce_target(&self, from: CellPoint, struck: EnemyId) -> Option<EnemyId> {
        self.enemies
            .iter()
            .filter(|enemy| enemy.id != struck)
            .map(|enemy| (enemy.id, from.distance(enemy.position)))
            .filter(|(_, distance)| *distance < RICOCHET_RADIUS)
            .min_by(|left, right| left.1.total_cmp(&right.1).then(left.0.cmp(&right.0)))
            .map(|(id, _)| id)
    }
}
