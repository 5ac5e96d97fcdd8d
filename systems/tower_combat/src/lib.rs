#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system deciding which targeted towers launch a projectile this step.

use road_defence_core::{Command, Phase, TowerCooldownView, TowerId, TowerTarget};

/// Firing gate between targeting output and the world's projectile launcher.
#[derive(Debug, Default)]
pub struct TowerCombat {
    ready: Vec<TowerId>,
}

impl TowerCombat {
    /// Creates a combat system with an empty readiness buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `Command::FireProjectile` for every targeted tower whose cooldown elapsed.
    ///
    /// Commands follow the order of `tower_targets`. A tower fires at most
    /// once per call, at its first listed target, and towers absent from the
    /// cooldown view never fire.
    pub fn handle(
        &mut self,
        phase: Phase,
        tower_cooldowns: &TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if phase != Phase::Wave || tower_targets.is_empty() {
            return;
        }

        // The view is sorted by id, so `ready` is too.
        self.ready.clear();
        self.ready.extend(
            tower_cooldowns
                .iter()
                .filter(|snapshot| snapshot.ready_in.is_zero())
                .map(|snapshot| snapshot.tower),
        );

        for target in tower_targets {
            if let Ok(index) = self.ready.binary_search(&target.tower) {
                let _ = self.ready.remove(index);
                out.push(Command::FireProjectile {
                    tower: target.tower,
                    target: target.enemy,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_defence_core::{CellPoint, EnemyId, TowerCooldownSnapshot};
    use std::time::Duration;

    fn cooldowns(entries: &[(u32, u64)]) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            entries
                .iter()
                .map(|&(tower, millis)| TowerCooldownSnapshot {
                    tower: TowerId::new(tower),
                    ready_in: Duration::from_millis(millis),
                })
                .collect(),
        )
    }

    fn aim(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
            tower_position: CellPoint::new(0.0, 0.0),
            enemy_position: CellPoint::new(1.0, 0.0),
        }
    }

    fn fire(tower: u32, enemy: u32) -> Command {
        Command::FireProjectile {
            tower: TowerId::new(tower),
            target: EnemyId::new(enemy),
        }
    }

    #[test]
    fn ready_towers_fire_in_target_order() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();

        combat.handle(
            Phase::Wave,
            &cooldowns(&[(2, 0), (6, 0)]),
            &[aim(6, 1), aim(2, 4)],
            &mut out,
        );

        assert_eq!(out, vec![fire(6, 1), fire(2, 4)]);
    }

    #[test]
    fn cooling_and_unknown_towers_hold_fire() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();

        combat.handle(
            Phase::Wave,
            &cooldowns(&[(1, 400), (4, 0)]),
            &[aim(1, 3), aim(4, 3), aim(9, 3)],
            &mut out,
        );

        assert_eq!(out, vec![fire(4, 3)]);
    }

    #[test]
    fn a_tower_fires_once_per_step() {
        let mut combat = TowerCombat::new();
        let mut out = Vec::new();

        combat.handle(
            Phase::Wave,
            &cooldowns(&[(3, 0)]),
            &[aim(3, 7), aim(3, 8)],
            &mut out,
        );

        assert_eq!(out, vec![fire(3, 7)]);
    }

    #[test]
    fn outside_waves_nothing_fires() {
        let mut combat = TowerCombat::new();
        let ready = cooldowns(&[(1, 0)]);

        for phase in [Phase::Card, Phase::Build, Phase::End] {
            let mut out = Vec::new();
            combat.handle(phase, &ready, &[aim(1, 1)], &mut out);
            assert!(out.is_empty(), "{phase:?} must not fire");
        }
    }

    #[test]
    fn queued_commands_stay_in_front() {
        let mut combat = TowerCombat::new();
        let mut out = vec![Command::StartWave];

        combat.handle(Phase::Wave, &cooldowns(&[(1, 0)]), &[aim(1, 2)], &mut out);

        assert_eq!(out, vec![Command::StartWave, fire(1, 2)]);
    }
}
