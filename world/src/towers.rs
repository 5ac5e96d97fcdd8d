//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use road_defence_core::{
    CellCoord, CellPoint, Direction, Event, Phase, PurchaseError, RoadShape, TileKind, TowerId,
    TowerKind, TowerModifiers, TowerSnapshot, UpgradeArchetype,
};
use tracing::debug;

use crate::{
    grid::Grid,
    upgrades::{self, UpgradeEffect},
    World,
};

/// Tower stored inside the world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tower {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
    pub(crate) archetype: UpgradeArchetype,
    pub(crate) upgrade_level: u32,
    pub(crate) damage: f32,
    pub(crate) fire_rate: f32,
    pub(crate) range: f32,
    pub(crate) cooldown: Duration,
    pub(crate) modifiers: TowerModifiers,
}

impl Tower {
    fn new(id: TowerId, kind: TowerKind, cell: CellCoord, archetype: UpgradeArchetype) -> Self {
        Self {
            id,
            kind,
            cell,
            archetype,
            upgrade_level: 0,
            damage: kind.base_damage(),
            fire_rate: kind.base_fire_rate(),
            range: kind.base_range(),
            cooldown: Duration::ZERO,
            modifiers: TowerModifiers::default(),
        }
    }

    pub(crate) fn position(&self) -> CellPoint {
        self.cell.to_point()
    }

    /// Time between shots at the current fire rate.
    pub(crate) fn fire_interval(&self) -> Duration {
        Duration::try_from_secs_f32(1.0 / self.fire_rate).unwrap_or(Duration::MAX)
    }

    pub(crate) fn apply_upgrade(&mut self, effect: UpgradeEffect) {
        match effect {
            UpgradeEffect::AddDamage(amount) => self.damage += amount,
            UpgradeEffect::ScaleFireRate(factor) => self.fire_rate *= factor,
            UpgradeEffect::CritChance(chance) => self.modifiers.crit_chance = chance,
            UpgradeEffect::Pierce(hits) => self.modifiers.pierce = hits,
            UpgradeEffect::Ricochet => self.modifiers.ricochet = true,
            UpgradeEffect::TurnBonus(amount) => self.modifiers.turn_bonus_damage = amount,
            UpgradeEffect::Ramp(per_hit) => {
                self.modifiers.ramp_stacks = 0.0;
                self.modifiers.ramp_per_hit = per_hit;
            }
            UpgradeEffect::Bleed(per_second) => self.modifiers.bleed_damage = per_second,
            UpgradeEffect::AddRange(amount) => self.range += amount,
            UpgradeEffect::HeadshotChance(chance) => self.modifiers.headshot_chance = chance,
            UpgradeEffect::SlowOnHit(multiplier) => self.modifiers.slow_on_hit = multiplier,
        }
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            archetype: self.archetype,
            upgrade_level: self.upgrade_level,
            damage: self.damage,
            fire_rate: self.fire_rate,
            range: self.range,
            cooldown: self.cooldown,
            modifiers: self.modifiers,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        archetype: UpgradeArchetype,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, Tower::new(id, kind, cell, archetype));
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn at(&self, cell: CellCoord) -> Option<&Tower> {
        self.entries.values().find(|tower| tower.cell == cell)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Upgrade tree unlocked by the terrain under and around `cell`.
///
/// A hill underneath wins; otherwise the most aggressive adjacent road shape
/// decides, long turns ahead of small turns ahead of straights.
pub(crate) fn archetype_for(grid: &Grid, cell: CellCoord) -> UpgradeArchetype {
    if grid.tile(cell).map(|tile| tile.kind()) == Some(TileKind::Hill) {
        return UpgradeArchetype::Sniper;
    }

    let shapes: Vec<RoadShape> = Direction::ALL
        .into_iter()
        .filter_map(|direction| grid.neighbor(cell, direction))
        .filter_map(|next| grid.tile(next).and_then(|tile| tile.road_shape()))
        .collect();

    if shapes.contains(&RoadShape::TurnLong) {
        UpgradeArchetype::Sustained
    } else if shapes.contains(&RoadShape::TurnSmall) {
        UpgradeArchetype::Angle
    } else {
        UpgradeArchetype::Precision
    }
}

impl World {
    /// Buys the next tier of the tower's upgrade tree.
    ///
    /// Tiers are bought strictly in order; gold is only spent when the tier
    /// exists and is affordable.
    pub fn purchase_upgrade(
        &mut self,
        tower: TowerId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PurchaseError> {
        if self.phase == Phase::End {
            return Err(PurchaseError::SessionOver);
        }
        let Some(entry) = self.towers.get_mut(tower) else {
            return Err(PurchaseError::UnknownTower);
        };
        let tier = upgrades::tier_at(entry.archetype, entry.upgrade_level)
            .ok_or(PurchaseError::NoUpgradesRemaining)?;
        if !self.ledger.spend(tier.cost) {
            return Err(PurchaseError::InsufficientGold);
        }

        entry.apply_upgrade(tier.effect);
        entry.upgrade_level += 1;
        debug!(
            tower = tower.get(),
            level = entry.upgrade_level,
            upgrade = tier.name,
            "upgrade purchased"
        );
        out_events.push(Event::UpgradePurchased {
            tower,
            level: entry.upgrade_level,
            cost: tier.cost,
        });
        Ok(())
    }
}
