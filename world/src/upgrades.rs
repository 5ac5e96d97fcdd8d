//! Fixed upgrade trees for each tower archetype.

use road_defence_core::UpgradeArchetype;

/// Change applied to a tower when a tier is purchased.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpgradeEffect {
    /// Adds flat damage.
    AddDamage(f32),
    /// Multiplies the fire rate.
    ScaleFireRate(f32),
    /// Sets the crit chance.
    CritChance(f32),
    /// Sets the number of hits per projectile.
    Pierce(u32),
    /// Lets projectiles bounce once.
    Ricochet,
    /// Sets the bonus damage against enemies on turns.
    TurnBonus(f32),
    /// Resets ramp stacks and sets the ramp gained per hit.
    Ramp(f32),
    /// Sets the bleed damage per second.
    Bleed(f32),
    /// Adds targeting range.
    AddRange(f32),
    /// Sets the headshot chance.
    HeadshotChance(f32),
    /// Sets the speed multiplier applied on hit.
    SlowOnHit(f32),
}

/// Single purchasable step of an upgrade tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpgradeTier {
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Gold required to buy the tier.
    pub cost: u32,
    /// Change applied to the tower.
    pub effect: UpgradeEffect,
}

const PRECISION: [UpgradeTier; 3] = [
    UpgradeTier {
        name: "+Damage",
        description: "+1 damage.",
        cost: 5,
        effect: UpgradeEffect::AddDamage(1.0),
    },
    UpgradeTier {
        name: "+Fire Rate",
        description: "+50% fire rate.",
        cost: 7,
        effect: UpgradeEffect::ScaleFireRate(1.5),
    },
    UpgradeTier {
        name: "Crit Chance",
        description: "Attacks can critically hit for double damage.",
        cost: 9,
        effect: UpgradeEffect::CritChance(0.25),
    },
];

const ANGLE: [UpgradeTier; 3] = [
    UpgradeTier {
        name: "Pierce",
        description: "Projectiles hit 2 enemies.",
        cost: 6,
        effect: UpgradeEffect::Pierce(2),
    },
    UpgradeTier {
        name: "Ricochet",
        description: "Projectiles bounce to a new target once.",
        cost: 8,
        effect: UpgradeEffect::Ricochet,
    },
    UpgradeTier {
        name: "Turn Bonus",
        description: "+1 damage vs enemies on turns.",
        cost: 9,
        effect: UpgradeEffect::TurnBonus(1.0),
    },
];

const SUSTAINED: [UpgradeTier; 3] = [
    UpgradeTier {
        name: "Ramp Damage",
        description: "Each hit increases damage slightly (capped).",
        cost: 6,
        effect: UpgradeEffect::Ramp(0.1),
    },
    UpgradeTier {
        name: "Bleed",
        description: "Hits apply a small extra damage over time.",
        cost: 8,
        effect: UpgradeEffect::Bleed(0.5),
    },
    UpgradeTier {
        name: "Hardened Tips",
        description: "+2 damage.",
        cost: 10,
        effect: UpgradeEffect::AddDamage(2.0),
    },
];

const SNIPER: [UpgradeTier; 3] = [
    UpgradeTier {
        name: "+Range",
        description: "+2 range.",
        cost: 7,
        effect: UpgradeEffect::AddRange(2.0),
    },
    UpgradeTier {
        name: "Headshot",
        description: "Small chance to deal triple damage.",
        cost: 9,
        effect: UpgradeEffect::HeadshotChance(0.15),
    },
    UpgradeTier {
        name: "Slow on Hit",
        description: "Hits slightly slow enemies.",
        cost: 9,
        effect: UpgradeEffect::SlowOnHit(0.8),
    },
];

/// Ordered tiers of the archetype's upgrade tree.
#[must_use]
pub fn upgrade_tree(archetype: UpgradeArchetype) -> &'static [UpgradeTier] {
    match archetype {
        UpgradeArchetype::Precision => &PRECISION,
        UpgradeArchetype::Angle => &ANGLE,
        UpgradeArchetype::Sustained => &SUSTAINED,
        UpgradeArchetype::Sniper => &SNIPER,
    }
}

/// Tier available at `level`, or `None` once the tree is exhausted.
pub(crate) fn tier_at(archetype: UpgradeArchetype, level: u32) -> Option<&'static UpgradeTier> {
    let index = usize::try_from(level).ok()?;
    upgrade_tree(archetype).get(index)
}
