#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Road Defence.
//!
//! The [`World`] owns the grid, the committed path, enemies, towers,
//! projectiles, the gold ledger and the session phase. Adapters and systems
//! mutate it exclusively through [`apply`] and observe it through [`query`].

use std::time::Duration;

use road_defence_core::{
    Card, CardError, CellCoord, Command, ConfigError, EnemyId, Event, GameConfig, Phase,
    Placement, PlacementError, ProjectileId, RandomSource, RoadShape, SessionOutcome,
    SessionSummary, TerrainKind, Tile, TileKind, TowerKind, UpgradeArchetype,
};
use tracing::{debug, info};

mod cards;
mod combat;
mod grid;
mod ledger;
mod random;
mod road;
mod towers;
mod upgrades;
mod waves;

pub use grid::{Endpoints, Grid};
pub use random::SeededRandom;
pub use road::can_place_road;
pub use upgrades::{upgrade_tree, UpgradeEffect, UpgradeTier};

use cards::CardState;
use combat::Projectile;
use ledger::Ledger;
use road::RoadResolution;
use towers::TowerRegistry;
use waves::{Enemy, WaveState};

/// Represents the authoritative Road Defence world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    grid: Grid,
    endpoints: Endpoints,
    path: Vec<CellCoord>,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    ledger: Ledger,
    base_hp: u32,
    current_wave: u32,
    phase: Phase,
    wave: WaveState,
    cards: CardState,
    random: Box<dyn RandomSource>,
    next_enemy_id: EnemyId,
    next_projectile_id: ProjectileId,
    outcome: Option<SessionSummary>,
}

/// Validated change produced by [`plan_placement`], ready to be committed.
#[derive(Debug)]
enum PlacementPlan {
    Road {
        shape: RoadShape,
        resolution: RoadResolution,
    },
    Tower {
        kind: TowerKind,
        archetype: UpgradeArchetype,
    },
    Terrain(TerrainKind),
}

impl World {
    /// Creates a world seeded from the configuration's random seed.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let random = SeededRandom::new(config.rng_seed);
        Self::with_random(config, Box::new(random))
    }

    /// Creates a world drawing every random decision from `random`.
    ///
    /// The session opens in the card phase with a fresh draw available.
    pub fn with_random(
        config: GameConfig,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let endpoints = Endpoints {
            spawn: config.spawn(),
            exit: config.exit(),
        };
        let mut world = Self {
            grid: Grid::new(config.columns, config.rows),
            endpoints,
            path: Vec::new(),
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            ledger: Ledger::new(config.starting_gold),
            base_hp: config.base_hp,
            current_wave: 1,
            phase: Phase::Card,
            wave: WaveState::default(),
            cards: CardState::default(),
            random,
            next_enemy_id: EnemyId::new(0),
            next_projectile_id: ProjectileId::new(0),
            outcome: None,
            config,
        };
        let count = world.config.card_choices;
        let _ = world.cards.draw(world.random.as_mut(), count);
        Ok(world)
    }

    /// Validates and commits a placement without consulting the card state.
    ///
    /// Nothing is mutated when the placement is rejected.
    pub fn place(
        &mut self,
        cell: CellCoord,
        placement: Placement,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        match plan_placement(self, cell, placement)? {
            PlacementPlan::Road { shape, resolution } => {
                self.grid = resolution.grid;
                self.path = resolution.path;
                debug!(?cell, ?shape, path_length = self.path.len(), "road placed");
                out_events.push(Event::RoadPlaced {
                    cell,
                    shape,
                    path_length: self.path.len(),
                });
            }
            PlacementPlan::Tower { kind, archetype } => {
                if !self.ledger.spend(kind.cost()) {
                    return Err(PlacementError::InsufficientGold);
                }
                let tower = self.towers.insert(kind, cell, archetype);
                debug!(tower = tower.get(), ?cell, ?archetype, "tower placed");
                out_events.push(Event::TowerPlaced {
                    tower,
                    cell,
                    archetype,
                });
            }
            PlacementPlan::Terrain(terrain) => {
                let tile = match terrain {
                    TerrainKind::Hill => Tile::HILL,
                };
                self.grid.set(cell, tile);
                debug!(?cell, ?terrain, "terrain placed");
                out_events.push(Event::TerrainPlaced { cell, terrain });
            }
        }
        Ok(())
    }

    /// Makes the offered card at `index` pending and enters the build phase.
    pub fn choose_card(
        &mut self,
        index: usize,
        out_events: &mut Vec<Event>,
    ) -> Result<(), CardError> {
        if self.phase != Phase::Card {
            return Err(CardError::InvalidPhase);
        }
        let card = self.cards.choose(index)?;
        self.enter_phase(Phase::Build, out_events);
        out_events.push(Event::CardChosen {
            card,
            placement: card.placement(),
        });
        Ok(())
    }

    fn play_pending_card(
        &mut self,
        cell: CellCoord,
        placement: Placement,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        if self.phase != Phase::Build {
            return Err(PlacementError::InvalidPhase);
        }
        let pending = self.cards.pending().map(Card::placement);
        if pending != Some(placement) {
            return Err(PlacementError::CardMismatch);
        }
        self.place(cell, placement, out_events)?;
        self.cards.consume_pending();
        if self.wave.active {
            self.enter_phase(Phase::Wave, out_events);
        } else {
            self.offer_cards(out_events);
        }
        Ok(())
    }

    /// Draws a fresh set of cards and enters the card phase.
    pub(crate) fn offer_cards(&mut self, out_events: &mut Vec<Event>) {
        let count = self.config.card_choices;
        let choices = self.cards.draw(self.random.as_mut(), count).to_vec();
        self.enter_phase(Phase::Card, out_events);
        out_events.push(Event::CardChoicesOffered { choices });
    }

    pub(crate) fn enter_phase(&mut self, phase: Phase, out_events: &mut Vec<Event>) {
        if self.phase != phase {
            self.phase = phase;
            out_events.push(Event::PhaseChanged { phase });
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.phase == Phase::End {
            return;
        }
        out_events.push(Event::TimeAdvanced { dt });
        self.step_wave(dt, out_events);
        for tower in self.towers.iter_mut() {
            tower.cooldown = tower.cooldown.saturating_sub(dt);
        }
    }

    fn end_session(&mut self, outcome: SessionOutcome, out_events: &mut Vec<Event>) {
        if self.phase == Phase::End {
            return;
        }
        let summary = SessionSummary {
            outcome,
            wave_reached: self.current_wave.saturating_sub(1),
            towers: u32::try_from(self.towers.len()).unwrap_or(u32::MAX),
            gold: self.ledger.gold(),
        };
        self.outcome = Some(summary);
        self.cards.clear();
        self.enter_phase(Phase::End, out_events);
        info!(?summary, "session ended");
        out_events.push(Event::SessionEnded { summary });
    }
}

/// Validates a placement against the current state without mutating it.
fn plan_placement(
    world: &World,
    cell: CellCoord,
    placement: Placement,
) -> Result<PlacementPlan, PlacementError> {
    let tile = world.grid.tile(cell).ok_or(PlacementError::OutOfBounds)?;
    if world.endpoints.contains(cell) {
        return Err(PlacementError::Reserved);
    }
    if world.towers.at(cell).is_some() {
        return Err(PlacementError::Occupied);
    }
    let on_road = matches!(tile.kind(), TileKind::Road(_));

    match placement {
        Placement::Road(shape) => {
            let resolution = road::evaluate_road(&world.grid, world.endpoints, cell, shape)?;
            Ok(PlacementPlan::Road { shape, resolution })
        }
        Placement::Tower(kind) => {
            if on_road {
                return Err(PlacementError::OnRoad);
            }
            if !world.ledger.can_afford(kind.cost()) {
                return Err(PlacementError::InsufficientGold);
            }
            Ok(PlacementPlan::Tower {
                kind,
                archetype: towers::archetype_for(&world.grid, cell),
            })
        }
        Placement::Terrain(terrain) => {
            if on_road {
                return Err(PlacementError::OnRoad);
            }
            Ok(PlacementPlan::Terrain(terrain))
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected requests leave the world untouched and are reported as events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::Place { cell, placement } => {
            if let Err(reason) = world.play_pending_card(cell, placement, out_events) {
                debug!(?cell, ?placement, %reason, "placement rejected");
                out_events.push(Event::PlacementRejected {
                    cell,
                    placement,
                    reason,
                });
            }
        }
        Command::ChooseCard { index } => {
            if let Err(reason) = world.choose_card(index, out_events) {
                debug!(index, %reason, "card rejected");
                out_events.push(Event::CardRejected { index, reason });
            }
        }
        Command::StartWave => {
            if let Err(reason) = world.start_next_wave(out_events) {
                debug!(%reason, "wave rejected");
                out_events.push(Event::WaveRejected { reason });
            }
        }
        Command::PurchaseUpgrade { tower } => {
            if let Err(reason) = world.purchase_upgrade(tower, out_events) {
                debug!(tower = tower.get(), %reason, "upgrade rejected");
                out_events.push(Event::UpgradeRejected { tower, reason });
            }
        }
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::ResolveProjectiles { dt } => world.resolve_projectiles(dt, out_events),
        Command::EndSession { outcome } => world.end_session(outcome, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use road_defence_core::{
        Card, CellCoord, EnemyView, GameConfig, Phase, Placement, PlacementError,
        ProjectileSnapshot, RoadShape, SessionSummary, TowerCooldownSnapshot, TowerCooldownView,
        TowerId, TowerView, UpgradeArchetype,
    };

    use super::{
        plan_placement, towers, upgrades, Endpoints, Grid, PlacementPlan, UpgradeTier, World,
    };

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Provides read-only access to the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Spawn and exit cells of the session.
    #[must_use]
    pub fn endpoints(world: &World) -> Endpoints {
        world.endpoints
    }

    /// Committed spawn to exit walk; empty while the endpoints are not joined.
    #[must_use]
    pub fn path(world: &World) -> &[CellCoord] {
        &world.path
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures the remaining cooldown of every tower.
    #[must_use]
    pub fn tower_cooldowns(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| TowerCooldownSnapshot {
                    tower: tower.id,
                    ready_in: tower.cooldown,
                })
                .collect(),
        )
    }

    /// Snapshots of the projectiles in flight, in launch order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Gold currently held.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.ledger.gold()
    }

    /// Escapes the base can still absorb.
    #[must_use]
    pub fn base_hp(world: &World) -> u32 {
        world.base_hp
    }

    /// One-based number of the wave that is running or will start next.
    #[must_use]
    pub fn current_wave(world: &World) -> u32 {
        world.current_wave
    }

    /// Phase the session is in.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Reports whether a wave is spawning or has enemies left.
    #[must_use]
    pub fn wave_active(world: &World) -> bool {
        world.wave.active
    }

    /// Cards currently offered.
    #[must_use]
    pub fn card_choices(world: &World) -> &[Card] {
        world.cards.choices()
    }

    /// Placement granted by the chosen card, if one awaits a cell.
    #[must_use]
    pub fn pending_placement(world: &World) -> Option<Placement> {
        world.cards.pending().map(Card::placement)
    }

    /// Tower standing on the cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.towers.at(cell).map(|tower| tower.id)
    }

    /// Tier the tower would buy next, or `None` when unknown or fully upgraded.
    #[must_use]
    pub fn next_upgrade(world: &World, tower: TowerId) -> Option<&'static UpgradeTier> {
        let entry = world.towers.get(tower)?;
        upgrades::tier_at(entry.archetype, entry.upgrade_level)
    }

    /// Upgrade tree the tower would unlock if placed on `cell` now.
    #[must_use]
    pub fn archetype_preview(world: &World, cell: CellCoord) -> UpgradeArchetype {
        towers::archetype_for(&world.grid, cell)
    }

    /// Checks a placement without touching the world.
    pub fn can_place(
        world: &World,
        cell: CellCoord,
        placement: Placement,
    ) -> Result<(), PlacementError> {
        plan_placement(world, cell, placement).map(|_| ())
    }

    /// Path a road of `shape` on `cell` would commit, empty while the endpoints stay apart.
    pub fn road_preview(
        world: &World,
        cell: CellCoord,
        shape: RoadShape,
    ) -> Result<Vec<CellCoord>, PlacementError> {
        match plan_placement(world, cell, Placement::Road(shape))? {
            PlacementPlan::Road { resolution, .. } => Ok(resolution.path),
            PlacementPlan::Tower { .. } | PlacementPlan::Terrain(_) => Ok(Vec::new()),
        }
    }

    /// Final report once the session has ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<SessionSummary> {
        world.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_defence_core::{CellPoint, HitMultiplier, PurchaseError, TowerId, WaveError};

    #[derive(Debug)]
    struct Fixed(f32);

    impl RandomSource for Fixed {
        fn next_unit(&mut self) -> f32 {
            self.0
        }
    }

    fn world_with(config: GameConfig) -> World {
        World::with_random(config, Box::new(Fixed(0.99))).expect("valid config")
    }

    fn straight_path_world(config: GameConfig) -> World {
        let mut world = world_with(config);
        let mut events = Vec::new();
        let row = world.endpoints.spawn.row();
        for column in 1..world.config.columns - 1 {
            world
                .place(
                    CellCoord::new(column, row),
                    Placement::Road(RoadShape::Straight),
                    &mut events,
                )
                .expect("straight road");
        }
        world
    }

    fn insert_enemy(world: &mut World, cell: CellCoord, hp: u32) -> EnemyId {
        let id = world.next_enemy_id;
        world.next_enemy_id = EnemyId::new(id.get() + 1);
        let mut enemy = Enemy::spawn(id, hp, &world.path);
        enemy.position = cell.to_point();
        world.enemies.push(enemy);
        id
    }

    #[test]
    fn new_session_opens_with_card_offer() {
        let world = world_with(GameConfig::default());
        assert_eq!(query::phase(&world), Phase::Card);
        assert_eq!(query::card_choices(&world), &[Card::Hill; 3]);
        assert_eq!(query::gold(&world), 10);
        assert_eq!(query::current_wave(&world), 1);
        assert!(query::path(&world).is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            columns: 2,
            ..GameConfig::default()
        };
        assert!(matches!(
            World::new(config),
            Err(ConfigError::GridTooSmall { columns: 2, .. })
        ));
    }

    #[test]
    fn tower_placement_needs_enough_gold() {
        let mut world = world_with(GameConfig {
            starting_gold: 4,
            ..GameConfig::default()
        });
        let mut events = Vec::new();

        let result = world.place(
            CellCoord::new(1, 1),
            Placement::Tower(TowerKind::Arrow),
            &mut events,
        );

        assert_eq!(result, Err(PlacementError::InsufficientGold));
        assert_eq!(query::gold(&world), 4);
        assert!(query::tower_view(&world).into_vec().is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn tower_placement_spends_gold_and_picks_archetype() {
        let mut world = straight_path_world(GameConfig::default());
        let mut events = Vec::new();

        world
            .place(
                CellCoord::new(2, 1),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower beside the road");

        assert_eq!(query::gold(&world), 5);
        assert_eq!(
            events,
            vec![Event::TowerPlaced {
                tower: TowerId::new(0),
                cell: CellCoord::new(2, 1),
                archetype: UpgradeArchetype::Precision,
            }]
        );
        assert_eq!(
            query::tower_at(&world, CellCoord::new(2, 1)),
            Some(TowerId::new(0))
        );
    }

    #[test]
    fn rejected_placements_leave_world_untouched() {
        let mut world = straight_path_world(GameConfig::default());
        let grid_before = world.grid.clone();
        let path_before = world.path.clone();
        let mut events = Vec::new();

        let tower = Placement::Tower(TowerKind::Arrow);
        let hill = Placement::Terrain(TerrainKind::Hill);
        let straight = Placement::Road(RoadShape::Straight);
        let attempts = [
            (CellCoord::new(2, 2), tower, PlacementError::OnRoad),
            (CellCoord::new(2, 2), hill, PlacementError::OnRoad),
            (CellCoord::new(0, 2), hill, PlacementError::Reserved),
            (CellCoord::new(9, 9), straight, PlacementError::OutOfBounds),
            (CellCoord::new(2, 1), straight, PlacementError::OrientationMismatch),
        ];
        for (cell, placement, expected) in attempts {
            assert_eq!(query::can_place(&world, cell, placement), Err(expected));
            assert_eq!(
                world.place(cell, placement, &mut events),
                Err(expected),
                "{placement:?} at {cell:?}"
            );
        }

        assert_eq!(world.grid, grid_before);
        assert_eq!(world.path, path_before);
        assert_eq!(query::gold(&world), 10);
        assert!(events.is_empty());
    }

    #[test]
    fn towers_block_every_placement() {
        let mut world = world_with(GameConfig::default());
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 0);
        world
            .place(cell, Placement::Tower(TowerKind::Arrow), &mut events)
            .expect("tower");

        for placement in [
            Placement::Tower(TowerKind::Arrow),
            Placement::Road(RoadShape::Straight),
            Placement::Terrain(TerrainKind::Hill),
        ] {
            assert_eq!(
                query::can_place(&world, cell, placement),
                Err(PlacementError::Occupied)
            );
        }
    }

    #[test]
    fn card_flow_gates_placements() {
        let mut world = world_with(GameConfig::default());
        let mut events = Vec::new();
        let cell = CellCoord::new(1, 0);

        apply(
            &mut world,
            Command::Place {
                cell,
                placement: Placement::Terrain(TerrainKind::Hill),
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::PlacementRejected {
                reason: PlacementError::InvalidPhase,
                ..
            }]
        ));

        events.clear();
        apply(&mut world, Command::ChooseCard { index: 5 }, &mut events);
        assert_eq!(
            events,
            vec![Event::CardRejected {
                index: 5,
                reason: CardError::OutOfRange,
            }]
        );

        events.clear();
        apply(&mut world, Command::ChooseCard { index: 0 }, &mut events);
        assert_eq!(query::phase(&world), Phase::Build);
        assert_eq!(
            query::pending_placement(&world),
            Some(Placement::Terrain(TerrainKind::Hill))
        );

        events.clear();
        apply(
            &mut world,
            Command::Place {
                cell,
                placement: Placement::Tower(TowerKind::Arrow),
            },
            &mut events,
        );
        assert!(matches!(
            events.as_slice(),
            [Event::PlacementRejected {
                reason: PlacementError::CardMismatch,
                ..
            }]
        ));

        events.clear();
        apply(
            &mut world,
            Command::Place {
                cell,
                placement: Placement::Terrain(TerrainKind::Hill),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::TerrainPlaced {
                    cell,
                    terrain: TerrainKind::Hill,
                },
                Event::PhaseChanged { phase: Phase::Card },
                Event::CardChoicesOffered {
                    choices: vec![Card::Hill; 3],
                },
            ]
        );
        assert_eq!(query::pending_placement(&world), None);
        assert_eq!(world.grid.tile(cell), Some(&Tile::HILL));
    }

    #[test]
    fn wave_needs_a_complete_path() {
        let mut world = world_with(GameConfig::default());
        let mut events = Vec::new();
        assert_eq!(
            world.start_next_wave(&mut events),
            Err(WaveError::PathIncomplete)
        );

        let mut world = straight_path_world(GameConfig::default());
        world.start_next_wave(&mut events).expect("first wave");
        assert_eq!(query::phase(&world), Phase::Wave);
        assert!(query::card_choices(&world).is_empty());
        assert_eq!(
            world.start_next_wave(&mut events),
            Err(WaveError::WaveActive)
        );
    }

    #[test]
    fn escapes_cost_base_hp_and_waves_complete() {
        let mut world = straight_path_world(GameConfig {
            base_hp: 3,
            ..GameConfig::default()
        });
        let mut events = Vec::new();
        world.start_next_wave(&mut events).expect("first wave");

        for _ in 0..200 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(50),
                },
                &mut events,
            );
        }

        let escapes = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyEscaped { .. }))
            .count();
        assert_eq!(escapes, 5);
        assert_eq!(query::base_hp(&world), 0, "base hp saturates at zero");
        assert!(events.contains(&Event::WaveCompleted { wave: 1 }));
        assert!(!query::wave_active(&world));
        assert_eq!(query::current_wave(&world), 2);
        assert_eq!(query::phase(&world), Phase::Card);
        assert_eq!(query::gold(&world), 10, "escapes grant no reward");
    }

    #[test]
    fn fire_rate_limits_shots() {
        let mut world = straight_path_world(GameConfig::default());
        let mut events = Vec::new();
        world
            .place(
                CellCoord::new(2, 1),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower");
        let tower = TowerId::new(0);
        let enemy = insert_enemy(&mut world, CellCoord::new(2, 2), 1_000);
        events.clear();

        let mut fired_at = Vec::new();
        for step in 0..60 {
            apply(
                &mut world,
                Command::FireProjectile {
                    tower,
                    target: enemy,
                },
                &mut events,
            );
            if events
                .drain(..)
                .any(|event| matches!(event, Event::ProjectileFired { .. }))
            {
                fired_at.push(step);
            }
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(50),
                },
                &mut events,
            );
            events.clear();
        }

        assert_eq!(fired_at, vec![0, 20, 40]);
    }

    #[test]
    fn projectiles_hit_and_kill() {
        let mut world = straight_path_world(GameConfig::default());
        let mut events = Vec::new();
        world
            .place(
                CellCoord::new(2, 1),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower");
        let enemy = insert_enemy(&mut world, CellCoord::new(2, 3), 1);
        events.clear();

        apply(
            &mut world,
            Command::FireProjectile {
                tower: TowerId::new(0),
                target: enemy,
            },
            &mut events,
        );
        for _ in 0..10 {
            apply(
                &mut world,
                Command::ResolveProjectiles {
                    dt: Duration::from_millis(100),
                },
                &mut events,
            );
        }

        assert!(events.contains(&Event::ProjectileHit {
            projectile: ProjectileId::new(0),
            enemy,
            damage: 1.0,
            multiplier: HitMultiplier::Normal,
        }));
        assert!(events.contains(&Event::EnemyKilled { enemy, reward: 1 }));
        assert_eq!(query::gold(&world), 6);
        assert!(query::enemy_view(&world).into_vec().is_empty());
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn out_of_range_targets_are_ignored() {
        let mut world = straight_path_world(GameConfig::default());
        let mut events = Vec::new();
        world
            .place(
                CellCoord::new(0, 0),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower");
        let enemy = insert_enemy(&mut world, CellCoord::new(4, 4), 5);
        events.clear();

        apply(
            &mut world,
            Command::FireProjectile {
                tower: TowerId::new(0),
                target: enemy,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn ricochet_bounces_once_within_radius() {
        let mut world = straight_path_world(GameConfig::default());
        let mut events = Vec::new();
        world
            .place(
                CellCoord::new(2, 1),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower");
        let tower = TowerId::new(0);
        world
            .towers
            .get_mut(tower)
            .expect("tower")
            .modifiers
            .ricochet = true;
        let first = insert_enemy(&mut world, CellCoord::new(2, 2), 10);
        let near = insert_enemy(&mut world, CellCoord::new(4, 2), 10);
        let _far = insert_enemy(&mut world, CellCoord::new(2, 0), 10);
        let _beyond = insert_enemy(&mut world, CellCoord::new(2, 4), 10);
        world.enemies[2].position = CellPoint::new(5.5, 2.0);
        world.enemies[3].position = CellPoint::new(2.0, 5.0);
        events.clear();

        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                target: first,
            },
            &mut events,
        );
        for _ in 0..20 {
            apply(
                &mut world,
                Command::ResolveProjectiles {
                    dt: Duration::from_millis(100),
                },
                &mut events,
            );
        }

        let struck: Vec<EnemyId> = events
            .iter()
            .filter_map(|event| match event {
                Event::ProjectileHit { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .collect();
        assert_eq!(struck, vec![first, near]);
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn upgrades_follow_the_tree() {
        let mut world = straight_path_world(GameConfig {
            starting_gold: 12,
            ..GameConfig::default()
        });
        let mut events = Vec::new();
        world
            .place(
                CellCoord::new(2, 1),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower");
        let tower = TowerId::new(0);

        assert_eq!(
            query::next_upgrade(&world, tower).map(|tier| tier.name),
            Some("+Damage")
        );
        world.purchase_upgrade(tower, &mut events).expect("first tier");
        assert_eq!(query::gold(&world), 2);
        assert_eq!(query::tower_view(&world).into_vec()[0].damage, 2.0);

        assert_eq!(
            world.purchase_upgrade(tower, &mut events),
            Err(PurchaseError::InsufficientGold)
        );
        assert_eq!(query::gold(&world), 2);
        assert_eq!(
            world.purchase_upgrade(TowerId::new(9), &mut events),
            Err(PurchaseError::UnknownTower)
        );
    }

    #[test]
    fn session_end_freezes_the_world() {
        let mut world = straight_path_world(GameConfig::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::EndSession {
                outcome: SessionOutcome::Defeat,
            },
            &mut events,
        );
        let summary = query::outcome(&world).expect("summary");
        assert_eq!(summary.outcome, SessionOutcome::Defeat);
        assert_eq!(summary.wave_reached, 0);
        assert_eq!(query::phase(&world), Phase::End);

        events.clear();
        apply(&mut world, Command::StartWave, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::EndSession {
                outcome: SessionOutcome::Victory,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::WaveRejected {
                reason: WaveError::SessionOver,
            }]
        );
        assert_eq!(
            query::outcome(&world).map(|summary| summary.outcome),
            Some(SessionOutcome::Defeat)
        );
    }

    fn winding_path_world(config: GameConfig) -> World {
        let mut world = world_with(config);
        let mut events = Vec::new();
        let layout = [
            (1, 2, RoadShape::TurnSmall),
            (1, 1, RoadShape::TurnSmall),
            (2, 1, RoadShape::Straight),
            (3, 1, RoadShape::TurnLong),
            (3, 2, RoadShape::TurnLong),
        ];
        for (column, row, shape) in layout {
            world
                .place(CellCoord::new(column, row), Placement::Road(shape), &mut events)
                .expect("winding road");
        }
        world
    }

    fn volley(world: &mut World, tower: TowerId, target: EnemyId) -> Vec<Event> {
        let mut events = Vec::new();
        world.towers.get_mut(tower).expect("tower").cooldown = Duration::ZERO;
        apply(world, Command::FireProjectile { tower, target }, &mut events);
        for _ in 0..10 {
            apply(
                world,
                Command::ResolveProjectiles {
                    dt: Duration::from_millis(100),
                },
                &mut events,
            );
        }
        events
    }

    fn hit_damage(events: &[Event]) -> Vec<f32> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::ProjectileHit { damage, .. } => Some(*damage),
                _ => None,
            })
            .collect()
    }

    fn live_enemy(world: &World, id: EnemyId) -> &Enemy {
        world
            .enemies
            .iter()
            .find(|enemy| enemy.id == id)
            .expect("enemy alive")
    }

    #[test]
    fn turn_bonus_applies_only_on_turn_cells() {
        let mut world = winding_path_world(GameConfig::default());
        let mut events = Vec::new();
        world
            .place(
                CellCoord::new(2, 2),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower inside the bend");
        let tower = TowerId::new(0);
        world
            .towers
            .get_mut(tower)
            .expect("tower")
            .modifiers
            .turn_bonus_damage = 1.0;

        let cornered = insert_enemy(&mut world, CellCoord::new(1, 1), 10);
        world.enemies[0].path_index = 2;
        world.enemies[0].t = 0.0;
        let straight = insert_enemy(&mut world, CellCoord::new(2, 1), 10);
        world.enemies[1].path_index = 3;
        world.enemies[1].t = 0.0;

        assert_eq!(hit_damage(&volley(&mut world, tower, cornered)), vec![2.0]);
        assert_eq!(hit_damage(&volley(&mut world, tower, straight)), vec![1.0]);
    }

    #[test]
    fn pierce_slow_bleed_and_ramp_stack_on_hit() {
        let mut world = straight_path_world(GameConfig::default());
        let mut events = Vec::new();
        world
            .place(
                CellCoord::new(2, 1),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower");
        let tower = TowerId::new(0);
        {
            let modifiers = &mut world.towers.get_mut(tower).expect("tower").modifiers;
            modifiers.slow_on_hit = 0.8;
            modifiers.bleed_damage = 0.5;
            modifiers.ramp_per_hit = 2.0;
            modifiers.pierce = 2;
        }
        let target = insert_enemy(&mut world, CellCoord::new(2, 2), 100);
        world.enemies[0].speed_multiplier = 0.5;

        let first = volley(&mut world, tower, target);
        assert_eq!(hit_damage(&first), vec![1.0, 1.0], "pierce hits the same enemy twice");
        assert!(query::projectiles(&world).is_empty());
        let struck = live_enemy(&world, target);
        assert_eq!(struck.speed_multiplier, 0.5, "a weaker slow never replaces a stronger one");
        assert_eq!(struck.bleed_dps, 1.0);
        assert_eq!(struck.bleed_remaining, Duration::from_millis(2_500));
        assert_eq!(
            world.towers.get(tower).expect("tower").modifiers.ramp_stacks,
            3.0,
            "ramp is capped"
        );

        let second = volley(&mut world, tower, target);
        assert_eq!(hit_damage(&second), vec![4.0, 4.0], "launch damage includes ramp stacks");
        assert_eq!(
            world.towers.get(tower).expect("tower").modifiers.ramp_stacks,
            3.0
        );

        world.enemies[0].speed_multiplier = 1.0;
        let _ = volley(&mut world, tower, target);
        assert_eq!(live_enemy(&world, target).speed_multiplier, 0.8);
    }

    #[test]
    fn ricochet_without_neighbours_is_spent() {
        let mut world = straight_path_world(GameConfig::default());
        let mut events = Vec::new();
        world
            .place(
                CellCoord::new(2, 1),
                Placement::Tower(TowerKind::Arrow),
                &mut events,
            )
            .expect("tower");
        let tower = TowerId::new(0);
        world
            .towers
            .get_mut(tower)
            .expect("tower")
            .modifiers
            .ricochet = true;
        let target = insert_enemy(&mut world, CellCoord::new(2, 2), 10);
        let _edge = insert_enemy(&mut world, CellCoord::new(2, 4), 10);
        world.enemies[1].position = CellPoint::new(2.0, 5.0);

        let events = volley(&mut world, tower, target);

        let struck: Vec<EnemyId> = events
            .iter()
            .filter_map(|event| match event {
                Event::ProjectileHit { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .collect();
        assert_eq!(struck, vec![target], "an enemy exactly three cells away is out of reach");
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn road_preview_reports_the_prospective_path() {
        let mut world = world_with(GameConfig::default());
        let mut events = Vec::new();
        for column in [1, 2] {
            world
                .place(
                    CellCoord::new(column, 2),
                    Placement::Road(RoadShape::Straight),
                    &mut events,
                )
                .expect("straight road");
        }

        assert_eq!(
            query::road_preview(&world, CellCoord::new(2, 1), RoadShape::Straight),
            Err(PlacementError::OrientationMismatch)
        );
        assert_eq!(
            query::road_preview(&world, CellCoord::new(3, 2), RoadShape::Straight)
                .map(|path| path.len()),
            Ok(5)
        );
        assert!(query::path(&world).is_empty(), "previews never commit");
    }

    #[test]
    fn archetype_preview_matches_the_placed_tower() {
        let mut world = winding_path_world(GameConfig {
            starting_gold: 20,
            ..GameConfig::default()
        });
        let mut events = Vec::new();
        let hill = CellCoord::new(0, 0);
        world
            .place(hill, Placement::Terrain(TerrainKind::Hill), &mut events)
            .expect("hill");

        for cell in [CellCoord::new(2, 2), CellCoord::new(2, 0), hill] {
            let preview = query::archetype_preview(&world, cell);
            world
                .place(cell, Placement::Tower(TowerKind::Arrow), &mut events)
                .expect("tower");
            let placed = query::tower_view(&world)
                .into_vec()
                .into_iter()
                .find(|tower| tower.cell == cell)
                .expect("tower placed");
            assert_eq!(placed.archetype, preview, "{cell:?}");
        }
        assert_eq!(
            query::archetype_preview(&world, CellCoord::new(2, 3)),
            UpgradeArchetype::Precision
        );
        assert_eq!(query::archetype_preview(&world, hill), UpgradeArchetype::Sniper);
    }
}
