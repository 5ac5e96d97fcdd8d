#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Road Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod config;
mod errors;

pub use config::GameConfig;
pub use errors::{CardError, ConfigError, PlacementError, PurchaseError, WaveError};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the wave simulation and tower cooldowns by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the pending card be played onto the provided cell.
    Place {
        /// Cell receiving the placement.
        cell: CellCoord,
        /// Road, tower or terrain being placed.
        placement: Placement,
    },
    /// Selects one of the currently offered cards.
    ChooseCard {
        /// Position of the card within the offered choices.
        index: usize,
    },
    /// Requests that the next wave begin spawning.
    StartWave,
    /// Requests purchase of the next upgrade tier for a tower.
    PurchaseUpgrade {
        /// Identifier of the tower being upgraded.
        tower: TowerId,
    },
    /// Requests that a tower launch a projectile toward an enemy.
    FireProjectile {
        /// Tower that fires the projectile.
        tower: TowerId,
        /// Enemy targeted by the projectile.
        target: EnemyId,
    },
    /// Advances projectile flight and resolves hits by the provided delta time.
    ResolveProjectiles {
        /// Duration of simulated time that elapsed since the previous pass.
        dt: Duration,
    },
    /// Ends the session with the provided outcome.
    EndSession {
        /// Result of the session.
        outcome: SessionOutcome,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the session entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// Announces a fresh set of card choices.
    CardChoicesOffered {
        /// Cards the player may choose from.
        choices: Vec<Card>,
    },
    /// Confirms that a card was chosen and its placement is pending.
    CardChosen {
        /// Card that was chosen.
        card: Card,
        /// Placement the card grants.
        placement: Placement,
    },
    /// Reports that a card selection was rejected.
    CardRejected {
        /// Index supplied with the request.
        index: usize,
        /// Specific reason the selection failed.
        reason: CardError,
    },
    /// Confirms that a road tile was committed.
    RoadPlaced {
        /// Cell holding the new road tile.
        cell: CellCoord,
        /// Shape of the road tile.
        shape: RoadShape,
        /// Number of cells in the walking path after the placement.
        path_length: usize,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Cell the tower occupies.
        cell: CellCoord,
        /// Upgrade tree unlocked by the surrounding terrain.
        archetype: UpgradeArchetype,
    },
    /// Confirms that terrain was placed.
    TerrainPlaced {
        /// Cell holding the new terrain.
        cell: CellCoord,
        /// Kind of terrain that was placed.
        terrain: TerrainKind,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Cell provided in the request.
        cell: CellCoord,
        /// Placement provided in the request.
        placement: Placement,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a wave started.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Number of enemies the wave will spawn.
        enemies: u32,
        /// Hit points assigned to every enemy of the wave.
        enemy_hp: u32,
    },
    /// Reports that a wave start request was rejected.
    WaveRejected {
        /// Specific reason the wave could not start.
        reason: WaveError,
    },
    /// Confirms that the active wave was cleared.
    WaveCompleted {
        /// Wave number that was cleared.
        wave: u32,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
    },
    /// Reports that an enemy reached the exit.
    EnemyEscaped {
        /// Identifier of the escaped enemy.
        enemy: EnemyId,
        /// Base hit points remaining afterwards.
        base_hp: u32,
    },
    /// Reports that an enemy was destroyed.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Gold granted for the kill.
        reward: u32,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile is tracking.
        target: EnemyId,
    },
    /// Reports that a projectile struck an enemy.
    ProjectileHit {
        /// Projectile that struck.
        projectile: ProjectileId,
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Damage applied after multipliers.
        damage: f32,
        /// Multiplier rolled for the hit.
        multiplier: HitMultiplier,
    },
    /// Confirms that an upgrade tier was purchased.
    UpgradePurchased {
        /// Tower receiving the upgrade.
        tower: TowerId,
        /// Upgrade level after the purchase.
        level: u32,
        /// Gold spent on the tier.
        cost: u32,
    },
    /// Reports that an upgrade purchase was rejected.
    UpgradeRejected {
        /// Tower targeted by the request.
        tower: TowerId,
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
    /// Announces that the session ended.
    SessionEnded {
        /// Final report of the session.
        summary: SessionSummary,
    },
}

/// Cardinal directions used for road openings and path steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in canonical order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Column and row offsets of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell one step away in the provided direction, if it has non-negative coordinates.
    ///
    /// Upper bounds are not checked; callers consult the grid dimensions.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let column = u32::try_from(i64::from(self.column) + dx).ok()?;
        let row = u32::try_from(i64::from(self.row) + dy).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Direction of a single orthogonal step from `self` to `other`.
    #[must_use]
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.step(*direction) == Some(other))
    }

    /// Continuous position of the cell in grid space.
    #[must_use]
    pub fn to_point(self) -> CellPoint {
        CellPoint::new(self.column as f32, self.row as f32)
    }
}

/// Continuous position measured in cell units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CellPoint {
    x: f32,
    y: f32,
}

impl CellPoint {
    /// Creates a new point from horizontal and vertical components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component measured in columns.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component measured in rows.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: CellPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: CellPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Linear interpolation toward `other` by `fraction`.
    #[must_use]
    pub fn lerp(self, other: CellPoint, fraction: f32) -> CellPoint {
        CellPoint::new(
            self.x + (other.x - self.x) * fraction,
            self.y + (other.y - self.y) * fraction,
        )
    }
}

/// Pair of edges through which a road tile connects to its neighbours.
///
/// On tiles lying on the committed path `entry` faces the previous path node
/// and `exit` the next one. Elsewhere the order is canonical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Openings {
    entry: Direction,
    exit: Direction,
}

impl Openings {
    /// Creates a new opening pair.
    #[must_use]
    pub const fn new(entry: Direction, exit: Direction) -> Self {
        Self { entry, exit }
    }

    /// Edge through which the road is entered.
    #[must_use]
    pub const fn entry(&self) -> Direction {
        self.entry
    }

    /// Edge through which the road is left.
    #[must_use]
    pub const fn exit(&self) -> Direction {
        self.exit
    }

    /// Reports whether the pair opens toward `direction`.
    #[must_use]
    pub fn contains(&self, direction: Direction) -> bool {
        self.entry == direction || self.exit == direction
    }

    /// Reports whether both pairs open the same two edges, ignoring order.
    #[must_use]
    pub fn same_edges(&self, other: &Openings) -> bool {
        other.contains(self.entry) && other.contains(self.exit)
    }
}

const STRAIGHT_OPENINGS: [Openings; 2] = [
    Openings::new(Direction::West, Direction::East),
    Openings::new(Direction::North, Direction::South),
];

const TURN_OPENINGS: [Openings; 4] = [
    Openings::new(Direction::North, Direction::East),
    Openings::new(Direction::East, Direction::South),
    Openings::new(Direction::South, Direction::West),
    Openings::new(Direction::West, Direction::North),
];

/// Shapes of road tile a card may place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadShape {
    /// Straight segment.
    Straight,
    /// Tight 90 degree turn.
    TurnSmall,
    /// Wide 90 degree turn.
    TurnLong,
}

impl RoadShape {
    /// Opening pairs the shape may be oriented to, in canonical order.
    #[must_use]
    pub fn opening_pairs(self) -> &'static [Openings] {
        match self {
            Self::Straight => &STRAIGHT_OPENINGS,
            Self::TurnSmall | Self::TurnLong => &TURN_OPENINGS,
        }
    }
}

/// Terrain features that may be placed onto plain tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Raised ground that unlocks sniper upgrades.
    Hill,
}

/// Classification of a tile's surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Empty buildable ground.
    Plain,
    /// Raised ground.
    Hill,
    /// Road tile of the given shape.
    Road(RoadShape),
}

/// Single cell of the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    kind: TileKind,
    openings: Option<Openings>,
}

impl Tile {
    /// Empty buildable ground.
    pub const PLAIN: Tile = Tile {
        kind: TileKind::Plain,
        openings: None,
    };

    /// Raised ground.
    pub const HILL: Tile = Tile {
        kind: TileKind::Hill,
        openings: None,
    };

    /// Creates a road tile oriented to the provided openings.
    #[must_use]
    pub const fn road(shape: RoadShape, openings: Openings) -> Self {
        Self {
            kind: TileKind::Road(shape),
            openings: Some(openings),
        }
    }

    /// Surface classification of the tile.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Resolved openings, present only on road tiles.
    #[must_use]
    pub const fn openings(&self) -> Option<Openings> {
        self.openings
    }

    /// Road shape carried by the tile, if any.
    #[must_use]
    pub const fn road_shape(&self) -> Option<RoadShape> {
        match self.kind {
            TileKind::Road(shape) => Some(shape),
            TileKind::Plain | TileKind::Hill => None,
        }
    }

    /// Reports whether the tile is plain ground.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.kind == TileKind::Plain
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Single-target tower firing arrows.
    Arrow,
}

impl TowerKind {
    /// Gold required to construct the tower.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Arrow => 5,
        }
    }

    /// Damage dealt by a single projectile before upgrades.
    #[must_use]
    pub const fn base_damage(self) -> f32 {
        match self {
            Self::Arrow => 1.0,
        }
    }

    /// Shots fired per second before upgrades.
    #[must_use]
    pub const fn base_fire_rate(self) -> f32 {
        match self {
            Self::Arrow => 1.0,
        }
    }

    /// Targeting radius measured in cells before upgrades.
    #[must_use]
    pub const fn base_range(self) -> f32 {
        match self {
            Self::Arrow => 3.0,
        }
    }

    /// Flight speed of launched projectiles in cells per second.
    #[must_use]
    pub const fn projectile_speed(self) -> f32 {
        match self {
            Self::Arrow => 6.0,
        }
    }
}

/// Anything a card can put onto the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// Road tile of the given shape.
    Road(RoadShape),
    /// Tower of the given kind.
    Tower(TowerKind),
    /// Terrain feature.
    Terrain(TerrainKind),
}

/// Cards that may be offered between waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Card {
    /// Straight road segment.
    StraightRoad,
    /// Tight road turn.
    SmallTurn,
    /// Wide road turn.
    LongTurn,
    /// Arrow tower.
    ArrowTower,
    /// Hill terrain.
    Hill,
}

impl Card {
    /// The full deck, in draw-index order.
    pub const ALL: [Card; 5] = [
        Card::StraightRoad,
        Card::SmallTurn,
        Card::LongTurn,
        Card::ArrowTower,
        Card::Hill,
    ];

    /// Placement granted when the card is played.
    #[must_use]
    pub const fn placement(self) -> Placement {
        match self {
            Self::StraightRoad => Placement::Road(RoadShape::Straight),
            Self::SmallTurn => Placement::Road(RoadShape::TurnSmall),
            Self::LongTurn => Placement::Road(RoadShape::TurnLong),
            Self::ArrowTower => Placement::Tower(TowerKind::Arrow),
            Self::Hill => Placement::Terrain(TerrainKind::Hill),
        }
    }

    /// Display name of the card.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StraightRoad => "Straight Road",
            Self::SmallTurn => "Small Turn",
            Self::LongTurn => "Long Turn",
            Self::ArrowTower => "Arrow Tower",
            Self::Hill => "Hill",
        }
    }

    /// Short description shown alongside the name.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::StraightRoad => "Extend the path with a straight road segment.",
            Self::SmallTurn => "Turn the road by 90 degrees.",
            Self::LongTurn => "Turn the road and add extra distance.",
            Self::ArrowTower => "Place an Arrow Tower to defend the path.",
            Self::Hill => "Place a hill; towers here unlock Sniper upgrades.",
        }
    }
}

/// Phases of a play session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// A chosen card awaits placement.
    Build,
    /// The player picks one of the offered cards.
    Card,
    /// Enemies are walking the path.
    Wave,
    /// The session is over.
    End,
}

/// Upgrade trees a tower may unlock at placement time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeArchetype {
    /// Raw damage and fire rate; unlocked next to straight roads.
    Precision,
    /// Pierce and ricochet; unlocked next to small turns.
    Angle,
    /// Damage over time; unlocked next to long turns.
    Sustained,
    /// Range and headshots; unlocked on hills.
    Sniper,
}

impl UpgradeArchetype {
    /// Display name of the upgrade tree.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Precision => "Precision",
            Self::Angle => "Angle",
            Self::Sustained => "Sustained",
            Self::Sniper => "Sniper",
        }
    }
}

/// Accumulated upgrade effects carried by a tower.
///
/// Every field starts at a neutral value so combat never branches on presence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerModifiers {
    /// Probability of a doubled hit.
    pub crit_chance: f32,
    /// Probability of a tripled hit, rolled before the crit.
    pub headshot_chance: f32,
    /// Extra damage against enemies standing on a path turn.
    pub turn_bonus_damage: f32,
    /// Number of hits a projectile can land; one means no pierce.
    pub pierce: u32,
    /// Whether projectiles bounce once to a nearby enemy.
    pub ricochet: bool,
    /// Bonus damage accumulated from previous hits.
    pub ramp_stacks: f32,
    /// Ramp bonus gained per hit.
    pub ramp_per_hit: f32,
    /// Bleed damage per second applied on hit.
    pub bleed_damage: f32,
    /// Speed multiplier applied on hit; one means no slow.
    pub slow_on_hit: f32,
}

impl Default for TowerModifiers {
    fn default() -> Self {
        Self {
            crit_chance: 0.0,
            headshot_chance: 0.0,
            turn_bonus_damage: 0.0,
            pierce: 1,
            ricochet: false,
            ramp_stacks: 0.0,
            ramp_per_hit: 0.0,
            bleed_damage: 0.0,
            slow_on_hit: 1.0,
        }
    }
}

/// Damage multiplier rolled for a single hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitMultiplier {
    /// No multiplier.
    Normal,
    /// Critical hit.
    Crit,
    /// Headshot.
    Headshot,
}

impl HitMultiplier {
    /// Factor applied to the hit's damage.
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Crit => 2.0,
            Self::Headshot => 3.0,
        }
    }
}

/// Result of a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Every configured wave was cleared.
    Victory,
    /// The base ran out of hit points.
    Defeat,
}

/// Report produced when the session ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Result of the session.
    pub outcome: SessionOutcome,
    /// Last wave the player reached.
    pub wave_reached: u32,
    /// Number of towers standing.
    pub towers: u32,
    /// Gold left in the ledger.
    pub gold: u32,
}

/// Uniform random source producing values in `[0, 1)`.
///
/// Injected into the world so combat rolls and card draws are reproducible.
pub trait RandomSource: std::fmt::Debug {
    /// Returns the next sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Continuous position in grid space.
    pub position: CellPoint,
    /// Index of the path cell the current segment starts from.
    pub path_index: usize,
    /// Fraction of the current segment already walked.
    pub t: f32,
    /// Remaining hit points.
    pub hp: f32,
    /// Hit points at spawn.
    pub max_hp: f32,
    /// Active speed multiplier.
    pub speed_multiplier: f32,
}

impl EnemySnapshot {
    /// Distance walked along the path, used to rank targets.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.path_index as f32 + self.t
    }
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell the tower occupies.
    pub cell: CellCoord,
    /// Upgrade tree unlocked at placement.
    pub archetype: UpgradeArchetype,
    /// Number of upgrade tiers purchased.
    pub upgrade_level: u32,
    /// Damage per projectile, excluding ramp stacks.
    pub damage: f32,
    /// Shots fired per second.
    pub fire_rate: f32,
    /// Targeting radius in cells.
    pub range: f32,
    /// Time remaining until the tower may fire again.
    pub cooldown: Duration,
    /// Accumulated upgrade effects.
    pub modifiers: TowerModifiers,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Cooldown state of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower the cooldown belongs to.
    pub tower: TowerId,
    /// Time remaining until the tower may fire.
    pub ready_in: Duration,
}

/// Cooldown state of every tower, sorted by identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Iterator over the captured cooldowns in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerCooldownSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub source: TowerId,
    /// Enemy the projectile is tracking.
    pub target: EnemyId,
    /// Continuous position in grid space.
    pub position: CellPoint,
    /// Base damage carried by the projectile.
    pub damage: f32,
}

/// Target selected for a tower during a simulation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as target.
    pub enemy: EnemyId,
    /// Position of the tower in grid space.
    pub tower_position: CellPoint,
    /// Position of the enemy in grid space.
    pub enemy_position: CellPoint,
}
