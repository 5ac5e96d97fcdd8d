//! Scripted player that drives a headless session through the builder.
//!
//! Every frame the bot inspects the world, fills in a [`BuilderInput`] the
//! way a person at the keyboard would, and lets the builder and clock turn
//! it into commands and simulation steps.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, VecDeque},
    time::Duration,
};

use road_defence_core::{
    Card, CellCoord, Direction, Event, Phase, Placement, RoadShape, SessionSummary, Tile,
    TowerKind,
};
use road_defence_system_builder::{Builder, BuilderInput};
use road_defence_system_clock::SimulationClock;
use road_defence_world::{self as world, query, Endpoints, Grid, World};
use tracing::{debug, info};

/// Totals gathered while the bot played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Report {
    /// Final summary, absent when the time limit cut the session short.
    pub(crate) summary: Option<SessionSummary>,
    /// Simulation steps run.
    pub(crate) steps: u64,
    /// Waves started.
    pub(crate) waves: u32,
    /// Enemies killed by towers.
    pub(crate) kills: u32,
    /// Enemies that reached the exit.
    pub(crate) escapes: u32,
    /// Upgrades bought.
    pub(crate) upgrades: u32,
}

impl Report {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveStarted { .. } => self.waves += 1,
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::EnemyEscaped { .. } => self.escapes += 1,
                Event::UpgradePurchased { .. } => self.upgrades += 1,
                Event::SessionEnded { summary } => self.summary = Some(*summary),
                _ => {}
            }
        }
    }
}

/// Plays `world` until the session ends or `limit` of simulated time passes.
pub(crate) fn run(world: &mut World, limit: Duration) -> Report {
    let mut clock = SimulationClock::new(query::config(world));
    let step = clock.fixed_step();
    let max_steps = u64::try_from(limit.as_nanos() / step.as_nanos().max(1)).unwrap_or(u64::MAX);

    let mut builder = Builder::new();
    let mut bot = Autoplay::default();
    let mut report = Report::default();
    let mut events = Vec::new();
    let mut commands = Vec::new();

    while query::phase(world) != Phase::End && clock.steps() < max_steps {
        bot.observe(&events);
        report.record(&events);

        let input = bot.decide(world);
        let view: &World = world;
        builder.handle(
            &events,
            input,
            |cell| query::tower_at(view, cell),
            |cell, placement| query::can_place(view, cell, placement).is_ok(),
            &mut commands,
        );

        events.clear();
        for command in commands.drain(..) {
            world::apply(world, command, &mut events);
        }
        let _ = clock.advance(world, step, &mut events);
    }
    report.record(&events);
    report.steps = clock.steps();

    if report.summary.is_none() {
        info!(steps = report.steps, "time limit reached before the session ended");
    }
    report
}

/// Decision state of the scripted player.
#[derive(Debug, Default)]
struct Autoplay {
    placed_since_wave: u32,
}

impl Autoplay {
    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveStarted { .. } => self.placed_since_wave = 0,
                Event::RoadPlaced { .. }
                | Event::TowerPlaced { .. }
                | Event::TerrainPlaced { .. } => self.placed_since_wave += 1,
                _ => {}
            }
        }
    }

    fn decide(&self, world: &World) -> BuilderInput {
        let path_complete = !query::path(world).is_empty();
        match query::phase(world) {
            Phase::End => BuilderInput::default(),
            Phase::Wave => upgrade_input(world).unwrap_or_default(),
            Phase::Card => {
                if path_complete && self.placed_since_wave > 0 {
                    return BuilderInput {
                        start_wave_action: true,
                        ..BuilderInput::default()
                    };
                }
                match pick_card(world, path_complete) {
                    Some(index) => BuilderInput {
                        choose_card: Some(index),
                        ..BuilderInput::default()
                    },
                    None => BuilderInput {
                        start_wave_action: path_complete,
                        ..BuilderInput::default()
                    },
                }
            }
            Phase::Build => {
                let pending = query::pending_placement(world);
                match pending.and_then(|placement| best_cell(world, placement)) {
                    Some(cell) => {
                        if let Some(Placement::Tower(_)) = pending {
                            let archetype = query::archetype_preview(world, cell);
                            debug!(?cell, archetype = archetype.label(), "placing tower");
                        }
                        BuilderInput {
                            confirm_action: true,
                            cursor_cell: Some(cell),
                            ..BuilderInput::default()
                        }
                    }
                    None => BuilderInput {
                        start_wave_action: path_complete,
                        ..BuilderInput::default()
                    },
                }
            }
        }
    }
}

/// Clicks the first tower whose next upgrade is affordable and buys it.
fn upgrade_input(world: &World) -> Option<BuilderInput> {
    let gold = query::gold(world);
    let tower = query::tower_view(world).into_vec().into_iter().find(|tower| {
        query::next_upgrade(world, tower.id).is_some_and(|tier| tier.cost <= gold)
    })?;
    debug!(tower = tower.id.get(), gold, "buying upgrade");
    Some(BuilderInput {
        confirm_action: true,
        cursor_cell: Some(tower.cell),
        purchase_action: true,
        ..BuilderInput::default()
    })
}

/// Index of the most useful playable card on offer.
///
/// Among road cards the one with the shortest remaining route wins.
fn pick_card(world: &World, path_complete: bool) -> Option<usize> {
    let (_, _, index, card) = query::card_choices(world)
        .iter()
        .enumerate()
        .filter_map(|(index, card)| {
            let rank = match card.placement() {
                Placement::Road(shape) => best_road(world, shape)?.0,
                placement => best_cell(world, placement).map(|_| 0)?,
            };
            Some((Reverse(priority(*card, path_complete)), rank, index, *card))
        })
        .min_by_key(|(priority, rank, index, _)| (*priority, *rank, *index))?;
    debug!(card = card.name(), effect = card.description(), "playing card");
    Some(index)
}

const fn priority(card: Card, path_complete: bool) -> u8 {
    match (card, path_complete) {
        (Card::StraightRoad | Card::SmallTurn | Card::LongTurn, false) => 3,
        (Card::StraightRoad | Card::SmallTurn | Card::LongTurn, true) => 0,
        (Card::Hill, false) | (Card::ArrowTower, true) => 2,
        (Card::ArrowTower, false) | (Card::Hill, true) => 1,
    }
}

/// Cell where the placement helps most, or `None` when no cell accepts it.
///
/// Roads extend the chain leaving the spawn. Towers and hills hug the
/// committed path once it exists and stay out of the road's way before.
fn best_cell(world: &World, placement: Placement) -> Option<CellCoord> {
    match placement {
        Placement::Road(shape) => best_road(world, shape).map(|(_, cell)| cell),
        Placement::Tower(_) | Placement::Terrain(_) if !query::path(world).is_empty() => {
            cells(world)
                .filter(|cell| query::can_place(world, *cell, placement).is_ok())
                .min_by_key(|cell| u32::MAX - coverage(world, *cell))
        }
        Placement::Tower(_) | Placement::Terrain(_) => {
            let lane = Lane::survey(world, None);
            let reach = lane.reach();
            cells(world)
                .filter(|cell| query::can_place(world, *cell, placement).is_ok())
                .filter(|cell| !lane.openings.contains(cell))
                .filter(|cell| Lane::survey(world, Some(*cell)).reach() == reach)
                .min_by_key(|cell| Reverse(lane.clearance(*cell)))
        }
    }
}

/// Lowest scoring cell for a road of `shape`, zero meaning the road completes the path.
fn best_road(world: &World, shape: RoadShape) -> Option<(u32, CellCoord)> {
    let lane = Lane::survey(world, None);
    lane.openings
        .iter()
        .filter_map(|cell| Some((lane.road_score(world, *cell, shape)?, *cell)))
        .min_by_key(|(score, _)| *score)
}

fn cells(world: &World) -> impl Iterator<Item = CellCoord> {
    let grid = query::grid(world);
    let columns = grid.columns();
    (0..grid.rows())
        .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
}

/// Extra cost of leaving the next tile a single workable road shape.
const DETOUR: u32 = 2;

/// Open end of the road chain grown from the spawn, with walking distances to the exit.
struct Lane {
    spawn: CellCoord,
    exit: CellCoord,
    frontier: CellCoord,
    /// Cells the next road tile may join the chain on.
    openings: Vec<CellCoord>,
    /// Steps from each free cell to the exit, never passing beside the spawn.
    distances: BTreeMap<CellCoord, u32>,
}

impl Lane {
    /// Maps the chain and the free ground, treating `blocked` as built over.
    fn survey(world: &World, blocked: Option<CellCoord>) -> Self {
        let grid = query::grid(world);
        let Endpoints { spawn, exit } = query::endpoints(world);
        let (frontier, back) = chain_end(grid, spawn);

        let openings = match (back, grid.tile(frontier).and_then(Tile::road_shape)) {
            (Some(back), Some(shape)) => onward(grid, frontier, back, shape),
            _ => Direction::ALL
                .into_iter()
                .filter_map(|direction| grid.neighbor(spawn, direction))
                .filter(|cell| *cell != exit)
                .collect(),
        };

        let open = |cell: CellCoord| {
            Some(cell) != blocked
                && cell != exit
                && cell.manhattan_distance(spawn) > 1
                && grid.tile(cell).is_some_and(Tile::is_plain)
                && query::tower_at(world, cell).is_none()
        };
        let mut distances = BTreeMap::new();
        let mut queue = VecDeque::new();
        for cell in neighbours(grid, exit).filter(|cell| open(*cell)) {
            let _ = distances.insert(cell, 1);
            queue.push_back(cell);
        }
        while let Some(cell) = queue.pop_front() {
            let distance = distances.get(&cell).copied().unwrap_or_default();
            for next in neighbours(grid, cell) {
                // A tile beside the exit joins it at once, so it only ends a route.
                let beside_exit = next.manhattan_distance(exit) == 1;
                if !open(next) || beside_exit || distances.contains_key(&next) {
                    continue;
                }
                let _ = distances.insert(next, distance + 1);
                queue.push_back(next);
            }
        }

        Self {
            spawn,
            exit,
            frontier,
            openings,
            distances,
        }
    }

    /// Shortest remaining route from any opening, `None` once the chain is boxed in.
    fn reach(&self) -> Option<u32> {
        self.openings
            .iter()
            .filter_map(|cell| self.distances.get(cell).copied())
            .min()
    }

    fn clearance(&self, cell: CellCoord) -> u32 {
        cell.manhattan_distance(self.frontier)
            .min(cell.manhattan_distance(self.exit))
    }

    /// Cost of laying `shape` on `cell`, or `None` when the tile would strand the chain.
    fn road_score(&self, world: &World, cell: CellCoord, shape: RoadShape) -> Option<u32> {
        let path = query::road_preview(world, cell, shape).ok()?;
        if !path.is_empty() {
            return Some(0);
        }
        // Either endpoint would end up with a second road.
        let beside_spawn = self.frontier != self.spawn && cell.manhattan_distance(self.spawn) == 1;
        if beside_spawn || cell.manhattan_distance(self.exit) == 1 {
            return None;
        }

        let grid = query::grid(world);
        let back = cell.direction_to(self.frontier)?;
        let next = onward(grid, cell, back, shape);
        let distance = next.iter().filter_map(|cell| self.distances.get(cell)).min()?;
        let (straight, turn) = self.next_shapes(grid, cell, &next);
        let detour = if straight && turn { 0 } else { DETOUR };
        Some(distance + 1 + detour)
    }

    /// Whether a straight and a turn could follow a tile on `from` opening into `next`.
    fn next_shapes(&self, grid: &Grid, from: CellCoord, next: &[CellCoord]) -> (bool, bool) {
        let mut shapes = (false, false);
        for cell in next.iter().filter(|cell| self.distances.contains_key(*cell)) {
            let Some(heading) = from.direction_to(*cell) else {
                continue;
            };
            if cell.manhattan_distance(self.exit) == 1 {
                if cell.direction_to(self.exit) == Some(heading) {
                    shapes.0 = true;
                } else {
                    shapes.1 = true;
                }
                continue;
            }
            let free = |direction: Direction| {
                grid.neighbor(*cell, direction)
                    .is_some_and(|beyond| self.distances.contains_key(&beyond))
            };
            shapes.0 |= free(heading);
            shapes.1 |= Direction::ALL
                .into_iter()
                .filter(|direction| *direction != heading && *direction != heading.opposite())
                .any(free);
        }
        shapes
    }
}

/// Last tile of the chain joined to the spawn and the side it is joined on.
fn chain_end(grid: &Grid, spawn: CellCoord) -> (CellCoord, Option<Direction>) {
    let opens = |cell: CellCoord, direction: Direction| {
        grid.tile(cell)
            .and_then(Tile::openings)
            .is_some_and(|openings| openings.contains(direction))
    };
    let mut end = (spawn, None);
    for _ in 0..grid.road_cells().count() {
        let (cell, back) = end;
        let next = Direction::ALL
            .into_iter()
            .filter(|direction| Some(*direction) != back)
            .filter(|direction| cell == spawn || opens(cell, *direction))
            .find_map(|direction| {
                let next = grid.neighbor(cell, direction)?;
                let back = direction.opposite();
                opens(next, back).then_some((next, Some(back)))
            });
        match next {
            Some(next) => end = next,
            None => break,
        }
    }
    end
}

/// Cells a tile of `shape` on `cell`, joined on `back`, would open toward.
fn onward(grid: &Grid, cell: CellCoord, back: Direction, shape: RoadShape) -> Vec<CellCoord> {
    shape
        .opening_pairs()
        .iter()
        .filter(|pair| pair.contains(back))
        .map(|pair| if pair.entry() == back { pair.exit() } else { pair.entry() })
        .filter_map(|direction| grid.neighbor(cell, direction))
        .collect()
}

fn neighbours(grid: &Grid, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
    Direction::ALL
        .into_iter()
        .filter_map(move |direction| grid.neighbor(cell, direction))
}

/// Number of path cells an arrow tower on `cell` could reach.
fn coverage(world: &World, cell: CellCoord) -> u32 {
    let range = TowerKind::Arrow.base_range();
    let covered = query::path(world)
        .iter()
        .filter(|step| {
            let dx = f64::from(step.column()) - f64::from(cell.column());
            let dy = f64::from(step.row()) - f64::from(cell.row());
            dx * dx + dy * dy <= f64::from(range * range)
        })
        .count();
    u32::try_from(covered).unwrap_or(u32::MAX)
}
