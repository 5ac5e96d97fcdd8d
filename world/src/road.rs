//! Road network validation.
//!
//! A placement is evaluated against a cloned grid. Every road tile is
//! re-oriented from its neighbours, the directional connectivity graph is
//! rebuilt with virtual spawn and exit nodes, and the graph must form a single
//! simple walk once both endpoints are attached. Only the caller decides
//! whether to adopt the resulting grid, so a rejected evaluation can never
//! leave a trace on the live state.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use road_defence_core::{CellCoord, Direction, Openings, PlacementError, RoadShape, Tile};

use crate::grid::{Endpoints, Grid};

/// Grid and path produced by a successful road evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RoadResolution {
    /// Candidate grid with every road tile re-oriented.
    pub(crate) grid: Grid,
    /// Spawn to exit walk, empty while the endpoints are not joined.
    pub(crate) path: Vec<CellCoord>,
}

/// Checks whether a road of `shape` may be placed at `cell` without touching the grid.
pub fn can_place_road(
    grid: &Grid,
    endpoints: Endpoints,
    cell: CellCoord,
    shape: RoadShape,
) -> Result<(), PlacementError> {
    evaluate_road(grid, endpoints, cell, shape).map(|_| ())
}

/// Evaluates a road placement, returning the grid and path to commit on success.
pub(crate) fn evaluate_road(
    grid: &Grid,
    endpoints: Endpoints,
    cell: CellCoord,
    shape: RoadShape,
) -> Result<RoadResolution, PlacementError> {
    let tile = grid.tile(cell).ok_or(PlacementError::OutOfBounds)?;
    if endpoints.contains(cell) {
        return Err(PlacementError::Reserved);
    }
    if !tile.is_plain() {
        return Err(PlacementError::TerrainOccupied);
    }

    let options = orientation_options(grid, endpoints, cell, shape);
    let mut candidate = grid.clone();
    for (road, option) in &options {
        let compatible = compatible_directions(grid, endpoints, &options, *road);
        let openings = option.resolve(&compatible)?;
        candidate.set(*road, Tile::road(option.shape, openings));
    }

    let adjacency = connectivity(&candidate, endpoints);
    let path = walk(&adjacency, endpoints)?;
    orient_along(&mut candidate, &path);

    Ok(RoadResolution {
        grid: candidate,
        path,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Node {
    Spawn,
    Exit,
    Road(CellCoord),
}

#[derive(Clone, Debug)]
struct OrientationOption {
    shape: RoadShape,
    current: Option<Openings>,
    pairs: Vec<Openings>,
}

impl OrientationOption {
    fn can_open(&self, direction: Direction) -> bool {
        self.pairs.iter().any(|pair| pair.contains(direction))
    }

    fn resolve(&self, compatible: &[Direction]) -> Result<Openings, PlacementError> {
        let resolved = match compatible {
            [only] => self
                .current
                .filter(|current| current.contains(*only))
                .or_else(|| self.pairs.iter().copied().find(|pair| pair.contains(*only))),
            [first, second] => {
                let wanted = Openings::new(*first, *second);
                self.current
                    .filter(|current| current.same_edges(&wanted))
                    .or_else(|| {
                        self.pairs
                            .iter()
                            .copied()
                            .find(|pair| pair.same_edges(&wanted))
                    })
            }
            _ => None,
        };
        resolved.ok_or(PlacementError::OrientationMismatch)
    }
}

/// Opening pairs each road tile may still take.
///
/// Committed tiles keep every pair that preserves their existing connections;
/// the new tile may take any pair of its shape.
fn orientation_options(
    grid: &Grid,
    endpoints: Endpoints,
    placed: CellCoord,
    shape: RoadShape,
) -> BTreeMap<CellCoord, OrientationOption> {
    let mut options = BTreeMap::new();

    for road in grid.road_cells() {
        let Some(tile) = grid.tile(road) else {
            continue;
        };
        let Some(road_shape) = tile.road_shape() else {
            continue;
        };
        let links = committed_links(grid, endpoints, road);
        let pairs = road_shape
            .opening_pairs()
            .iter()
            .copied()
            .filter(|pair| links.iter().all(|link| pair.contains(*link)))
            .collect();
        let _ = options.insert(
            road,
            OrientationOption {
                shape: road_shape,
                current: tile.openings(),
                pairs,
            },
        );
    }

    let _ = options.insert(
        placed,
        OrientationOption {
            shape,
            current: None,
            pairs: shape.opening_pairs().to_vec(),
        },
    );

    options
}

/// Directions in which a committed road tile is joined to a facing neighbour.
fn committed_links(grid: &Grid, endpoints: Endpoints, cell: CellCoord) -> Vec<Direction> {
    let Some(openings) = grid.tile(cell).and_then(Tile::openings) else {
        return Vec::new();
    };

    Direction::ALL
        .into_iter()
        .filter(|direction| openings.contains(*direction))
        .filter(|direction| {
            grid.neighbor(cell, *direction)
                .is_some_and(|next| faces(grid, endpoints, next, direction.opposite()))
        })
        .collect()
}

fn faces(grid: &Grid, endpoints: Endpoints, cell: CellCoord, direction: Direction) -> bool {
    endpoints.contains(cell)
        || grid
            .tile(cell)
            .and_then(Tile::openings)
            .is_some_and(|openings| openings.contains(direction))
}

fn can_open(
    endpoints: Endpoints,
    options: &BTreeMap<CellCoord, OrientationOption>,
    cell: CellCoord,
    direction: Direction,
) -> bool {
    endpoints.contains(cell)
        || options
            .get(&cell)
            .is_some_and(|option| option.can_open(direction))
}

fn compatible_directions(
    grid: &Grid,
    endpoints: Endpoints,
    options: &BTreeMap<CellCoord, OrientationOption>,
    cell: CellCoord,
) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|direction| {
            let Some(next) = grid.neighbor(cell, *direction) else {
                return false;
            };
            can_open(endpoints, options, cell, *direction)
                && can_open(endpoints, options, next, direction.opposite())
        })
        .collect()
}

/// Undirected graph joining tiles whose openings face each other.
fn connectivity(grid: &Grid, endpoints: Endpoints) -> BTreeMap<Node, BTreeSet<Node>> {
    let mut adjacency: BTreeMap<Node, BTreeSet<Node>> = BTreeMap::new();
    let _ = adjacency.insert(Node::Spawn, BTreeSet::new());
    let _ = adjacency.insert(Node::Exit, BTreeSet::new());

    for road in grid.road_cells() {
        let node = Node::Road(road);
        let _ = adjacency.entry(node).or_default();
        let Some(openings) = grid.tile(road).and_then(Tile::openings) else {
            continue;
        };

        for direction in [openings.entry(), openings.exit()] {
            let Some(next) = grid.neighbor(road, direction) else {
                continue;
            };
            let other = if next == endpoints.spawn {
                Node::Spawn
            } else if next == endpoints.exit {
                Node::Exit
            } else if faces(grid, endpoints, next, direction.opposite()) {
                Node::Road(next)
            } else {
                continue;
            };
            let _ = adjacency.entry(node).or_default().insert(other);
            let _ = adjacency.entry(other).or_default().insert(node);
        }
    }

    adjacency
}

fn walk(
    adjacency: &BTreeMap<Node, BTreeSet<Node>>,
    endpoints: Endpoints,
) -> Result<Vec<CellCoord>, PlacementError> {
    let degree = |node: Node| adjacency.get(&node).map_or(0, BTreeSet::len);
    let has_fork = adjacency.values().any(|neighbours| neighbours.len() > 2);

    if degree(Node::Spawn) == 0 || degree(Node::Exit) == 0 {
        return if has_fork {
            Err(PlacementError::Fork)
        } else {
            Ok(Vec::new())
        };
    }

    let mut parents: BTreeMap<Node, Node> = BTreeMap::new();
    let mut visited = BTreeSet::from([Node::Spawn]);
    let mut queue = VecDeque::from([Node::Spawn]);
    while let Some(node) = queue.pop_front() {
        if node == Node::Exit {
            break;
        }
        for next in adjacency.get(&node).into_iter().flatten() {
            if visited.insert(*next) {
                let _ = parents.insert(*next, node);
                queue.push_back(*next);
            }
        }
    }

    if !visited.contains(&Node::Exit) {
        return Err(PlacementError::Disconnected);
    }
    if has_fork {
        return Err(PlacementError::Fork);
    }
    if degree(Node::Spawn) != 1 || degree(Node::Exit) != 1 {
        return Err(PlacementError::EndpointDegree);
    }

    let mut nodes = vec![Node::Exit];
    let mut current = Node::Exit;
    while let Some(parent) = parents.get(&current) {
        nodes.push(*parent);
        current = *parent;
    }
    nodes.reverse();

    let on_walk: BTreeSet<Node> = nodes.iter().copied().collect();
    if adjacency.keys().any(|node| !on_walk.contains(node)) {
        return Err(PlacementError::SideBranch);
    }

    Ok(nodes
        .into_iter()
        .map(|node| match node {
            Node::Spawn => endpoints.spawn,
            Node::Exit => endpoints.exit,
            Node::Road(cell) => cell,
        })
        .collect())
}

/// Rewrites path tiles so `entry` faces the previous node and `exit` the next.
fn orient_along(grid: &mut Grid, path: &[CellCoord]) {
    for window in path.windows(3) {
        let [previous, cell, next] = [window[0], window[1], window[2]];
        let Some(shape) = grid.tile(cell).and_then(Tile::road_shape) else {
            continue;
        };
        if let (Some(entry), Some(exit)) = (cell.direction_to(previous), cell.direction_to(next)) {
            grid.set(cell, Tile::road(shape, Openings::new(entry, exit)));
        }
    }
}
