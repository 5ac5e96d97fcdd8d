//! Tile matrix owned by the world.

use road_defence_core::{CellCoord, Direction, Tile};

/// Dense row-major tile matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid filled with plain tiles.
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            tiles: vec![Tile::PLAIN; capacity],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Tile stored at the cell, if the cell lies within the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    pub(crate) fn set(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile;
            }
        }
    }

    /// Neighbouring cell in the provided direction, if it lies within the grid.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction).filter(|next| self.contains(*next))
    }

    /// Cells holding road tiles, in row-major order.
    pub fn road_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns.max(1);
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.road_shape().is_some())
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index % columns, index / columns))
            })
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Fixed entry and exit cells of the road network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// Cell where enemies appear.
    pub spawn: CellCoord,
    /// Cell enemies walk toward.
    pub exit: CellCoord,
}

impl Endpoints {
    /// Reports whether the cell is the spawn or the exit.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell == self.spawn || cell == self.exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_defence_core::{Openings, RoadShape};

    #[test]
    fn new_grid_is_plain() {
        let grid = Grid::new(4, 3);
        for row in 0..3 {
            for column in 0..4 {
                assert_eq!(grid.tile(CellCoord::new(column, row)), Some(&Tile::PLAIN));
            }
        }
        assert_eq!(grid.tile(CellCoord::new(4, 0)), None);
        assert_eq!(grid.road_cells().count(), 0);
    }

    #[test]
    fn neighbor_respects_bounds() {
        let grid = Grid::new(3, 3);
        let corner = CellCoord::new(2, 2);
        assert_eq!(grid.neighbor(corner, Direction::East), None);
        assert_eq!(grid.neighbor(corner, Direction::South), None);
        assert_eq!(
            grid.neighbor(corner, Direction::West),
            Some(CellCoord::new(1, 2))
        );
    }

    #[test]
    fn road_cells_report_coordinates() {
        let mut grid = Grid::new(3, 2);
        let road = Tile::road(
            RoadShape::Straight,
            Openings::new(Direction::West, Direction::East),
        );
        grid.set(CellCoord::new(2, 1), road);
        grid.set(CellCoord::new(0, 0), Tile::HILL);
        assert_eq!(
            grid.road_cells().collect::<Vec<_>>(),
            vec![CellCoord::new(2, 1)]
        );
    }
}
