//! Recoverable failure reasons reported by the world.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The session is not waiting for a card to be placed.
    #[error("Nothing can be placed right now.")]
    InvalidPhase,
    /// The placement differs from the chosen card.
    #[error("Placement does not match the chosen card.")]
    CardMismatch,
    /// The cell lies beyond the grid.
    #[error("Cell is outside the grid.")]
    OutOfBounds,
    /// The cell holds the spawn or the exit.
    #[error("Spawn and exit cells cannot be built on.")]
    Reserved,
    /// A tower already stands on the cell.
    #[error("A tower already occupies this cell.")]
    Occupied,
    /// Roads require plain terrain.
    #[error("Road must be placed on plain terrain.")]
    TerrainOccupied,
    /// Towers and terrain cannot replace roads.
    #[error("Cannot build over road tiles.")]
    OnRoad,
    /// No opening pair of the shape fits its neighbours.
    #[error("Road orientation does not match its neighbours.")]
    OrientationMismatch,
    /// A road node would gain more than two connections.
    #[error("Road would create a fork.")]
    Fork,
    /// A road would hang off the spawn to exit path.
    #[error("Road would create a side branch.")]
    SideBranch,
    /// Spawn and exit both have roads but no path joins them.
    #[error("Path must connect spawn and exit.")]
    Disconnected,
    /// Spawn or exit would connect to more than one road.
    #[error("Spawn and exit must connect to the path with exactly one road.")]
    EndpointDegree,
    /// The ledger cannot cover the cost.
    #[error("Not enough gold.")]
    InsufficientGold,
}

/// Reasons an upgrade purchase may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PurchaseError {
    /// No tower with the provided identifier exists.
    #[error("No such tower.")]
    UnknownTower,
    /// Every tier of the tower's tree was bought.
    #[error("No upgrades remaining.")]
    NoUpgradesRemaining,
    /// The ledger cannot cover the tier's cost.
    #[error("Not enough gold.")]
    InsufficientGold,
    /// The session already ended.
    #[error("The session is over.")]
    SessionOver,
}

/// Reasons a wave may fail to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WaveError {
    /// The session already ended.
    #[error("The session is over.")]
    SessionOver,
    /// A wave is already running.
    #[error("A wave is already in progress.")]
    WaveActive,
    /// Spawn and exit are not joined by a road yet.
    #[error("The road does not reach the exit yet.")]
    PathIncomplete,
}

/// Reasons a card selection may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum CardError {
    /// Cards are not on offer right now.
    #[error("No card choice is pending.")]
    InvalidPhase,
    /// The index does not name an offered card.
    #[error("No card at that position.")]
    OutOfRange,
}

/// Reasons a [`crate::GameConfig`] may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// The grid cannot hold separate spawn and exit cells.
    #[error("grid must be at least 3x1, got {columns}x{rows}")]
    GridTooSmall {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The fixed step would be unbounded.
    #[error("tick rate must be positive")]
    ZeroTickRate,
    /// No wave could ever be won.
    #[error("final wave must be at least 1")]
    ZeroFinalWave,
    /// The card phase would offer nothing.
    #[error("at least one card choice is required")]
    ZeroCardChoices,
}
