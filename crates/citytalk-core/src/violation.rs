//! Reasons the executor refuses a task.

use citytalk_ledger::LedgerError;
use citytalk_types::{BuildingType, Coord, TaskShapeError};

/// A well-formed task that breaks a game rule, or a record too incomplete to
/// act on. Either way the task is discarded and the queue moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    /// Add targeted a tile that already holds a building.
    #[error("tile {at} is occupied by {occupant}")]
    TileOccupied {
        /// Target tile.
        at: Coord,
        /// Building already there.
        occupant: BuildingType,
    },

    /// Delete or Move named a tile without a building.
    #[error("no building at {at}")]
    NoBuildingAt {
        /// Tile that was checked.
        at: Coord,
    },

    /// Add did not name a building.
    #[error("add at {at} names no building")]
    MissingBuildingType {
        /// Target tile.
        at: Coord,
    },

    /// The record lacks a field its kind needs, or its kind is illegal.
    #[error("malformed task: {0}")]
    Malformed(#[from] TaskShapeError),

    /// The store refused the trade.
    #[error("trade refused: {0}")]
    Ledger(#[from] LedgerError),
}
