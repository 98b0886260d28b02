//! Task records produced by the extractor and consumed by the executor.
//!
//! A [`Task`] mirrors what the LLM wrote: its kind may be the
//! [`TaskKind::None`] sentinel and its fields may be missing. Before anything
//! touches game state the executor turns it into a [`TaskAction`], a closed
//! sum type over the five legal operations, so dispatch is an exhaustive
//! `match` instead of string switching.

use core::fmt;

use serde::Serialize;

use crate::enums::{BuildingType, TaskKind};
use crate::structs::{GridPoint, ResourceBundle};

/// Which of the two task families a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskVariant {
    /// Map interaction (Add, Delete, Move).
    Map,
    /// Store interaction (Buy, Sell).
    Store,
}

impl fmt::Display for TaskVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map => f.write_str("map"),
            Self::Store => f.write_str("store"),
        }
    }
}

/// A task that places, removes or relocates a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapTask {
    /// Requested operation.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// Target tile (source tile for Move).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GridPoint>,
    /// Destination tile, Move only.
    #[serde(rename = "newLocation", skip_serializing_if = "Option::is_none")]
    pub new_location: Option<GridPoint>,
    /// Building to place, Add only.
    pub building: BuildingType,
}

/// A task that trades resources with the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreTask {
    /// Requested operation.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    /// Quantities to buy or sell.
    pub resources: ResourceBundle,
}

/// One extracted task, exactly as the LLM described it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Task {
    /// Map interaction.
    Map(MapTask),
    /// Store interaction.
    Store(StoreTask),
}

/// A validated operation with every field it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Place `building` at `at`.
    Add {
        /// Target tile.
        at: GridPoint,
        /// Building to place (may still be the sentinel; the executor checks).
        building: BuildingType,
    },
    /// Remove the building at `at`.
    Delete {
        /// Target tile.
        at: GridPoint,
    },
    /// Move the building at `from` to `to`.
    Move {
        /// Source tile.
        from: GridPoint,
        /// Destination tile.
        to: GridPoint,
    },
    /// Buy the bundle.
    Buy(ResourceBundle),
    /// Sell the bundle.
    Sell(ResourceBundle),
}

/// A task record cannot be turned into a [`TaskAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TaskShapeError {
    /// A map task without `location`.
    #[error("{kind} task has no location")]
    MissingLocation {
        /// The task's kind.
        kind: TaskKind,
    },
    /// A Move task without `newLocation`.
    #[error("Move task has no new location")]
    MissingNewLocation,
    /// The kind is not an operation of the record's family.
    #[error("{kind} is not a {variant} operation")]
    KindNotAllowed {
        /// The task's kind.
        kind: TaskKind,
        /// The record's family.
        variant: TaskVariant,
    },
}

impl Task {
    /// Add task at `(x, y)`.
    pub const fn add(x: i32, y: i32, building: BuildingType) -> Self {
        Self::Map(MapTask {
            kind: TaskKind::Add,
            location: Some(GridPoint::new(x, y)),
            new_location: None,
            building,
        })
    }

    /// Delete task at `(x, y)`.
    pub const fn delete(x: i32, y: i32) -> Self {
        Self::Map(MapTask {
            kind: TaskKind::Delete,
            location: Some(GridPoint::new(x, y)),
            new_location: None,
            building: BuildingType::NoBuilding,
        })
    }

    /// Move task from `from` to `to`.
    pub const fn relocate(from: GridPoint, to: GridPoint) -> Self {
        Self::Map(MapTask {
            kind: TaskKind::Move,
            location: Some(from),
            new_location: Some(to),
            building: BuildingType::NoBuilding,
        })
    }

    /// Buy task.
    pub const fn buy(resources: ResourceBundle) -> Self {
        Self::Store(StoreTask {
            kind: TaskKind::Buy,
            resources,
        })
    }

    /// Sell task.
    pub const fn sell(resources: ResourceBundle) -> Self {
        Self::Store(StoreTask {
            kind: TaskKind::Sell,
            resources,
        })
    }

    /// The kind the record carries (possibly the sentinel).
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::Map(t) => t.kind,
            Self::Store(t) => t.kind,
        }
    }

    /// The record's family.
    pub const fn variant(&self) -> TaskVariant {
        match self {
            Self::Map(_) => TaskVariant::Map,
            Self::Store(_) => TaskVariant::Store,
        }
    }

    /// Validate the record's shape and produce the operation it describes.
    pub const fn action(&self) -> Result<TaskAction, TaskShapeError> {
        match self {
            Self::Map(task) => {
                let Some(at) = task.location else {
                    return match task.kind {
                        TaskKind::Add | TaskKind::Delete | TaskKind::Move => {
                            Err(TaskShapeError::MissingLocation { kind: task.kind })
                        }
                        kind => Err(TaskShapeError::KindNotAllowed {
                            kind,
                            variant: TaskVariant::Map,
                        }),
                    };
                };
                match task.kind {
                    TaskKind::Add => Ok(TaskAction::Add {
                        at,
                        building: task.building,
                    }),
                    TaskKind::Delete => Ok(TaskAction::Delete { at }),
                    TaskKind::Move => match task.new_location {
                        Some(to) => Ok(TaskAction::Move { from: at, to }),
                        None => Err(TaskShapeError::MissingNewLocation),
                    },
                    kind => Err(TaskShapeError::KindNotAllowed {
                        kind,
                        variant: TaskVariant::Map,
                    }),
                }
            }
            Self::Store(task) => match task.kind {
                TaskKind::Buy => Ok(TaskAction::Buy(task.resources)),
                TaskKind::Sell => Ok(TaskAction::Sell(task.resources)),
                kind => Err(TaskShapeError::KindNotAllowed {
                    kind,
                    variant: TaskVariant::Store,
                }),
            },
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(t) => {
                write!(f, "{}", t.kind)?;
                if t.building.is_building() {
                    write!(f, " {}", t.building)?;
                }
                if let Some(at) = t.location {
                    write!(f, " at {at}")?;
                }
                if let Some(to) = t.new_location {
                    write!(f, " to {to}")?;
                }
                Ok(())
            }
            Self::Store(t) => write!(f, "{} [{}]", t.kind, t.resources),
        }
    }
}
