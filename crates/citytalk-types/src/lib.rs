//! Shared type definitions for the `CityTalk` command pipeline.
//!
//! This crate is the single source of truth for the game vocabulary used
//! across the workspace: what a tile can hold, which tasks exist, which
//! resources the store trades, and the task records that flow from the
//! LLM extractor into the executor.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for conversions and queued tasks
//! - [`enums`] -- Terrain, building, tile, task-kind and resource enumerations
//! - [`structs`] -- Grid coordinates and the six-counter [`ResourceBundle`]
//! - [`task`] -- Lenient task records and the closed [`TaskAction`] sum type

pub mod enums;
pub mod ids;
pub mod structs;
pub mod task;

// Re-export all public types at crate root for convenience.
pub use enums::{BuildingType, LabelError, Resource, TaskKind, Terrain, TileKind, parse_or_default};
pub use ids::{ConversionId, TaskId};
pub use structs::{Coord, GridPoint, ResourceBundle};
pub use task::{MapTask, StoreTask, Task, TaskAction, TaskShapeError, TaskVariant};
