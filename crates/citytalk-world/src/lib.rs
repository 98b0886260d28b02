//! Tile registry and world projections for the `CityTalk` command pipeline.
//!
//! This crate models the physical city: a fixed grid of tiles, each holding
//! either terrain or a building. It is the authoritative store the executor
//! mutates and the context formatter reads.
//!
//! # Modules
//!
//! - [`error`] -- Error types for world operations.
//! - [`world_model`] -- [`WorldModel`], the tile registry with its three
//!   read-only projections (relational table, record array, compact grid).
//! - [`tile_table`] -- [`TileTable`], an in-memory `SQLite` snapshot of the
//!   registry that LLM-authored queries run against.
//! - [`starting_world`] -- Default 10x5 starting layout.

pub mod error;
pub mod starting_world;
pub mod tile_table;
pub mod world_model;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use starting_world::{GRID_HEIGHT, GRID_WIDTH, create_starting_world};
pub use tile_table::TileTable;
pub use world_model::{TileRecord, WorldModel};
