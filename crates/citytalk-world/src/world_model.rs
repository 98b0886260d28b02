//! Tile registry: one label per grid coordinate.
//!
//! The [`WorldModel`] is the authoritative store of the city. Every cell holds
//! either a terrain kind or a building kind; a coordinate with no entry reads
//! as [`TileKind::GRASS`]. Mutations are visible to the next read immediately,
//! and the three projections ([`WorldModel::snapshot_as_table`],
//! [`WorldModel::snapshot_as_array`], [`WorldModel::snapshot_as_compact_grid`])
//! are computed from the live map on every call, so they never go stale.

use std::collections::BTreeMap;

use citytalk_types::{BuildingType, Coord, TileKind};
use serde::Serialize;

use crate::error::WorldError;
use crate::starting_world::{GRID_HEIGHT, GRID_WIDTH};
use crate::tile_table::TileTable;

/// One tile as it appears in the array projection.
///
/// Coordinates are floats on the wire (`{"x": 6.0, "y": 2.0, "type": "House"}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileRecord {
    /// Column.
    pub x: f64,
    /// Row.
    pub y: f64,
    /// Terrain or building label.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The tile registry.
///
/// Backed by a `BTreeMap` keyed on [`Coord`], which gives insert-or-replace
/// semantics and deterministic iteration (x, then y, then z).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldModel {
    /// Every known tile.
    tiles: BTreeMap<Coord, TileKind>,
}

impl WorldModel {
    /// Create an empty world.
    pub const fn new() -> Self {
        Self {
            tiles: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------

    /// Set the tile at `coord`, overwriting whatever was there.
    pub fn upsert_tile(&mut self, coord: Coord, kind: impl Into<TileKind>) {
        let kind = kind.into();
        tracing::trace!(x = coord.x, y = coord.y, z = coord.z, tile = kind.label(), "tile upserted");
        self.tiles.insert(coord, kind);
    }

    /// Reset the tile at `coord` to Grass.
    ///
    /// Afterwards [`Self::building_at`] reports [`BuildingType::NoBuilding`].
    /// Calling this twice is the same as calling it once.
    pub fn remove_tile(&mut self, coord: Coord) {
        self.upsert_tile(coord, TileKind::GRASS);
    }

    /// Move the building at `from` to `to`: the source becomes Grass, the
    /// destination is overwritten with `building`.
    ///
    /// The destination is not checked for an existing building.
    pub fn relocate_building(&mut self, from: Coord, to: Coord, building: BuildingType) {
        self.remove_tile(from);
        self.upsert_tile(to, building);
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The stored label at `coord`, if any.
    pub fn tile_at(&self, coord: Coord) -> Option<TileKind> {
        self.tiles.get(&coord).copied()
    }

    /// The label at `coord`, with absent entries reading as Grass.
    pub fn kind_at(&self, coord: Coord) -> TileKind {
        self.tile_at(coord).unwrap_or(TileKind::GRASS)
    }

    /// The building at `coord`, or [`BuildingType::NoBuilding`] when the
    /// tile is terrain or absent.
    pub fn building_at(&self, coord: Coord) -> BuildingType {
        self.kind_at(coord).building()
    }

    /// All coordinates whose label is exactly `label`.
    ///
    /// The comparison is case-sensitive; `"house"` matches nothing.
    pub fn tiles_of_type(&self, label: &str) -> Vec<Coord> {
        self.tiles
            .iter()
            .filter(|(_, kind)| kind.label() == label)
            .map(|(coord, _)| *coord)
            .collect()
    }

    /// Number of buildings of the given type.
    pub fn count_buildings(&self, building: BuildingType) -> usize {
        self.tiles
            .values()
            .filter(|kind| kind.building() == building && building.is_building())
            .count()
    }

    /// Number of stored entries.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate over every stored entry in coordinate order.
    pub fn tiles(&self) -> impl Iterator<Item = (&Coord, &TileKind)> {
        self.tiles.iter()
    }

    // -------------------------------------------------------------------
    // Projections
    // -------------------------------------------------------------------

    /// Copy the registry into a fresh in-memory relational table.
    ///
    /// The table is detached: statements run against it never change the
    /// registry.
    pub fn snapshot_as_table(&self) -> Result<TileTable, WorldError> {
        TileTable::from_tiles(self.tiles())
    }

    /// Every tile as a flat record list, sorted by y descending then x
    /// ascending.
    pub fn snapshot_as_array(&self) -> Vec<TileRecord> {
        let mut entries: Vec<(&Coord, &TileKind)> = self.tiles.iter().collect();
        entries.sort_by(|(a, _), (b, _)| b.y.cmp(&a.y).then(a.x.cmp(&b.x)).then(a.z.cmp(&b.z)));
        entries
            .into_iter()
            .map(|(coord, kind)| TileRecord {
                x: f64::from(coord.x),
                y: f64::from(coord.y),
                kind: kind.label().to_owned(),
            })
            .collect()
    }

    /// The array projection serialized as JSON.
    pub fn snapshot_as_json(&self) -> Result<String, WorldError> {
        Ok(serde_json::to_string(&self.snapshot_as_array())?)
    }

    /// The bounding box of known tiles rendered as abbreviation rows.
    ///
    /// Only cells inside the playable area (`0..GRID_WIDTH` by
    /// `0..GRID_HEIGHT`) are drawn; tiles outside it are left out so the grid
    /// stays bounded whatever coordinates the registry holds. Rows run from the highest y to the lowest, columns from the lowest x to
    /// the highest. Cells without an entry render as a single space. Each row
    /// ends with `\n`. When several layers share an (x, y) cell the highest z
    /// is shown. Types that share leading letters (`Stone` and `Store`, for
    /// example) are indistinguishable in this form.
    pub fn snapshot_as_compact_grid(&self) -> String {
        // Ascending z iteration means later inserts are higher layers.
        let mut plane: BTreeMap<(i32, i32), TileKind> = BTreeMap::new();
        let mut outside = 0_usize;
        for (coord, kind) in &self.tiles {
            if (0..GRID_WIDTH).contains(&coord.x) && (0..GRID_HEIGHT).contains(&coord.y) {
                plane.insert((coord.x, coord.y), *kind);
            } else {
                outside = outside.saturating_add(1);
            }
        }
        if outside > 0 {
            tracing::debug!(outside, "tiles outside the playable area left off the grid");
        }

        let Some(bounds) = Bounds::of(plane.keys().copied()) else {
            return String::new();
        };

        let mut grid = String::new();
        for y in (bounds.min_y..=bounds.max_y).rev() {
            for x in bounds.min_x..=bounds.max_x {
                match plane.get(&(x, y)) {
                    Some(kind) => grid.push_str(kind.abbreviation()),
                    None => grid.push(' '),
                }
            }
            grid.push('\n');
        }
        grid
    }
}

/// Inclusive bounding box over (x, y) cells.
struct Bounds {
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

impl Bounds {
    fn of(cells: impl Iterator<Item = (i32, i32)>) -> Option<Self> {
        cells.fold(None, |acc, (x, y)| {
            Some(match acc {
                None => Self {
                    min_x: x,
                    max_x: x,
                    min_y: y,
                    max_y: y,
                },
                Some(b) => Self {
                    min_x: b.min_x.min(x),
                    max_x: b.max_x.max(x),
                    min_y: b.min_y.min(y),
                    max_y: b.max_y.max(y),
                },
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use citytalk_types::Terrain;

    use super::*;

    #[test]
    fn absent_tile_reads_as_grass_without_building() {
        let world = WorldModel::new();
        assert_eq!(world.kind_at(Coord::ground(3, 3)), TileKind::GRASS);
        assert_eq!(world.building_at(Coord::ground(3, 3)), BuildingType::NoBuilding);
        assert!(world.tile_at(Coord::ground(3, 3)).is_none());
    }

    #[test]
    fn upsert_overwrites_previous_entry() {
        let mut world = WorldModel::new();
        let c = Coord::ground(2, 1);
        world.upsert_tile(c, Terrain::River);
        world.upsert_tile(c, BuildingType::Farm);
        assert_eq!(world.building_at(c), BuildingType::Farm);
        assert_eq!(world.tile_count(), 1);

        world.upsert_tile(c, Terrain::Stone);
        assert_eq!(world.kind_at(c).label(), "Stone");
        assert_eq!(world.building_at(c), BuildingType::NoBuilding);
    }

    #[test]
    fn remove_tile_is_idempotent() {
        let mut world = WorldModel::new();
        let c = Coord::ground(4, 4);
        world.upsert_tile(c, BuildingType::House);

        world.remove_tile(c);
        let once = world.clone();
        world.remove_tile(c);

        assert_eq!(world, once);
        assert_eq!(world.building_at(c), BuildingType::NoBuilding);
        assert_eq!(world.kind_at(c), TileKind::GRASS);
    }

    #[test]
    fn relocate_clears_source_and_overwrites_destination() {
        let mut world = WorldModel::new();
        world.upsert_tile(Coord::ground(1, 1), BuildingType::Store);
        world.upsert_tile(Coord::ground(2, 2), BuildingType::House);

        world.relocate_building(Coord::ground(1, 1), Coord::ground(2, 2), BuildingType::Store);

        assert_eq!(world.building_at(Coord::ground(1, 1)), BuildingType::NoBuilding);
        assert_eq!(world.building_at(Coord::ground(2, 2)), BuildingType::Store);
    }

    #[test]
    fn tiles_of_type_matches_exact_label() {
        let mut world = WorldModel::new();
        world.upsert_tile(Coord::ground(0, 0), BuildingType::House);
        world.upsert_tile(Coord::ground(5, 1), BuildingType::House);
        world.upsert_tile(Coord::ground(2, 2), Terrain::Wood);

        assert_eq!(
            world.tiles_of_type("House"),
            vec![Coord::ground(0, 0), Coord::ground(5, 1)]
        );
        assert!(world.tiles_of_type("house").is_empty());
        assert_eq!(world.count_buildings(BuildingType::House), 2);
    }

    #[test]
    fn array_projection_is_sorted_y_desc_x_asc() {
        let mut world = WorldModel::new();
        world.upsert_tile(Coord::ground(1, 0), Terrain::River);
        world.upsert_tile(Coord::ground(0, 0), Terrain::Grass);
        world.upsert_tile(Coord::ground(0, 1), Terrain::Wood);

        let labels: Vec<String> = world
            .snapshot_as_array()
            .into_iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(labels, vec!["Wood", "Grass", "River"]);
    }

    #[test]
    fn json_projection_uses_type_key() {
        let mut world = WorldModel::new();
        world.upsert_tile(Coord::ground(6, 2), BuildingType::House);
        let json = world.snapshot_as_json().unwrap_or_default();
        assert_eq!(json, r#"[{"x":6.0,"y":2.0,"type":"House"}]"#);
    }

    #[test]
    fn compact_grid_puts_highest_row_first() {
        let mut world = WorldModel::new();
        world.upsert_tile(Coord::ground(0, 0), Terrain::Grass);
        world.upsert_tile(Coord::ground(1, 0), Terrain::River);
        world.upsert_tile(Coord::ground(0, 1), Terrain::Wood);

        let grid = world.snapshot_as_compact_grid();
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines, vec!["W ", "GR"]);
    }

    #[test]
    fn compact_grid_shows_highest_layer() {
        let mut world = WorldModel::new();
        world.upsert_tile(Coord::new(0, 0, 0), Terrain::Grass);
        world.upsert_tile(Coord::new(0, 0, 1), BuildingType::House);
        assert_eq!(world.snapshot_as_compact_grid(), "Ho\n");
    }

    #[test]
    fn compact_grid_ignores_tiles_outside_the_playable_area() {
        let mut world = WorldModel::new();
        world.upsert_tile(Coord::ground(0, 0), Terrain::Grass);
        world.upsert_tile(Coord::ground(1_000_000_000, 0), BuildingType::House);
        world.upsert_tile(Coord::ground(-4, 2), BuildingType::Farm);
        assert_eq!(world.snapshot_as_compact_grid(), "G\n");
    }

    #[test]
    fn empty_world_has_empty_grid() {
        assert_eq!(WorldModel::new().snapshot_as_compact_grid(), "");
        assert!(WorldModel::new().snapshot_as_array().is_empty());
    }
}
