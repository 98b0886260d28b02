//! Default starting layout.
//!
//! A 10 x 5 grid on layer 0: a wood patch in the upper-left corner, a river
//! running north-south through column 5, Grass everywhere else, and two
//! buildings already placed (a House at (3, 3) and a `LumberjackHut` at
//! (4, 3)).

use citytalk_types::{BuildingType, Coord, Terrain};

use crate::world_model::WorldModel;

/// Grid width in tiles.
pub const GRID_WIDTH: i32 = 10;

/// Grid height in tiles.
pub const GRID_HEIGHT: i32 = 5;

/// Buildings present before the first command.
const STARTING_BUILDINGS: [(i32, i32, BuildingType); 2] = [
    (3, 3, BuildingType::House),
    (4, 3, BuildingType::LumberjackHut),
];

/// Terrain of the default layout at `(x, y)`.
const fn default_terrain(x: i32, y: i32) -> Terrain {
    if x == 5 {
        Terrain::River
    } else if (x < 3 && y >= 3) || (x < 2 && y == 2) {
        Terrain::Wood
    } else {
        Terrain::Grass
    }
}

/// Build the default starting world.
pub fn create_starting_world() -> WorldModel {
    let mut world = WorldModel::new();
    for y in 0..GRID_HEIGHT {
        for x in 0..GRID_WIDTH {
            world.upsert_tile(Coord::ground(x, y), default_terrain(x, y));
        }
    }
    for (x, y, building) in STARTING_BUILDINGS {
        world.upsert_tile(Coord::ground(x, y), building);
    }
    tracing::debug!(tiles = world.tile_count(), "starting world created");
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_the_whole_grid() {
        let world = create_starting_world();
        assert_eq!(world.tile_count(), 50);
    }

    #[test]
    fn starting_buildings_are_placed() {
        let world = create_starting_world();
        assert_eq!(world.building_at(Coord::ground(3, 3)), BuildingType::House);
        assert_eq!(world.building_at(Coord::ground(4, 3)), BuildingType::LumberjackHut);
        assert_eq!(world.building_at(Coord::ground(6, 2)), BuildingType::NoBuilding);
    }

    #[test]
    fn river_and_wood_follow_the_layout() {
        let world = create_starting_world();
        assert_eq!(world.tiles_of_type("River").len(), 5);
        // (0..3, 3..5) plus (0..2, 2)
        assert_eq!(world.tiles_of_type("Wood").len(), 8);
    }

    #[test]
    fn compact_grid_matches_layout() {
        let grid = create_starting_world().snapshot_as_compact_grid();
        let rows: Vec<&str> = grid.lines().collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows.first().copied(), Some("WWWGGRGGGG"));
        assert_eq!(rows.get(1).copied(), Some("WWWHoLuRGGGG"));
        assert_eq!(rows.last().copied(), Some("GGGGGRGGGG"));
    }
}
