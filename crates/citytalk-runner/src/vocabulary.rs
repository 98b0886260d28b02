//! Game vocabulary substituted into every prompt.
//!
//! The lists are derived from the enums in `citytalk-types`, so adding a
//! building or resource there is enough for the prompts to pick it up.

use citytalk_types::{BuildingType, Resource, TaskKind, Terrain};
use citytalk_world::{GRID_HEIGHT, GRID_WIDTH};

/// Display strings for the game's closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameVocabulary {
    /// Every task type, comma separated.
    pub task_types: String,
    /// Task types valid in store conversations.
    pub store_task_types: String,
    /// Placeable buildings, comma separated.
    pub buildings: String,
    /// Terrain kinds, comma separated.
    pub terrains: String,
    /// One `Building: Resource: n, ...` line per building.
    pub building_costs: String,
    /// One `Resource: n money` line per traded resource.
    pub resource_prices: String,
    /// Grid width in tiles.
    pub grid_width: i32,
    /// Grid height in tiles.
    pub grid_height: i32,
}

impl Default for GameVocabulary {
    fn default() -> Self {
        Self {
            task_types: join_labels(TaskKind::OPERATIONS.into_iter().map(TaskKind::label)),
            store_task_types: join_labels(
                TaskKind::OPERATIONS
                    .into_iter()
                    .filter(|k| k.is_store_kind())
                    .map(TaskKind::label),
            ),
            buildings: join_labels(BuildingType::PLACEABLE.into_iter().map(BuildingType::label)),
            terrains: join_labels(Terrain::ALL.into_iter().map(Terrain::label)),
            building_costs: building_costs(),
            resource_prices: resource_prices(),
            grid_width: GRID_WIDTH,
            grid_height: GRID_HEIGHT,
        }
    }
}

fn join_labels(labels: impl Iterator<Item = &'static str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

fn building_costs() -> String {
    BuildingType::PLACEABLE
        .iter()
        .map(|building| {
            let parts: Vec<String> = building
                .cost()
                .iter()
                .map(|(resource, amount)| format!("{resource}: {amount}"))
                .collect();
            format!("{building}: {}", parts.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn resource_prices() -> String {
    Resource::TRADED
        .iter()
        .filter_map(|resource| {
            resource
                .unit_price()
                .map(|price| format!("{resource}: {price} money"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_follow_the_enums() {
        let vocabulary = GameVocabulary::default();
        assert_eq!(vocabulary.task_types, "Add, Delete, Move, Buy, Sell");
        assert_eq!(vocabulary.store_task_types, "Buy, Sell");
        assert_eq!(
            vocabulary.buildings,
            "FishingHut, House, Store, IronMine, LumberjackHut, Farm"
        );
    }

    #[test]
    fn price_and_cost_lines() {
        let vocabulary = GameVocabulary::default();
        assert_eq!(
            vocabulary.resource_prices,
            "Wood: 1 money\nSalt: 2 money\nStone: 3 money\nIron: 4 money\nFood: 2 money"
        );
        assert!(
            vocabulary
                .building_costs
                .lines()
                .any(|line| line == "House: Wood: 50, Stone: 30")
        );
        assert_eq!(vocabulary.building_costs.lines().count(), 6);
    }
}
