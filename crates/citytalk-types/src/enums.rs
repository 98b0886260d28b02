//! Enumeration types for the `CityTalk` game vocabulary.
//!
//! Every enum here has a canonical text label (its variant name) which is
//! what the tile table stores, what prompts enumerate, and what the LLM is
//! expected to echo back. Label parsing is case-insensitive.
//!
//! Two enums carry an explicit sentinel variant ([`BuildingType::NoBuilding`]
//! and [`TaskKind::None`]). They exist so that [`parse_or_default`] can turn
//! an unrecognized label into a defined value instead of failing the whole
//! batch the label came from.

use core::any::type_name;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A label did not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} label: {label:?}")]
pub struct LabelError {
    /// Which enum the label was parsed for.
    pub kind: &'static str,
    /// The offending label.
    pub label: String,
}

/// Implements `label`, `Display` and case-insensitive `FromStr` from an
/// `ALL` table.
macro_rules! impl_label {
    ($name:ident, $kind:literal) => {
        impl $name {
            /// Canonical text label of this variant.
            pub fn label(self) -> &'static str {
                self.as_static()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_static())
            }
        }

        impl FromStr for $name {
            type Err = LabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_static().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| LabelError {
                        kind: $kind,
                        label: wanted.to_owned(),
                    })
            }
        }
    };
}

/// Parse a label leniently: missing, empty or unrecognized input yields
/// `T::default()` (the sentinel) instead of an error.
///
/// Unrecognized input is logged so operators can see what the LLM produced.
pub fn parse_or_default<T>(value: Option<&str>) -> T
where
    T: FromStr + Default,
{
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return T::default();
    };
    raw.parse().unwrap_or_else(|_| {
        warn!(
            value = raw,
            target_type = type_name::<T>(),
            "unrecognized label, falling back to default"
        );
        T::default()
    })
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Natural ground a tile can hold when no building stands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open grass; the only terrain a building may be placed on.
    Grass,
    /// Running water.
    River,
    /// Iron deposit.
    Iron,
    /// Forest.
    Wood,
    /// Rock.
    Stone,
}

impl Terrain {
    /// Every terrain kind, in declaration order.
    pub const ALL: [Self; 5] = [Self::Grass, Self::River, Self::Iron, Self::Wood, Self::Stone];

    const fn as_static(self) -> &'static str {
        match self {
            Self::Grass => "Grass",
            Self::River => "River",
            Self::Iron => "Iron",
            Self::Wood => "Wood",
            Self::Stone => "Stone",
        }
    }

    /// One-letter minimap abbreviation.
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Grass => "G",
            Self::River => "R",
            Self::Iron => "I",
            Self::Wood => "W",
            Self::Stone => "S",
        }
    }
}

impl_label!(Terrain, "terrain");

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// A building that can be placed on a tile.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BuildingType {
    /// Hut for fishing at the river.
    FishingHut,
    /// Dwelling; every house adds ten inhabitants.
    House,
    /// Trading post.
    Store,
    /// Mine placed near iron.
    IronMine,
    /// Hut for cutting wood.
    LumberjackHut,
    /// Farmland.
    Farm,
    /// Sentinel: no building (terrain tile, absent tile, or unparseable label).
    #[default]
    NoBuilding,
}

impl BuildingType {
    /// Every variant including the [`BuildingType::NoBuilding`] sentinel.
    pub const ALL: [Self; 7] = [
        Self::FishingHut,
        Self::House,
        Self::Store,
        Self::IronMine,
        Self::LumberjackHut,
        Self::Farm,
        Self::NoBuilding,
    ];

    /// Every real building, without the sentinel.
    pub const PLACEABLE: [Self; 6] = [
        Self::FishingHut,
        Self::House,
        Self::Store,
        Self::IronMine,
        Self::LumberjackHut,
        Self::Farm,
    ];

    const fn as_static(self) -> &'static str {
        match self {
            Self::FishingHut => "FishingHut",
            Self::House => "House",
            Self::Store => "Store",
            Self::IronMine => "IronMine",
            Self::LumberjackHut => "LumberjackHut",
            Self::Farm => "Farm",
            Self::NoBuilding => "NoBuilding",
        }
    }

    /// Whether this is a real building rather than the sentinel.
    pub const fn is_building(self) -> bool {
        !matches!(self, Self::NoBuilding)
    }

    /// Two-letter minimap abbreviation.
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::FishingHut => "Fi",
            Self::House => "Ho",
            Self::Store => "St",
            Self::IronMine => "Ir",
            Self::LumberjackHut => "Lu",
            Self::Farm => "Fa",
            Self::NoBuilding => " ",
        }
    }

    /// Construction cost as shown to the LLM.
    ///
    /// The executor does not charge these; they only inform the prompts.
    pub const fn cost(self) -> &'static [(Resource, i64)] {
        match self {
            Self::FishingHut => &[(Resource::Wood, 30), (Resource::Stone, 20)],
            Self::House => &[(Resource::Wood, 50), (Resource::Stone, 30)],
            Self::Store => &[(Resource::Wood, 100), (Resource::Stone, 80), (Resource::Iron, 20)],
            Self::IronMine => &[(Resource::Wood, 80), (Resource::Stone, 100)],
            Self::LumberjackHut => &[(Resource::Wood, 40), (Resource::Stone, 60)],
            Self::Farm => &[(Resource::Wood, 40), (Resource::Stone, 20)],
            Self::NoBuilding => &[],
        }
    }
}

impl_label!(BuildingType, "building");

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// What a single grid cell holds: either terrain or a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TileKind {
    /// Natural ground.
    Terrain(Terrain),
    /// A placed building.
    Building(BuildingType),
}

impl TileKind {
    /// Plain grass, the value an absent or cleared tile reads as.
    pub const GRASS: Self = Self::Terrain(Terrain::Grass);

    /// Canonical label stored in the tile table.
    pub fn label(self) -> &'static str {
        match self {
            Self::Terrain(t) => t.label(),
            Self::Building(b) => b.label(),
        }
    }

    /// The building on this tile, or [`BuildingType::NoBuilding`].
    pub const fn building(self) -> BuildingType {
        match self {
            Self::Terrain(_) => BuildingType::NoBuilding,
            Self::Building(b) => b,
        }
    }

    /// Minimap abbreviation: one letter for terrain, two for buildings.
    ///
    /// Abbreviations are lossy (`Stone` and `Store` both start with `S`).
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Terrain(t) => t.abbreviation(),
            Self::Building(b) => b.abbreviation(),
        }
    }
}

impl From<Terrain> for TileKind {
    fn from(t: Terrain) -> Self {
        Self::Terrain(t)
    }
}

impl From<BuildingType> for TileKind {
    fn from(b: BuildingType) -> Self {
        if b.is_building() {
            Self::Building(b)
        } else {
            Self::GRASS
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TileKind {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(b) = s.parse::<BuildingType>()
            && b.is_building()
        {
            return Ok(Self::Building(b));
        }
        s.parse::<Terrain>().map(Self::Terrain).map_err(|e| LabelError {
            kind: "tile",
            label: e.label,
        })
    }
}

impl From<TileKind> for String {
    fn from(kind: TileKind) -> Self {
        kind.label().to_owned()
    }
}

impl TryFrom<String> for TileKind {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Operation a task asks for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TaskKind {
    /// Place a building.
    Add,
    /// Remove a building.
    Delete,
    /// Relocate a building.
    Move,
    /// Purchase resources from the store.
    Buy,
    /// Sell resources to the store.
    Sell,
    /// Sentinel for a missing or unparseable kind.
    #[default]
    None,
}

impl TaskKind {
    /// Every variant including the [`TaskKind::None`] sentinel.
    pub const ALL: [Self; 6] = [
        Self::Add,
        Self::Delete,
        Self::Move,
        Self::Buy,
        Self::Sell,
        Self::None,
    ];

    /// The kinds the LLM may choose from, in prompt order.
    pub const OPERATIONS: [Self; 5] = [Self::Add, Self::Delete, Self::Move, Self::Buy, Self::Sell];

    const fn as_static(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Delete => "Delete",
            Self::Move => "Move",
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::None => "None",
        }
    }

    /// Whether this kind operates on the map.
    pub const fn is_map_kind(self) -> bool {
        matches!(self, Self::Add | Self::Delete | Self::Move)
    }

    /// Whether this kind operates on the store.
    pub const fn is_store_kind(self) -> bool {
        matches!(self, Self::Buy | Self::Sell)
    }
}

impl_label!(TaskKind, "task kind");

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A counter in the city's resource ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Lumber.
    Wood,
    /// Salt.
    Salt,
    /// Stone blocks.
    Stone,
    /// Iron.
    Iron,
    /// Currency. Has no unit price of its own.
    Money,
    /// Food, eaten by the population over time.
    Food,
}

impl Resource {
    /// Every counter, in ledger order.
    pub const ALL: [Self; 6] = [
        Self::Wood,
        Self::Salt,
        Self::Stone,
        Self::Iron,
        Self::Money,
        Self::Food,
    ];

    /// The counters the store buys and sells (everything except money).
    pub const TRADED: [Self; 5] = [Self::Wood, Self::Salt, Self::Stone, Self::Iron, Self::Food];

    const fn as_static(self) -> &'static str {
        match self {
            Self::Wood => "Wood",
            Self::Salt => "Salt",
            Self::Stone => "Stone",
            Self::Iron => "Iron",
            Self::Money => "Money",
            Self::Food => "Food",
        }
    }

    /// Store price per unit, or `None` for [`Resource::Money`].
    pub const fn unit_price(self) -> Option<i64> {
        match self {
            Self::Wood => Some(1),
            Self::Salt | Self::Food => Some(2),
            Self::Stone => Some(3),
            Self::Iron => Some(4),
            Self::Money => None,
        }
    }
}

impl_label!(Resource, "resource");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("house".parse::<BuildingType>(), Ok(BuildingType::House));
        assert_eq!(" SELL ".parse::<TaskKind>(), Ok(TaskKind::Sell));
        assert_eq!("river".parse::<Terrain>(), Ok(Terrain::River));
        assert!("castle".parse::<BuildingType>().is_err());
    }

    #[test]
    fn lenient_parse_falls_back_to_sentinel() {
        assert_eq!(parse_or_default::<TaskKind>(Some("Teleport")), TaskKind::None);
        assert_eq!(parse_or_default::<TaskKind>(None), TaskKind::None);
        assert_eq!(parse_or_default::<BuildingType>(Some("")), BuildingType::NoBuilding);
        assert_eq!(parse_or_default::<BuildingType>(Some("farm")), BuildingType::Farm);
    }

    #[test]
    fn tile_kind_prefers_buildings_over_terrain() {
        assert_eq!("IronMine".parse::<TileKind>(), Ok(TileKind::Building(BuildingType::IronMine)));
        assert_eq!("Iron".parse::<TileKind>(), Ok(TileKind::Terrain(Terrain::Iron)));
        assert!("NoBuilding".parse::<TileKind>().is_err());
    }

    #[test]
    fn tile_kind_serializes_as_label() {
        let json = serde_json::to_string(&TileKind::Building(BuildingType::Farm)).unwrap_or_default();
        assert_eq!(json, "\"Farm\"");
        let back: Result<TileKind, _> = serde_json::from_str("\"Wood\"");
        assert!(matches!(back, Ok(TileKind::Terrain(Terrain::Wood))));
    }

    #[test]
    fn sentinel_building_maps_to_grass_tile() {
        assert_eq!(TileKind::from(BuildingType::NoBuilding), TileKind::GRASS);
    }

    #[test]
    fn abbreviations_are_one_or_two_letters() {
        assert_eq!(TileKind::GRASS.abbreviation(), "G");
        assert_eq!(TileKind::Building(BuildingType::House).abbreviation(), "Ho");
        // Known collision, kept on purpose.
        assert_eq!(Terrain::Stone.abbreviation(), "S");
        assert!(BuildingType::Store.abbreviation().starts_with('S'));
    }

    #[test]
    fn money_has_no_unit_price() {
        assert_eq!(Resource::Money.unit_price(), None);
        assert_eq!(Resource::Iron.unit_price(), Some(4));
        assert!(!Resource::TRADED.contains(&Resource::Money));
    }
}
