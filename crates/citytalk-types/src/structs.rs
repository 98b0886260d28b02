//! Core value structs: grid coordinates and resource bundles.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::Resource;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Integer grid coordinate of a tile. `(0, 0, 0)` is the bottom-left cell.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coord {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing upwards.
    pub y: i32,
    /// Layer. The game only uses `0`.
    pub z: i32,
}

impl Coord {
    /// Create a coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Create a coordinate on the ground layer.
    pub const fn ground(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A two-dimensional location as it appears in task JSON (`{"X": 1, "Y": 2}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column.
    #[serde(rename = "X", alias = "x")]
    pub x: i32,
    /// Row.
    #[serde(rename = "Y", alias = "y")]
    pub y: i32,
}

impl GridPoint {
    /// Create a grid point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<GridPoint> for Coord {
    fn from(p: GridPoint) -> Self {
        Self::ground(p.x, p.y)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Resource bundle
// ---------------------------------------------------------------------------

/// Six named counters, used both as the ledger's holdings and as the delta
/// carried by Buy/Sell tasks.
///
/// Missing counters deserialize as `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceBundle {
    /// Wood units.
    pub wood: i64,
    /// Salt units.
    pub salt: i64,
    /// Stone units.
    pub stone: i64,
    /// Iron units.
    pub iron: i64,
    /// Money.
    pub money: i64,
    /// Food units.
    pub food: i64,
}

impl ResourceBundle {
    /// Create a bundle from all six counters.
    pub const fn new(wood: i64, salt: i64, stone: i64, iron: i64, money: i64, food: i64) -> Self {
        Self {
            wood,
            salt,
            stone,
            iron,
            money,
            food,
        }
    }

    /// Read one counter.
    pub const fn get(&self, resource: Resource) -> i64 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Salt => self.salt,
            Resource::Stone => self.stone,
            Resource::Iron => self.iron,
            Resource::Money => self.money,
            Resource::Food => self.food,
        }
    }

    /// Mutable access to one counter.
    pub const fn get_mut(&mut self, resource: Resource) -> &mut i64 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Salt => &mut self.salt,
            Resource::Stone => &mut self.stone,
            Resource::Iron => &mut self.iron,
            Resource::Money => &mut self.money,
            Resource::Food => &mut self.food,
        }
    }

    /// Return a copy with one counter replaced.
    #[must_use]
    pub const fn with(mut self, resource: Resource, quantity: i64) -> Self {
        *self.get_mut(resource) = quantity;
        self
    }

    /// Whether every traded counter is zero. Money is not considered.
    pub fn is_empty(&self) -> bool {
        Resource::TRADED.iter().all(|r| self.get(*r) == 0)
    }

    /// First traded counter holding a negative quantity, if any.
    pub fn first_negative(&self) -> Option<Resource> {
        Resource::TRADED.iter().copied().find(|r| self.get(*r) < 0)
    }

    /// Store value of the bundle: sum of unit price times quantity over the
    /// traded counters. Money is excluded.
    ///
    /// Returns `None` on overflow.
    pub fn price(&self) -> Option<i64> {
        let mut total: i64 = 0;
        for resource in Resource::TRADED {
            let unit = resource.unit_price()?;
            let line = self.get(resource).checked_mul(unit)?;
            total = total.checked_add(line)?;
        }
        Some(total)
    }
}

impl fmt::Display for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for resource in Resource::ALL {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{resource}: {}", self.get(resource))?;
        }
        Ok(())
    }
}
