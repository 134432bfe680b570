//! Unit catalog and base stats

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of unit a player can buy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Vanguard, // Tank, melee
    Ranger,   // Long range, fragile
    Mage,     // Heavy hitter, mid range
}

/// Base stats for a unit type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitStats {
    pub hp: f32,
    pub damage: f32,
    /// Attack range in board units
    pub range: f32,
    /// Movement per frame at the 60 Hz baseline
    pub speed: f32,
    pub cost: u32,
}

impl UnitType {
    pub fn all() -> [UnitType; 3] {
        [UnitType::Vanguard, UnitType::Ranger, UnitType::Mage]
    }

    pub fn stats(&self) -> UnitStats {
        match self {
            UnitType::Vanguard => UnitStats {
                hp: 1500.0,
                damage: 10.0,
                range: 60.0,
                speed: 1.8,
                cost: 1,
            },
            UnitType::Ranger => UnitStats {
                hp: 80.0,
                damage: 18.0,
                range: 260.0,
                speed: 2.2,
                cost: 2,
            },
            UnitType::Mage => UnitStats {
                hp: 70.0,
                damage: 30.0,
                range: 180.0,
                speed: 1.6,
                cost: 3,
            },
        }
    }

    pub fn cost(&self) -> u32 {
        self.stats().cost
    }

    /// Gold returned when this unit is sold: half the cost, at least 1
    pub fn sell_refund(&self) -> u32 {
        (self.cost() / 2).max(1)
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnitType::Vanguard => "Vanguard",
            UnitType::Ranger => "Ranger",
            UnitType::Mage => "Mage",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitType::all()
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| s.to_string())
    }
}
