//! Ability score arithmetic
//!
//! Pure derived values: modifiers, proficiency bonus and point-buy costs.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, RulesError};

/// Points available under the standard point-buy method
pub const POINT_BUY_BUDGET: u32 = 27;

/// The standard array, highest first
pub const STANDARD_ARRAY: [i32; 6] = [15, 14, 13, 12, 10, 8];

/// Point-buy cost for scores 8 through 15
const POINT_BUY_COSTS: [u32; 8] = [0, 1, 2, 3, 4, 5, 7, 9];

/// The six abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    /// Get all abilities in sheet order
    pub fn all() -> &'static [Ability] {
        &[
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }

    /// Three-letter abbreviation as used in reference data ("str", "dex", ...)
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "str",
            Ability::Dexterity => "dex",
            Ability::Constitution => "con",
            Ability::Intelligence => "int",
            Ability::Wisdom => "wis",
            Ability::Charisma => "cha",
        }
    }
}

impl FromStr for Ability {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "str" | "strength" => Ok(Ability::Strength),
            "dex" | "dexterity" => Ok(Ability::Dexterity),
            "con" | "constitution" => Ok(Ability::Constitution),
            "int" | "intelligence" => Ok(Ability::Intelligence),
            "wis" | "wisdom" => Ok(Ability::Wisdom),
            "cha" | "charisma" => Ok(Ability::Charisma),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.abbreviation().to_uppercase())
    }
}

/// Ability modifier: `floor((score - 10) / 2)`
pub fn modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Proficiency bonus for a character level in `1..=20`
pub fn proficiency_bonus(level: u32) -> Result<i32> {
    if !(1..=20).contains(&level) {
        return Err(RulesError::out_of_range("character level", level as i64, 1, 20));
    }
    Ok(level.div_ceil(4) as i32 + 1)
}

/// Point-buy cost of a single score
pub fn point_buy_cost(score: i32) -> Result<u32> {
    if !(8..=15).contains(&score) {
        return Err(RulesError::UnsupportedScore(score));
    }
    Ok(POINT_BUY_COSTS[(score - 8) as usize])
}

/// Total point-buy cost of a set of scores
pub fn point_buy_total(scores: &[i32]) -> Result<u32> {
    scores.iter().map(|&s| point_buy_cost(s)).sum()
}
