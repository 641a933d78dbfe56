//! Status conditions
//!
//! Tracks which conditions a character currently has:
//! - Binary conditions (blinded, prone, ...) toggled on and off
//! - Exhaustion, graded 0-6, active whenever its level is above 0

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::{Result, RulesError};

/// Highest exhaustion level
pub const MAX_EXHAUSTION: u8 = 6;

/// The closed condition vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Blinded,
    Charmed,
    /// Maintaining a concentration spell
    Concentrating,
    Deafened,
    /// Graded; see [`ConditionSet::set_exhaustion_level`]
    Exhaustion,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
}

impl Condition {
    /// Get all conditions in alphabetical order
    pub fn all() -> &'static [Condition] {
        &[
            Condition::Blinded,
            Condition::Charmed,
            Condition::Concentrating,
            Condition::Deafened,
            Condition::Exhaustion,
            Condition::Frightened,
            Condition::Grappled,
            Condition::Incapacitated,
            Condition::Invisible,
            Condition::Paralyzed,
            Condition::Petrified,
            Condition::Poisoned,
            Condition::Prone,
            Condition::Restrained,
            Condition::Stunned,
            Condition::Unconscious,
        ]
    }

    /// Whether this condition leaves the character unable to take actions
    pub fn prevents_action(&self) -> bool {
        matches!(
            self,
            Condition::Incapacitated
                | Condition::Paralyzed
                | Condition::Petrified
                | Condition::Stunned
                | Condition::Unconscious
        )
    }
}

impl FromStr for Condition {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "blinded" | "blind" => Ok(Condition::Blinded),
            "charmed" => Ok(Condition::Charmed),
            "concentrating" | "concentration" => Ok(Condition::Concentrating),
            "deafened" | "deaf" => Ok(Condition::Deafened),
            "exhaustion" | "exhausted" => Ok(Condition::Exhaustion),
            "frightened" => Ok(Condition::Frightened),
            "grappled" => Ok(Condition::Grappled),
            "incapacitated" => Ok(Condition::Incapacitated),
            "invisible" => Ok(Condition::Invisible),
            "paralyzed" => Ok(Condition::Paralyzed),
            "petrified" => Ok(Condition::Petrified),
            "poisoned" => Ok(Condition::Poisoned),
            "prone" => Ok(Condition::Prone),
            "restrained" => Ok(Condition::Restrained),
            "stunned" => Ok(Condition::Stunned),
            "unconscious" => Ok(Condition::Unconscious),
            _ => Err(RulesError::UnknownEntity(format!("condition '{}'", s))),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Condition::Blinded => "blinded",
            Condition::Charmed => "charmed",
            Condition::Concentrating => "concentrating",
            Condition::Deafened => "deafened",
            Condition::Exhaustion => "exhaustion",
            Condition::Frightened => "frightened",
            Condition::Grappled => "grappled",
            Condition::Incapacitated => "incapacitated",
            Condition::Invisible => "invisible",
            Condition::Paralyzed => "paralyzed",
            Condition::Petrified => "petrified",
            Condition::Poisoned => "poisoned",
            Condition::Prone => "prone",
            Condition::Restrained => "restrained",
            Condition::Stunned => "stunned",
            Condition::Unconscious => "unconscious",
        };
        write!(f, "{}", s)
    }
}

/// A membership transition caused by a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionChange {
    Entered(Condition),
    Left(Condition),
}

/// Conditions on a single character
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "StoredConditionSet")]
pub struct ConditionSet {
    /// Active conditions in the order they were applied
    active: Vec<Condition>,
    exhaustion_level: u8,
}

impl ConditionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a condition on or off.
    ///
    /// Toggling exhaustion moves its level between 0 and 1.
    pub fn toggle(&mut self, condition: Condition) -> ConditionChange {
        if self.is_active(condition) {
            self.remove(condition);
            ConditionChange::Left(condition)
        } else {
            self.add(condition);
            ConditionChange::Entered(condition)
        }
    }

    /// Apply a condition; returns the transition if it was not already active
    pub fn add(&mut self, condition: Condition) -> Option<ConditionChange> {
        if self.is_active(condition) {
            return None;
        }
        if condition == Condition::Exhaustion {
            self.exhaustion_level = 1;
        }
        self.active.push(condition);
        debug!(%condition, "condition entered");
        Some(ConditionChange::Entered(condition))
    }

    /// Clear a condition; returns the transition if it was active
    pub fn remove(&mut self, condition: Condition) -> Option<ConditionChange> {
        let pos = self.active.iter().position(|&c| c == condition)?;
        self.active.remove(pos);
        if condition == Condition::Exhaustion {
            self.exhaustion_level = 0;
        }
        debug!(%condition, "condition left");
        Some(ConditionChange::Left(condition))
    }

    /// Set the exhaustion level in `0..=6`
    pub fn set_exhaustion_level(&mut self, level: u8) -> Result<Option<ConditionChange>> {
        if level > MAX_EXHAUSTION {
            return Err(RulesError::out_of_range(
                "exhaustion level",
                level as i64,
                0,
                MAX_EXHAUSTION as i64,
            ));
        }
        let change = if level == 0 {
            self.remove(Condition::Exhaustion)
        } else {
            self.add(Condition::Exhaustion)
        };
        self.exhaustion_level = level;
        Ok(change)
    }

    pub fn exhaustion_level(&self) -> u8 {
        self.exhaustion_level
    }

    /// Check if a condition is active
    pub fn is_active(&self, condition: Condition) -> bool {
        self.active.contains(&condition)
    }

    /// Active conditions in the order they were applied
    pub fn active_conditions(&self) -> &[Condition] {
        &self.active
    }

    /// Whether any active condition prevents actions
    pub fn is_incapacitated(&self) -> bool {
        self.active.iter().any(|c| c.prevents_action())
    }

    /// Penalty to every d20 test from exhaustion
    pub fn d20_penalty(&self) -> i32 {
        -2 * self.exhaustion_level as i32
    }

    /// Speed reduction in feet from exhaustion
    pub fn speed_penalty(&self) -> u32 {
        5 * self.exhaustion_level as u32
    }

    /// Clear all conditions, returning the transitions in application order
    pub fn clear(&mut self) -> Vec<ConditionChange> {
        self.exhaustion_level = 0;
        self.active.drain(..).map(ConditionChange::Left).collect()
    }
}

/// Serialized form of [`ConditionSet`]; the stored level decides whether
/// exhaustion is active
#[derive(Deserialize)]
struct StoredConditionSet {
    #[serde(default)]
    active: Vec<Condition>,
    #[serde(default)]
    exhaustion_level: u8,
}

impl TryFrom<StoredConditionSet> for ConditionSet {
    type Error = RulesError;

    fn try_from(stored: StoredConditionSet) -> Result<Self> {
        let mut set = ConditionSet::new();
        for condition in stored.active {
            if condition != Condition::Exhaustion || stored.exhaustion_level > 0 {
                set.add(condition);
            }
        }
        set.set_exhaustion_level(stored.exhaustion_level)?;
        Ok(set)
    }
}
