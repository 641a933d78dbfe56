//! Dice notation parser
//!
//! Parses notation like "2d6+3", "d20", "4d6kh3" and "2d20kl1-1".

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Result, RulesError};

/// Largest number of dice a single formula may roll unless configured otherwise
pub const DEFAULT_MAX_DICE: u32 = 100;

/// Die sizes used by the rules
pub const STANDARD_DICE: [u32; 7] = [4, 6, 8, 10, 12, 20, 100];

// Whitespace may separate tokens but never splits a number
static FORMULA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d*)\s*d\s*(\d+)\s*(?:(k[hl])\s*(\d+))?\s*(?:([+-])\s*(\d+))?\s*$").unwrap()
});

/// Which end of the sorted results a keep clause retains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepMode {
    Highest,
    Lowest,
}

/// A keep clause such as `kh3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keep {
    pub mode: KeepMode,
    pub count: u32,
}

/// A parsed dice formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceFormula {
    /// Number of dice to roll
    pub count: u32,
    /// Number of faces per die
    pub die: u32,
    /// Flat modifier added to the kept dice
    pub modifier: i32,
    /// Optional keep-highest/keep-lowest clause
    pub keep: Option<Keep>,
}

impl DiceFormula {
    /// Create a formula without a keep clause
    pub fn new(count: u32, die: u32, modifier: i32) -> Self {
        Self {
            count,
            die,
            modifier,
            keep: None,
        }
    }

    /// Attach a keep clause
    pub fn keeping(mut self, mode: KeepMode, count: u32) -> Self {
        self.keep = Some(Keep { mode, count });
        self
    }

    /// The d20 test formula: `1d20+modifier`
    pub fn d20(modifier: i32) -> Self {
        Self::new(1, 20, modifier)
    }

    /// How many dice count toward the total
    pub fn kept_count(&self) -> u32 {
        self.keep.map_or(self.count, |k| k.count.min(self.count))
    }

    /// Whether the die is one of the standard polyhedral sizes
    pub fn is_standard_die(&self) -> bool {
        STANDARD_DICE.contains(&self.die)
    }

    /// Get the minimum possible total
    pub fn min(&self) -> i64 {
        self.kept_count() as i64 + self.modifier as i64
    }

    /// Get the maximum possible total
    pub fn max(&self) -> i64 {
        self.kept_count() as i64 * self.die as i64 + self.modifier as i64
    }

    /// Expected total, only defined when every die is kept
    pub fn average(&self) -> Option<f64> {
        if self.keep.is_some() {
            return None;
        }
        let avg_per_die = (1.0 + self.die as f64) / 2.0;
        Some(self.count as f64 * avg_per_die + self.modifier as f64)
    }
}

impl FromStr for DiceFormula {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self> {
        parse_dice(s)
    }
}

impl std::fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.die)?;
        if let Some(keep) = self.keep {
            let mode = match keep.mode {
                KeepMode::Highest => 'h',
                KeepMode::Lowest => 'l',
            };
            write!(f, "k{}{}", mode, keep.count)?;
        }
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)
        } else {
            Ok(())
        }
    }
}

/// Parse dice notation with the default dice limit
pub fn parse_dice(notation: &str) -> Result<DiceFormula> {
    parse_dice_limited(notation, DEFAULT_MAX_DICE)
}

/// Parse dice notation, rejecting formulas that roll more than `max_dice` dice
pub fn parse_dice_limited(notation: &str, max_dice: u32) -> Result<DiceFormula> {
    let normalized = notation.to_lowercase();

    let caps = FORMULA_REGEX
        .captures(&normalized)
        .ok_or_else(|| RulesError::invalid_formula(notation, "does not match NdS[kh|klN][+/-M]"))?;

    let count_str = caps.get(1).map_or("", |m| m.as_str());
    let count: u32 = if count_str.is_empty() {
        1 // "d6" means "1d6"
    } else {
        count_str
            .parse()
            .map_err(|_| RulesError::invalid_formula(notation, "dice count too large"))?
    };
    if count == 0 {
        return Err(RulesError::invalid_formula(notation, "dice count must be at least 1"));
    }
    if count > max_dice {
        return Err(RulesError::invalid_formula(
            notation,
            format!("at most {} dice per formula", max_dice),
        ));
    }

    let die: u32 = caps[2]
        .parse()
        .map_err(|_| RulesError::invalid_formula(notation, "die size too large"))?;
    if die == 0 {
        return Err(RulesError::invalid_formula(notation, "die must have at least 1 face"));
    }

    let keep = match (caps.get(3), caps.get(4)) {
        (Some(mode), Some(n)) => Some(parse_keep(notation, mode.as_str(), n.as_str(), count)?),
        _ => None,
    };

    let modifier: i32 = match (caps.get(5), caps.get(6)) {
        (Some(sign), Some(n)) => format!("{}{}", sign.as_str(), n.as_str())
            .parse()
            .map_err(|_| RulesError::invalid_formula(notation, "modifier too large"))?,
        _ => 0,
    };

    Ok(DiceFormula {
        count,
        die,
        modifier,
        keep,
    })
}

/// Parse a `kh3`/`kl1` clause that already matched the grammar
fn parse_keep(notation: &str, mode: &str, keep_count: &str, count: u32) -> Result<Keep> {
    let mode = if mode == "kh" {
        KeepMode::Highest
    } else {
        KeepMode::Lowest
    };
    let keep_count: u32 = keep_count
        .parse()
        .map_err(|_| RulesError::invalid_formula(notation, "keep count too large"))?;
    if keep_count == 0 {
        return Err(RulesError::invalid_formula(notation, "keep count must be at least 1"));
    }
    if keep_count > count {
        return Err(RulesError::invalid_formula(
            notation,
            format!("cannot keep {} of {} dice", keep_count, count),
        ));
    }
    Ok(Keep {
        mode,
        count: keep_count,
    })
}
