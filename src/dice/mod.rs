//! Dice system
//!
//! Implements tabletop dice notation:
//! - Parsing ("1d20+5", "4d6kh3", "2d8-1")
//! - Keep-highest/keep-lowest selection
//! - Critical/fumble detection on d20s
//! - Pluggable random sources for deterministic replay

mod formula;
mod roller;

pub use formula::{
    parse_dice, parse_dice_limited, DiceFormula, Keep, KeepMode, DEFAULT_MAX_DICE, STANDARD_DICE,
};
pub use roller::{
    Advantage, DiceRoller, RandomSource, RngSource, RollOutcome, SequenceSource, SingleRollResult,
};
