//! Dice evaluation
//!
//! Turns a parsed [`DiceFormula`] into a [`RollOutcome`] by drawing one value
//! per die from a [`RandomSource`].

use chrono::{DateTime, Utc};
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::formula::{parse_dice_limited, DiceFormula, KeepMode, DEFAULT_MAX_DICE};
use crate::error::Result;

/// Source of uniformly distributed die results
pub trait RandomSource {
    /// Draw one value in `1..=faces`; a zero-faced die counts as one face
    fn roll_die(&mut self, faces: u32) -> u32;
}

/// Random source backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn roll_die(&mut self, faces: u32) -> u32 {
        self.0.random_range(1..=faces.max(1))
    }
}

/// Replays a fixed sequence of results, cycling when exhausted.
///
/// Values are folded into `1..=faces`, so a sequence written for d20s stays
/// in range when applied to smaller dice. An empty sequence always yields 1.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    values: Vec<u32>,
    position: usize,
}

impl SequenceSource {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }
}

impl RandomSource for SequenceSource {
    fn roll_die(&mut self, faces: u32) -> u32 {
        if self.values.is_empty() {
            return 1;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        (value.max(1) - 1) % faces.max(1) + 1
    }
}

/// Advantage state for a d20 test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Combine advantage and disadvantage sources; any of each cancels out
    pub fn combine(has_advantage: bool, has_disadvantage: bool) -> Self {
        match (has_advantage, has_disadvantage) {
            (true, false) => Advantage::Advantage,
            (false, true) => Advantage::Disadvantage,
            _ => Advantage::Normal,
        }
    }
}

/// One die within a roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleRollResult {
    pub die: u32,
    pub result: u32,
    pub kept: bool,
    pub is_critical: bool,
    pub is_fumble: bool,
}

impl SingleRollResult {
    fn new(die: u32, result: u32) -> Self {
        Self {
            die,
            result,
            kept: true,
            is_critical: die == 20 && result == 20,
            is_fumble: die == 20 && result == 1,
        }
    }
}

/// The outcome of evaluating a formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub formula_text: String,
    /// Die results in the order they were rolled
    pub rolls: Vec<SingleRollResult>,
    pub modifier: i32,
    /// Sum of kept results plus the modifier
    pub total: i64,
    pub label: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RollOutcome {
    /// Whether any kept die is a natural 20 on a d20
    pub fn has_critical(&self) -> bool {
        self.rolls.iter().any(|r| r.kept && r.is_critical)
    }

    /// Whether any kept die is a natural 1 on a d20
    pub fn has_fumble(&self) -> bool {
        self.rolls.iter().any(|r| r.kept && r.is_fumble)
    }

    /// Iterate over the results that count toward the total
    pub fn kept_results(&self) -> impl Iterator<Item = u32> + '_ {
        self.rolls.iter().filter(|r| r.kept).map(|r| r.result)
    }
}

/// Evaluates formulas against a random source
#[derive(Debug, Clone)]
pub struct DiceRoller<S> {
    source: S,
    max_dice: u32,
}

impl DiceRoller<RngSource<ThreadRng>> {
    /// Roller backed by the thread-local generator
    pub fn thread() -> Self {
        Self::new(RngSource(rand::rng()))
    }
}

impl<S: RandomSource> DiceRoller<S> {
    /// Create a roller over the given source
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_dice: DEFAULT_MAX_DICE,
        }
    }

    /// Limit how many dice a text formula may request
    pub fn with_max_dice(mut self, max_dice: u32) -> Self {
        self.max_dice = max_dice;
        self
    }

    /// Roll a parsed formula
    pub fn roll(&mut self, formula: &DiceFormula, label: Option<&str>) -> RollOutcome {
        let mut rolls: Vec<SingleRollResult> = (0..formula.count)
            .map(|_| SingleRollResult::new(formula.die, self.source.roll_die(formula.die)))
            .collect();

        if let Some(keep) = formula.keep {
            mark_kept(&mut rolls, keep.mode, keep.count as usize);
        }

        let kept_sum: i64 = rolls
            .iter()
            .filter(|r| r.kept)
            .map(|r| r.result as i64)
            .sum();
        let total = kept_sum + formula.modifier as i64;

        let outcome = RollOutcome {
            formula_text: formula.to_string(),
            rolls,
            modifier: formula.modifier,
            total,
            label: label.map(str::to_string),
            timestamp: Utc::now(),
        };
        debug!(
            formula = %outcome.formula_text,
            total = outcome.total,
            label = outcome.label.as_deref().unwrap_or(""),
            "rolled dice"
        );
        outcome
    }

    /// Parse and roll a formula in one step
    pub fn roll_text(&mut self, text: &str, label: Option<&str>) -> Result<RollOutcome> {
        let formula = parse_dice_limited(text, self.max_dice)?;
        Ok(self.roll(&formula, label))
    }

    /// Ability check, saving throw or attack roll: `1d20 + modifier`
    pub fn d20_test(&mut self, modifier: i32, label: Option<&str>) -> RollOutcome {
        self.d20_test_with(modifier, Advantage::Normal, label)
    }

    /// d20 test rolled as `2d20kh1`/`2d20kl1` under advantage/disadvantage
    pub fn d20_test_with(
        &mut self,
        modifier: i32,
        advantage: Advantage,
        label: Option<&str>,
    ) -> RollOutcome {
        let formula = match advantage {
            Advantage::Normal => DiceFormula::d20(modifier),
            Advantage::Advantage => {
                DiceFormula::new(2, 20, modifier).keeping(KeepMode::Highest, 1)
            }
            Advantage::Disadvantage => {
                DiceFormula::new(2, 20, modifier).keeping(KeepMode::Lowest, 1)
            }
        };
        self.roll(&formula, label)
    }

    /// Roll six ability scores as `4d6kh3`.
    ///
    /// Totals come back sorted highest first so they can be assigned by hand.
    pub fn ability_scores(&mut self) -> Vec<i64> {
        let formula = DiceFormula::new(4, 6, 0).keeping(KeepMode::Highest, 3);
        let mut scores: Vec<i64> = (0..6)
            .map(|_| self.roll(&formula, Some("ability score")).total)
            .collect();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores
    }
}

/// Keep the best/worst `keep` results; earlier rolls win ties
fn mark_kept(rolls: &mut [SingleRollResult], mode: KeepMode, keep: usize) {
    let mut order: Vec<usize> = (0..rolls.len()).collect();
    // sort_by is stable, so equal results stay in roll order
    match mode {
        KeepMode::Highest => order.sort_by(|&a, &b| rolls[b].result.cmp(&rolls[a].result)),
        KeepMode::Lowest => order.sort_by(|&a, &b| rolls[a].result.cmp(&rolls[b].result)),
    }
    for (rank, &idx) in order.iter().enumerate() {
        rolls[idx].kept = rank < keep;
    }
}
