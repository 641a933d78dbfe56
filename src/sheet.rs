//! Per-character rules state
//!
//! Bundles the resource ledger and condition set a character owns, so a rest
//! or a d20 test sees both at once.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::conditions::ConditionSet;
use crate::dice::{Advantage, DiceRoller, RandomSource, RollOutcome};
use crate::resources::{LedgerRest, ResourceLedger, RestTier};

/// What a rest changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestSummary {
    pub tier: RestTier,
    pub ledger: LedgerRest,
    pub exhaustion_before: u8,
    pub exhaustion_after: u8,
}

/// Mutable rules state for one character
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RulesState {
    pub ledger: ResourceLedger,
    pub conditions: ConditionSet,
}

impl RulesState {
    pub fn new(ledger: ResourceLedger) -> Self {
        Self {
            ledger,
            conditions: ConditionSet::new(),
        }
    }

    /// Take a rest. A long rest also removes one level of exhaustion.
    pub fn take_rest(&mut self, tier: RestTier) -> RestSummary {
        let ledger = self.ledger.take_rest(tier);
        let exhaustion_before = self.conditions.exhaustion_level();
        if tier == RestTier::Long && exhaustion_before > 0 {
            match self.conditions.set_exhaustion_level(exhaustion_before - 1) {
                Ok(Some(change)) => debug!(?change, "rest changed conditions"),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "failed to reduce exhaustion"),
            }
        }
        let exhaustion_after = self.conditions.exhaustion_level();
        if exhaustion_after != exhaustion_before {
            info!(exhaustion_before, exhaustion_after, "exhaustion reduced by rest");
        }
        RestSummary {
            tier,
            ledger,
            exhaustion_before,
            exhaustion_after,
        }
    }

    /// Roll a d20 test with the exhaustion penalty folded into the modifier
    pub fn d20_test<S: RandomSource>(
        &self,
        roller: &mut DiceRoller<S>,
        modifier: i32,
        advantage: Advantage,
        label: Option<&str>,
    ) -> RollOutcome {
        roller.d20_test_with(modifier + self.conditions.d20_penalty(), advantage, label)
    }
}
