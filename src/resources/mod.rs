//! Resource tracking
//!
//! Consumable pools a character spends and regains:
//! - Named limited-use resources with a recharge trigger
//! - Spell slots per spell level (long rest)
//! - Pact magic slots (short or long rest)

mod ledger;
mod pool;
mod slots;

pub use ledger::{LedgerRest, ResourceLedger};
pub use pool::{reset_on_rest, RechargeTrigger, Resource, RestTier};
pub use slots::{pip_target, PactSlotPool, SlotLevel, SpellSlotPool, MAX_SPELL_LEVEL};
