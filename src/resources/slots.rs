//! Spell slot pools
//!
//! Two pools with different recovery rules:
//! - [`SpellSlotPool`]: slots per spell level, refilled by a long rest only
//! - [`PactSlotPool`]: one pool of same-level slots, refilled by any short or long rest

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::pool::RestTier;
use crate::error::{Result, RulesError};

/// Highest spell level
pub const MAX_SPELL_LEVEL: u8 = 9;

/// Slots per spell level (1st..9th) for a full caster at levels 1..=20
const FULL_CASTER_SLOTS: [[u32; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

/// Where a click on pip `index` leaves the used count.
///
/// Used pips fill the low indices. Clicking a used pip restores it and every
/// pip above it; clicking an unused pip spends it and every pip below it.
pub fn pip_target(used: u32, index: u32, total: u32) -> u32 {
    let target = if index < used {
        index
    } else {
        index.saturating_add(1)
    };
    target.min(total)
}

fn check_level(level: u8) -> Result<()> {
    if !(1..=MAX_SPELL_LEVEL).contains(&level) {
        return Err(RulesError::out_of_range(
            "spell slot level",
            level as i64,
            1,
            MAX_SPELL_LEVEL as i64,
        ));
    }
    Ok(())
}

fn check_caster_level(level: u32) -> Result<()> {
    if !(1..=20).contains(&level) {
        return Err(RulesError::out_of_range("caster level", level as i64, 1, 20));
    }
    Ok(())
}

/// Slots at one spell level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "StoredSlotLevel")]
pub struct SlotLevel {
    pub total: u32,
    pub used: u32,
}

impl SlotLevel {
    pub fn available(&self) -> u32 {
        self.total.saturating_sub(self.used)
    }
}

#[derive(Deserialize)]
struct StoredSlotLevel {
    total: u32,
    used: u32,
}

impl TryFrom<StoredSlotLevel> for SlotLevel {
    type Error = RulesError;

    fn try_from(stored: StoredSlotLevel) -> Result<Self> {
        if stored.used > stored.total {
            return Err(RulesError::out_of_range(
                "spell slots used",
                stored.used as i64,
                0,
                stored.total as i64,
            ));
        }
        Ok(Self {
            total: stored.total,
            used: stored.used,
        })
    }
}

/// Spell slots keyed by spell level
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "StoredSpellSlotPool")]
pub struct SpellSlotPool {
    levels: BTreeMap<u8, SlotLevel>,
}

#[derive(Deserialize)]
struct StoredSpellSlotPool {
    levels: BTreeMap<u8, SlotLevel>,
}

impl TryFrom<StoredSpellSlotPool> for SpellSlotPool {
    type Error = RulesError;

    fn try_from(stored: StoredSpellSlotPool) -> Result<Self> {
        for &level in stored.levels.keys() {
            check_level(level)?;
        }
        let levels = stored
            .levels
            .into_iter()
            .filter(|(_, slot)| slot.total > 0)
            .collect();
        Ok(Self { levels })
    }
}

impl SpellSlotPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots for a full caster of the given level
    pub fn for_caster_level(caster_level: u32) -> Result<Self> {
        check_caster_level(caster_level)?;
        let mut pool = Self::new();
        for (i, &total) in FULL_CASTER_SLOTS[caster_level as usize - 1].iter().enumerate() {
            if total > 0 {
                pool.set_total(i as u8 + 1, total)?;
            }
        }
        Ok(pool)
    }

    /// Set the number of slots at a level, keeping used within bounds
    pub fn set_total(&mut self, level: u8, total: u32) -> Result<()> {
        check_level(level)?;
        if total == 0 {
            self.levels.remove(&level);
            return Ok(());
        }
        let slot = self.levels.entry(level).or_default();
        slot.total = total;
        slot.used = slot.used.min(total);
        Ok(())
    }

    /// Get the slots at a level
    pub fn level(&self, level: u8) -> Option<&SlotLevel> {
        self.levels.get(&level)
    }

    /// Remaining slots at a level
    pub fn available(&self, level: u8) -> u32 {
        self.levels.get(&level).map_or(0, SlotLevel::available)
    }

    /// Iterate over levels that have slots, lowest first
    pub fn levels(&self) -> impl Iterator<Item = (u8, &SlotLevel)> {
        self.levels.iter().map(|(&l, s)| (l, s))
    }

    /// Lowest level at or above `min_level` with a slot remaining (for upcasting)
    pub fn lowest_available_from(&self, min_level: u8) -> Option<u8> {
        self.levels
            .range(min_level..)
            .find(|(_, s)| s.available() > 0)
            .map(|(&l, _)| l)
    }

    /// Spend `amount` slots at a level; all or nothing
    pub fn consume(&mut self, level: u8, amount: u32) -> Result<()> {
        check_level(level)?;
        let available = self.available(level);
        if available < amount {
            return Err(RulesError::InsufficientResource {
                name: format!("level {} spell slots", level),
                requested: amount,
                available,
            });
        }
        if let Some(slot) = self.levels.get_mut(&level) {
            slot.used += amount;
            debug!(level, used = slot.used, total = slot.total, "spell slot used");
        }
        Ok(())
    }

    /// Regain `amount` slots at a level, saturating at the total
    pub fn recover(&mut self, level: u8, amount: u32) -> Result<()> {
        check_level(level)?;
        if let Some(slot) = self.levels.get_mut(&level) {
            slot.used = slot.used.saturating_sub(amount);
            debug!(level, used = slot.used, total = slot.total, "spell slot recovered");
        }
        Ok(())
    }

    /// Set the used count at a level, clamped to `[0, total]`. Returns the new count.
    pub fn set_used(&mut self, level: u8, used: u32) -> Result<u32> {
        check_level(level)?;
        Ok(match self.levels.get_mut(&level) {
            Some(slot) => {
                slot.used = used.min(slot.total);
                slot.used
            }
            None => 0,
        })
    }

    /// Apply a click on pip `index` at a level. Returns the new used count.
    pub fn toggle_pip(&mut self, level: u8, index: u32) -> Result<u32> {
        check_level(level)?;
        let slot = self.levels.get(&level).copied().unwrap_or_default();
        self.set_used(level, pip_target(slot.used, index, slot.total))
    }

    /// Refill every level
    pub fn restore_all(&mut self) {
        for slot in self.levels.values_mut() {
            slot.used = 0;
        }
    }

    /// Apply a rest; only a long rest refills spell slots. Returns slots regained.
    pub fn rest(&mut self, tier: RestTier) -> u32 {
        if tier != RestTier::Long {
            return 0;
        }
        let regained = self.levels.values().map(|s| s.used).sum();
        self.restore_all();
        regained
    }
}

/// Pact magic slots: all slots share one level derived from the caster level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredPactSlotPool")]
pub struct PactSlotPool {
    slots: u32,
    used: u32,
    caster_level: u32,
}

impl PactSlotPool {
    /// Create a full pool
    pub fn new(slots: u32, caster_level: u32) -> Self {
        Self {
            slots,
            used: 0,
            caster_level,
        }
    }

    /// Pact slots for a warlock of the given level
    pub fn for_caster_level(caster_level: u32) -> Result<Self> {
        check_caster_level(caster_level)?;
        let slots = match caster_level {
            1 => 1,
            2..=10 => 2,
            11..=16 => 3,
            _ => 4,
        };
        Ok(Self::new(slots, caster_level))
    }

    pub fn slots(&self) -> u32 {
        self.slots
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn caster_level(&self) -> u32 {
        self.caster_level
    }

    pub fn available(&self) -> u32 {
        self.slots.saturating_sub(self.used)
    }

    /// Spell level every pact slot is cast at
    pub fn slot_level(&self) -> u8 {
        match self.caster_level {
            0..=2 => 1,
            3..=4 => 2,
            5..=6 => 3,
            7..=8 => 4,
            _ => 5,
        }
    }

    /// Spend `amount` slots; all or nothing
    pub fn consume(&mut self, amount: u32) -> Result<()> {
        if self.available() < amount {
            return Err(RulesError::InsufficientResource {
                name: "pact slots".to_string(),
                requested: amount,
                available: self.available(),
            });
        }
        self.used += amount;
        debug!(used = self.used, slots = self.slots, "pact slot used");
        Ok(())
    }

    /// Regain `amount` slots, saturating at the total
    pub fn recover(&mut self, amount: u32) {
        self.used = self.used.saturating_sub(amount);
        debug!(used = self.used, slots = self.slots, "pact slot recovered");
    }

    /// Set the used count, clamped to `[0, slots]`. Returns the new count.
    pub fn set_used(&mut self, used: u32) -> u32 {
        self.used = used.min(self.slots);
        self.used
    }

    /// Apply a click on pip `index`. Returns the new used count.
    pub fn toggle_pip(&mut self, index: u32) -> u32 {
        self.set_used(pip_target(self.used, index, self.slots))
    }

    /// Change the slot count and caster level (e.g. on level up)
    pub fn set_slots(&mut self, slots: u32, caster_level: u32) {
        self.slots = slots;
        self.caster_level = caster_level;
        self.used = self.used.min(slots);
    }

    /// Apply a rest; short and long rests both refill pact slots. Returns slots regained.
    pub fn rest(&mut self, tier: RestTier) -> u32 {
        match tier {
            RestTier::Short | RestTier::Long => std::mem::take(&mut self.used),
            RestTier::Dawn => 0,
        }
    }
}

#[derive(Deserialize)]
struct StoredPactSlotPool {
    slots: u32,
    used: u32,
    caster_level: u32,
}

impl TryFrom<StoredPactSlotPool> for PactSlotPool {
    type Error = RulesError;

    fn try_from(stored: StoredPactSlotPool) -> Result<Self> {
        if stored.used > stored.slots {
            return Err(RulesError::out_of_range(
                "pact slots used",
                stored.used as i64,
                0,
                stored.slots as i64,
            ));
        }
        Ok(Self {
            slots: stored.slots,
            used: stored.used,
            caster_level: stored.caster_level,
        })
    }
}
