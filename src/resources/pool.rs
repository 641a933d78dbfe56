//! Limited-use resources and rest recovery

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::{Result, RulesError};

/// Kinds of rest a character can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestTier {
    Short,
    Long,
    Dawn,
}

impl FromStr for RestTier {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" | "short_rest" | "sr" => Ok(RestTier::Short),
            "long" | "long_rest" | "lr" => Ok(RestTier::Long),
            "dawn" => Ok(RestTier::Dawn),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for RestTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RestTier::Short => "short",
            RestTier::Long => "long",
            RestTier::Dawn => "dawn",
        };
        write!(f, "{}", s)
    }
}

/// When a resource refills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RechargeTrigger {
    ShortRest,
    #[default]
    LongRest,
    Dawn,
    Never,
}

impl RechargeTrigger {
    /// Whether a rest of the given tier refills this resource.
    ///
    /// A long rest also counts as a short rest. Dawn is its own trigger.
    pub fn recharges_on(&self, tier: RestTier) -> bool {
        match (self, tier) {
            (RechargeTrigger::ShortRest, RestTier::Short | RestTier::Long) => true,
            (RechargeTrigger::LongRest, RestTier::Long) => true,
            (RechargeTrigger::Dawn, RestTier::Dawn) => true,
            _ => false,
        }
    }
}

impl FromStr for RechargeTrigger {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" | "short_rest" | "shortrest" | "sr" => Ok(RechargeTrigger::ShortRest),
            "long" | "long_rest" | "longrest" | "lr" => Ok(RechargeTrigger::LongRest),
            "dawn" => Ok(RechargeTrigger::Dawn),
            "never" | "none" => Ok(RechargeTrigger::Never),
            _ => Err(()),
        }
    }
}

/// A bounded consumable count such as "Channel Divinity" or "Rage"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredResource")]
pub struct Resource {
    pub name: String,
    pub short_label: String,
    max: u32,
    current: u32,
    pub recharge: RechargeTrigger,
}

impl Resource {
    /// Create a full resource
    pub fn new(name: &str, short_label: &str, max: u32, recharge: RechargeTrigger) -> Self {
        Self {
            name: name.to_string(),
            short_label: short_label.to_string(),
            max,
            current: max,
            recharge,
        }
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// Uses spent since the last refill
    pub fn spent(&self) -> u32 {
        self.max.saturating_sub(self.current)
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    /// Spend `amount` uses; all or nothing
    pub fn consume(&mut self, amount: u32) -> Result<()> {
        if self.current < amount {
            return Err(RulesError::InsufficientResource {
                name: self.name.clone(),
                requested: amount,
                available: self.current,
            });
        }
        self.current -= amount;
        debug!(resource = %self.name, amount, remaining = self.current, "resource used");
        Ok(())
    }

    /// Regain `amount` uses, saturating at max
    pub fn recover(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
        debug!(resource = %self.name, amount, remaining = self.current, "resource recovered");
    }

    /// Refill to max
    pub fn restore(&mut self) {
        self.current = self.max;
    }

    /// Change the maximum (e.g. on level up), keeping current within bounds
    pub fn set_max(&mut self, max: u32) {
        self.max = max;
        self.current = self.current.min(max);
    }

    /// Set the remaining count directly, clamped to `[0, max]`
    pub fn set_current(&mut self, current: u32) {
        self.current = current.min(self.max);
    }
}

/// Serialized form of [`Resource`], checked before it becomes one
#[derive(Deserialize)]
struct StoredResource {
    name: String,
    short_label: String,
    max: u32,
    current: u32,
    #[serde(default)]
    recharge: RechargeTrigger,
}

impl TryFrom<StoredResource> for Resource {
    type Error = RulesError;

    fn try_from(stored: StoredResource) -> Result<Self> {
        if stored.current > stored.max {
            return Err(RulesError::out_of_range(
                "resource uses remaining",
                stored.current as i64,
                0,
                stored.max as i64,
            ));
        }
        Ok(Self {
            name: stored.name,
            short_label: stored.short_label,
            max: stored.max,
            current: stored.current,
            recharge: stored.recharge,
        })
    }
}

/// Refill every resource the rest recharges. Returns how many were refilled.
pub fn reset_on_rest(resources: &mut [Resource], tier: RestTier) -> usize {
    let mut restored = 0;
    for resource in resources
        .iter_mut()
        .filter(|r| r.recharge.recharges_on(tier))
    {
        if !resource.is_full() {
            restored += 1;
        }
        resource.restore();
    }
    restored
}
