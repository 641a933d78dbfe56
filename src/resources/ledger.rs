//! Per-character resource ledger

use serde::{Deserialize, Serialize};
use tracing::info;

use super::pool::{reset_on_rest, Resource, RestTier};
use super::slots::{PactSlotPool, SpellSlotPool};
use crate::error::{Result, RulesError};

/// What a rest gave back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerRest {
    /// Named resources that were below max and got refilled
    pub resources_restored: usize,
    /// Spell slots regained across all levels
    pub spell_slots_regained: u32,
    /// Pact slots regained
    pub pact_slots_regained: u32,
}

/// All consumable pools owned by one character
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceLedger {
    resources: Vec<Resource>,
    pub spell_slots: SpellSlotPool,
    pub pact_slots: Option<PactSlotPool>,
}

impl ResourceLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named resource, replacing any resource with the same name
    pub fn add_resource(&mut self, resource: Resource) {
        if let Some(existing) = self
            .resources
            .iter_mut()
            .find(|r| r.name.eq_ignore_ascii_case(&resource.name))
        {
            *existing = resource;
        } else {
            self.resources.push(resource);
        }
    }

    /// Remove a named resource
    pub fn remove_resource(&mut self, name: &str) -> Option<Resource> {
        let pos = self
            .resources
            .iter()
            .position(|r| r.name.eq_ignore_ascii_case(name))?;
        Some(self.resources.remove(pos))
    }

    /// Look up a resource by name (case-insensitive)
    pub fn resource(&self, name: &str) -> Result<&Resource> {
        self.resources
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| RulesError::UnknownEntity(format!("resource '{}'", name)))
    }

    fn resource_mut(&mut self, name: &str) -> Result<&mut Resource> {
        self.resources
            .iter_mut()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| RulesError::UnknownEntity(format!("resource '{}'", name)))
    }

    /// All named resources in the order they were added
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Spend uses of a named resource
    pub fn use_resource(&mut self, name: &str, amount: u32) -> Result<u32> {
        let resource = self.resource_mut(name)?;
        resource.consume(amount)?;
        Ok(resource.current())
    }

    /// Regain uses of a named resource
    pub fn recover_resource(&mut self, name: &str, amount: u32) -> Result<u32> {
        let resource = self.resource_mut(name)?;
        resource.recover(amount);
        Ok(resource.current())
    }

    /// Set a named resource's remaining uses from a pip click
    pub fn toggle_resource_pip(&mut self, name: &str, index: u32) -> Result<u32> {
        let resource = self.resource_mut(name)?;
        let used = super::slots::pip_target(resource.spent(), index, resource.max());
        resource.set_current(resource.max() - used);
        Ok(resource.current())
    }

    /// Apply a rest to every pool
    pub fn take_rest(&mut self, tier: RestTier) -> LedgerRest {
        let summary = LedgerRest {
            resources_restored: reset_on_rest(&mut self.resources, tier),
            spell_slots_regained: self.spell_slots.rest(tier),
            pact_slots_regained: self.pact_slots.as_mut().map_or(0, |p| p.rest(tier)),
        };
        info!(
            %tier,
            resources = summary.resources_restored,
            spell_slots = summary.spell_slots_regained,
            pact_slots = summary.pact_slots_regained,
            "rest taken"
        );
        summary
    }
}
