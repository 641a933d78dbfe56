//! Ruleset index
//!
//! Filters raw reference data down to the supported ruleset variant and
//! answers lookups by key, class and level.

use std::collections::HashMap;
use tracing::{debug, info};

use super::entities::{
    Background, Class, ClassFeature, Feat, Item, Race, ReferenceData, RulesEntity, Spell,
    Subclass, SubclassFeature,
};
use super::key::EntityKey;
use crate::config::RulesetSettings;
use crate::error::{Result, RulesError};

/// Keep entries whose source is the supported source or whose edition is the
/// supported edition. Features are matched on their owning class's source.
pub fn filter_to_supported_edition<T: RulesEntity>(
    entities: Vec<T>,
    settings: &RulesetSettings,
) -> Vec<T> {
    entities
        .into_iter()
        .filter(|e| {
            e.filter_source() == settings.source || e.edition() == Some(settings.edition.as_str())
        })
        .collect()
}

/// Canonical form of a key string, so "Fireball|xphb" finds "fireball|XPHB"
fn normalize_key(key: &str) -> Result<String> {
    Ok(key.parse::<EntityKey>()?.to_string())
}

/// Entries of one category plus a key index
#[derive(Debug, Clone)]
struct Catalog<T> {
    entries: Vec<T>,
    by_key: HashMap<String, usize>,
}

impl<T: RulesEntity> Catalog<T> {
    fn new(category: &'static str, entries: Vec<T>) -> Self {
        let mut by_key = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if by_key.insert(entry.key(), i).is_some() {
                debug!(category, key = %entry.key(), "duplicate entity key, later entry wins");
            }
        }
        Self { entries, by_key }
    }

    fn get(&self, category: &str, key: &str) -> Result<&T> {
        let normalized = normalize_key(key)?;
        self.by_key
            .get(&normalized)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| RulesError::UnknownEntity(format!("{} '{}'", category, key)))
    }
}

/// Lookup index over the supported subset of the reference data
#[derive(Debug, Clone)]
pub struct RulesetIndex {
    races: Catalog<Race>,
    backgrounds: Catalog<Background>,
    feats: Catalog<Feat>,
    classes: Catalog<Class>,
    subclasses: Vec<Subclass>,
    class_features: Vec<ClassFeature>,
    subclass_features: Vec<SubclassFeature>,
    spells: Catalog<Spell>,
    items: Catalog<Item>,
    base_items: Catalog<Item>,
}

impl RulesetIndex {
    /// Build an index, filtering every edition-tagged category
    pub fn new(data: ReferenceData, settings: &RulesetSettings) -> Self {
        let index = Self {
            races: Catalog::new("race", filter_to_supported_edition(data.race, settings)),
            backgrounds: Catalog::new(
                "background",
                filter_to_supported_edition(data.background, settings),
            ),
            feats: Catalog::new("feat", filter_to_supported_edition(data.feat, settings)),
            classes: Catalog::new("class", filter_to_supported_edition(data.class, settings)),
            subclasses: filter_to_supported_edition(data.subclass, settings),
            class_features: filter_to_supported_edition(data.class_feature, settings),
            subclass_features: filter_to_supported_edition(data.subclass_feature, settings),
            spells: Catalog::new("spell", data.spell),
            items: Catalog::new("item", data.item),
            base_items: Catalog::new("baseitem", data.baseitem),
        };
        info!(
            source = %settings.source,
            edition = %settings.edition,
            races = index.races.entries.len(),
            classes = index.classes.entries.len(),
            class_features = index.class_features.len(),
            spells = index.spells.entries.len(),
            "ruleset index built"
        );
        index
    }

    pub fn race(&self, key: &str) -> Result<&Race> {
        self.races.get("race", key)
    }

    pub fn background(&self, key: &str) -> Result<&Background> {
        self.backgrounds.get("background", key)
    }

    pub fn feat(&self, key: &str) -> Result<&Feat> {
        self.feats.get("feat", key)
    }

    pub fn class(&self, key: &str) -> Result<&Class> {
        self.classes.get("class", key)
    }

    pub fn spell(&self, key: &str) -> Result<&Spell> {
        self.spells.get("spell", key)
    }

    /// Look up a magic item, falling back to base items (weapons, armor, gear)
    pub fn item(&self, key: &str) -> Result<&Item> {
        self.items
            .get("item", key)
            .or_else(|_| self.base_items.get("item", key))
    }

    /// Look up a supported class by display name (case-insensitive)
    pub fn class_by_name(&self, name: &str) -> Result<&Class> {
        self.classes
            .entries
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| RulesError::UnknownEntity(format!("class '{}'", name)))
    }

    pub fn races(&self) -> &[Race] {
        &self.races.entries
    }

    pub fn backgrounds(&self) -> &[Background] {
        &self.backgrounds.entries
    }

    pub fn feats(&self) -> &[Feat] {
        &self.feats.entries
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes.entries
    }

    /// Subclasses belonging to a class
    pub fn subclasses_for(&self, class_name: &str) -> Vec<&Subclass> {
        self.subclasses
            .iter()
            .filter(|s| s.class_name.eq_ignore_ascii_case(class_name))
            .collect()
    }

    /// Class features gained at or below `max_level`; callers sort for display
    pub fn class_features_up_to(&self, class_name: &str, max_level: u32) -> Vec<&ClassFeature> {
        self.class_features
            .iter()
            .filter(|f| f.class_name.eq_ignore_ascii_case(class_name) && f.level <= max_level)
            .collect()
    }

    /// Subclass features gained at or below `max_level`
    pub fn subclass_features_up_to(
        &self,
        class_name: &str,
        subclass_short_name: &str,
        max_level: u32,
    ) -> Vec<&SubclassFeature> {
        self.subclass_features
            .iter()
            .filter(|f| {
                f.class_name.eq_ignore_ascii_case(class_name)
                    && f.subclass_short_name.eq_ignore_ascii_case(subclass_short_name)
                    && f.level <= max_level
            })
            .collect()
    }

    /// Spells whose class list includes the class
    pub fn spells_for_class(&self, class_name: &str) -> Vec<&Spell> {
        self.spells
            .entries
            .iter()
            .filter(|s| s.is_available_to(class_name))
            .collect()
    }

    /// Spells of one level (0 for cantrips)
    pub fn spells_of_level(&self, level: u8) -> Vec<&Spell> {
        self.spells
            .entries
            .iter()
            .filter(|s| s.level == level)
            .collect()
    }
}
