//! Reference data and entity keys
//!
//! - Entity key encoding ("fireball|XPHB")
//! - Typed reference data records
//! - Edition filtering and lookups by key, class and level

pub mod key;

mod entities;
mod index;

pub use entities::{
    Background, Class, ClassFeature, ClassRef, Feat, HitDie, Item, Race, ReferenceData,
    RulesEntity, Spell, SpellClasses, Subclass, SubclassFeature,
};
pub use index::{filter_to_supported_edition, RulesetIndex};
pub use key::EntityKey;
