//! Reference data records
//!
//! Typed, read-only records for each reference data category. Field names
//! follow the upstream JSON (camelCase); fields the rules core does not use
//! are ignored on load.

use serde::{Deserialize, Serialize};

use super::key;
use crate::error::Result;

/// Common accessors used by filtering and key lookups
pub trait RulesEntity {
    fn name(&self) -> &str;
    fn source(&self) -> &str;

    /// Edition marker, when the record carries one
    fn edition(&self) -> Option<&str> {
        None
    }

    /// Source tag used by the edition filter
    fn filter_source(&self) -> &str {
        self.source()
    }

    /// Encoded entity key
    fn key(&self) -> String {
        key::encode(self.name(), self.source())
    }
}

macro_rules! impl_rules_entity {
    ($ty:ty) => {
        impl RulesEntity for $ty {
            fn name(&self) -> &str {
                &self.name
            }
            fn source(&self) -> &str {
                &self.source
            }
            fn edition(&self) -> Option<&str> {
                self.edition.as_deref()
            }
        }
    };
}

/// Hit die as `{ "number": 1, "faces": 10 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitDie {
    pub number: u32,
    pub faces: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub name: String,
    pub source: String,
    pub edition: Option<String>,
    #[serde(default)]
    pub size: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    pub name: String,
    pub source: String,
    pub edition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feat {
    pub name: String,
    pub source: String,
    pub edition: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub name: String,
    pub source: String,
    pub edition: Option<String>,
    pub hd: Option<HitDie>,
    /// Saving throw proficiencies as ability abbreviations
    #[serde(default)]
    pub proficiency: Vec<String>,
    pub spellcasting_ability: Option<String>,
    pub caster_progression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subclass {
    pub name: String,
    pub short_name: String,
    pub source: String,
    pub class_name: String,
    pub class_source: String,
    pub edition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeature {
    pub name: String,
    pub source: String,
    pub class_name: String,
    pub class_source: String,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubclassFeature {
    pub name: String,
    pub source: String,
    pub class_name: String,
    pub class_source: String,
    pub subclass_short_name: String,
    pub subclass_source: String,
    pub level: u32,
}

/// A class reference in a spell's class list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRef {
    pub name: String,
    pub source: String,
}

/// Classes that can learn a spell
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellClasses {
    #[serde(default)]
    pub from_class_list: Vec<ClassRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub name: String,
    pub source: String,
    /// 0 for cantrips
    pub level: u8,
    /// Single-letter school code ("V" evocation, "A" abjuration, ...)
    pub school: String,
    #[serde(default)]
    pub classes: SpellClasses,
}

impl Spell {
    /// Whether the class list names `class_name` (case-insensitive)
    pub fn is_available_to(&self, class_name: &str) -> bool {
        self.classes
            .from_class_list
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(class_name))
    }

    /// Full school name for the single-letter code
    pub fn school_name(&self) -> &'static str {
        match self.school.as_str() {
            "A" => "Abjuration",
            "C" => "Conjuration",
            "D" => "Divination",
            "E" => "Enchantment",
            "V" => "Evocation",
            "I" => "Illusion",
            "N" => "Necromancy",
            "T" => "Transmutation",
            _ => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    pub source: String,
    pub edition: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub rarity: Option<String>,
    pub weight: Option<f64>,
}

impl_rules_entity!(Race);
impl_rules_entity!(Background);
impl_rules_entity!(Feat);
impl_rules_entity!(Class);
impl_rules_entity!(Subclass);
impl_rules_entity!(Item);

impl RulesEntity for ClassFeature {
    fn name(&self) -> &str {
        &self.name
    }
    fn source(&self) -> &str {
        &self.source
    }
    fn filter_source(&self) -> &str {
        &self.class_source
    }
}

impl RulesEntity for SubclassFeature {
    fn name(&self) -> &str {
        &self.name
    }
    fn source(&self) -> &str {
        &self.source
    }
    fn filter_source(&self) -> &str {
        &self.class_source
    }
}

impl RulesEntity for Spell {
    fn name(&self) -> &str {
        &self.name
    }
    fn source(&self) -> &str {
        &self.source
    }
}

/// Raw reference data collections keyed by category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceData {
    pub race: Vec<Race>,
    pub background: Vec<Background>,
    pub feat: Vec<Feat>,
    pub class: Vec<Class>,
    pub subclass: Vec<Subclass>,
    pub class_feature: Vec<ClassFeature>,
    pub subclass_feature: Vec<SubclassFeature>,
    pub spell: Vec<Spell>,
    pub item: Vec<Item>,
    pub baseitem: Vec<Item>,
}

impl ReferenceData {
    /// Parse a JSON document holding any subset of the categories
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Append every collection from another document
    pub fn extend(&mut self, other: ReferenceData) {
        self.race.extend(other.race);
        self.background.extend(other.background);
        self.feat.extend(other.feat);
        self.class.extend(other.class);
        self.subclass.extend(other.subclass);
        self.class_feature.extend(other.class_feature);
        self.subclass_feature.extend(other.subclass_feature);
        self.spell.extend(other.spell);
        self.item.extend(other.item);
        self.baseitem.extend(other.baseitem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_categories() {
        let data = ReferenceData::from_value(json!({
            "class": [{
                "name": "Fighter",
                "source": "XPHB",
                "edition": "one",
                "hd": {"number": 1, "faces": 10},
                "proficiency": ["str", "con"],
                "someUpstreamField": {"ignored": true}
            }],
            "classFeature": [{
                "name": "Second Wind",
                "source": "XPHB",
                "className": "Fighter",
                "classSource": "XPHB",
                "level": 1
            }],
            "baseitem": [{"name": "Longsword", "source": "XPHB", "type": "M", "weight": 3}]
        }))
        .unwrap();

        assert_eq!(data.class[0].hd, Some(HitDie { number: 1, faces: 10 }));
        assert_eq!(data.class_feature[0].level, 1);
        assert_eq!(data.baseitem[0].item_type.as_deref(), Some("M"));
        assert!(data.spell.is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let err = ReferenceData::from_json_str(r#"{"spell": [{"name": "Light"}]}"#);
        assert!(matches!(err, Err(crate::RulesError::ReferenceData(_))));
    }

    #[test]
    fn test_feature_filters_by_class_source() {
        let feature = ClassFeature {
            name: "Rage".to_string(),
            source: "PHB".to_string(),
            class_name: "Barbarian".to_string(),
            class_source: "XPHB".to_string(),
            level: 1,
        };
        assert_eq!(feature.filter_source(), "XPHB");
        assert_eq!(feature.key(), "rage|PHB");
    }

    #[test]
    fn test_spell_school_and_classes() {
        let spell: Spell = serde_json::from_value(json!({
            "name": "Fireball",
            "source": "XPHB",
            "level": 3,
            "school": "V",
            "classes": {"fromClassList": [{"name": "Wizard", "source": "XPHB"}]}
        }))
        .unwrap();
        assert_eq!(spell.school_name(), "Evocation");
        assert!(spell.is_available_to("wizard"));
        assert!(!spell.is_available_to("Cleric"));
    }
}
