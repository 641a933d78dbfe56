//! End-to-end rules scenarios against the public API

use charsheet::abilities;
use charsheet::conditions::{Condition, ConditionSet};
use charsheet::config::RulesetSettings;
use charsheet::dice::{parse_dice, DiceRoller, KeepMode, RngSource, SequenceSource};
use charsheet::resources::{
    reset_on_rest, PactSlotPool, RechargeTrigger, Resource, ResourceLedger, RestTier,
    SpellSlotPool,
};
use charsheet::ruleset::{key, ReferenceData, RulesetIndex};
use charsheet::sheet::RulesState;
use charsheet::RulesError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

/// Test: every die lands in range and the total matches the kept dice
#[test]
fn test_roll_properties_hold_for_many_formulas() {
    let mut roller = DiceRoller::new(RngSource(StdRng::seed_from_u64(42)));
    let formulas = ["1d20+5", "2d8-1", "3d6", "8d10+12", "d100", "10d4-3", "1d12"];

    for text in formulas {
        let formula = parse_dice(text).unwrap();
        for _ in 0..100 {
            let outcome = roller.roll(&formula, None);
            assert_eq!(outcome.rolls.len(), formula.count as usize);
            assert!(outcome
                .rolls
                .iter()
                .all(|r| r.result >= 1 && r.result <= formula.die));
            let kept: i64 = outcome.kept_results().map(|v| v as i64).sum();
            assert_eq!(outcome.total, kept + formula.modifier as i64);
            assert!(outcome.total >= formula.min() && outcome.total <= formula.max());
        }
    }
}

/// Test: keep clauses retain exactly the K best or worst dice
#[test]
fn test_keep_clause_selects_extremes() {
    let mut roller = DiceRoller::new(RngSource(StdRng::seed_from_u64(9)));

    for text in ["4d6kh3", "5d10kl2", "2d20kh1", "2d20kl1", "6d8kh6"] {
        let formula = parse_dice(text).unwrap();
        let keep = formula.keep.unwrap();
        for _ in 0..100 {
            let outcome = roller.roll(&formula, None);
            let kept: Vec<u32> = outcome.kept_results().collect();
            assert_eq!(kept.len(), keep.count as usize);

            let mut sorted: Vec<u32> = outcome.rolls.iter().map(|r| r.result).collect();
            match keep.mode {
                KeepMode::Highest => sorted.sort_unstable_by(|a, b| b.cmp(a)),
                KeepMode::Lowest => sorted.sort_unstable(),
            }
            let mut kept_sorted = kept;
            match keep.mode {
                KeepMode::Highest => kept_sorted.sort_unstable_by(|a, b| b.cmp(a)),
                KeepMode::Lowest => kept_sorted.sort_unstable(),
            }
            assert_eq!(kept_sorted, sorted[..keep.count as usize].to_vec());
        }
    }
}

/// Test: critical only counts when the natural 20 is kept
#[test]
fn test_critical_requires_kept_twenty() {
    let mut roller = DiceRoller::new(RngSource(StdRng::seed_from_u64(3)));
    let formula = parse_dice("2d20kl1").unwrap();

    for _ in 0..500 {
        let outcome = roller.roll(&formula, None);
        let expected = outcome
            .rolls
            .iter()
            .any(|r| r.die == 20 && r.result == 20 && r.kept);
        assert_eq!(outcome.has_critical(), expected);
        let expected = outcome
            .rolls
            .iter()
            .any(|r| r.die == 20 && r.result == 1 && r.kept);
        assert_eq!(outcome.has_fumble(), expected);
    }
}

/// Test: "4d6kh3" with rolls [2, 5, 6, 1] totals 13
#[test]
fn test_ability_roll_scenario() {
    let mut roller = DiceRoller::new(SequenceSource::new(vec![2, 5, 6, 1]));
    let outcome = roller.roll_text("4d6kh3", Some("STR")).unwrap();

    let mut kept: Vec<u32> = outcome.kept_results().collect();
    kept.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(kept, vec![6, 5, 2]);
    assert_eq!(outcome.modifier, 0);
    assert_eq!(outcome.total, 13);
}

/// Test: malformed notation is rejected with InvalidFormula
#[test]
fn test_invalid_formulas() {
    for text in ["", "d", "2x6", "0d6", "1d0", "2d6kh3", "1d20++1", "kh1"] {
        assert!(
            matches!(parse_dice(text), Err(RulesError::InvalidFormula { .. })),
            "{} should be rejected",
            text
        );
    }
}

/// Test: ability math tables
#[test]
fn test_ability_math() {
    assert_eq!(abilities::modifier(10), 0);
    assert_eq!(abilities::modifier(11), 0);
    assert_eq!(abilities::modifier(8), -1);
    assert_eq!(abilities::modifier(20), 5);

    assert!((1..=4).all(|l| abilities::proficiency_bonus(l) == Ok(2)));
    assert!((5..=8).all(|l| abilities::proficiency_bonus(l) == Ok(3)));
    assert!((17..=20).all(|l| abilities::proficiency_bonus(l) == Ok(6)));
    assert_eq!(
        abilities::point_buy_cost(16),
        Err(RulesError::UnsupportedScore(16))
    );
}

/// Test: use then recover restores the pre-use value
#[test]
fn test_resource_round_trip() {
    for (max, start_used, k) in [(5, 0, 3), (5, 2, 3), (1, 0, 1), (10, 4, 6)] {
        let mut r = Resource::new("Bardic Inspiration", "BI", max, RechargeTrigger::LongRest);
        r.consume(start_used).unwrap();
        let before = r.current();
        r.consume(k).unwrap();
        r.recover(k);
        assert_eq!(r.current(), before);
    }
}

/// Test: long rest restores short and long resources, never ones stay spent
#[test]
fn test_long_rest_resource_reset() {
    let mut resources = vec![
        Resource::new("Action Surge", "AS", 1, RechargeTrigger::ShortRest),
        Resource::new("Indomitable", "IN", 1, RechargeTrigger::LongRest),
        Resource::new("Luck Blade Wish", "WSH", 1, RechargeTrigger::Never),
    ];
    for r in resources.iter_mut() {
        r.consume(1).unwrap();
    }

    reset_on_rest(&mut resources, RestTier::Long);
    assert_eq!(resources[0].current(), 1);
    assert_eq!(resources[1].current(), 1);
    assert_eq!(resources[2].current(), 0);
}

/// Test: a level-3 slot survives a short rest and returns on a long rest
#[test]
fn test_spell_slot_rest_asymmetry() {
    let mut ledger = ResourceLedger::new();
    ledger.spell_slots = SpellSlotPool::for_caster_level(5).unwrap();
    ledger.pact_slots = Some(PactSlotPool::for_caster_level(5).unwrap());

    ledger.spell_slots.consume(3, 1).unwrap();
    ledger.pact_slots.as_mut().unwrap().consume(1).unwrap();

    ledger.take_rest(RestTier::Short);
    assert_eq!(ledger.spell_slots.available(3), 1);
    assert_eq!(ledger.pact_slots.as_ref().unwrap().available(), 2);

    ledger.take_rest(RestTier::Long);
    assert_eq!(ledger.spell_slots.available(3), 2);
}

/// Test: exhaustion bounds and activity
#[test]
fn test_exhaustion_scenario() {
    let mut set = ConditionSet::new();
    assert!(matches!(
        set.set_exhaustion_level(7),
        Err(RulesError::OutOfRange { .. })
    ));

    set.set_exhaustion_level(3).unwrap();
    assert!(set.active_conditions().contains(&Condition::Exhaustion));
    assert_eq!(set.exhaustion_level(), 3);
}

/// Test: key encoding and lossy decoding
#[test]
fn test_key_codec_scenario() {
    assert_eq!(key::encode("Fireball", "XPHB"), "fireball|XPHB");
    let decoded = key::decode("fireball|XPHB").unwrap();
    assert_eq!(decoded.name, "fireball");
    assert_eq!(decoded.source, "XPHB");
}

/// Test: a character's chosen entities resolve through the index
#[test]
fn test_character_references_resolve() {
    let data = ReferenceData::from_value(json!({
        "race": [{"name": "Dwarf", "source": "XPHB", "edition": "one"}],
        "background": [{"name": "Acolyte", "source": "XPHB", "edition": "one"}],
        "class": [{"name": "Cleric", "source": "XPHB", "edition": "one", "hd": {"number": 1, "faces": 8}}],
        "subclass": [
            {"name": "Life Domain", "shortName": "Life", "source": "XPHB", "className": "Cleric", "classSource": "XPHB", "edition": "one"},
            {"name": "Knowledge Domain", "shortName": "Knowledge", "source": "PHB", "className": "Cleric", "classSource": "PHB", "edition": "classic"}
        ],
        "subclassFeature": [
            {"name": "Disciple of Life", "source": "XPHB", "className": "Cleric", "classSource": "XPHB",
             "subclassShortName": "Life", "subclassSource": "XPHB", "level": 3},
            {"name": "Blessed Healer", "source": "XPHB", "className": "Cleric", "classSource": "XPHB",
             "subclassShortName": "Life", "subclassSource": "XPHB", "level": 6}
        ],
        "spell": [{"name": "Cure Wounds", "source": "XPHB", "level": 1, "school": "A",
                   "classes": {"fromClassList": [{"name": "Cleric", "source": "XPHB"}]}}]
    }))
    .unwrap();
    let index = RulesetIndex::new(data, &RulesetSettings::default());

    let race_key = key::encode("Dwarf", "XPHB");
    let class_key = key::encode("Cleric", "XPHB");
    let spell_key = key::encode("Cure Wounds", "XPHB");

    assert_eq!(index.race(&race_key).unwrap().name, "Dwarf");
    assert_eq!(index.background("acolyte|XPHB").unwrap().name, "Acolyte");
    assert_eq!(index.class(&class_key).unwrap().hd.unwrap().faces, 8);
    assert_eq!(index.spell(&spell_key).unwrap().name, "Cure Wounds");
    assert_eq!(index.subclasses_for("Cleric").len(), 1);
    assert_eq!(index.subclass_features_up_to("Cleric", "Life", 5).len(), 1);
    assert!(matches!(
        index.feat("alert|XPHB"),
        Err(RulesError::UnknownEntity(_))
    ));
}

/// Test: a full adventuring day for a warlock/cleric style character
#[test]
fn test_adventuring_day() {
    let mut ledger = ResourceLedger::new();
    ledger.add_resource(Resource::new("Channel Divinity", "CD", 2, RechargeTrigger::ShortRest));
    ledger.add_resource(Resource::new("Pearl of Power", "PoP", 1, RechargeTrigger::Dawn));
    ledger.spell_slots = SpellSlotPool::for_caster_level(3).unwrap();
    let mut state = RulesState::new(ledger);

    state.ledger.use_resource("Channel Divinity", 2).unwrap();
    state.ledger.use_resource("Pearl of Power", 1).unwrap();
    state.ledger.spell_slots.toggle_pip(1, 3).unwrap();
    assert_eq!(state.ledger.spell_slots.available(1), 0);
    assert!(state.ledger.spell_slots.consume(1, 1).is_err());
    state.conditions.toggle(Condition::Poisoned);
    state.conditions.set_exhaustion_level(1).unwrap();

    state.take_rest(RestTier::Short);
    assert_eq!(state.ledger.resource("Channel Divinity").unwrap().current(), 2);
    assert_eq!(state.ledger.spell_slots.available(1), 0);

    let summary = state.take_rest(RestTier::Long);
    assert_eq!(summary.ledger.spell_slots_regained, 4);
    assert_eq!(summary.exhaustion_after, 0);
    assert_eq!(state.ledger.resource("Pearl of Power").unwrap().current(), 0);
    assert!(state.conditions.is_active(Condition::Poisoned));

    state.take_rest(RestTier::Dawn);
    assert_eq!(state.ledger.resource("Pearl of Power").unwrap().current(), 1);
}

/// Test: a stored character state is checked when loaded back
#[test]
fn test_stored_state_is_validated() {
    let mut ledger = ResourceLedger::new();
    ledger.add_resource(Resource::new("Rage", "RG", 3, RechargeTrigger::LongRest));
    ledger.spell_slots = SpellSlotPool::for_caster_level(5).unwrap();
    ledger.pact_slots = Some(PactSlotPool::for_caster_level(3).unwrap());
    let mut state = RulesState::new(ledger);
    state.ledger.use_resource("Rage", 1).unwrap();
    state.conditions.set_exhaustion_level(2).unwrap();

    let mut stored = serde_json::to_value(&state).unwrap();
    let back: RulesState = serde_json::from_value(stored.clone()).unwrap();
    assert_eq!(back, state);

    stored["conditions"]["exhaustion_level"] = json!(9);
    assert!(serde_json::from_value::<RulesState>(stored.clone()).is_err());

    stored["conditions"]["exhaustion_level"] = json!(2);
    stored["ledger"]["pact_slots"]["used"] = json!(7);
    assert!(serde_json::from_value::<RulesState>(stored).is_err());
}
