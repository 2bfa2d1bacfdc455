//! Property-based tests over generated content.

use proptest::prelude::*;
use ravenest_core::prelude::*;
use ravenest_test_utils::determinism::{check_source, verify_idempotence};
use ravenest_test_utils::fixtures::{arb_defense_rows, arb_entity_id, defense_json, valid_source};

const TRIO: [&str; 3] = ["melee", "ranged", "magical"];

fn damage_file(types: &[String]) -> String {
    serde_json::to_string(types).unwrap()
}

fn issues_in(issues: &[Issue], file: &str) -> Vec<String> {
    issues
        .iter()
        .filter(|i| i.location().file.ends_with(file))
        .map(|i| format!("{}: {}", i.severity(), i.message()))
        .collect()
}

/// JSON fragments for an optional paired stat on a skill.
fn arb_skill_stat(stat: &'static str) -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(format!(r#", "{stat}": [1, 2], "{stat}_max": 10"#)),
        Just(format!(r#", "{stat}": [1, 2]"#)),
        Just(format!(r#", "{stat}": "lots", "{stat}_max": -1"#)),
        Just(format!(r#", "{stat}_max": 3"#)),
    ]
}

proptest! {
    #[test]
    fn prop_exact_trio_in_any_order_is_clean(
        types in Just(TRIO.map(String::from).to_vec()).prop_shuffle()
    ) {
        let source = valid_source().with(ConfigFile::DamageTypes, damage_file(&types));
        let issues = check_source(&source);
        prop_assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn prop_missing_required_type_is_one_error(
        dropped in 0usize..3,
        extras in proptest::collection::btree_set("[a-z]{3,8}", 0..3)
            .prop_filter("extras must not be required types", |set| {
                TRIO.iter().all(|t| !set.contains(*t))
            }),
    ) {
        let mut types: Vec<String> = TRIO
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != dropped)
            .map(|(_, t)| (*t).to_string())
            .collect();
        types.extend(extras);

        let source = MemorySource::new("config").with(ConfigFile::DamageTypes, damage_file(&types));
        let issues = issues_in(&check_source(&source), "damage_types.json");
        prop_assert_eq!(
            issues,
            vec![format!("ERROR: Missing required damage types: ['{}']", TRIO[dropped])]
        );
    }

    #[test]
    fn prop_null_defense_rows_never_reported(rows in arb_defense_rows(8)) {
        let combatants = format!(
            r#"{{"militia": {{"name": "Militia", "max_level": {}, "defense": {}}}}}"#,
            rows.len(),
            defense_json(&rows)
        );
        let source = valid_source().with(ConfigFile::PlayerCombatants, combatants);
        let issues = check_source(&source);
        prop_assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn prop_damage_without_max_is_exactly_one_error(
        defense in arb_skill_stat("defense"),
        healing in arb_skill_stat("healing"),
    ) {
        let heroes = format!(
            r#"{{"arthur": {{"name": "Arthur", "max_level": 1, "skills": {{
                "cleave": {{"name": "Cleave", "damage": [5]{defense}{healing}}}
            }}}}}}"#
        );
        let source = valid_source().with(ConfigFile::Heroes, heroes);
        let issues = check_source(&source);
        let about_damage_max: Vec<_> = issues
            .iter()
            .filter(|i| i.message().contains("damage_max"))
            .collect();
        prop_assert_eq!(about_damage_max.len(), 1);
        prop_assert!(about_damage_max[0].is_error());
        prop_assert_eq!(
            about_damage_max[0].message(),
            "Hero 'arthur'.skills.cleave with 'damage' is missing required field 'damage_max'"
        );
    }

    #[test]
    fn prop_check_is_idempotent(
        id in arb_entity_id(),
        damage in prop_oneof![
            Just(r#"["melee", "ranged", "magical"]"#),
            Just(r#"["melee", "melee", ""]"#),
            Just(r#"{"melee": 1}"#),
            Just("[1, 2"),
        ],
    ) {
        let source = valid_source()
            .with(ConfigFile::DamageTypes, damage)
            .with(
                ConfigFile::EnemyCombatants,
                format!(r#"{{"{id}": {{"name": "X", "max_level": 1}}, "{id}": {{}}}}"#),
            );
        let result = verify_idempotence(3, || check_source(&source));
        prop_assert!(result.is_idempotent, "{:?}", result.hashes);
    }
}
