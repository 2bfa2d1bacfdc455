//! `heroes.json`: a mapping of hero ID to definition with nested equipment,
//! skills and status effects.

use tracing::debug;

use crate::issue::IssueSink;
use crate::loader::{JsonNode, JsonObject};
use crate::schema::{check_fields, paired_requirement, EntityKind, FieldRule, PairedStat, Scope, Shape};
use crate::tracker::CrossReferences;
use crate::validators::{for_each_child, EntityWalker};

/// Allowed status effect types.
pub const STATUS_EFFECT_TYPES: [&str; 3] = ["stun", "mute", "confuse"];

const HERO_FIELDS: [FieldRule; 2] = [
    FieldRule::required("name", Shape::NonEmptyString),
    FieldRule::required("max_level", Shape::Integer { min: 1 }),
];

const EQUIPMENT_FIELDS: [FieldRule; 2] = [
    FieldRule::required("slots", Shape::IntegerArray { range: None }),
    FieldRule::required("max", Shape::Integer { min: 0 }),
];

const SKILL_NAME: [FieldRule; 1] = [FieldRule::required("name", Shape::NonEmptyString)];

const SKILL_STATS: [PairedStat; 3] = [
    PairedStat::conditional("damage", "damage_max"),
    PairedStat::conditional("defense", "defense_max"),
    PairedStat::conditional("healing", "healing_max"),
];

const EFFECT_FIELDS: [FieldRule; 2] = [
    FieldRule::required("name", Shape::NonEmptyString),
    FieldRule::required("type", Shape::OneOf(&STATUS_EFFECT_TYPES)),
];

const EFFECT_STATS: [PairedStat; 1] = [PairedStat::always("effect", "max")];

const DESCRIPTION: [FieldRule; 1] = [FieldRule::optional("visual_description", Shape::Description)];

/// Validate the hero mapping, staging hero IDs and their skill IDs into `staged`.
///
/// Returns how many entities validated without an ERROR.
pub fn validate(doc: &JsonNode, sink: &mut IssueSink<'_>, staged: &mut CrossReferences) -> usize {
    let Some(entries) = doc.as_object() else {
        sink.error("Expected object with hero definitions");
        return 0;
    };
    if entries.is_empty() {
        sink.warn("Empty heroes file");
    }

    let mut walker = EntityWalker::new(EntityKind::Hero);
    let mut clean = 0;
    for (id, definition) in entries.iter() {
        let Some((scope, obj)) = walker.visit(id, definition, sink) else {
            continue;
        };
        if let Some(skills) = obj.get("skills").and_then(JsonNode::as_object) {
            staged.set_hero_skills(id, skills.keys());
        }
        clean += usize::from(validate_hero(&scope, obj, sink));
    }
    debug!(entities = entries.len(), clean, "Validated heroes");

    for id in walker.into_ids() {
        staged.add_hero(id);
    }
    clean
}

fn validate_hero(scope: &Scope, obj: &JsonObject, sink: &mut IssueSink<'_>) -> bool {
    let mut valid = check_fields(scope, obj, &HERO_FIELDS, sink);

    valid &= for_each_child(scope, obj, "equipment", sink, |slot, slot_obj, sink| {
        check_fields(slot, slot_obj, &EQUIPMENT_FIELDS, sink)
    });

    valid &= for_each_child(scope, obj, "skills", sink, |skill, skill_obj, sink| {
        let named = check_fields(skill, skill_obj, &SKILL_NAME, sink);
        paired_requirement(skill, skill_obj, &SKILL_STATS, sink) && named
    });

    valid &= for_each_child(scope, obj, "status_effects", sink, |effect, effect_obj, sink| {
        let fields = check_fields(effect, effect_obj, &EFFECT_FIELDS, sink);
        paired_requirement(effect, effect_obj, &EFFECT_STATS, sink) && fields
    });

    check_fields(scope, obj, &DESCRIPTION, sink);
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_document;

    fn run(content: &str) -> (CrossReferences, Vec<String>) {
        let mut sink = IssueSink::new("heroes.json", content);
        let mut staged = CrossReferences::new();
        if let Some(doc) = parse_document(content, &mut sink) {
            validate(&doc, &mut sink, &mut staged);
        }
        let issues = sink
            .into_issues()
            .iter()
            .map(|i| format!("{}: {}", i.severity(), i.message()))
            .collect();
        (staged, issues)
    }

    #[test]
    fn test_counts_heroes_without_errors() {
        let content = r#"{
            "arthur": {"name": "Arthur", "max_level": 1},
            "merlin": {"name": "Merlin", "max_level": 1, "skills": {"bolt": {"damage": [1]}}}
        }"#;
        let mut sink = IssueSink::new("heroes.json", content);
        let mut staged = CrossReferences::new();
        let doc = parse_document(content, &mut sink).unwrap();
        assert_eq!(validate(&doc, &mut sink, &mut staged), 1);
        assert_eq!(sink.error_count(), 2);
    }

    #[test]
    fn test_valid_hero_records_skills() {
        let (staged, issues) = run(
            r#"{"arthur": {
                "name": "Arthur",
                "max_level": 10,
                "equipment": {"weapon": {"slots": [1, 1, 2], "max": 2}},
                "skills": {
                    "cleave": {"name": "Cleave", "damage": [10, 12], "damage_max": 40},
                    "rally": {"name": "Rally", "defense": [1], "defense_max": 5, "healing": [2], "healing_max": 9}
                },
                "status_effects": {"daze": {"name": "Daze", "type": "stun", "effect": [1, 2], "max": 3}},
                "visual_description": "A king in battered armour."
            }}"#,
        );
        assert!(issues.is_empty(), "{issues:?}");
        assert!(staged.hero_ids().contains("arthur"));
        let skills: Vec<_> = staged.hero_skills()["arthur"].iter().cloned().collect();
        assert_eq!(skills, vec!["cleave", "rally"]);
    }

    #[test]
    fn test_skill_missing_damage_max_is_one_error() {
        let (_, issues) = run(
            r#"{"arthur": {"name": "Arthur", "max_level": 1,
                "skills": {"cleave": {"name": "Cleave", "damage": [1],
                    "defense": ["bad"], "healing": [1], "healing_max": -1}}}}"#,
        );
        let about_damage_max: Vec<_> = issues.iter().filter(|m| m.contains("damage_max")).collect();
        assert_eq!(
            about_damage_max,
            vec!["ERROR: Hero 'arthur'.skills.cleave with 'damage' is missing required field 'damage_max'"]
        );
        assert_eq!(
            issues,
            vec![
                "ERROR: Hero 'arthur'.skills.cleave.defense[0] must be an integer",
                "ERROR: Hero 'arthur'.skills.cleave with 'damage' is missing required field 'damage_max'",
                "ERROR: Hero 'arthur'.skills.cleave with 'defense' is missing required field 'defense_max'",
                "ERROR: Hero 'arthur'.skills.cleave.healing_max must be >= 0, got -1",
            ]
        );
    }

    #[test]
    fn test_equipment_fields_independently_required() {
        let (_, issues) = run(
            r#"{"arthur": {"name": "Arthur", "max_level": 1,
                "equipment": {"weapon": {"max": 1}, "armor": {"slots": [1]}, "ring": 4}}}"#,
        );
        assert_eq!(
            issues,
            vec![
                "ERROR: Hero 'arthur'.equipment.weapon is missing required field 'slots'",
                "ERROR: Hero 'arthur'.equipment.armor is missing required field 'max'",
                "ERROR: Hero 'arthur'.equipment.ring must be an object",
            ]
        );
    }

    #[test]
    fn test_status_effect_fields() {
        let (_, issues) = run(
            r#"{"merlin": {"name": "Merlin", "max_level": 1,
                "status_effects": {
                    "sleep": {"name": "Sleep", "type": "slumber", "effect": [1.5], "max": 1},
                    "hush": {}
                }}}"#,
        );
        assert_eq!(
            issues,
            vec![
                "ERROR: Hero 'merlin'.status_effects.sleep.type must be one of ['confuse', 'mute', 'stun'], got 'slumber'",
                "ERROR: Hero 'merlin'.status_effects.sleep.effect[0] must be an integer",
                "ERROR: Hero 'merlin'.status_effects.hush is missing required field 'name'",
                "ERROR: Hero 'merlin'.status_effects.hush is missing required field 'type'",
                "ERROR: Hero 'merlin'.status_effects.hush is missing required field 'effect'",
                "ERROR: Hero 'merlin'.status_effects.hush is missing required field 'max'",
            ]
        );
    }

    #[test]
    fn test_collections_must_be_objects() {
        let (_, issues) = run(
            r#"{"merlin": {"name": "Merlin", "max_level": "1", "skills": [], "visual_description": 3}}"#,
        );
        assert_eq!(
            issues,
            vec![
                "ERROR: Hero 'merlin'.max_level must be an integer, got string",
                "ERROR: Hero 'merlin'.skills must be an object",
                "WARN: Hero 'merlin'.visual_description must be a string",
            ]
        );
    }
}
