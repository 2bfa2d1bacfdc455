//! `player_combatants.json` / `enemy_combatants.json`.
//!
//! A mapping of combatant ID to definition. Per-level stat rows (`damage`,
//! `defense`) are keyed by the damage-type vocabulary; `costs` rows by the
//! seven resource types.

use tracing::debug;

use crate::issue::{IssueSink, Severity};
use crate::loader::{JsonNode, JsonObject};
use crate::schema::{check_fields, format_set, Bound, EntityKind, FieldRule, Scope, Shape};
use crate::tracker::{CrossReferences, DamageVocabulary};
use crate::validators::EntityWalker;

/// The seven base resources.
pub const RESOURCE_TYPES: [&str; 7] = [
    "gold", "grain", "wood", "steel", "bronze", "stone", "leather",
];

const FIELDS: [FieldRule; 4] = [
    FieldRule::required("name", Shape::Name),
    FieldRule::required("max_level", Shape::Integer { min: 1 }),
    FieldRule::optional("movement_speed", Shape::NumberArray(Bound::Positive(Severity::Warn))),
    FieldRule::optional("visual_description", Shape::Description),
];

/// Which combatant collection a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Roster {
    /// `player_combatants.json`
    Player,
    /// `enemy_combatants.json`
    Enemy,
}

impl Roster {
    /// Lowercase name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Enemy => "enemy",
        }
    }
}

/// Validate a combatant collection, staging accepted IDs into `staged`.
///
/// Returns how many entities validated without an ERROR.
pub fn validate(
    doc: &JsonNode,
    roster: Roster,
    vocabulary: &DamageVocabulary,
    sink: &mut IssueSink<'_>,
    staged: &mut CrossReferences,
) -> usize {
    let Some(entries) = doc.as_object() else {
        sink.error("Expected object with combatant definitions");
        return 0;
    };
    if entries.is_empty() {
        sink.warn(format!("Empty {} combatants file", roster.name()));
    }

    let mut walker = EntityWalker::new(EntityKind::Combatant);
    let mut clean = 0;
    for (id, definition) in entries.iter() {
        if let Some((scope, obj)) = walker.visit(id, definition, sink) {
            clean += usize::from(validate_combatant(&scope, obj, vocabulary, sink));
        }
    }
    debug!(
        roster = roster.name(),
        entities = entries.len(),
        clean,
        "Validated combatants"
    );

    for id in walker.into_ids() {
        staged.add_combatant(id);
    }
    clean
}

fn validate_combatant(
    scope: &Scope,
    obj: &JsonObject,
    vocabulary: &DamageVocabulary,
    sink: &mut IssueSink<'_>,
) -> bool {
    let mut valid = check_fields(scope, obj, &FIELDS[..2], sink);
    valid &= check_stat_rows(scope, obj, "damage", vocabulary, false, sink);
    valid &= check_stat_rows(scope, obj, "defense", vocabulary, true, sink);
    valid &= check_fields(scope, obj, &FIELDS[2..3], sink);
    valid &= check_cost_rows(scope, obj, sink);
    check_fields(scope, obj, &FIELDS[3..], sink);
    valid
}

/// Per-level rows whose keys must be exactly the damage vocabulary.
///
/// With `allow_null`, `null` rows mean "no data at this level" and are skipped.
fn check_stat_rows(
    scope: &Scope,
    obj: &JsonObject,
    field: &str,
    vocabulary: &DamageVocabulary,
    allow_null: bool,
    sink: &mut IssueSink<'_>,
) -> bool {
    let Some(value) = obj.get(field) else {
        return true;
    };
    let path = scope.path(field);
    let Some(rows) = value.as_array() else {
        sink.error_at(scope.line(), format!("{path} must be an array"));
        return false;
    };

    let expected = vocabulary.types();
    let mut valid = true;
    for (i, row) in rows.iter().enumerate() {
        if allow_null && row.is_null() {
            continue;
        }
        let Some(row) = row.as_object() else {
            let shape = if allow_null { "an object or null" } else { "an object" };
            sink.error_at(scope.line(), format!("{path}[{i}] must be {shape}"));
            valid = false;
            continue;
        };

        let unexpected: Vec<&str> = row.keys().filter(|k| !vocabulary.contains(k)).collect();
        if !unexpected.is_empty() {
            sink.warn_at(
                scope.line(),
                format!("{path}[{i}] has unexpected keys: {}", format_set(&unexpected)),
            );
        }

        let missing: Vec<&str> = expected
            .iter()
            .map(String::as_str)
            .filter(|k| !row.contains_key(k))
            .collect();
        if !missing.is_empty() {
            sink.error_at(
                scope.line(),
                format!("{path}[{i}] is missing keys: {}", format_set(&missing)),
            );
            valid = false;
            continue;
        }

        valid &= check_numeric_values(scope, &format!("{path}[{i}]"), row, expected, sink);
    }
    valid
}

fn check_cost_rows(scope: &Scope, obj: &JsonObject, sink: &mut IssueSink<'_>) -> bool {
    let Some(value) = obj.get("costs") else {
        return true;
    };
    let path = scope.path("costs");
    let Some(rows) = value.as_array() else {
        sink.error_at(scope.line(), format!("{path} must be an array"));
        return false;
    };

    let mut valid = true;
    for (i, row) in rows.iter().enumerate() {
        let Some(row) = row.as_object() else {
            sink.error_at(scope.line(), format!("{path}[{i}] must be an object"));
            valid = false;
            continue;
        };
        if row.is_empty() {
            sink.error_at(scope.line(), format!("{path}[{i}] must not be empty"));
            valid = false;
            continue;
        }

        let unexpected: Vec<&str> = row.keys().filter(|k| !RESOURCE_TYPES.contains(k)).collect();
        if !unexpected.is_empty() {
            sink.warn_at(
                scope.line(),
                format!("{path}[{i}] has unexpected keys: {}", format_set(&unexpected)),
            );
        }

        let keys: Vec<&str> = row.keys().collect();
        valid &= check_numeric_values(scope, &format!("{path}[{i}]"), row, &keys, sink);
    }
    valid
}

fn check_numeric_values<S: AsRef<str>>(
    scope: &Scope,
    row_path: &str,
    row: &JsonObject,
    keys: &[S],
    sink: &mut IssueSink<'_>,
) -> bool {
    let mut valid = true;
    let mut reported: Vec<&str> = Vec::new();
    for key in keys.iter().map(AsRef::as_ref) {
        if reported.contains(&key) {
            continue;
        }
        reported.push(key);
        if let Some(value) = row.get(key) {
            if value.as_number().is_none() {
                sink.error_at(
                    scope.line(),
                    format!(
                        "{row_path}.{key} must be a number, got {}",
                        value.kind_name()
                    ),
                );
                valid = false;
            }
        }
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_document;

    fn run(content: &str) -> (CrossReferences, Vec<String>) {
        run_with(content, &DamageVocabulary::default())
    }

    fn run_with(content: &str, vocabulary: &DamageVocabulary) -> (CrossReferences, Vec<String>) {
        let mut sink = IssueSink::new("player_combatants.json", content);
        let mut staged = CrossReferences::new();
        if let Some(doc) = parse_document(content, &mut sink) {
            validate(&doc, Roster::Player, vocabulary, &mut sink, &mut staged);
        }
        let issues = sink
            .into_issues()
            .iter()
            .map(|i| format!("{}: {}", i.severity(), i.message()))
            .collect();
        (staged, issues)
    }

    #[test]
    fn test_valid_combatant() {
        let (staged, issues) = run(
            r#"{
                "spearman": {
                    "name": "Spearman",
                    "max_level": 2,
                    "damage": [{"melee": 4, "ranged": 0, "magical": 0}, {"melee": 5, "ranged": 0, "magical": 0}],
                    "defense": [null, {"melee": 1, "ranged": 1, "magical": 0.5}],
                    "movement_speed": [1.5, 1.75],
                    "costs": [{"gold": 10}, {"gold": 15, "wood": 2}],
                    "visual_description": "A soldier with a long spear."
                }
            }"#,
        );
        assert!(issues.is_empty(), "{issues:?}");
        assert!(staged.combatant_ids().contains("spearman"));
    }

    #[test]
    fn test_counts_entities_without_errors() {
        let content = r#"{
            "spearman": {"name": "Spearman", "max_level": 1},
            "Archer": {"name": "Archer", "max_level": 1},
            "militia": {"name": "", "max_level": 1},
            "scout": 4
        }"#;
        let mut sink = IssueSink::new("player_combatants.json", content);
        let mut staged = CrossReferences::new();
        let doc = parse_document(content, &mut sink).unwrap();
        let clean = validate(
            &doc,
            Roster::Player,
            &DamageVocabulary::default(),
            &mut sink,
            &mut staged,
        );
        assert_eq!(clean, 2);
        assert_eq!(staged.combatant_ids().len(), 4);
    }

    #[test]
    fn test_required_fields() {
        let (_, issues) = run(r#"{"spearman": {"name": "", "max_level": 0}}"#);
        assert_eq!(
            issues,
            vec![
                "ERROR: Combatant 'spearman' has invalid 'name' field",
                "ERROR: Combatant 'spearman'.max_level must be >= 1, got 0",
            ]
        );

        let (_, issues) = run(r#"{"spearman": {}}"#);
        assert_eq!(
            issues,
            vec![
                "ERROR: Combatant 'spearman' is missing required field 'name'",
                "ERROR: Combatant 'spearman' is missing required field 'max_level'",
            ]
        );
    }

    #[test]
    fn test_stat_rows_against_vocabulary() {
        let (_, issues) = run(
            r#"{"archer": {"name": "Archer", "max_level": 1,
                "damage": [{"melee": 1, "ranged": "high", "fire": 2}, 7]}}"#,
        );
        assert_eq!(
            issues,
            vec![
                "WARN: Combatant 'archer'.damage[0] has unexpected keys: ['fire']",
                "ERROR: Combatant 'archer'.damage[0] is missing keys: ['magical']",
                "ERROR: Combatant 'archer'.damage[1] must be an object",
            ]
        );
    }

    #[test]
    fn test_non_numeric_stat_value() {
        let (_, issues) = run(
            r#"{"archer": {"name": "Archer", "max_level": 1,
                "defense": [{"melee": 1, "ranged": "high", "magical": 0}, 3]}}"#,
        );
        assert_eq!(
            issues,
            vec![
                "ERROR: Combatant 'archer'.defense[0].ranged must be a number, got string",
                "ERROR: Combatant 'archer'.defense[1] must be an object or null",
            ]
        );
    }

    #[test]
    fn test_custom_vocabulary_is_used() {
        let vocabulary = DamageVocabulary::from_validated(vec![
            "melee".to_string(),
            "ranged".to_string(),
            "magical".to_string(),
            "fire".to_string(),
        ]);
        let (_, issues) = run_with(
            r#"{"imp": {"name": "Imp", "max_level": 1,
                "damage": [{"melee": 1, "ranged": 0, "magical": 0}]}}"#,
            &vocabulary,
        );
        assert_eq!(
            issues,
            vec!["ERROR: Combatant 'imp'.damage[0] is missing keys: ['fire']"]
        );
    }

    #[test]
    fn test_movement_speed_and_costs() {
        let (_, issues) = run(
            r#"{"scout": {"name": "Scout", "max_level": 1,
                "movement_speed": [0, "fast"],
                "costs": [{}, {"gold": 1, "gems": 2}, {"wood": null}]}}"#,
        );
        assert_eq!(
            issues,
            vec![
                "WARN: Combatant 'scout'.movement_speed[0] must be > 0, got 0",
                "ERROR: Combatant 'scout'.movement_speed[1] must be a number",
                "ERROR: Combatant 'scout'.costs[0] must not be empty",
                "WARN: Combatant 'scout'.costs[1] has unexpected keys: ['gems']",
                "ERROR: Combatant 'scout'.costs[2].wood must be a number, got null",
            ]
        );
    }

    #[test]
    fn test_duplicate_id_is_skipped() {
        let (staged, issues) = run(
            r#"{"Goblin": {"name": "Goblin", "max_level": 1},
                "Goblin": {"max_level": "x"}}"#,
        );
        assert_eq!(
            issues,
            vec![
                "WARN: Combatant ID 'Goblin' should be lowercase",
                "ERROR: Duplicate combatant ID: 'Goblin'",
            ]
        );
        assert_eq!(staged.combatant_ids().len(), 1);
    }

    #[test]
    fn test_empty_file_warns() {
        let (_, issues) = run("{}");
        assert_eq!(issues, vec!["WARN: Empty player combatants file"]);
        let (_, issues) = run("[]");
        assert_eq!(issues, vec!["ERROR: Expected object with combatant definitions"]);
    }
}
