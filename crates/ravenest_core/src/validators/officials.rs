//! `fiefdom_officials.json`: official templates keyed by ID.

use tracing::debug;

use crate::issue::IssueSink;
use crate::loader::{JsonNode, JsonObject};
use crate::schema::{
    check_field, check_fields, paired_requirement, EntityKind, FieldRule, PairedStat, Scope, Shape,
};
use crate::tracker::CrossReferences;
use crate::validators::EntityWalker;

/// Roles an official may hold.
pub const OFFICIAL_ROLES: [&str; 8] = [
    "bailiff",
    "wizard",
    "architect",
    "steward",
    "reeve",
    "beadle",
    "constable",
    "forester",
];

const FIELDS: [FieldRule; 3] = [
    FieldRule::required("name", Shape::NonEmptyString),
    FieldRule::required("max_level", Shape::Integer { min: 1 }),
    FieldRule::required("roles", Shape::OneOfArray(&OFFICIAL_ROLES)),
];

const PORTRAIT_ID: FieldRule = FieldRule::required("portrait_id", Shape::Integer { min: 1 });

const PORTRAIT_DESCRIPTION: FieldRule =
    FieldRule::optional("portrait_description", Shape::Description);

const STATS: [PairedStat; 4] = [
    PairedStat::conditional("intelligence", "intelligence_max").with_range(0, 255),
    PairedStat::conditional("charisma", "charisma_max").with_range(0, 255),
    PairedStat::conditional("wisdom", "wisdom_max").with_range(0, 255),
    PairedStat::conditional("diligence", "diligence_max").with_range(0, 255),
];

/// Validate the officials mapping, staging official and portrait IDs into `staged`.
///
/// Returns how many entities validated without an ERROR.
pub fn validate(doc: &JsonNode, sink: &mut IssueSink<'_>, staged: &mut CrossReferences) -> usize {
    let Some(entries) = doc.as_object() else {
        sink.error("Expected object with official definitions");
        return 0;
    };
    if entries.is_empty() {
        sink.warn("Empty fiefdom officials file");
    }

    let mut walker = EntityWalker::new(EntityKind::Official);
    let mut clean = 0;
    for (id, definition) in entries.iter() {
        if let Some((scope, obj)) = walker.visit(id, definition, sink) {
            clean += usize::from(validate_official(&scope, obj, sink, staged));
        }
    }
    debug!(entities = entries.len(), clean, "Validated fiefdom officials");

    for id in walker.into_ids() {
        staged.add_official(id);
    }
    clean
}

fn validate_official(
    scope: &Scope,
    obj: &JsonObject,
    sink: &mut IssueSink<'_>,
    staged: &mut CrossReferences,
) -> bool {
    let mut valid = check_fields(scope, obj, &FIELDS, sink);

    match obj.get("stats") {
        None => {
            scope.missing(sink, "stats");
            valid = false;
        }
        Some(stats) => match stats.as_object() {
            Some(stats) => valid &= paired_requirement(&scope.nested("stats"), stats, &STATS, sink),
            None => {
                sink.error_at(scope.line(), format!("{} must be an object", scope.path("stats")));
                valid = false;
            }
        },
    }

    if check_field(scope, obj, &PORTRAIT_ID, sink) {
        if let Some(portrait) = obj.get("portrait_id").and_then(JsonNode::as_integer) {
            staged.add_portrait(portrait);
        }
    } else {
        valid = false;
    }

    check_field(scope, obj, &PORTRAIT_DESCRIPTION, sink);
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_document;

    fn run(content: &str) -> (CrossReferences, Vec<String>) {
        let mut sink = IssueSink::new("fiefdom_officials.json", content);
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
    fn test_valid_official_records_portrait() {
        let (staged, issues) = run(
            r#"{"reeve_anna": {
                "name": "Anna", "max_level": 5, "roles": ["reeve", "steward"],
                "stats": {"intelligence": [10, 20], "intelligence_max": 255, "wisdom": [0], "wisdom_max": 3},
                "portrait_id": 7,
                "portrait_description": "A stern woman with a ledger."
            }}"#,
        );
        assert!(issues.is_empty(), "{issues:?}");
        assert!(staged.official_ids().contains("reeve_anna"));
        assert!(staged.portrait_ids().contains(&7));
    }

    #[test]
    fn test_stat_without_max() {
        let (_, issues) = run(
            r#"{"reeve_anna": {"name": "Anna", "max_level": 1, "roles": ["reeve"],
                "stats": {"intelligence": [1, 2, 3]}, "portrait_id": 1}}"#,
        );
        assert_eq!(
            issues,
            vec!["ERROR: Official 'reeve_anna' with 'intelligence' is missing required field 'stats.intelligence_max'"]
        );
    }

    #[test]
    fn test_roles_and_portrait() {
        let (staged, issues) = run(
            r#"{"odo": {"name": "Odo", "max_level": 1, "roles": ["jester", 4],
                "stats": {}, "portrait_id": 0}, "ida": {"name": "Ida", "max_level": 1, "roles": [],
                "stats": [], "portrait_description": 12}}"#,
        );
        assert_eq!(
            issues,
            vec![
                "ERROR: Official 'odo'.roles[0] must be one of ['architect', 'bailiff', 'beadle', 'constable', 'forester', 'reeve', 'steward', 'wizard'], got 'jester'",
                "ERROR: Official 'odo'.roles[1] must be a string",
                "ERROR: Official 'odo'.portrait_id must be >= 1, got 0",
                "ERROR: Official 'ida'.roles must not be empty",
                "ERROR: Official 'ida'.stats must be an object",
                "ERROR: Official 'ida' is missing required field 'portrait_id'",
                "WARN: Official 'ida'.portrait_description must be a string",
            ]
        );
        assert!(staged.portrait_ids().is_empty());
    }

    #[test]
    fn test_missing_stats() {
        let (_, issues) = run(r#"{"odo": {"name": "Odo", "max_level": 1, "roles": ["reeve"], "portrait_id": 2}}"#);
        assert_eq!(issues, vec!["ERROR: Official 'odo' is missing required field 'stats'"]);
    }
}
