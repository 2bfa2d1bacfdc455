//! `fiefdom_building_types.json`: an array of single-key objects, each
//! mapping a building ID to its definition.
//!
//! Building images are discovered from `images/buildings/<id>/`; the legacy
//! `*_images` arrays are no longer read and only draw a warning.

use tracing::debug;

use crate::issue::{IssueSink, Severity};
use crate::loader::{JsonNode, JsonObject};
use crate::schema::{check_fields, Bound, EntityKind, FieldRule, Scope, Shape};
use crate::tracker::CrossReferences;
use crate::validators::EntityWalker;

/// Keys allowed in a resource-production object.
pub const PRODUCTION_FIELDS: [&str; 4] = [
    "amount",
    "amount_multiplier",
    "periodicity",
    "periodicity_multiplier",
];

const COST: Shape = Shape::NumberArray(Bound::NonNegative(Severity::Warn));
const PRODUCTION: Shape = Shape::NumberMap(&PRODUCTION_FIELDS);

const FIELDS: [FieldRule; 23] = [
    FieldRule::required("width", Shape::Integer { min: 1 }),
    FieldRule::required("height", Shape::Integer { min: 1 }),
    FieldRule::required("max_level", Shape::Integer { min: 1 }),
    FieldRule::required("construction_times", COST),
    FieldRule::optional("can_build_outside_wall", Shape::Boolean),
    FieldRule::optional("gold_cost", COST),
    FieldRule::optional("grain_cost", COST),
    FieldRule::optional("wood_cost", COST),
    FieldRule::optional("steel_cost", COST),
    FieldRule::optional("bronze_cost", COST),
    FieldRule::optional("stone_cost", COST),
    FieldRule::optional("leather_cost", COST),
    FieldRule::optional("mana_cost", COST),
    FieldRule::optional("peasants", PRODUCTION),
    FieldRule::optional("gold", PRODUCTION),
    FieldRule::optional("grain", PRODUCTION),
    FieldRule::optional("wood", PRODUCTION),
    FieldRule::optional("steel", PRODUCTION),
    FieldRule::optional("bronze", PRODUCTION),
    FieldRule::optional("stone", PRODUCTION),
    FieldRule::optional("leather", PRODUCTION),
    FieldRule::optional("mana", PRODUCTION),
    FieldRule::optional("visual_description", Shape::Description),
];

/// Image-list fields superseded by the images directory.
pub const LEGACY_IMAGE_FIELDS: [&str; 3] = ["construction_images", "idle_images", "harvest_images"];

/// Validate the building list, staging accepted IDs into `staged`.
///
/// Returns how many entities validated without an ERROR.
pub fn validate(doc: &JsonNode, sink: &mut IssueSink<'_>, staged: &mut CrossReferences) -> usize {
    let Some(entries) = doc.as_array() else {
        sink.error("Expected array of building definitions");
        return 0;
    };
    if entries.is_empty() {
        sink.warn("Buildings array is empty");
    }

    let mut walker = EntityWalker::new(EntityKind::Building).at_depth(2);
    let mut clean = 0;
    for entry in entries {
        let Some(entry) = entry.as_object() else {
            sink.error("Each building entry must be an object");
            continue;
        };
        if entry.len() != 1 {
            let line = entry
                .keys()
                .next()
                .map_or(1, |first| sink.lines().key_line(first, 2, 0));
            sink.warn_at(
                line,
                "Each building entry should have exactly one key (building ID)",
            );
        }

        for (id, definition) in entry.iter() {
            if let Some((scope, obj)) = walker.visit(id, definition, sink) {
                clean += usize::from(validate_building(&scope, id, obj, sink));
            }
        }
    }
    debug!(entities = entries.len(), clean, "Validated buildings");

    for id in walker.into_ids() {
        staged.add_building(id);
    }
    clean
}

fn validate_building(scope: &Scope, id: &str, obj: &JsonObject, sink: &mut IssueSink<'_>) -> bool {
    let valid = check_fields(scope, obj, &FIELDS, sink);

    for field in LEGACY_IMAGE_FIELDS {
        if obj.contains_key(field) {
            sink.warn_at(
                scope.line(),
                format!(
                    "{} is ignored; images are read from images/buildings/{id}/",
                    scope.path(field)
                ),
            );
        }
    }

    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_document;

    fn run(content: &str) -> (CrossReferences, Vec<String>) {
        let mut sink = IssueSink::new("fiefdom_building_types.json", content);
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
    fn test_valid_building() {
        let (staged, issues) = run(
            r#"[{"sawmill": {
                "width": 2, "height": 2, "max_level": 3,
                "construction_times": [10, 20, 40],
                "can_build_outside_wall": true,
                "wood_cost": [5, 10, 20],
                "mana_cost": [0, 0, 1],
                "wood": {"amount": 2, "amount_multiplier": 1.5, "periodicity": 60, "periodicity_multiplier": 0.9},
                "peasants": {"amount": 1},
                "visual_description": "A water-driven sawmill."
            }}]"#,
        );
        assert!(issues.is_empty(), "{issues:?}");
        assert!(staged.building_ids().contains("sawmill"));
    }

    #[test]
    fn test_missing_required_fields_in_order() {
        let (_, issues) = run(r#"[{"keep": {"name": "Keep"}}]"#);
        assert_eq!(
            issues,
            vec![
                "ERROR: Building 'keep' is missing required field 'width'",
                "ERROR: Building 'keep' is missing required field 'height'",
                "ERROR: Building 'keep' is missing required field 'max_level'",
                "ERROR: Building 'keep' is missing required field 'construction_times'",
            ]
        );
    }

    #[test]
    fn test_negative_costs_warn_and_production_keys() {
        let (_, issues) = run(
            r#"[{"farm": {
                "width": 1, "height": 1, "max_level": 1,
                "construction_times": [-1],
                "gold_cost": [-5],
                "grain": {"amount": "lots", "bonus": 1},
                "can_build_outside_wall": "yes"
            }}]"#,
        );
        assert_eq!(
            issues,
            vec![
                "WARN: Building 'farm'.construction_times[0] must be >= 0, got -1",
                "ERROR: Building 'farm'.can_build_outside_wall must be a boolean",
                "WARN: Building 'farm'.gold_cost[0] must be >= 0, got -5",
                "WARN: Building 'farm'.grain has unexpected keys: ['bonus']",
                "ERROR: Building 'farm'.grain.amount must be a number",
            ]
        );
    }

    #[test]
    fn test_entry_shape_and_duplicates() {
        let (staged, issues) = run(
            r#"[
                {"well": {"width": 1, "height": 1, "max_level": 1, "construction_times": [1]},
                 "Pond": {"width": 1, "height": 1, "max_level": 1, "construction_times": [1]}},
                "tower",
                {"well": {}}
            ]"#,
        );
        assert_eq!(
            issues,
            vec![
                "WARN: Each building entry should have exactly one key (building ID)",
                "WARN: Building ID 'Pond' should be lowercase, use snake_case",
                "ERROR: Each building entry must be an object",
                "ERROR: Duplicate building ID: 'well'",
            ]
        );
        assert_eq!(staged.building_ids().len(), 2);
    }

    #[test]
    fn test_building_id_matching_a_field_name_gets_its_own_line() {
        let content = r#"[
  {"sawmill": {"width": 1, "height": 1, "max_level": 1, "construction_times": [1],
               "wood": {"amount": 1}}},
  {"wood": {"width": 1, "height": 1, "max_level": 1, "construction_times": [1]}},
  {"wood": {}}
]"#;
        let mut sink = IssueSink::new("fiefdom_building_types.json", content);
        let mut staged = CrossReferences::new();
        let doc = parse_document(content, &mut sink).unwrap();
        assert_eq!(validate(&doc, &mut sink, &mut staged), 2);

        let issues = sink.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message(), "Duplicate building ID: 'wood'");
        assert_eq!(issues[0].location().line, 5);
    }

    #[test]
    fn test_legacy_image_fields_warn() {
        let (_, issues) = run(
            r#"[{"mill": {"width": 1, "height": 1, "max_level": 1, "construction_times": [1],
                "idle_images": ["mill_idle.png"]}}]"#,
        );
        assert_eq!(
            issues,
            vec!["WARN: Building 'mill'.idle_images is ignored; images are read from images/buildings/mill/"]
        );
    }
}
