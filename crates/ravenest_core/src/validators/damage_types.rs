//! `damage_types.json`: a non-empty array of damage-type names.

use std::collections::BTreeSet;

use tracing::debug;

use crate::issue::IssueSink;
use crate::loader::JsonNode;
use crate::schema::format_set;
use crate::tracker::REQUIRED_DAMAGE_TYPES;

/// Validate the damage-type list.
///
/// Returns the distinct, non-empty damage-type strings in declaration order.
/// This becomes the vocabulary for combatant stat rows even if the file had
/// ERRORs.
pub fn validate(doc: &JsonNode, sink: &mut IssueSink<'_>) -> Vec<String> {
    let Some(items) = doc.as_array() else {
        sink.error("Expected array of damage types");
        return Vec::new();
    };
    if items.is_empty() {
        sink.error("Damage types array is empty");
        return Vec::new();
    }

    let mut vocabulary: Vec<String> = Vec::new();
    let mut occurrences: Vec<(String, usize)> = Vec::new();

    for item in items {
        let Some(name) = item.as_str() else {
            sink.error(format!(
                "Expected string for damage type, got {}",
                item.kind_name()
            ));
            continue;
        };

        let seen = match occurrences.iter_mut().find(|(n, _)| n == name) {
            Some((_, count)) => {
                *count += 1;
                *count - 1
            }
            None => {
                occurrences.push((name.to_string(), 1));
                0
            }
        };
        let line = sink.lines().string_line(name, seen);

        if seen > 0 {
            sink.error_at(line, format!("Duplicate damage type: '{name}'"));
        }
        if name.is_empty() {
            sink.error_at(line, "Empty damage type string");
        } else if seen == 0 {
            vocabulary.push(name.to_string());
        }
    }

    let present: BTreeSet<&str> = vocabulary.iter().map(String::as_str).collect();
    let missing: Vec<&str> = REQUIRED_DAMAGE_TYPES
        .iter()
        .copied()
        .filter(|t| !present.contains(t))
        .collect();
    if !missing.is_empty() {
        sink.error(format!(
            "Missing required damage types: {}",
            format_set(&missing)
        ));
    }

    debug!(entries = items.len(), types = vocabulary.len(), "Validated damage types");
    vocabulary
}
