//! Per-entity-kind validators.
//!
//! Each validator takes a parsed document, records issues into the file's
//! [`IssueSink`], and stages the IDs it accepted into a
//! [`CrossReferences`](crate::tracker::CrossReferences). Validation of
//! siblings always continues after a failure.

pub mod buildings;
pub mod combatants;
pub mod damage_types;
pub mod heroes;
pub mod officials;

use std::collections::{BTreeSet, HashMap};

use crate::issue::IssueSink;
use crate::loader::{JsonNode, JsonObject};
use crate::schema::{check_id_naming, EntityKind, Scope};

/// Walks the entity entries of one file, enforcing ID uniqueness and naming.
#[derive(Debug)]
pub(crate) struct EntityWalker {
    kind: EntityKind,
    depth: usize,
    seen: BTreeSet<String>,
    occurrences: HashMap<String, usize>,
}

impl EntityWalker {
    pub(crate) fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            depth: 1,
            seen: BTreeSet::new(),
            occurrences: HashMap::new(),
        }
    }

    /// Entity IDs are keys of objects at `depth` (1 for a top-level mapping).
    pub(crate) fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Admit one `id: definition` entry.
    ///
    /// Returns the entity's scope and definition object, or `None` when the
    /// entry is a duplicate (skipped entirely) or not an object.
    pub(crate) fn visit<'n>(
        &mut self,
        id: &str,
        definition: &'n JsonNode,
        sink: &mut IssueSink<'_>,
    ) -> Option<(Scope, &'n JsonObject)> {
        let occurrence = self.occurrences.entry(id.to_string()).or_insert(0);
        let line = sink.lines().key_line(id, self.depth, *occurrence);
        *occurrence += 1;

        if !self.seen.insert(id.to_string()) {
            sink.error_at(line, format!("Duplicate {} ID: '{id}'", self.kind.noun()));
            return None;
        }

        check_id_naming(self.kind, id, line, sink);

        let scope = Scope::entity(self.kind, id, line);
        match definition.as_object() {
            Some(obj) => Some((scope, obj)),
            None => {
                sink.error_at(line, format!("{} must be an object", scope.label()));
                None
            }
        }
    }

    /// Every distinct ID admitted, in sorted order.
    pub(crate) fn into_ids(self) -> BTreeSet<String> {
        self.seen
    }
}

/// Run `check` on every object-valued entry of a keyed sub-collection
/// (`equipment`, `skills`, `status_effects`).
///
/// Reports a non-object collection or entry as an ERROR. Returns `true` if
/// no ERROR was recorded.
pub(crate) fn for_each_child<F>(
    scope: &Scope,
    obj: &JsonObject,
    field: &str,
    sink: &mut IssueSink<'_>,
    mut check: F,
) -> bool
where
    F: FnMut(&Scope, &JsonObject, &mut IssueSink<'_>) -> bool,
{
    let Some(value) = obj.get(field) else {
        return true;
    };
    let Some(children) = value.as_object() else {
        sink.error_at(scope.line(), format!("{} must be an object", scope.path(field)));
        return false;
    };

    let mut valid = true;
    for (child_id, child) in children.iter() {
        let child_scope = scope.child(&format!("{field}.{child_id}"));
        match child.as_object() {
            Some(child_obj) => valid &= check(&child_scope, child_obj, sink),
            None => {
                sink.error_at(
                    scope.line(),
                    format!("{} must be an object", child_scope.label()),
                );
                valid = false;
            }
        }
    }
    valid
}
