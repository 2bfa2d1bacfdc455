//! Diff expected image directories against the scanned tree.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::Path;

use tracing::debug;

use crate::assets::{
    AssetTree, AssetTriple, ExpectedAssets, ACTIVATE_DIR, BUILDINGS, COMBATANTS, HEROES,
    IMAGE_EXTENSIONS,
};
use crate::issue::{Issue, Location};
use crate::tracker::CrossReferences;

/// Found and expected triples sorted into their roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Required but not found.
    pub missing: BTreeSet<AssetTriple>,
    /// Found but neither required nor optional.
    pub orphaned: BTreeSet<AssetTriple>,
    /// Found and required.
    pub required_found: BTreeSet<AssetTriple>,
    /// Found and optional.
    pub optional_found: BTreeSet<AssetTriple>,
}

/// Split `found` against the expected sets.
#[must_use]
pub fn classify(expected: &ExpectedAssets, found: &BTreeSet<AssetTriple>) -> Classification {
    let required = expected.required();
    let optional = expected.optional();
    let known: BTreeSet<AssetTriple> = required.union(optional).cloned().collect();

    Classification {
        missing: required.difference(found).cloned().collect(),
        orphaned: found.difference(&known).cloned().collect(),
        required_found: found.intersection(required).cloned().collect(),
        optional_found: found.intersection(optional).cloned().collect(),
    }
}

/// Compare the images tree with what the validated content expects.
///
/// Every finding is a WARN except an empty required directory, which is an
/// ERROR. Issues come out grouped by check, each group in triple order.
#[must_use]
pub fn reconcile(
    expected: &ExpectedAssets,
    tree: &AssetTree,
    refs: &CrossReferences,
) -> Vec<Issue> {
    let root = tree.root();
    let at = |path: &Path| Location::new(path, 1);
    let mut issues = Vec::new();

    let validated = [
        (COMBATANTS, refs.combatant_ids()),
        (BUILDINGS, refs.building_ids()),
        (HEROES, refs.hero_ids()),
    ];
    let has_config = |item: &AssetTriple| {
        validated
            .iter()
            .any(|(kind, ids)| item.kind == *kind && ids.contains(&item.id))
    };

    // Items without config are reported once, as plain orphans, further down.
    for item in tree.childless_items().into_iter().filter(has_config) {
        issues.push(Issue::warn(
            at(&tree.path_of(&item)),
            format!("Orphaned images directory: {item} (no subtype directories)"),
        ));
    }

    let classes = classify(expected, &tree.found());

    for triple in &classes.missing {
        issues.push(Issue::warn(
            at(root),
            format!("Missing required images directory: {triple}"),
        ));
    }

    for triple in &classes.orphaned {
        issues.push(Issue::warn(
            at(&tree.path_of(triple)),
            format!("Orphaned images directory: {triple} (no matching config)"),
        ));
    }

    for (triple, files) in tree.dirs() {
        if !files.is_empty() {
            continue;
        }
        let location = at(&tree.path_of(triple));
        let issue = if classes.required_found.contains(triple) {
            Issue::error(location, format!("Empty required directory: {triple}"))
        } else if classes.optional_found.contains(triple) {
            Issue::warn(location, format!("Empty optional directory: {triple}"))
        } else {
            Issue::warn(location, format!("Empty orphaned directory: {triple}"))
        };
        issues.push(issue);
    }

    for (triple, files) in tree.dirs() {
        for file in files {
            if let Some(problem) = filename_problem(file) {
                issues.push(Issue::warn(
                    at(&tree.path_of(triple)),
                    format!("Invalid filename in {triple}: {file} ({problem})"),
                ));
            }
        }
    }

    for (hero, skills) in refs.hero_skills() {
        for skill in skills {
            if tree.activate_files(hero, skill).is_some_and(<[String]>::is_empty) {
                let skill_dir = tree.path_of(&AssetTriple::new(HEROES, hero, skill));
                issues.push(Issue::warn(
                    at(&skill_dir.join(ACTIVATE_DIR)),
                    format!(
                        "Empty optional activate/ directory: images/heroes/{hero}/{skill}/activate/"
                    ),
                ));
            }
        }
    }

    for &(kind, ids) in &validated {
        for id in tree.item_ids(kind).filter(|id| !ids.contains(*id)) {
            let item = AssetTriple::item(kind, id);
            issues.push(Issue::warn(
                at(&tree.path_of(&item)),
                format!("Orphaned images directory: {item}"),
            ));
        }
    }

    debug!(
        missing = classes.missing.len(),
        orphaned = classes.orphaned.len(),
        issues = issues.len(),
        "Reconciled images tree"
    );
    issues
}

/// Why an image file name is rejected, if it is.
///
/// Names must be `<n>.<ext>` with `n >= 1` and an accepted extension.
#[must_use]
pub fn filename_problem(name: &str) -> Option<&'static str> {
    let path = Path::new(name);
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);
    if !extension.is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str())) {
        return Some("invalid extension");
    }

    let stem = path.file_stem().and_then(OsStr::to_str).unwrap_or_default();
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return Some("non-numeric name");
    }
    if stem.bytes().all(|b| b == b'0') {
        return Some("must be >= 1");
    }
    None
}
