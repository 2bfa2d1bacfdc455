//! Directories the validated content expects to find.

use std::collections::BTreeSet;

use crate::assets::{AssetTriple, BUILDINGS, COMBATANTS, HEROES, PORTRAITS};
use crate::tracker::CrossReferences;

/// Animation subtypes every combatant needs.
pub const COMBATANT_SUBTYPES: [&str; 4] = ["idle", "attack", "defend", "die"];
/// Animation subtypes every building needs.
pub const BUILDING_SUBTYPES: [&str; 2] = ["construction", "idle"];
/// Animation subtypes a building may have.
pub const BUILDING_OPTIONAL_SUBTYPES: [&str; 1] = ["harvest"];
/// Animation subtypes every hero needs, in addition to one per skill.
pub const HERO_SUBTYPES: [&str; 2] = ["idle", "attack"];

/// Required and optional directory triples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedAssets {
    required: BTreeSet<AssetTriple>,
    optional: BTreeSet<AssetTriple>,
}

impl ExpectedAssets {
    /// Derive the expected directories from validated IDs.
    #[must_use]
    pub fn from_references(refs: &CrossReferences) -> Self {
        let mut expected = Self::default();

        for id in refs.combatant_ids() {
            for subtype in COMBATANT_SUBTYPES {
                expected.require(AssetTriple::new(COMBATANTS, id, subtype));
            }
        }
        for id in refs.building_ids() {
            for subtype in BUILDING_SUBTYPES {
                expected.require(AssetTriple::new(BUILDINGS, id, subtype));
            }
            for subtype in BUILDING_OPTIONAL_SUBTYPES {
                expected.allow(AssetTriple::new(BUILDINGS, id, subtype));
            }
        }
        for id in refs.hero_ids() {
            for subtype in HERO_SUBTYPES {
                expected.require(AssetTriple::new(HEROES, id, subtype));
            }
        }
        for (hero, skills) in refs.hero_skills() {
            for skill in skills {
                expected.require(AssetTriple::new(HEROES, hero, skill));
            }
        }
        for portrait in refs.portrait_ids() {
            expected.require(AssetTriple::item(PORTRAITS, portrait.to_string()));
        }

        expected
    }

    /// Add a required triple.
    pub fn require(&mut self, triple: AssetTriple) {
        self.optional.remove(&triple);
        self.required.insert(triple);
    }

    /// Add an optional triple. Ignored if already required.
    pub fn allow(&mut self, triple: AssetTriple) {
        if !self.required.contains(&triple) {
            self.optional.insert(triple);
        }
    }

    /// Triples that must exist.
    #[must_use]
    pub fn required(&self) -> &BTreeSet<AssetTriple> {
        &self.required
    }

    /// Triples that may exist.
    #[must_use]
    pub fn optional(&self) -> &BTreeSet<AssetTriple> {
        &self.optional
    }

    /// Whether `triple` is required or optional.
    #[must_use]
    pub fn is_expected(&self, triple: &AssetTriple) -> bool {
        self.required.contains(triple) || self.optional.contains(triple)
    }
}
