//! Cross-file state accumulated during a run.
//!
//! Validators stage the IDs they accept into a [`CrossReferences`] of their
//! own; the run merges that into its tracker only when the file produced no
//! ERRORs. The damage-type vocabulary lives here too because the combatant
//! validators read it.

use std::collections::{BTreeMap, BTreeSet};

/// Damage types every vocabulary must contain.
pub const REQUIRED_DAMAGE_TYPES: [&str; 3] = ["melee", "ranged", "magical"];

/// The ordered set of damage types combatant stat rows are keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageVocabulary {
    types: Vec<String>,
}

impl Default for DamageVocabulary {
    fn default() -> Self {
        Self {
            types: REQUIRED_DAMAGE_TYPES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl DamageVocabulary {
    /// Vocabulary from a validated damage-type list. An empty list falls back
    /// to the default trio.
    #[must_use]
    pub fn from_validated(types: Vec<String>) -> Self {
        if types.is_empty() {
            Self::default()
        } else {
            Self { types }
        }
    }

    /// Damage types in declaration order.
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Whether `name` is a known damage type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.iter().any(|t| t == name)
    }
}

/// Entity IDs and derived sub-structures accepted so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossReferences {
    combatant_ids: BTreeSet<String>,
    building_ids: BTreeSet<String>,
    hero_ids: BTreeSet<String>,
    official_ids: BTreeSet<String>,
    hero_skills: BTreeMap<String, BTreeSet<String>>,
    portrait_ids: BTreeSet<i64>,
}

impl CrossReferences {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a combatant ID (player and enemy share one namespace).
    pub fn add_combatant(&mut self, id: impl Into<String>) {
        self.combatant_ids.insert(id.into());
    }

    /// Record a building ID.
    pub fn add_building(&mut self, id: impl Into<String>) {
        self.building_ids.insert(id.into());
    }

    /// Record a hero ID.
    pub fn add_hero(&mut self, id: impl Into<String>) {
        self.hero_ids.insert(id.into());
    }

    /// Record the skill IDs of a hero. Replaces any earlier set for that hero.
    pub fn set_hero_skills<I, S>(&mut self, hero: impl Into<String>, skills: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hero_skills
            .insert(hero.into(), skills.into_iter().map(Into::into).collect());
    }

    /// Record an official ID.
    pub fn add_official(&mut self, id: impl Into<String>) {
        self.official_ids.insert(id.into());
    }

    /// Record a portrait ID.
    pub fn add_portrait(&mut self, id: i64) {
        self.portrait_ids.insert(id);
    }

    /// Fold another tracker into this one.
    pub fn merge(&mut self, other: CrossReferences) {
        self.combatant_ids.extend(other.combatant_ids);
        self.building_ids.extend(other.building_ids);
        self.hero_ids.extend(other.hero_ids);
        self.official_ids.extend(other.official_ids);
        for (hero, skills) in other.hero_skills {
            self.hero_skills.entry(hero).or_default().extend(skills);
        }
        self.portrait_ids.extend(other.portrait_ids);
    }

    /// Combatant IDs.
    #[must_use]
    pub fn combatant_ids(&self) -> &BTreeSet<String> {
        &self.combatant_ids
    }

    /// Building IDs.
    #[must_use]
    pub fn building_ids(&self) -> &BTreeSet<String> {
        &self.building_ids
    }

    /// Hero IDs.
    #[must_use]
    pub fn hero_ids(&self) -> &BTreeSet<String> {
        &self.hero_ids
    }

    /// Official IDs.
    #[must_use]
    pub fn official_ids(&self) -> &BTreeSet<String> {
        &self.official_ids
    }

    /// Skill IDs per hero.
    #[must_use]
    pub fn hero_skills(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.hero_skills
    }

    /// Portrait IDs referenced by officials.
    #[must_use]
    pub fn portrait_ids(&self) -> &BTreeSet<i64> {
        &self.portrait_ids
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatant_ids.is_empty()
            && self.building_ids.is_empty()
            && self.hero_ids.is_empty()
            && self.official_ids.is_empty()
            && self.hero_skills.is_empty()
            && self.portrait_ids.is_empty()
    }
}
