//! Test fixtures and helpers.
//!
//! A small, fully valid content set plus helpers to put it on disk and to
//! build images trees around it.

use std::fs;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use ravenest_core::assets::ExpectedAssets;
use ravenest_core::options::LintOptions;
use ravenest_core::run::{ConfigFile, MemorySource};
use tempfile::TempDir;

/// Valid `damage_types.json`.
pub const DAMAGE_TYPES: &str = r#"["melee", "ranged", "magical"]"#;

/// Valid `player_combatants.json`.
pub const PLAYER_COMBATANTS: &str = r#"{
  "spearman": {
    "name": "Spearman",
    "max_level": 2,
    "damage": [
      {"melee": 4, "ranged": 0, "magical": 0},
      {"melee": 6, "ranged": 0, "magical": 0}
    ],
    "defense": [null, {"melee": 2, "ranged": 1, "magical": 0}],
    "movement_speed": [1.0, 1.25],
    "costs": [{"gold": 10, "grain": 2}, {"gold": 15, "grain": 3}],
    "visual_description": "A levy soldier holding a long ash spear."
  }
}"#;

/// Valid `enemy_combatants.json`.
pub const ENEMY_COMBATANTS: &str = r#"{
  "goblin": {
    "name": "Goblin",
    "max_level": 1,
    "damage": [{"melee": 2, "ranged": 0, "magical": 0}],
    "defense": [null]
  }
}"#;

/// Valid `fiefdom_building_types.json`.
pub const BUILDINGS: &str = r#"[
  {
    "sawmill": {
      "width": 2,
      "height": 2,
      "max_level": 2,
      "construction_times": [30, 60],
      "can_build_outside_wall": true,
      "wood_cost": [10, 20],
      "wood": {"amount": 2, "amount_multiplier": 1.5, "periodicity": 60, "periodicity_multiplier": 0.9}
    }
  }
]"#;

/// Valid `heroes.json`.
pub const HEROES: &str = r#"{
  "arthur": {
    "name": "Arthur",
    "max_level": 5,
    "equipment": {"weapon": {"slots": [1, 1, 2, 2, 3], "max": 3}},
    "skills": {
      "cleave": {"name": "Cleave", "damage": [10, 15], "damage_max": 40}
    },
    "status_effects": {
      "daze": {"name": "Daze", "type": "stun", "effect": [1, 2], "max": 3}
    }
  }
}"#;

/// Valid `fiefdom_officials.json`.
pub const OFFICIALS: &str = r#"{
  "reeve_anna": {
    "name": "Anna",
    "max_level": 3,
    "roles": ["reeve"],
    "stats": {"diligence": [10, 20, 30], "diligence_max": 200},
    "portrait_id": 1
  }
}"#;

/// Valid content for `file`.
#[must_use]
pub fn valid_content(file: ConfigFile) -> &'static str {
    match file {
        ConfigFile::DamageTypes => DAMAGE_TYPES,
        ConfigFile::PlayerCombatants => PLAYER_COMBATANTS,
        ConfigFile::EnemyCombatants => ENEMY_COMBATANTS,
        ConfigFile::Buildings => BUILDINGS,
        ConfigFile::Heroes => HEROES,
        ConfigFile::Officials => OFFICIALS,
    }
}

/// In-memory source holding the full valid content set.
#[must_use]
pub fn valid_source() -> MemorySource {
    ConfigFile::ALL
        .into_iter()
        .fold(MemorySource::new("config"), |source, file| {
            source.with(file, valid_content(file))
        })
}

/// A temporary project with `config/` and `images/` side by side.
#[derive(Debug)]
pub struct ConfigFixture {
    dir: TempDir,
}

impl ConfigFixture {
    /// Empty `config/` directory, no images tree.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::create_dir_all(dir.path().join("config")).expect("create config dir");
        Self { dir }
    }

    /// All six valid files, no images tree.
    #[must_use]
    pub fn valid() -> Self {
        let fixture = Self::empty();
        for file in ConfigFile::ALL {
            fixture.write(file, valid_content(file));
        }
        fixture
    }

    /// Replace one config file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, file: ConfigFile, content: &str) {
        fs::write(self.config_dir().join(file.file_name()), content).expect("write config file");
    }

    /// Delete one config file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be removed.
    pub fn remove(&self, file: ConfigFile) {
        fs::remove_file(self.config_dir().join(file.file_name())).expect("remove config file");
    }

    /// The project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `<root>/config`.
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.root().join("config")
    }

    /// `<root>/images`.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.root().join("images")
    }

    /// Builder for the images tree of this fixture.
    #[must_use]
    pub fn images(&self) -> ImageTreeBuilder {
        ImageTreeBuilder::new(self.images_dir())
    }

    /// Default options for this fixture.
    #[must_use]
    pub fn options(&self) -> LintOptions {
        LintOptions::new(self.config_dir())
    }
}

/// Writes directories and image files under an images root.
#[derive(Debug, Clone)]
pub struct ImageTreeBuilder {
    root: PathBuf,
}

impl ImageTreeBuilder {
    /// Builder rooted at `root`. Nothing is created until a method is called.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create `<root>/<relative>/` (and parents).
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created.
    #[must_use]
    pub fn dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.root.join(relative)).expect("create images dir");
        self
    }

    /// Create an empty file `<root>/<relative>/<file>`.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn file(self, relative: &str, file: &str) -> Self {
        let dir = self.root.join(relative);
        fs::create_dir_all(&dir).expect("create images dir");
        fs::write(dir.join(file), b"").expect("write image file");
        self
    }

    /// One `1.png` in every required directory of `expected`.
    #[must_use]
    pub fn mirror(self, expected: &ExpectedAssets) -> Self {
        expected.required().iter().fold(self, |builder, triple| {
            let relative = triple.relative_path();
            builder.file(&relative.to_string_lossy(), "1.png")
        })
    }

    /// The images root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Strategy for well-formed entity IDs.
pub fn arb_entity_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Strategy for a `defense` array mixing `null` and valid rows.
pub fn arb_defense_rows(max_len: usize) -> impl Strategy<Value = Vec<Option<[u8; 3]>>> {
    proptest::collection::vec(proptest::option::of(any::<[u8; 3]>()), 1..=max_len)
}

/// Render [`arb_defense_rows`] output as a JSON array.
#[must_use]
pub fn defense_json(rows: &[Option<[u8; 3]>]) -> String {
    let rows: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| match row {
            None => serde_json::Value::Null,
            Some([melee, ranged, magical]) => serde_json::json!({
                "melee": melee,
                "ranged": ranged,
                "magical": magical,
            }),
        })
        .collect();
    serde_json::Value::Array(rows).to_string()
}
