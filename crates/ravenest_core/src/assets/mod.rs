//! Image-directory reconciliation.
//!
//! The images tree is laid out as `<type>/<id>/<subtype>/<n>.<ext>`. After a
//! clean config pass, the validated IDs determine which directories must
//! exist ([`ExpectedAssets`]); the tree on disk is snapshotted into an
//! [`AssetTree`]; and [`reconcile`] diffs the two.

pub mod expected;
pub mod reconcile;
pub mod scan;

use std::fmt;
use std::path::PathBuf;

pub use expected::ExpectedAssets;
pub use reconcile::{classify, reconcile, Classification};
pub use scan::AssetTree;

/// Asset type directory for combatants.
pub const COMBATANTS: &str = "combatants";
/// Asset type directory for buildings.
pub const BUILDINGS: &str = "buildings";
/// Asset type directory for heroes.
pub const HEROES: &str = "heroes";
/// Asset type directory for official portraits.
pub const PORTRAITS: &str = "portraits";

/// Types whose item directories hold images directly, with no subtype level.
pub const FLAT_KINDS: [&str; 1] = [PORTRAITS];

/// Accepted image file extensions (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// Optional per-skill directory of activation frames.
pub const ACTIVATE_DIR: &str = "activate";

/// Whether `kind` is a flat asset type.
#[must_use]
pub fn is_flat(kind: &str) -> bool {
    FLAT_KINDS.contains(&kind)
}

/// A `(type, id, subtype)` key naming one image directory.
///
/// Flat types use an empty subtype.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetTriple {
    /// Asset type (`combatants`, `buildings`, `heroes`, `portraits`).
    pub kind: String,
    /// Entity ID.
    pub id: String,
    /// Subtype directory, empty for flat types.
    pub subtype: String,
}

impl AssetTriple {
    /// Create a triple.
    pub fn new(kind: impl Into<String>, id: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            subtype: subtype.into(),
        }
    }

    /// A triple with no subtype.
    pub fn item(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(kind, id, String::new())
    }

    /// Path of the directory relative to the images root.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(&self.kind);
        path.push(&self.id);
        if !self.subtype.is_empty() {
            path.push(&self.subtype);
        }
        path
    }
}

impl fmt::Display for AssetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subtype.is_empty() {
            write!(f, "images/{}/{}/", self.kind, self.id)
        } else {
            write!(f, "images/{}/{}/{}/", self.kind, self.id, self.subtype)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            AssetTriple::new(COMBATANTS, "goblin", "idle").to_string(),
            "images/combatants/goblin/idle/"
        );
        assert_eq!(AssetTriple::item(PORTRAITS, "7").to_string(), "images/portraits/7/");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            AssetTriple::new(HEROES, "arthur", "cleave").relative_path(),
            PathBuf::from("heroes/arthur/cleave")
        );
        assert_eq!(AssetTriple::item(PORTRAITS, "3").relative_path(), PathBuf::from("portraits/3"));
    }

    #[test]
    fn test_ordering_is_by_kind_then_id_then_subtype() {
        let mut triples = vec![
            AssetTriple::new(HEROES, "a", "idle"),
            AssetTriple::new(BUILDINGS, "b", "idle"),
            AssetTriple::new(BUILDINGS, "b", "construction"),
            AssetTriple::new(BUILDINGS, "a", "idle"),
        ];
        triples.sort();
        let shown: Vec<_> = triples.iter().map(ToString::to_string).collect();
        assert_eq!(
            shown,
            vec![
                "images/buildings/a/idle/",
                "images/buildings/b/construction/",
                "images/buildings/b/idle/",
                "images/heroes/a/idle/",
            ]
        );
    }
}
