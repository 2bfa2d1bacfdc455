//! Snapshot of the images tree on disk.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::assets::{is_flat, AssetTriple, ACTIVATE_DIR, HEROES};
use crate::error::{LintError, Result};

/// What was found under the images root, down to the subtype level.
///
/// Besides [`AssetTree::scan`], trees can be assembled by hand with the
/// `add_*` methods for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetTree {
    root: PathBuf,
    dirs: BTreeMap<AssetTriple, Vec<String>>,
    items: BTreeMap<String, BTreeSet<String>>,
    activate: BTreeMap<AssetTriple, Vec<String>>,
}

impl AssetTree {
    /// An empty tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Walk `root` and record every directory down to depth 3.
    ///
    /// Files directly under `root` or a type directory are ignored. Entries
    /// are visited in name order.
    ///
    /// # Errors
    ///
    /// Returns [`LintError::ImagesDirUnreadable`] if any directory in the
    /// tree cannot be listed.
    pub fn scan(root: &Path) -> Result<Self> {
        let unreadable = |source: io::Error| LintError::ImagesDirUnreadable {
            path: root.display().to_string(),
            source,
        };

        let mut tree = Self::new(root);
        for kind in subdirectories(root).map_err(unreadable)? {
            let kind_dir = root.join(&kind);
            for id in subdirectories(&kind_dir).map_err(unreadable)? {
                let item_dir = kind_dir.join(&id);
                tree.add_item_dir(&kind, &id);

                if is_flat(&kind) {
                    let files = regular_files(&item_dir).map_err(unreadable)?;
                    tree.add_dir(AssetTriple::item(&kind, &id), files);
                }

                for subtype in subdirectories(&item_dir).map_err(unreadable)? {
                    let subtype_dir = item_dir.join(&subtype);
                    let triple = AssetTriple::new(&kind, &id, &subtype);

                    if kind == HEROES {
                        let activate_dir = subtype_dir.join(ACTIVATE_DIR);
                        if activate_dir.is_dir() {
                            let files = regular_files(&activate_dir).map_err(unreadable)?;
                            tree.add_activate_dir(&id, &subtype, files);
                        }
                    }

                    let files = regular_files(&subtype_dir).map_err(unreadable)?;
                    tree.add_dir(triple, files);
                }
            }
        }

        debug!(
            root = %root.display(),
            directories = tree.dirs.len(),
            "Scanned images tree"
        );
        Ok(tree)
    }

    /// Record a found directory and the regular files it holds.
    pub fn add_dir<I, S>(&mut self, triple: AssetTriple, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_item_dir(&triple.kind, &triple.id);
        let mut files: Vec<String> = files.into_iter().map(Into::into).collect();
        files.sort();
        self.dirs.insert(triple, files);
    }

    /// Record an item directory `<kind>/<id>/`.
    pub fn add_item_dir(&mut self, kind: &str, id: &str) {
        self.items
            .entry(kind.to_string())
            .or_default()
            .insert(id.to_string());
    }

    /// Record a skill's `activate/` directory and the regular files it holds.
    pub fn add_activate_dir<I, S>(&mut self, hero: &str, skill: &str, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files: Vec<String> = files.into_iter().map(Into::into).collect();
        files.sort();
        self.activate.insert(AssetTriple::new(HEROES, hero, skill), files);
    }

    /// Root of the images tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a triple's directory.
    #[must_use]
    pub fn path_of(&self, triple: &AssetTriple) -> PathBuf {
        self.root.join(triple.relative_path())
    }

    /// Every found triple with its file names.
    #[must_use]
    pub fn dirs(&self) -> &BTreeMap<AssetTriple, Vec<String>> {
        &self.dirs
    }

    /// Set of found triples.
    #[must_use]
    pub fn found(&self) -> BTreeSet<AssetTriple> {
        self.dirs.keys().cloned().collect()
    }

    /// Item IDs found under `kind`.
    pub fn item_ids(&self, kind: &str) -> impl Iterator<Item = &str> {
        self.items
            .get(kind)
            .into_iter()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    /// Item directories of layered types that have no subtype directories.
    #[must_use]
    pub fn childless_items(&self) -> Vec<AssetTriple> {
        self.items
            .iter()
            .filter(|(kind, _)| !is_flat(kind))
            .flat_map(|(kind, ids)| ids.iter().map(move |id| AssetTriple::item(kind, id)))
            .filter(|item| {
                !self
                    .dirs
                    .keys()
                    .any(|t| t.kind == item.kind && t.id == item.id)
            })
            .collect()
    }

    /// Files in the `activate/` directory of a hero skill, if it exists.
    #[must_use]
    pub fn activate_files(&self, hero: &str, skill: &str) -> Option<&[String]> {
        self.activate
            .get(&AssetTriple::new(HEROES, hero, skill))
            .map(Vec::as_slice)
    }
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        entries.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    entries.sort();
    Ok(entries)
}

fn subdirectories(dir: &Path) -> io::Result<Vec<String>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|(_, path)| path.is_dir())
        .map(|(name, _)| name)
        .collect())
}

fn regular_files(dir: &Path) -> io::Result<Vec<String>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|(_, path)| path.is_file())
        .map(|(name, _)| name)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{COMBATANTS, PORTRAITS};
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_scan_records_triples_and_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "combatants/goblin/idle/2.png");
        touch(root, "combatants/goblin/idle/1.png");
        fs::create_dir_all(root.join("combatants/goblin/attack/nested")).unwrap();
        fs::create_dir_all(root.join("combatants/ghost")).unwrap();
        touch(root, "portraits/7/1.webp");
        touch(root, "heroes/arthur/cleave/1.png");
        fs::create_dir_all(root.join("heroes/arthur/cleave/activate")).unwrap();
        touch(root, "README.md");

        let tree = AssetTree::scan(root).unwrap();

        assert_eq!(
            tree.dirs()[&AssetTriple::new(COMBATANTS, "goblin", "idle")],
            vec!["1.png", "2.png"]
        );
        assert!(tree.dirs()[&AssetTriple::new(COMBATANTS, "goblin", "attack")].is_empty());
        assert_eq!(tree.dirs()[&AssetTriple::item(PORTRAITS, "7")], vec!["1.webp"]);
        assert_eq!(
            tree.childless_items(),
            vec![AssetTriple::item(COMBATANTS, "ghost")]
        );
        assert_eq!(tree.activate_files("arthur", "cleave"), Some(&[][..]));
        assert_eq!(tree.activate_files("arthur", "rally"), None);

        let ids: Vec<_> = tree.item_ids(COMBATANTS).collect();
        assert_eq!(ids, vec!["ghost", "goblin"]);
    }

    #[test]
    fn test_scan_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = AssetTree::scan(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, LintError::ImagesDirUnreadable { .. }));
    }

    #[test]
    fn test_synthetic_tree() {
        let mut tree = AssetTree::new("images");
        tree.add_dir(AssetTriple::new(COMBATANTS, "orc", "idle"), ["1.png"]);
        tree.add_item_dir(COMBATANTS, "troll");
        assert_eq!(tree.item_ids(COMBATANTS).count(), 2);
        assert_eq!(tree.childless_items(), vec![AssetTriple::item(COMBATANTS, "troll")]);
        assert_eq!(
            tree.path_of(&AssetTriple::new(COMBATANTS, "orc", "idle")),
            PathBuf::from("images/combatants/orc/idle")
        );
    }
}
