//! Knobs for a lint run and config directory discovery.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the default config directory.
pub const CONFIG_DIR_ENV: &str = "RAVENEST_CONFIG_DIR";

/// Directories searched, in order, when no config directory is given.
pub const CONFIG_DIR_CANDIDATES: [&str; 2] = ["server/config", "config"];

/// Options for one lint run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOptions {
    /// Directory holding the six config files.
    pub config_dir: PathBuf,
    /// Root of the images tree.
    pub images_dir: PathBuf,
    /// Keep WARN issues in the report.
    pub show_warnings: bool,
    /// Include columns in formatted issue lines.
    pub show_columns: bool,
}

impl LintOptions {
    /// Options for `config_dir`, with the images tree as its sibling.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            images_dir: default_images_dir(&config_dir),
            config_dir,
            show_warnings: true,
            show_columns: true,
        }
    }

    /// Use a different images tree.
    #[must_use]
    pub fn with_images_dir(mut self, images_dir: impl Into<PathBuf>) -> Self {
        self.images_dir = images_dir.into();
        self
    }

    /// Drop or keep WARN issues.
    #[must_use]
    pub fn with_warnings(mut self, show: bool) -> Self {
        self.show_warnings = show;
        self
    }

    /// Drop or keep columns in formatted lines.
    #[must_use]
    pub fn with_columns(mut self, show: bool) -> Self {
        self.show_columns = show;
        self
    }
}

impl Default for LintOptions {
    fn default() -> Self {
        Self::new(resolve_config_dir(None))
    }
}

/// `images/` next to the config directory.
#[must_use]
pub fn default_images_dir(config_dir: &Path) -> PathBuf {
    config_dir
        .parent()
        .map_or_else(|| PathBuf::from("images"), |parent| parent.join("images"))
}

/// Pick the config directory.
///
/// An explicit path always wins. Otherwise `RAVENEST_CONFIG_DIR` is used if
/// it points at an existing path, then the first existing candidate. Falls
/// back to `server/config` even if it does not exist; the run reports that.
#[must_use]
pub fn resolve_config_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }

    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        let path = PathBuf::from(dir);
        if path.exists() {
            return path;
        }
    }

    CONFIG_DIR_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR_CANDIDATES[0]))
}
