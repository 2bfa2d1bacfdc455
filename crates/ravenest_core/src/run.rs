//! One lint run over the six config files and the images tree.
//!
//! Files are validated in a fixed order because later files depend on state
//! from earlier ones: the damage-type vocabulary feeds the combatant checks,
//! and every file's accepted IDs feed the image reconciliation. All of that
//! state lives in a [`ValidationRun`], so independent runs never share it.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::assets::{reconcile, AssetTree, ExpectedAssets};
use crate::error::{LintError, Result};
use crate::issue::{Issue, IssueSink, Location, Severity};
use crate::loader::parse_document;
use crate::options::LintOptions;
use crate::tracker::{CrossReferences, DamageVocabulary};
use crate::validators::combatants::Roster;
use crate::validators::{buildings, combatants, damage_types, heroes, officials};

/// The six config files, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigFile {
    /// `damage_types.json`
    DamageTypes,
    /// `player_combatants.json`
    PlayerCombatants,
    /// `enemy_combatants.json`
    EnemyCombatants,
    /// `fiefdom_building_types.json`
    Buildings,
    /// `heroes.json`
    Heroes,
    /// `fiefdom_officials.json`
    Officials,
}

impl ConfigFile {
    /// Every config file, in the order they must be validated.
    pub const ALL: [Self; 6] = [
        Self::DamageTypes,
        Self::PlayerCombatants,
        Self::EnemyCombatants,
        Self::Buildings,
        Self::Heroes,
        Self::Officials,
    ];

    /// File name inside the config directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::DamageTypes => "damage_types.json",
            Self::PlayerCombatants => "player_combatants.json",
            Self::EnemyCombatants => "enemy_combatants.json",
            Self::Buildings => "fiefdom_building_types.json",
            Self::Heroes => "heroes.json",
            Self::Officials => "fiefdom_officials.json",
        }
    }
}

/// Outcome of reading one config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFile {
    /// The file does not exist.
    Missing,
    /// The file exists but could not be read.
    Unreadable(String),
    /// The file's text.
    Content(String),
}

/// Where config file text comes from.
pub trait ConfigSource {
    /// Path reported in issues for `file`.
    fn path_of(&self, file: ConfigFile) -> PathBuf;

    /// Read `file`.
    fn read(&self, file: ConfigFile) -> SourceFile;
}

/// Reads config files from a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    /// Source over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ConfigSource for DirSource {
    fn path_of(&self, file: ConfigFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    fn read(&self, file: ConfigFile) -> SourceFile {
        let path = self.path_of(file);
        if !path.exists() {
            return SourceFile::Missing;
        }
        match fs::read_to_string(&path) {
            Ok(content) => SourceFile::Content(content),
            Err(e) => SourceFile::Unreadable(e.to_string()),
        }
    }
}

/// Config files held in memory, keyed by file.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    root: PathBuf,
    files: BTreeMap<ConfigFile, String>,
}

impl MemorySource {
    /// Empty source whose paths are reported under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    /// Add or replace a file.
    #[must_use]
    pub fn with(mut self, file: ConfigFile, content: impl Into<String>) -> Self {
        self.insert(file, content);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, file: ConfigFile, content: impl Into<String>) {
        self.files.insert(file, content.into());
    }

    /// Remove a file.
    pub fn remove(&mut self, file: ConfigFile) {
        self.files.remove(&file);
    }
}

impl ConfigSource for MemorySource {
    fn path_of(&self, file: ConfigFile) -> PathBuf {
        self.root.join(file.file_name())
    }

    fn read(&self, file: ConfigFile) -> SourceFile {
        self.files
            .get(&file)
            .map_or(SourceFile::Missing, |content| SourceFile::Content(content.clone()))
    }
}

/// Mutable state of one lint run.
#[derive(Debug, Default)]
pub struct ValidationRun {
    vocabulary: DamageVocabulary,
    references: CrossReferences,
    issues: Vec<Issue>,
    all_files_present: bool,
    validated_files: Vec<PathBuf>,
}

impl ValidationRun {
    /// Fresh run with the default damage vocabulary and no IDs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            all_files_present: true,
            ..Self::default()
        }
    }

    /// Validate all six files from `source`, in order.
    pub fn validate_configs(&mut self, source: &dyn ConfigSource) {
        for file in ConfigFile::ALL {
            let path = source.path_of(file);
            match source.read(file) {
                SourceFile::Missing => {
                    self.issues
                        .push(Issue::error(Location::new(&path, 1), "Config file not found"));
                    self.all_files_present = false;
                }
                SourceFile::Unreadable(reason) => {
                    self.issues.push(Issue::error(
                        Location::new(&path, 1),
                        format!("Failed to read file: {reason}"),
                    ));
                }
                SourceFile::Content(content) => {
                    self.validate_file(file, &path, &content);
                    self.validated_files.push(path);
                }
            }
        }
    }

    /// Validate one file's text.
    ///
    /// IDs the file declares are committed to the run only if the file has
    /// no ERRORs. The damage vocabulary is taken regardless.
    pub fn validate_file(&mut self, file: ConfigFile, path: &Path, content: &str) {
        let mut sink = IssueSink::new(path, content);
        let mut staged = CrossReferences::new();

        let mut clean = 0;
        if let Some(doc) = parse_document(content, &mut sink) {
            clean = match file {
                ConfigFile::DamageTypes => {
                    let types = damage_types::validate(&doc, &mut sink);
                    let count = types.len();
                    self.vocabulary = DamageVocabulary::from_validated(types);
                    count
                }
                ConfigFile::PlayerCombatants => combatants::validate(
                    &doc,
                    Roster::Player,
                    &self.vocabulary,
                    &mut sink,
                    &mut staged,
                ),
                ConfigFile::EnemyCombatants => combatants::validate(
                    &doc,
                    Roster::Enemy,
                    &self.vocabulary,
                    &mut sink,
                    &mut staged,
                ),
                ConfigFile::Buildings => buildings::validate(&doc, &mut sink, &mut staged),
                ConfigFile::Heroes => heroes::validate(&doc, &mut sink, &mut staged),
                ConfigFile::Officials => officials::validate(&doc, &mut sink, &mut staged),
            };
        }

        let errors = sink.error_count();
        debug!(
            file = file.file_name(),
            clean,
            issues = sink.issues().len(),
            errors,
            "Validated config file"
        );
        if errors == 0 {
            self.references.merge(staged);
        }
        self.issues.extend(sink.into_issues());
    }

    /// Diff `tree` against the IDs accepted so far and record the findings.
    pub fn reconcile_assets(&mut self, tree: &AssetTree) {
        let expected = ExpectedAssets::from_references(&self.references);
        debug!(
            required = expected.required().len(),
            optional = expected.optional().len(),
            found = tree.dirs().len(),
            "Reconciling images tree"
        );
        self.issues
            .extend(reconcile(&expected, tree, &self.references));
    }

    /// Whether any ERROR has been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    /// Damage vocabulary in effect.
    #[must_use]
    pub fn vocabulary(&self) -> &DamageVocabulary {
        &self.vocabulary
    }

    /// IDs committed so far.
    #[must_use]
    pub fn references(&self) -> &CrossReferences {
        &self.references
    }

    /// Every issue so far, in the order recorded.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Finish the run. With `show_warnings` off, WARN issues are dropped.
    #[must_use]
    pub fn into_report(self, show_warnings: bool) -> Report {
        let issues: Vec<Issue> = self
            .issues
            .into_iter()
            .filter(|issue| show_warnings || issue.is_error())
            .collect();
        Report {
            issues,
            all_files_present: self.all_files_present,
            validated_files: self.validated_files,
        }
    }
}

/// Final result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    issues: Vec<Issue>,
    all_files_present: bool,
    validated_files: Vec<PathBuf>,
}

impl Report {
    /// Reported issues in the order they were found.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// ERROR issues.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity() == Severity::Error)
    }

    /// WARN issues.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity() == Severity::Warn)
    }

    /// Number of ERRORs.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Number of reported WARNs.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Whether all six files existed.
    #[must_use]
    pub fn all_files_present(&self) -> bool {
        self.all_files_present
    }

    /// Files that were read and validated, in order.
    #[must_use]
    pub fn validated_files(&self) -> &[PathBuf] {
        &self.validated_files
    }

    /// No ERRORs and every file present.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.all_files_present && self.error_count() == 0
    }

    /// Process exit status: 0 on pass, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.passed())
    }

    /// Whether a summary line should be printed.
    #[must_use]
    pub fn needs_summary(&self) -> bool {
        !self.all_files_present || !self.issues.is_empty()
    }

    /// `Summary: <E> error(s), <W> warning(s)`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Summary: {} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )
    }
}

/// Run a full check as configured by `options`.
///
/// Image reconciliation runs only when no config file produced an ERROR and
/// the images directory exists.
///
/// # Errors
///
/// Returns [`LintError::ConfigDirNotFound`] if the config directory does not
/// exist and [`LintError::Io`] if its metadata cannot be read. Content
/// problems are reported in the [`Report`], never as errors.
pub fn run(options: &LintOptions) -> Result<Report> {
    match fs::metadata(&options.config_dir) {
        Ok(meta) if meta.is_dir() => {}
        Err(e) if e.kind() != ErrorKind::NotFound => {
            return Err(LintError::io(&options.config_dir, e));
        }
        _ => {
            return Err(LintError::ConfigDirNotFound(
                options.config_dir.display().to_string(),
            ));
        }
    }
    info!(config_dir = %options.config_dir.display(), "Checking configs");

    let mut run = ValidationRun::new();
    run.validate_configs(&DirSource::new(&options.config_dir));

    if run.has_errors() {
        debug!("Config errors present, skipping image reconciliation");
    } else if !options.images_dir.is_dir() {
        warn!(
            images_dir = %options.images_dir.display(),
            "Images directory not found, skipping image reconciliation"
        );
    } else {
        match AssetTree::scan(&options.images_dir) {
            Ok(tree) => run.reconcile_assets(&tree),
            Err(e) => warn!("Skipping image reconciliation: {e}"),
        }
    }

    let report = run.into_report(options.show_warnings);
    info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        files = report.validated_files().len(),
        "Config check finished"
    );
    Ok(report)
}
