//! # Ravenest Core
//!
//! Validation engine for Ravenest game content.
//!
//! Checks the six JSON config files that define damage types, combatants,
//! buildings, heroes and fiefdom officials, then reconciles the images tree
//! against the IDs those files declare. Every finding is an [`Issue`] with a
//! file, a line and a [`Severity`]; nothing here prints or exits.
//!
//! ## Crate Structure
//!
//! - [`loader`] - Duplicate-preserving JSON parsing and line lookup
//! - [`schema`] - Declarative field rules shared by the validators
//! - [`validators`] - One validator per config file
//! - [`tracker`] - IDs accepted so far and the damage vocabulary
//! - [`assets`] - Images tree scan and reconciliation
//! - [`run`] - Orchestration of a full check

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod assets;
pub mod error;
pub mod issue;
pub mod loader;
pub mod options;
pub mod run;
pub mod schema;
pub mod tracker;
pub mod validators;

pub use issue::{Issue, Location, Severity};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::assets::{AssetTree, AssetTriple, ExpectedAssets};
    pub use crate::error::{LintError, Result};
    pub use crate::issue::{Issue, IssueSink, Location, Severity};
    pub use crate::options::{resolve_config_dir, LintOptions};
    pub use crate::run::{
        run, ConfigFile, ConfigSource, DirSource, MemorySource, Report, SourceFile, ValidationRun,
    };
    pub use crate::tracker::{CrossReferences, DamageVocabulary};
}
