//! The `check-configs` command.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use ravenest_core::error::LintError;
use ravenest_core::options::{resolve_config_dir, LintOptions};
use ravenest_core::run::{run, Report};
use thiserror::Error;
use tracing::info;

/// Failures that stop the command before a report exists.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The check itself could not run.
    #[error(transparent)]
    Lint(#[from] LintError),

    /// Writing the report failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Arguments of `check-configs`.
#[derive(Debug, Clone, Default, Args)]
pub struct CheckArgs {
    /// Directory containing the config files
    /// [default: $RAVENEST_CONFIG_DIR, then server/config or config]
    #[arg(short = 'c', long)]
    pub config_dir: Option<PathBuf>,

    /// Images directory to reconcile [default: images/ next to the config directory]
    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    /// Suppress warnings, only show errors
    #[arg(short = 'w', long)]
    pub no_warnings: bool,

    /// Show the list of validated files on success and enable debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Leave column numbers out of issue lines
    #[arg(long)]
    pub no_columns: bool,
}

impl CheckArgs {
    /// Lint options these arguments describe.
    #[must_use]
    pub fn options(&self) -> LintOptions {
        let options = LintOptions::new(resolve_config_dir(self.config_dir.as_deref()))
            .with_warnings(!self.no_warnings)
            .with_columns(!self.no_columns);
        match &self.images_dir {
            Some(dir) => options.with_images_dir(dir),
            None => options,
        }
    }
}

/// Run the check and print the report.
///
/// Warnings go to `out`, errors and the summary to `err`. Returns the exit
/// status.
///
/// # Errors
///
/// Returns [`CheckError`] if the config directory is missing or output
/// cannot be written.
pub fn execute<O: Write, E: Write>(
    args: &CheckArgs,
    out: &mut O,
    err: &mut E,
) -> Result<i32, CheckError> {
    let options = args.options();
    info!(
        "Checking configs in: {} (images: {})",
        options.config_dir.display(),
        options.images_dir.display()
    );
    let report = run(&options)?;
    info!("{}", report.summary());
    print_report(&report, options.show_columns, args.verbose, out, err)?;
    Ok(report.exit_code())
}

/// Print `report`: WARN lines to `out`, ERROR lines to `err`, then the summary.
///
/// # Errors
///
/// Returns any error from the writers.
pub fn print_report<O: Write, E: Write>(
    report: &Report,
    show_columns: bool,
    verbose: bool,
    out: &mut O,
    err: &mut E,
) -> io::Result<()> {
    for warning in report.warnings() {
        writeln!(out, "{}", warning.format(show_columns))?;
    }
    for error in report.errors() {
        writeln!(err, "{}", error.format(show_columns))?;
    }
    if !report.issues().is_empty() {
        writeln!(err)?;
    }
    if report.needs_summary() {
        writeln!(err, "{}", report.summary())?;
    }

    if report.passed() {
        writeln!(out, "All configs present and valid ✓")?;
        if verbose {
            for file in report.validated_files() {
                let name = file.file_name().map_or_else(
                    || file.display().to_string(),
                    |n| n.to_string_lossy().into_owned(),
                );
                writeln!(out, "  - {name}")?;
            }
        }
    }
    Ok(())
}
