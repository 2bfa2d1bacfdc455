//! Idempotence testing utilities.
//!
//! A check over unchanged inputs must produce the same issues, in the same
//! order, every time. Sources of drift this catches:
//!
//! - **Hash-ordered collections**: ID sets and triple sets must iterate in
//!   sorted order, never in `HashMap` order.
//! - **Filesystem order**: `read_dir` order is platform dependent, so scans
//!   sort their entries.
//! - **Shared state**: each run owns its tracker; parallel runs must not see
//!   each other.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use ravenest_core::issue::Issue;
use ravenest_core::run::{ConfigSource, ValidationRun};

/// Result of repeated checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotenceResult {
    /// Whether all runs produced identical issue lists.
    pub is_idempotent: bool,
    /// Issue-list hash from each run.
    pub hashes: Vec<u64>,
}

impl IdempotenceResult {
    fn from_hashes(hashes: Vec<u64>) -> Self {
        Self {
            is_idempotent: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
        }
    }

    /// Distinct hashes (1 for an idempotent check).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert every run matched.
    ///
    /// # Panics
    ///
    /// Panics if any two runs produced different issue lists.
    pub fn assert_idempotent(&self) {
        if !self.is_idempotent {
            let unique = self.unique_hashes();
            panic!(
                "Check is not idempotent!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash an issue list, including order.
#[must_use]
pub fn hash_issues(issues: &[Issue]) -> u64 {
    let mut hasher = DefaultHasher::new();
    issues.hash(&mut hasher);
    hasher.finish()
}

/// Validate every config file from `source` with a fresh run.
#[must_use]
pub fn check_source(source: &dyn ConfigSource) -> Vec<Issue> {
    let mut run = ValidationRun::new();
    run.validate_configs(source);
    run.issues().to_vec()
}

/// Run `check` `runs` times in sequence and compare the issue lists.
pub fn verify_idempotence<F>(runs: usize, check: F) -> IdempotenceResult
where
    F: Fn() -> Vec<Issue>,
{
    let hashes = (0..runs).map(|_| hash_issues(&check())).collect();
    IdempotenceResult::from_hashes(hashes)
}

/// Run `check` on `threads` threads at once and compare the issue lists.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn verify_parallel_idempotence<F>(threads: usize, check: F) -> IdempotenceResult
where
    F: Fn() -> Vec<Issue> + Sync,
{
    let hashes = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| scope.spawn(|| hash_issues(&check())))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("check thread panicked"))
            .collect()
    });
    IdempotenceResult::from_hashes(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::valid_source;
    use ravenest_core::issue::Location;
    use ravenest_core::run::ConfigFile;

    #[test]
    fn test_hash_depends_on_order() {
        let a = Issue::warn(Location::new("a.json", 1), "first");
        let b = Issue::warn(Location::new("a.json", 2), "second");
        assert_ne!(
            hash_issues(&[a.clone(), b.clone()]),
            hash_issues(&[b, a])
        );
    }

    #[test]
    fn test_valid_source_is_idempotent() {
        let source = valid_source();
        verify_idempotence(3, || check_source(&source)).assert_idempotent();
    }

    #[test]
    fn test_parallel_runs_match() {
        let source = valid_source().with(ConfigFile::DamageTypes, r#"["melee", "melee"]"#);
        let result = verify_parallel_idempotence(4, || check_source(&source));
        result.assert_idempotent();
        assert_eq!(result.hashes.len(), 4);
    }

    #[test]
    #[should_panic(expected = "not idempotent")]
    fn test_divergence_is_reported() {
        let counter = std::cell::Cell::new(0);
        let result = verify_idempotence(2, || {
            counter.set(counter.get() + 1);
            vec![Issue::warn(Location::new("a.json", counter.get()), "drift")]
        });
        result.assert_idempotent();
    }
}
