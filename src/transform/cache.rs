//! Stage Cache Guard

use std::path::Path;

/// Decides whether a conversion stage must run.
///
/// Existence-only: a stage whose expected output exists is skipped, with no
/// content or staleness check. Sound because converters write through a
/// temporary file and rename, so an existing output is a complete one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCacheGuard {
    force: bool,
}

impl StageCacheGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A guard that runs every stage regardless of existing outputs.
    pub fn forced() -> Self {
        Self { force: true }
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// `false` iff `expected_output` already exists (and the guard is not forced).
    pub fn should_run(&self, expected_output: &Path) -> bool {
        self.force || !expected_output.exists()
    }
}
