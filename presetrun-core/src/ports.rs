//! Port traits abstracting side effects away from the pipeline.

use camino::Utf8Path;
use std::fmt;

/// Removes a build directory.
pub trait BuildDirCleaner {
    /// Remove exactly `path` and everything below it.
    ///
    /// Absence is not an error. Any other failure is.
    fn remove_build_dir(&self, path: &Utf8Path) -> std::io::Result<CleanOutcome>;
}

/// Executes a workflow preset and waits for it to finish.
pub trait WorkflowRunner {
    /// Program name used in launch errors.
    fn program(&self) -> &str;

    fn run_workflow(&self, workflow: &str, working_dir: &Utf8Path) -> std::io::Result<EngineExit>;
}

/// What the cleaner found at the build path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanOutcome {
    /// Nothing was there.
    Absent,
    /// A directory tree was removed.
    Removed,
    /// A symlink was removed; its target was left alone.
    RemovedLink,
}

/// Exit status of the build engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineExit {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl EngineExit {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for EngineExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("no exit code (terminated by signal)"),
        }
    }
}
