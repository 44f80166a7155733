//! Default port implementations.

use crate::ports::{BuildDirCleaner, CleanOutcome, EngineExit, WorkflowRunner};
use crate::settings::DEFAULT_ENGINE;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::io::{self, ErrorKind};
use std::process::Command;
use std::sync::Mutex;
use tracing::debug;

/// Removes build directories from the local filesystem.
///
/// Symlinks are never followed: a link at the build path is unlinked and
/// its target is left untouched.
#[derive(Debug, Clone, Default)]
pub struct FsBuildDirCleaner;

impl BuildDirCleaner for FsBuildDirCleaner {
    fn remove_build_dir(&self, path: &Utf8Path) -> io::Result<CleanOutcome> {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path, "build directory absent");
                return Ok(CleanOutcome::Absent);
            }
            Err(e) => return Err(e),
        };

        let file_type = meta.file_type();
        if file_type.is_symlink() {
            debug!(path = %path, "unlinking symlinked build directory");
            remove_link(path)?;
            return Ok(CleanOutcome::RemovedLink);
        }
        if file_type.is_dir() {
            fs::remove_dir_all(path)?;
            return Ok(CleanOutcome::Removed);
        }

        Err(io::Error::new(
            ErrorKind::NotADirectory,
            format!("{path} exists but is not a directory"),
        ))
    }
}

fn remove_link(path: &Utf8Path) -> io::Result<()> {
    match fs::remove_file(path) {
        // Directory symlinks on Windows are removed as directories.
        Err(e) if cfg!(windows) => fs::remove_dir(path).map_err(|_| e),
        other => other,
    }
}

/// Arguments asking the engine to run one workflow preset.
pub fn workflow_args(workflow: &str) -> [&str; 3] {
    ["--workflow", "--preset", workflow]
}

/// Runs `cmake --workflow --preset <name>` as a blocking subprocess.
///
/// Stdio and environment are inherited; output is not interpreted.
#[derive(Debug, Clone)]
pub struct CmakeWorkflowRunner {
    pub program: String,
}

impl CmakeWorkflowRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CmakeWorkflowRunner {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl WorkflowRunner for CmakeWorkflowRunner {
    fn program(&self) -> &str {
        &self.program
    }

    fn run_workflow(&self, workflow: &str, working_dir: &Utf8Path) -> io::Result<EngineExit> {
        let args = workflow_args(workflow);
        debug!(program = %self.program, ?args, cwd = %working_dir, "spawning workflow engine");
        let status = Command::new(&self.program)
            .args(args)
            .current_dir(working_dir)
            .status()?;
        Ok(EngineExit {
            code: status.code(),
        })
    }
}

/// A single recorded engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInvocation {
    pub workflow: String,
    pub working_dir: Utf8PathBuf,
}

/// In-memory runner for embedding and testing.
///
/// Records every invocation and reports a fixed exit code without spawning
/// anything.
#[derive(Debug)]
pub struct RecordingWorkflowRunner {
    exit: EngineExit,
    invocations: Mutex<Vec<WorkflowInvocation>>,
}

impl RecordingWorkflowRunner {
    pub fn new(exit: EngineExit) -> Self {
        Self {
            exit,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(EngineExit::from_code(0))
    }

    pub fn invocations(&self) -> Vec<WorkflowInvocation> {
        self.invocations
            .lock()
            .map(|v| v.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl WorkflowRunner for RecordingWorkflowRunner {
    fn program(&self) -> &str {
        "recording"
    }

    fn run_workflow(&self, workflow: &str, working_dir: &Utf8Path) -> io::Result<EngineExit> {
        let invocation = WorkflowInvocation {
            workflow: workflow.to_string(),
            working_dir: working_dir.to_owned(),
        };
        match self.invocations.lock() {
            Ok(mut v) => v.push(invocation),
            Err(poisoned) => poisoned.into_inner().push(invocation),
        }
        Ok(self.exit)
    }
}
