//! The clean-and-run pipeline.
//!
//! Stages run strictly in order: load presets, resolve the build directory,
//! clear it, delegate to the engine. The first failing stage aborts the run.

use crate::adapters::{CmakeWorkflowRunner, FsBuildDirCleaner};
use crate::ports::{BuildDirCleaner, CleanOutcome, EngineExit, WorkflowRunner};
use crate::settings::RunSettings;
use camino::{Utf8Path, Utf8PathBuf};
use presetrun_presets::{
    PresetLoadError, ResolveError, load_presets, normalize_lexically, resolve_build_dir,
};
use tracing::{debug, info};

/// Error type for pipeline results.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] PresetLoadError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to resolve source root {path}")]
    SourceRoot {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to remove {build_dir}: it contains the source root {source_dir}")]
    UnsafeBuildDir {
        build_dir: Utf8PathBuf,
        source_dir: Utf8PathBuf,
    },

    #[error("failed to remove build directory {path}")]
    Cleanup {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch build engine `{program}`")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("workflow \"{workflow}\" failed: {exit}")]
    WorkflowFailed { workflow: String, exit: EngineExit },
}

impl RunError {
    /// Process exit code for this failure.
    ///
    /// A failed workflow passes the engine's own code through; everything
    /// else is 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::WorkflowFailed {
                exit: EngineExit { code: Some(code) },
                ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub workflow: String,
    pub build_dir: Utf8PathBuf,
    pub cleanup: CleanOutcome,
}

/// Runs workflow presets from a clean build directory.
pub struct Orchestrator<'a> {
    settings: RunSettings,
    cleaner: &'a dyn BuildDirCleaner,
    runner: &'a dyn WorkflowRunner,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        settings: RunSettings,
        cleaner: &'a dyn BuildDirCleaner,
        runner: &'a dyn WorkflowRunner,
    ) -> Self {
        Self {
            settings,
            cleaner,
            runner,
        }
    }

    pub fn run(&self, workflow_name: &str) -> Result<RunOutcome, RunError> {
        let source_dir = absolute_source_dir(&self.settings.source_dir)?;
        let settings = RunSettings {
            source_dir,
            ..self.settings.clone()
        };

        let doc = load_presets(&settings.presets_path())?;
        let build_dir = resolve_build_dir(&doc, workflow_name, &settings.source_dir)?;
        let cleanup = self.clean(&settings.source_dir, &build_dir)?;
        self.delegate(workflow_name, &settings.source_dir)?;

        Ok(RunOutcome {
            workflow: workflow_name.to_string(),
            build_dir,
            cleanup,
        })
    }

    fn clean(
        &self,
        source_dir: &Utf8Path,
        build_dir: &Utf8Path,
    ) -> Result<CleanOutcome, RunError> {
        if source_dir.starts_with(build_dir) {
            return Err(RunError::UnsafeBuildDir {
                build_dir: build_dir.to_owned(),
                source_dir: source_dir.to_owned(),
            });
        }

        info!("removing build directory: {}", build_dir);
        let outcome =
            self.cleaner
                .remove_build_dir(build_dir)
                .map_err(|source| RunError::Cleanup {
                    path: build_dir.to_owned(),
                    source,
                })?;
        debug!(?outcome, "build directory cleared");
        Ok(outcome)
    }

    fn delegate(&self, workflow_name: &str, source_dir: &Utf8Path) -> Result<(), RunError> {
        info!("running workflow \"{}\"", workflow_name);
        let exit = self
            .runner
            .run_workflow(workflow_name, source_dir)
            .map_err(|source| RunError::Launch {
                program: self.runner.program().to_string(),
                source,
            })?;

        if !exit.success() {
            return Err(RunError::WorkflowFailed {
                workflow: workflow_name.to_string(),
                exit,
            });
        }
        debug!(%exit, "workflow finished");
        Ok(())
    }
}

/// Anchor a relative source root at the current directory and fold `..`.
///
/// Resolved build paths are only comparable against an absolute root.
fn absolute_source_dir(source_dir: &Utf8Path) -> Result<Utf8PathBuf, RunError> {
    let to_error = |source: std::io::Error| RunError::SourceRoot {
        path: source_dir.to_owned(),
        source,
    };
    let absolute = std::path::absolute(source_dir).map_err(to_error)?;
    let absolute = Utf8PathBuf::from_path_buf(absolute).map_err(|p| {
        to_error(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("not valid UTF-8: {}", p.display()),
        ))
    })?;
    Ok(normalize_lexically(&absolute))
}

/// Run `workflow_name` with the filesystem cleaner and the configured engine.
pub fn run_workflow_tests(
    settings: &RunSettings,
    workflow_name: &str,
) -> Result<RunOutcome, RunError> {
    let cleaner = FsBuildDirCleaner;
    let runner = CmakeWorkflowRunner::new(settings.engine.clone());
    Orchestrator::new(settings.clone(), &cleaner, &runner).run(workflow_name)
}
