//! Clap-free settings for the clean-and-run pipeline.

use camino::{Utf8Path, Utf8PathBuf};
use presetrun_types::schema::{DEFAULT_PRESETS_FILE, DEFAULT_WORKFLOW};

/// Build engine launched when nothing else is configured.
pub const DEFAULT_ENGINE: &str = "cmake";

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Source root: substituted for `${sourceDir}` and used as the engine's
    /// working directory.
    pub source_dir: Utf8PathBuf,

    /// Presets document; relative paths are taken from `source_dir`.
    pub presets_file: Utf8PathBuf,

    /// Workflow preset used when the caller names none.
    pub default_workflow: String,

    /// Build engine program.
    pub engine: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            source_dir: Utf8PathBuf::from("."),
            presets_file: Utf8PathBuf::from(DEFAULT_PRESETS_FILE),
            default_workflow: DEFAULT_WORKFLOW.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
        }
    }
}

impl RunSettings {
    pub fn new(source_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            ..Self::default()
        }
    }

    pub fn presets_path(&self) -> Utf8PathBuf {
        resolve_against(&self.source_dir, &self.presets_file)
    }

    /// The requested workflow, or the configured default.
    pub fn workflow_or_default<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.default_workflow)
    }
}

fn resolve_against(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        base.join(path)
    }
}
