//! Configuration file loading for presetrun.
//!
//! Discovers and loads `presetrun.toml` from the source root and merges it
//! with the command line (command line takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use presetrun_core::RunSettings;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "presetrun.toml";

/// Top-level configuration from presetrun.toml. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresetrunConfig {
    /// Presets document, relative to the source root unless absolute.
    pub presets_file: Option<Utf8PathBuf>,

    /// Workflow preset used when `--preset` is not given.
    pub default_workflow: Option<String>,

    /// Build engine program (default: `cmake`).
    pub engine: Option<String>,
}

/// Discover presetrun.toml in the source root.
pub fn discover_config(source_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = source_dir.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<PresetrunConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<PresetrunConfig> {
    let config: PresetrunConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the source root, or return default if not found.
pub fn load_or_default(source_dir: &Utf8Path) -> anyhow::Result<PresetrunConfig> {
    match discover_config(source_dir) {
        Some(path) => load_config(&path),
        None => Ok(PresetrunConfig::default()),
    }
}

/// Builder for merging the config file with CLI arguments.
pub struct ConfigMerger {
    config: PresetrunConfig,
}

impl ConfigMerger {
    pub fn new(config: PresetrunConfig) -> Self {
        Self { config }
    }

    /// Produce run settings and the workflow to run.
    ///
    /// `cli_preset` wins over `default_workflow`.
    pub fn merge(
        self,
        source_dir: Utf8PathBuf,
        cli_preset: Option<String>,
    ) -> (RunSettings, String) {
        let mut settings = RunSettings::new(source_dir);
        if let Some(presets_file) = self.config.presets_file {
            settings.presets_file = presets_file;
        }
        if let Some(default_workflow) = self.config.default_workflow {
            settings.default_workflow = default_workflow;
        }
        if let Some(engine) = self.config.engine {
            settings.engine = engine;
        }

        let workflow = settings.workflow_or_default(cli_preset.as_deref()).to_string();
        (settings, workflow)
    }
}
