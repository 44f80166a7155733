//! Error types for presets loading and resolution.

use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// Failure to produce a usable [`PresetsDocument`](presetrun_types::PresetsDocument).
///
/// All variants are fatal and are raised before anything on disk is touched.
#[derive(Debug, Error)]
pub enum PresetLoadError {
    #[error("presets file not found: {path}")]
    NotFound { path: Utf8PathBuf },

    #[error("failed to read presets file {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse presets file {path}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported presets version {found} in {path} (need {minimum} or newer)")]
    UnsupportedVersion {
        path: Utf8PathBuf,
        found: u32,
        minimum: u32,
    },
}

/// Which link of the workflow -> configure chain was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetLink {
    WorkflowPreset,
    ConfigureStep,
    ConfigurePreset,
}

impl fmt::Display for PresetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PresetLink::WorkflowPreset => "workflow preset",
            PresetLink::ConfigureStep => "configure step",
            PresetLink::ConfigurePreset => "configure preset",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// `name` is the name that was looked up. For [`PresetLink::ConfigureStep`]
    /// it is the workflow preset that lacks a named configure step.
    #[error("{link} not found: \"{name}\"")]
    PresetNotFound { link: PresetLink, name: String },

    #[error("configure preset \"{preset}\" does not declare a binaryDir")]
    MissingBinaryDir { preset: String },
}

impl ResolveError {
    pub(crate) fn not_found(link: PresetLink, name: &str) -> Self {
        ResolveError::PresetNotFound {
            link,
            name: name.to_string(),
        }
    }
}
