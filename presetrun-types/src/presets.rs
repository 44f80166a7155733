use crate::schema::CONFIGURE_STEP;
use serde::{Deserialize, Serialize};

/// Root of a `CMakePresets.json` document.
///
/// Read-only once loaded. Unknown top-level keys (`cmakeMinimumRequired`,
/// `buildPresets`, `testPresets`, vendor maps, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetsDocument {
    /// Presets schema version, e.g. `6`.
    pub version: u32,

    #[serde(default)]
    pub configure_presets: Vec<ConfigurePreset>,

    #[serde(default)]
    pub workflow_presets: Vec<WorkflowPreset>,
}

impl PresetsDocument {
    /// First workflow preset whose name matches exactly.
    pub fn workflow_preset(&self, name: &str) -> Option<&WorkflowPreset> {
        self.workflow_presets.iter().find(|w| w.name == name)
    }

    /// First configure preset whose name matches exactly.
    pub fn configure_preset(&self, name: &str) -> Option<&ConfigurePreset> {
        self.configure_presets.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurePreset {
    pub name: String,

    /// Output directory template; may contain `${sourceDir}`.
    ///
    /// Absent when the preset inherits it from another preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPreset {
    pub name: String,

    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
}

impl WorkflowPreset {
    /// The first `configure` step. Later configure steps are never consulted.
    pub fn first_configure_step(&self) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.is_configure())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Step type tag: `configure`, `build`, `test`, `package`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Name of the preset this step runs. For configure steps this is the
    /// configure preset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl WorkflowStep {
    pub fn is_configure(&self) -> bool {
        self.kind == CONFIGURE_STEP
    }
}
