//! Shared DTOs for the presets document consumed by presetrun.
//!
//! # Design constraints
//! - Only the fields presetrun consults are modelled; everything else in the
//!   document is ignored on read.
//! - Collections default to empty so partial documents still deserialize.

pub mod presets;

pub use presets::{ConfigurePreset, PresetsDocument, WorkflowPreset, WorkflowStep};

/// Schema and naming constants shared across the workspace.
pub mod schema {
    /// Oldest presets `version` that carries `workflowPresets`.
    pub const MIN_SCHEMA_VERSION: u32 = 6;

    /// The only placeholder expanded inside `binaryDir`.
    pub const SOURCE_DIR_PLACEHOLDER: &str = "${sourceDir}";

    /// Workflow step type that names a configure preset.
    pub const CONFIGURE_STEP: &str = "configure";

    pub const DEFAULT_PRESETS_FILE: &str = "CMakePresets.json";
    pub const DEFAULT_WORKFLOW: &str = "Test";
}
