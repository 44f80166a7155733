use crate::error::PresetLoadError;
use camino::Utf8Path;
use fs_err as fs;
use presetrun_types::PresetsDocument;
use presetrun_types::schema::MIN_SCHEMA_VERSION;
use std::io::ErrorKind;
use tracing::{debug, info};

/// Read and validate the presets document at `path`.
pub fn load_presets(path: &Utf8Path) -> Result<PresetsDocument, PresetLoadError> {
    info!("loading presets from {}", path);

    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            PresetLoadError::NotFound {
                path: path.to_owned(),
            }
        } else {
            PresetLoadError::Io {
                path: path.to_owned(),
                source,
            }
        }
    })?;

    parse_presets(&contents, path)
}

/// Parse a presets document from a string. `path` is only used for errors.
pub fn parse_presets(contents: &str, path: &Utf8Path) -> Result<PresetsDocument, PresetLoadError> {
    let doc: PresetsDocument =
        serde_json::from_str(contents).map_err(|source| PresetLoadError::Parse {
            path: path.to_owned(),
            source,
        })?;

    if doc.version < MIN_SCHEMA_VERSION {
        return Err(PresetLoadError::UnsupportedVersion {
            path: path.to_owned(),
            found: doc.version,
            minimum: MIN_SCHEMA_VERSION,
        });
    }

    debug!(
        version = doc.version,
        configure_presets = doc.configure_presets.len(),
        workflow_presets = doc.workflow_presets.len(),
        "parsed presets"
    );
    Ok(doc)
}
