use crate::error::{PresetLink, ResolveError};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use presetrun_types::PresetsDocument;
use presetrun_types::schema::SOURCE_DIR_PLACEHOLDER;
use tracing::info;

/// Resolve the absolute build directory used by `workflow_name`.
///
/// Only the first `configure` step of the workflow is consulted.
pub fn resolve_build_dir(
    doc: &PresetsDocument,
    workflow_name: &str,
    source_dir: &Utf8Path,
) -> Result<Utf8PathBuf, ResolveError> {
    let workflow = doc
        .workflow_preset(workflow_name)
        .ok_or_else(|| ResolveError::not_found(PresetLink::WorkflowPreset, workflow_name))?;

    let configure_name = workflow
        .first_configure_step()
        .and_then(|step| step.name.as_deref())
        .ok_or_else(|| ResolveError::not_found(PresetLink::ConfigureStep, workflow_name))?;

    let configure = doc
        .configure_preset(configure_name)
        .ok_or_else(|| ResolveError::not_found(PresetLink::ConfigurePreset, configure_name))?;

    let template =
        configure
            .binary_dir
            .as_deref()
            .ok_or_else(|| ResolveError::MissingBinaryDir {
                preset: configure.name.clone(),
            })?;

    let build_dir = expand_binary_dir(template, source_dir);
    info!(
        "workflow preset \"{}\": build path: \"{}\"",
        workflow_name, build_dir
    );
    Ok(build_dir)
}

/// Substitute `${sourceDir}` literally, then anchor the result at `source_dir`.
///
/// A relative template lands under `source_dir`; an absolute one (including
/// any template that started with the placeholder) is kept.
pub fn expand_binary_dir(template: &str, source_dir: &Utf8Path) -> Utf8PathBuf {
    let expanded = template.replace(SOURCE_DIR_PLACEHOLDER, source_dir.as_str());
    normalize_lexically(&source_dir.join(expanded))
}

/// Drop `.` and fold `..` without consulting the filesystem.
///
/// `..` never climbs above a root; leading `..` on a relative path is kept.
pub fn normalize_lexically(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match out.components().next_back() {
                Some(Utf8Component::Normal(_)) => {
                    out.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_str()),
        }
    }
    if out.as_str().is_empty() {
        out.push(".");
    }
    out
}
