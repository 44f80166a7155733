//! End-to-end pipeline behavior against a temp source root.

use camino::{Utf8Path, Utf8PathBuf};
use pretty_assertions::assert_eq;
use presetrun_core::adapters::{FsBuildDirCleaner, RecordingWorkflowRunner, WorkflowInvocation};
use presetrun_core::ports::{BuildDirCleaner, CleanOutcome, EngineExit, WorkflowRunner};
use presetrun_core::{
    Orchestrator, PresetLink, PresetLoadError, ResolveError, RunError, RunSettings,
};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::sync::Mutex;
use tempfile::TempDir;

const PRESETS: &str = r#"{
    "version": 6,
    "configurePresets": [
        { "name": "cfg1", "binaryDir": "${sourceDir}/out" },
        { "name": "cfg2", "binaryDir": "${sourceDir}/other" }
    ],
    "workflowPresets": [
        {
            "name": "Test",
            "steps": [ { "type": "configure", "name": "cfg1" }, { "type": "test" } ]
        },
        {
            "name": "Twice",
            "steps": [
                { "type": "configure", "name": "cfg1" },
                { "type": "configure", "name": "cfg2" }
            ]
        },
        {
            "name": "Root",
            "steps": [ { "type": "configure", "name": "root" } ]
        }
    ]
}"#;

fn source_root(presets: &str) -> (TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
    fs::write(root.join("CMakePresets.json"), presets).expect("write presets");
    (temp, root)
}

/// Relative path -> file contents (None for directories).
fn snapshot(root: &Utf8Path) -> BTreeMap<String, Option<String>> {
    fn walk(root: &Utf8Path, dir: &Utf8Path, out: &mut BTreeMap<String, Option<String>>) {
        for entry in fs::read_dir(dir).expect("read_dir") {
            let path = Utf8PathBuf::from_path_buf(entry.expect("entry").path()).expect("utf8");
            let rel = path.strip_prefix(root).expect("prefix").to_string();
            if path.is_dir() {
                out.insert(rel, None);
                walk(root, &path, out);
            } else {
                out.insert(rel, Some(fs::read_to_string(&path).expect("read")));
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

#[test]
fn end_to_end_clears_build_dir_and_runs_workflow() {
    let (_temp, root) = source_root(PRESETS);
    fs::create_dir_all(root.join("out").join("sub")).unwrap();
    fs::write(root.join("out").join("stale.txt"), "stale").unwrap();
    fs::write(root.join("out").join("sub").join("obj.o"), "obj").unwrap();

    let mut expected = snapshot(&root);
    expected.retain(|k, _| !k.starts_with("out"));

    let runner = RecordingWorkflowRunner::succeeding();
    let orchestrator =
        Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &runner);
    let outcome = orchestrator.run("Test").unwrap();

    assert_eq!(outcome.workflow, "Test");
    assert_eq!(outcome.build_dir, root.join("out"));
    assert_eq!(outcome.cleanup, CleanOutcome::Removed);
    assert!(!root.join("out").exists());
    assert_eq!(
        runner.invocations(),
        vec![WorkflowInvocation {
            workflow: "Test".to_string(),
            working_dir: root.clone(),
        }]
    );
    assert_eq!(snapshot(&root), expected);
}

#[test]
fn missing_build_dir_is_not_an_error() {
    let (_temp, root) = source_root(PRESETS);
    let before = snapshot(&root);

    let runner = RecordingWorkflowRunner::succeeding();
    let outcome = Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &runner)
        .run("Test")
        .unwrap();

    assert_eq!(outcome.cleanup, CleanOutcome::Absent);
    assert_eq!(runner.invocations().len(), 1);
    assert_eq!(snapshot(&root), before);
}

#[test]
fn second_configure_step_is_ignored() {
    let (_temp, root) = source_root(PRESETS);
    fs::create_dir_all(root.join("out")).unwrap();
    fs::create_dir_all(root.join("other")).unwrap();

    let runner = RecordingWorkflowRunner::succeeding();
    let outcome = Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &runner)
        .run("Twice")
        .unwrap();

    assert_eq!(outcome.build_dir, root.join("out"));
    assert!(!root.join("out").exists());
    assert!(root.join("other").is_dir());
}

#[test]
fn old_schema_aborts_before_any_mutation() {
    let (_temp, root) = source_root(&PRESETS.replacen("\"version\": 6", "\"version\": 5", 1));
    fs::create_dir_all(root.join("out")).unwrap();
    fs::write(root.join("out").join("stale.txt"), "stale").unwrap();
    let before = snapshot(&root);

    let runner = RecordingWorkflowRunner::succeeding();
    let err = Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &runner)
        .run("Test")
        .unwrap_err();

    assert!(matches!(
        err,
        RunError::Load(PresetLoadError::UnsupportedVersion { found: 5, .. })
    ));
    assert_eq!(snapshot(&root), before);
    assert!(runner.invocations().is_empty());
}

#[test]
fn missing_presets_file_aborts() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();

    let runner = RecordingWorkflowRunner::succeeding();
    let err = Orchestrator::new(RunSettings::new(root), &FsBuildDirCleaner, &runner)
        .run("Test")
        .unwrap_err();

    assert!(matches!(err, RunError::Load(PresetLoadError::NotFound { .. })));
    assert!(runner.invocations().is_empty());
}

#[test]
fn unknown_workflow_deletes_nothing() {
    let (_temp, root) = source_root(PRESETS);
    fs::create_dir_all(root.join("out")).unwrap();
    fs::create_dir_all(root.join("other")).unwrap();
    let before = snapshot(&root);

    let runner = RecordingWorkflowRunner::succeeding();
    let err = Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &runner)
        .run("Nope")
        .unwrap_err();

    match err {
        RunError::Resolve(ResolveError::PresetNotFound { link, name }) => {
            assert_eq!(link, PresetLink::WorkflowPreset);
            assert_eq!(name, "Nope");
        }
        other => panic!("expected PresetNotFound, got {other:?}"),
    }
    assert_eq!(snapshot(&root), before);
    assert!(runner.invocations().is_empty());
}

#[test]
fn unknown_configure_preset_deletes_nothing() {
    let (_temp, root) = source_root(PRESETS);
    let before = snapshot(&root);

    let runner = RecordingWorkflowRunner::succeeding();
    let err = Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &runner)
        .run("Root")
        .unwrap_err();

    assert!(matches!(
        err,
        RunError::Resolve(ResolveError::PresetNotFound {
            link: PresetLink::ConfigurePreset,
            ..
        })
    ));
    assert_eq!(snapshot(&root), before);
}

#[test]
fn build_dir_equal_to_source_root_is_refused() {
    let presets = r#"{
        "version": 6,
        "configurePresets": [ { "name": "root", "binaryDir": "${sourceDir}" } ],
        "workflowPresets": [ { "name": "Test", "steps": [ { "type": "configure", "name": "root" } ] } ]
    }"#;
    let (_temp, root) = source_root(presets);

    let runner = RecordingWorkflowRunner::succeeding();
    let err = Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &runner)
        .run("Test")
        .unwrap_err();

    assert!(matches!(err, RunError::UnsafeBuildDir { .. }));
    assert!(root.join("CMakePresets.json").exists());
    assert!(runner.invocations().is_empty());
}

#[test]
fn build_dir_above_source_root_is_refused() {
    let presets = r#"{
        "version": 6,
        "configurePresets": [ { "name": "up", "binaryDir": "${sourceDir}/.." } ],
        "workflowPresets": [ { "name": "Test", "steps": [ { "type": "configure", "name": "up" } ] } ]
    }"#;
    let (_temp, root) = source_root(presets);

    let runner = RecordingWorkflowRunner::succeeding();
    let err = Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &runner)
        .run("Test")
        .unwrap_err();

    assert!(matches!(err, RunError::UnsafeBuildDir { .. }));
    assert!(root.join("CMakePresets.json").exists());
}

#[test]
fn cleanup_failure_stops_before_engine() {
    let (_temp, root) = source_root(PRESETS);
    fs::write(root.join("out"), "a file, not a directory").unwrap();

    let runner = RecordingWorkflowRunner::succeeding();
    let err = Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &runner)
        .run("Test")
        .unwrap_err();

    match err {
        RunError::Cleanup { path, .. } => assert_eq!(path, root.join("out")),
        other => panic!("expected Cleanup, got {other:?}"),
    }
    assert!(runner.invocations().is_empty());
}

#[test]
fn nonzero_engine_exit_is_reported() {
    let (_temp, root) = source_root(PRESETS);

    let runner = RecordingWorkflowRunner::new(EngineExit::from_code(8));
    let err = Orchestrator::new(RunSettings::new(root), &FsBuildDirCleaner, &runner)
        .run("Test")
        .unwrap_err();

    assert!(matches!(err, RunError::WorkflowFailed { .. }));
    assert_eq!(err.exit_code(), 8);
}

struct FailingLauncher;

impl WorkflowRunner for FailingLauncher {
    fn program(&self) -> &str {
        "cmake"
    }

    fn run_workflow(&self, _workflow: &str, _working_dir: &Utf8Path) -> io::Result<EngineExit> {
        Err(io::Error::from(io::ErrorKind::NotFound))
    }
}

#[test]
fn launch_failure_is_reported_after_cleanup() {
    let (_temp, root) = source_root(PRESETS);
    fs::create_dir_all(root.join("out")).unwrap();

    let settings = RunSettings::new(root.clone());
    let err = Orchestrator::new(settings, &FsBuildDirCleaner, &FailingLauncher)
        .run("Test")
        .unwrap_err();

    match err {
        RunError::Launch { program, .. } => assert_eq!(program, "cmake"),
        other => panic!("expected Launch, got {other:?}"),
    }
    assert!(!root.join("out").exists());
}

/// Records whether the build directory still existed when the engine ran.
struct ProbeRunner {
    build_dir: Utf8PathBuf,
    seen: Mutex<Option<bool>>,
}

impl WorkflowRunner for ProbeRunner {
    fn program(&self) -> &str {
        "probe"
    }

    fn run_workflow(&self, _workflow: &str, _working_dir: &Utf8Path) -> io::Result<EngineExit> {
        *self.seen.lock().unwrap() = Some(self.build_dir.exists());
        Ok(EngineExit::from_code(0))
    }
}

#[test]
fn engine_runs_after_cleanup() {
    let (_temp, root) = source_root(PRESETS);
    fs::create_dir_all(root.join("out")).unwrap();

    let probe = ProbeRunner {
        build_dir: root.join("out"),
        seen: Mutex::new(None),
    };
    Orchestrator::new(RunSettings::new(root.clone()), &FsBuildDirCleaner, &probe)
        .run("Test")
        .unwrap();

    assert_eq!(*probe.seen.lock().unwrap(), Some(false));
}

#[test]
fn custom_presets_file_is_honored() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    fs::create_dir_all(root.join("cmake")).unwrap();
    fs::write(root.join("cmake").join("presets.json"), PRESETS).unwrap();

    let settings = RunSettings {
        presets_file: Utf8PathBuf::from("cmake/presets.json"),
        ..RunSettings::new(root.clone())
    };
    let runner = RecordingWorkflowRunner::succeeding();
    let outcome = Orchestrator::new(settings, &FsBuildDirCleaner, &runner)
        .run("Test")
        .unwrap();

    assert_eq!(outcome.build_dir, root.join("out"));
}

/// Records requested removals without touching the filesystem.
#[derive(Default)]
struct SpyCleaner {
    removed: Mutex<Vec<Utf8PathBuf>>,
}

impl BuildDirCleaner for SpyCleaner {
    fn remove_build_dir(&self, path: &Utf8Path) -> io::Result<CleanOutcome> {
        self.removed.lock().unwrap().push(path.to_owned());
        Ok(CleanOutcome::Absent)
    }
}

fn presets_with_binary_dir(binary_dir: &str) -> (TempDir, Utf8PathBuf) {
    let presets = format!(
        r#"{{
            "version": 6,
            "configurePresets": [ {{ "name": "cfg", "binaryDir": "{binary_dir}" }} ],
            "workflowPresets": [
                {{ "name": "Test", "steps": [ {{ "type": "configure", "name": "cfg" }} ] }}
            ]
        }}"#
    );
    source_root(&presets)
}

#[test]
fn default_settings_refuse_parent_of_working_dir() {
    let (_temp, root) = presets_with_binary_dir("${sourceDir}/..");
    let settings = RunSettings {
        presets_file: root.join("CMakePresets.json"),
        ..RunSettings::default()
    };

    let cleaner = SpyCleaner::default();
    let runner = RecordingWorkflowRunner::succeeding();
    let err = Orchestrator::new(settings, &cleaner, &runner)
        .run("Test")
        .unwrap_err();

    match err {
        RunError::UnsafeBuildDir {
            build_dir,
            source_dir,
        } => {
            assert!(build_dir.is_absolute());
            assert!(source_dir.is_absolute());
        }
        other => panic!("expected UnsafeBuildDir, got {other:?}"),
    }
    assert!(cleaner.removed.lock().unwrap().is_empty());
    assert!(runner.invocations().is_empty());
}

#[test]
fn default_settings_resolve_absolute_build_dir() {
    let (_temp, root) = presets_with_binary_dir("${sourceDir}/build/x");
    let settings = RunSettings {
        presets_file: root.join("CMakePresets.json"),
        ..RunSettings::default()
    };

    let cleaner = SpyCleaner::default();
    let runner = RecordingWorkflowRunner::succeeding();
    let outcome = Orchestrator::new(settings, &cleaner, &runner)
        .run("Test")
        .unwrap();

    let cwd = Utf8PathBuf::from_path_buf(std::env::current_dir().unwrap()).unwrap();
    assert!(outcome.build_dir.is_absolute());
    assert_eq!(outcome.build_dir, cwd.join("build").join("x"));
    assert_eq!(*cleaner.removed.lock().unwrap(), vec![cwd.join("build").join("x")]);
    assert_eq!(runner.invocations()[0].working_dir, cwd);
}
