//! Embeddable core library for presetrun.
//!
//! Provides a clap-free entry point that loads the presets document,
//! resolves the build directory of a workflow preset, clears it, and hands
//! the workflow to the build engine.
//!
//! # Port traits
//!
//! Side effects go through the port traits in [`ports`]:
//! - [`BuildDirCleaner`](ports::BuildDirCleaner) — remove the stale build directory
//! - [`WorkflowRunner`](ports::WorkflowRunner) — execute a workflow preset
//!
//! The [`adapters`] module provides the filesystem cleaner, the `cmake`
//! subprocess runner, and a recording runner for embedding and tests.
//!
//! # Entry points
//!
//! - [`Orchestrator::run`](pipeline::Orchestrator::run) — run with explicit ports
//! - [`run_workflow_tests`](pipeline::run_workflow_tests) — run with the default adapters

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::{Orchestrator, RunError, RunOutcome, run_workflow_tests};
pub use settings::RunSettings;

// Re-export so embedders don't need presetrun-presets directly.
pub use presetrun_presets::{PresetLink, PresetLoadError, ResolveError};
