mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use config::ConfigMerger;
use fs_err as fs;
use presetrun_core::{RunError, run_workflow_tests};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Overrides the source root (default: the directory holding this executable).
const SOURCE_DIR_ENV: &str = "PRESETRUN_SOURCE_DIR";

#[derive(Debug, Parser)]
#[command(
    name = "presetrun",
    about = "Run a CMake workflow preset from a clean build directory."
)]
struct Cli {
    /// Name of the workflow preset to use (default: "Test", or
    /// `default_workflow` from presetrun.toml).
    #[arg(long, env = "PRESETRUN_PRESET")]
    preset: Option<String>,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        let code = e.downcast_ref::<RunError>().map_or(1, RunError::exit_code);
        return ExitCode::from(code);
    }
    ExitCode::SUCCESS
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    let source_dir = discover_source_dir()?;
    debug!("source root: {}", source_dir);

    let file_config = config::load_or_default(&source_dir).context("load presetrun.toml config")?;
    let (settings, workflow) = ConfigMerger::new(file_config).merge(source_dir, cli.preset);
    debug!("merged settings: {:?}", settings);

    let outcome = run_workflow_tests(&settings, &workflow)?;
    info!(
        "workflow \"{}\" finished (build directory {})",
        outcome.workflow, outcome.build_dir
    );
    Ok(())
}

/// The canonical directory of the running executable, unless overridden.
fn discover_source_dir() -> anyhow::Result<Utf8PathBuf> {
    let dir = match std::env::var_os(SOURCE_DIR_ENV) {
        Some(dir) => fs::canonicalize(&dir)
            .with_context(|| format!("resolve {} ({})", SOURCE_DIR_ENV, dir.to_string_lossy()))?,
        None => {
            let exe = std::env::current_exe().context("locate running executable")?;
            let exe = fs::canonicalize(&exe).context("resolve running executable")?;
            exe.parent()
                .map(|p| p.to_path_buf())
                .context("executable has no parent directory")?
        }
    };
    Utf8PathBuf::from_path_buf(dir)
        .map_err(|p| anyhow::anyhow!("source root is not valid UTF-8: {}", p.display()))
}
