//! Command implementations shared by the `vdl` binary and tests.
//!
//! Commands return data; printing and exit codes stay in `main.rs`.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use vdl_codegen::{GeneratorRegistry, Pipeline, RunSummary, TargetSpec};
use vdl_ir::{Compilation, CompileError, IrBuilder};

use crate::config::ConfigManager;
use crate::error::{CliError, CliResult};
use crate::loader::FsLoader;

/// Toolchain version reported to generators and plugins.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options for `vdl generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Manifest path; `vdl.toml` in the current directory when `None`.
    pub config: Option<PathBuf>,
    /// Report files instead of writing them.
    pub dry_run: bool,
    /// Run only these targets. Empty runs all of them.
    pub targets: Vec<String>,
}

/// Result of `vdl generate`.
#[derive(Debug)]
pub struct GenerateReport {
    pub targets: Vec<TargetSpec>,
    pub summary: RunSummary,
}

impl GenerateReport {
    /// Convert a failed run into an error.
    pub fn into_result(self) -> CliResult<RunSummary> {
        let failed = self.summary.failures().count();
        if failed == 0 {
            Ok(self.summary)
        } else {
            Err(CliError::Targets {
                failed,
                total: self.summary.outcomes.len(),
            })
        }
    }
}

/// Build the IR for the schema rooted at `schema`.
pub fn compile(schema: &Path) -> CliResult<Compilation> {
    let entry = schema.to_string_lossy();
    debug!(schema = %entry, "compiling schema");
    let compiled = IrBuilder::new(FsLoader::new()).build(&entry)?;
    info!(
        files = compiled.files.len(),
        types = compiled.ir.types.len(),
        rpcs = compiled.ir.rpcs.len(),
        "schema compiled"
    );
    Ok(compiled)
}

/// Load the manifest, compile its schema, and run the selected targets.
///
/// A compile error aborts before any target runs. Target failures are
/// reported in the summary, not as an error.
pub async fn generate(options: &GenerateOptions) -> CliResult<GenerateReport> {
    let config = ConfigManager::load(options.config.as_deref())?;
    let targets = ConfigManager::select_targets(config.target_specs()?, &options.targets)?;
    let compiled = compile(&config.schema_path())?;

    let summary = Pipeline::new(GeneratorRegistry::with_builtins())
        .with_version(VERSION)
        .dry_run(options.dry_run)
        .run(&compiled.ir, &compiled.schema_source, &targets)
        .await;

    Ok(GenerateReport { targets, summary })
}

/// Serialize the IR of `schema` as JSON.
pub fn ir_json(schema: &Path, minify: bool) -> CliResult<String> {
    let compiled = compile(schema)?;
    let json = if minify {
        compiled.ir.to_json()?
    } else {
        compiled.ir.to_json_pretty()?
    };
    Ok(json)
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Create a starter manifest at `output`.
pub fn init(output: &Path, force: bool) -> CliResult<()> {
    if output.exists() && !force {
        return Err(CliError::usage(format!(
            "Configuration file already exists: {} (use --force to overwrite)",
            output.display()
        )));
    }
    write_file(output, ConfigManager::default_config_content())
}

/// One line per compile error, prefixed by its diagnostic code.
pub fn compile_diagnostics(error: &CompileError) -> Vec<String> {
    error
        .clone()
        .into_errors()
        .iter()
        .map(|e| format!("[{}] {}", e.code(), e))
        .collect()
}

/// One line per failed target.
pub fn failure_lines(summary: &RunSummary) -> Vec<String> {
    summary
        .failures()
        .map(|(name, error)| format!("{name}: {error}"))
        .collect()
}
