//! Run every configured target against one IR.
//!
//! Targets run concurrently and independently: each produces its own
//! [`TargetOutcome`], and a failure in one never cancels another.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};
use vdl_ir::IrSchema;

use crate::error::TargetError;
use crate::generator::GeneratorRegistry;
use crate::plugin::{DiagnosticSink, PluginRunner};
use crate::target::{self, TargetInput, TargetSpec};
use crate::writer::{FileWriter, WriteResult};

/// Result of running one target.
#[derive(Debug)]
pub struct TargetOutcome {
    pub name: String,
    pub output: PathBuf,
    pub result: Result<Vec<WriteResult>, TargetError>,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Files written or planned; empty on failure.
    pub fn files(&self) -> &[WriteResult] {
        match &self.result {
            Ok(files) => files,
            Err(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&TargetError> {
        self.result.as_ref().err()
    }
}

/// Results of every target, in configuration order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<TargetOutcome>,
}

impl RunSummary {
    /// True when every target succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(TargetOutcome::is_success)
    }

    /// Failed targets with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &TargetError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.name.as_str(), e)))
    }

    /// Every file across successful targets.
    pub fn files(&self) -> impl Iterator<Item = &WriteResult> {
        self.outcomes.iter().flat_map(|o| o.files())
    }

    /// Number of files actually written to disk.
    pub fn written_count(&self) -> usize {
        self.files().filter(|f| f.was_written()).count()
    }
}

/// Drives targets to completion.
#[derive(Debug, Clone)]
pub struct Pipeline {
    registry: Arc<GeneratorRegistry>,
    runner: PluginRunner,
    version: String,
    dry_run: bool,
}

impl Pipeline {
    /// Create a pipeline using `registry` for built-in targets.
    pub fn new(registry: GeneratorRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            runner: PluginRunner::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            dry_run: false,
        }
    }

    /// Send plugin stderr to `sink` instead of the user's stderr.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.runner = PluginRunner::new(sink);
        self
    }

    /// Toolchain version reported to generators and plugins.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Report files instead of writing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run every target concurrently.
    pub async fn run(
        &self,
        schema: &IrSchema,
        schema_source: &str,
        targets: &[TargetSpec],
    ) -> RunSummary {
        let input = TargetInput {
            schema,
            schema_source,
            version: &self.version,
        };
        let outcomes = join_all(targets.iter().map(|spec| self.run_target(spec, input))).await;
        RunSummary { outcomes }
    }

    async fn run_target(&self, spec: &TargetSpec, input: TargetInput<'_>) -> TargetOutcome {
        info!(target_name = %spec.name, output = %spec.output.display(), "target started");
        let result = self.execute(spec, input).await;

        match &result {
            Ok(files) => info!(target_name = %spec.name, files = files.len(), "target finished"),
            Err(e) => warn!(target_name = %spec.name, error = %e, "target failed"),
        }

        TargetOutcome {
            name: spec.name.clone(),
            output: spec.output.clone(),
            result,
        }
    }

    async fn execute(
        &self,
        spec: &TargetSpec,
        input: TargetInput<'_>,
    ) -> Result<Vec<WriteResult>, TargetError> {
        let target = target::resolve(spec, &self.registry, &self.runner)?;
        let files = target.generate(input).await?;

        let writer = FileWriter::new(&spec.output, self.dry_run);
        writer.plan(&files)?;
        if spec.clean {
            writer.clean()?;
        }
        Ok(writer.write_all(&files)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_failure_does_not_stop_other_targets() {
        let dir = TempDir::new().unwrap();
        let targets = vec![
            TargetSpec::builtin("bad", dir.path().join("bad"), "nope"),
            TargetSpec::builtin("ir", dir.path().join("ir"), "ir"),
        ];

        let summary = Pipeline::new(GeneratorRegistry::with_builtins())
            .run(&IrSchema::new(), "", &targets)
            .await;

        assert!(!summary.is_success());
        let failures: Vec<&str> = summary.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["bad"]);
        assert_eq!(summary.written_count(), 1);
        assert!(dir.path().join("ir/ir.json").exists());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let targets = vec![TargetSpec::builtin("ir", dir.path().join("ir"), "ir")];

        let summary = Pipeline::new(GeneratorRegistry::with_builtins())
            .dry_run(true)
            .run(&IrSchema::new(), "", &targets)
            .await;

        assert!(summary.is_success());
        assert_eq!(summary.files().count(), 1);
        assert_eq!(summary.written_count(), 0);
        assert!(!dir.path().join("ir").exists());
    }

    #[tokio::test]
    async fn test_clean_only_after_success() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("stale.txt"), "stale").unwrap();

        let pipeline = Pipeline::new(GeneratorRegistry::with_builtins());

        // Invalid options fail the target, so nothing is cleaned.
        let failing = vec![TargetSpec::builtin("ir", &root, "ir")
            .with_options(json!("not a table"))
            .with_clean(true)];
        let summary = pipeline.run(&IrSchema::new(), "", &failing).await;
        assert!(!summary.is_success());
        assert!(root.join("stale.txt").exists());

        let passing = vec![TargetSpec::builtin("ir", &root, "ir").with_clean(true)];
        let summary = pipeline.run(&IrSchema::new(), "", &passing).await;
        assert!(summary.is_success());
        assert!(!root.join("stale.txt").exists());
        assert!(root.join("ir.json").exists());
    }

    #[tokio::test]
    async fn test_stale_files_persist_without_clean() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("stale.txt"), "stale").unwrap();

        let targets = vec![TargetSpec::builtin("ir", &root, "ir")];
        let summary = Pipeline::new(GeneratorRegistry::with_builtins())
            .run(&IrSchema::new(), "", &targets)
            .await;

        assert!(summary.is_success());
        assert!(root.join("stale.txt").exists());
    }
}
