//! Generation targets.
//!
//! A [`TargetSpec`] is the validated description of one configured output:
//! either a built-in generator or a plugin. Both are driven through the
//! [`Target`] trait so the pipeline treats them alike.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use vdl_ir::IrSchema;

use crate::error::GeneratorError;
use crate::generator::{CodeGenerator, GeneratedFile, GenerationContext, GeneratorRegistry};
use crate::plugin::{PluginCommand, PluginRequest, PluginRunner};

/// One configured output.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    /// Name used in logs, diagnostics, and the run summary.
    pub name: String,
    /// Output root that generated paths are joined onto.
    pub output: PathBuf,
    /// Remove the output root before writing.
    pub clean: bool,
    pub kind: TargetKind,
}

/// What produces a target's files.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetKind {
    Builtin {
        generator: String,
        options: Value,
    },
    Plugin {
        command: Vec<String>,
        args: Vec<String>,
        options: Value,
        timeout: Duration,
    },
}

impl TargetSpec {
    /// A target backed by a built-in generator.
    pub fn builtin(
        name: impl Into<String>,
        output: impl Into<PathBuf>,
        generator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            clean: false,
            kind: TargetKind::Builtin {
                generator: generator.into(),
                options: Value::Null,
            },
        }
    }

    /// A target backed by a plugin command.
    pub fn plugin(
        name: impl Into<String>,
        output: impl Into<PathBuf>,
        command: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            clean: false,
            kind: TargetKind::Plugin {
                command,
                args: Vec::new(),
                options: Value::Object(Default::default()),
                timeout: crate::plugin::DEFAULT_TIMEOUT,
            },
        }
    }

    /// Replace the options passed to the generator or plugin.
    pub fn with_options(mut self, value: Value) -> Self {
        match &mut self.kind {
            TargetKind::Builtin { options, .. } | TargetKind::Plugin { options, .. } => {
                *options = value
            }
        }
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }
}

/// Inputs shared by every target of a run.
#[derive(Debug, Clone, Copy)]
pub struct TargetInput<'a> {
    pub schema: &'a IrSchema,
    pub schema_source: &'a str,
    pub version: &'a str,
}

/// Something that turns the IR into files.
#[async_trait]
pub trait Target: Send + Sync {
    async fn generate(&self, input: TargetInput<'_>) -> Result<Vec<GeneratedFile>, GeneratorError>;
}

/// A target running a registered generator in-process.
pub struct BuiltinTarget {
    generator: Arc<dyn CodeGenerator>,
    options: Value,
}

impl BuiltinTarget {
    pub fn new(generator: Arc<dyn CodeGenerator>, options: Value) -> Self {
        Self { generator, options }
    }
}

#[async_trait]
impl Target for BuiltinTarget {
    async fn generate(&self, input: TargetInput<'_>) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let ctx = GenerationContext::new(
            input.schema,
            input.schema_source,
            input.version,
            &self.options,
        );
        self.generator.generate(&ctx)
    }
}

/// A target running an external plugin.
pub struct PluginTarget {
    name: String,
    runner: PluginRunner,
    command: PluginCommand,
    options: Value,
}

impl PluginTarget {
    pub fn new(
        name: impl Into<String>,
        runner: PluginRunner,
        command: PluginCommand,
        options: Value,
    ) -> Self {
        Self {
            name: name.into(),
            runner,
            command,
            options,
        }
    }
}

#[async_trait]
impl Target for PluginTarget {
    async fn generate(&self, input: TargetInput<'_>) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let request = PluginRequest {
            version: input.version,
            schema: input.schema_source,
            ir: input.schema,
            options: &self.options,
        };
        self.runner.run(&self.name, &self.command, &request).await
    }
}

/// Build the runnable target for a spec.
pub fn resolve(
    spec: &TargetSpec,
    registry: &GeneratorRegistry,
    runner: &PluginRunner,
) -> Result<Box<dyn Target>, GeneratorError> {
    match &spec.kind {
        TargetKind::Builtin { generator, options } => Ok(Box::new(BuiltinTarget::new(
            registry.get(generator)?,
            options.clone(),
        ))),
        TargetKind::Plugin {
            command,
            args,
            options,
            timeout,
        } => Ok(Box::new(PluginTarget::new(
            spec.name.clone(),
            runner.clone(),
            PluginCommand::new(command.clone())
                .args(args.clone())
                .timeout(*timeout),
            options.clone(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spec_builders() {
        let spec = TargetSpec::builtin("web", "gen/ts", "typescript")
            .with_options(json!({ "gen_consts": false }))
            .with_clean(true);
        assert!(spec.clean);
        assert_eq!(
            spec.kind,
            TargetKind::Builtin {
                generator: "typescript".into(),
                options: json!({ "gen_consts": false }),
            }
        );

        let spec = TargetSpec::plugin("py", "gen/py", vec!["vdl-py".into()]);
        assert!(matches!(
            spec.kind,
            TargetKind::Plugin { ref options, timeout, .. }
                if options == &json!({}) && timeout == crate::plugin::DEFAULT_TIMEOUT
        ));
    }

    #[test]
    fn test_unknown_generator_fails_to_resolve() {
        let spec = TargetSpec::builtin("x", "out", "cobol");
        let err = resolve(&spec, &GeneratorRegistry::with_builtins(), &PluginRunner::default())
            .err()
            .unwrap();
        assert!(matches!(err, GeneratorError::UnknownGenerator(id) if id == "cobol"));
    }

    #[tokio::test]
    async fn test_builtin_target_generates() {
        let schema = IrSchema::new();
        let spec = TargetSpec::builtin("ir", "out", "ir");
        let registry = GeneratorRegistry::with_builtins();
        let target = resolve(&spec, &registry, &PluginRunner::default()).unwrap();

        let files = target
            .generate(TargetInput {
                schema: &schema,
                schema_source: "",
                version: "0.1.0",
            })
            .await
            .unwrap();
        assert_eq!(files[0].path, "ir.json");
    }
}
