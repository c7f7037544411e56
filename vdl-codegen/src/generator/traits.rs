//! Code generator trait definition.
//!
//! A generator is a pure function of its [`GenerationContext`]: identical
//! IR and options always produce byte-identical files.

use vdl_ir::IrSchema;

use crate::error::GeneratorError;

/// Trait for built-in code generators.
///
/// # Example
///
/// ```rust
/// use vdl_codegen::generator::{CodeGenerator, GeneratedFile, GenerationContext};
/// use vdl_codegen::GeneratorError;
///
/// struct Summary;
///
/// impl CodeGenerator for Summary {
///     fn id(&self) -> &'static str { "summary" }
///     fn name(&self) -> &'static str { "Type Summary" }
///
///     fn generate(
///         &self,
///         ctx: &GenerationContext<'_>,
///     ) -> Result<Vec<GeneratedFile>, GeneratorError> {
///         let names: Vec<_> = ctx.schema.types.iter().map(|t| t.name.as_str()).collect();
///         Ok(vec![GeneratedFile::new("types.txt", names.join("\n"))])
///     }
/// }
/// ```
pub trait CodeGenerator: Send + Sync {
    /// Returns the unique identifier for this generator.
    ///
    /// This is the value of `generator = "..."` in the project manifest.
    fn id(&self) -> &'static str;

    /// Returns the human-readable name of this generator.
    fn name(&self) -> &'static str;

    /// Generate files from the IR.
    ///
    /// Returned paths are relative to the target's output root.
    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<GeneratedFile>, GeneratorError>;
}

/// Immutable input of one generator invocation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    /// The resolved IR.
    pub schema: &'a IrSchema,
    /// Merged schema source text.
    pub schema_source: &'a str,
    /// Toolchain version.
    pub version: &'a str,
    /// Target options, verbatim from the manifest.
    pub options: &'a serde_json::Value,
}

impl<'a> GenerationContext<'a> {
    /// Create a context.
    pub fn new(
        schema: &'a IrSchema,
        schema_source: &'a str,
        version: &'a str,
        options: &'a serde_json::Value,
    ) -> Self {
        Self {
            schema,
            schema_source,
            version,
            options,
        }
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output root, `/`-separated.
    pub path: String,
    /// File contents.
    pub content: String,
}

impl GeneratedFile {
    /// Create a generated file.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}
