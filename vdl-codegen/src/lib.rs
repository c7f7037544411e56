//! # vdl-codegen
//!
//! Code generation for VDL schemas: built-in generators, the plugin
//! protocol runtime, and the pipeline that runs configured targets and
//! writes their output.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vdl_codegen::{GeneratorRegistry, Pipeline, TargetSpec};
//! use vdl_ir::IrSchema;
//!
//! # async fn run() {
//! let schema = IrSchema::new();
//! let targets = vec![
//!     TargetSpec::builtin("ir", "gen/ir", "ir"),
//!     TargetSpec::plugin("docs", "gen/docs", vec!["vdl-docs".into()]),
//! ];
//!
//! let summary = Pipeline::new(GeneratorRegistry::with_builtins())
//!     .run(&schema, "", &targets)
//!     .await;
//! for (name, error) in summary.failures() {
//!     eprintln!("{name}: {error}");
//! }
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`generator`] - The [`CodeGenerator`] trait, registry, and built-ins
//! - [`plugin`] - Request/response protocol and process supervision
//! - [`target`] - Target specs and their runnable form
//! - [`writer`] - Path validation and file output
//! - [`pipeline`] - Concurrent target execution and the run summary
//! - [`error`] - Error types

pub mod error;
pub mod generator;
pub mod pipeline;
pub mod plugin;
pub mod target;
pub mod writer;

// Re-export main types for convenience
pub use error::{GeneratorError, OutputError, TargetError};
pub use generator::{CodeGenerator, GeneratedFile, GenerationContext, GeneratorRegistry};
pub use pipeline::{Pipeline, RunSummary, TargetOutcome};
pub use plugin::{DiagnosticSink, PluginCommand, PluginRequest, PluginResponse, PluginRunner};
pub use target::{TargetKind, TargetSpec};
pub use writer::{FileWriter, WriteResult};
