//! # vdl-ir
//!
//! Intermediate representation and IR builder for VDL schemas.
//!
//! A VDL front end hands this crate one parsed [`SourceFile`] per schema
//! file. The builder merges every file reachable through includes, resolves
//! spreads and type references, compiles patterns, and flattens RPC
//! operations into a single immutable [`IrSchema`] that code generators and
//! plugins consume.
//!
//! ## Quick Start
//!
//! ```rust
//! use vdl_ir::ast::{FieldDecl, SourceFile, TypeDecl, TypeExpr};
//! use vdl_ir::{IrBuilder, MemoryLoader};
//!
//! let loader = MemoryLoader::new().with_file(
//!     SourceFile::new("main.vdl").with_decl(
//!         TypeDecl::new("User").with_field(FieldDecl::new("name", TypeExpr::named("string"))),
//!     ),
//! );
//!
//! let compiled = IrBuilder::new(loader).build("main.vdl").unwrap();
//! assert_eq!(compiled.ir.types[0].name, "User");
//! ```
//!
//! ## Architecture
//!
//! - [`ast`] - Parsed-source model
//! - [`merge`] - Include traversal and global name checks
//! - [`resolver`] - Type reference resolution and spread flattening
//! - [`convert`] - Enum, constant, and pattern conversion
//! - [`builder`] - The IR build pipeline
//! - [`ir`] - The IR itself
//! - [`value`] - Schema-directed JSON codec
//! - [`error`] - Error types and diagnostic codes

pub mod ast;
pub mod builder;
pub mod convert;
pub mod doc;
pub mod error;
pub mod graph;
pub mod ir;
pub mod merge;
pub mod naming;
pub mod pattern;
pub mod resolver;
pub mod value;

// Re-export main types for convenience
pub use ast::SourceFile;
pub use builder::{build_merged, Compilation, IrBuilder};
pub use error::{CompileError, CompileResult, DecodeError, Location, PatternError};
pub use graph::{CycleError, DependencyGraph};
pub use ir::{
    ConstType, ConstantDef, Deprecation, EnumDef, EnumMember, EnumType, FieldDef, InlineObject,
    IrSchema, PatternDef, Primitive, ProcedureDef, RpcDef, StreamDef, TypeDef, TypeKind, TypeRef,
    route_path,
};
pub use merge::{load_all, MemoryLoader, MergedSources, SourceLoader};
pub use value::{Codec, Record, Value};
