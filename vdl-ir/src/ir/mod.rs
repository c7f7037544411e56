//! Intermediate representation for VDL schemas.
//!
//! The IR is source-free: no spans, no file paths, no spreads left to
//! resolve. Generators see flat field lists and one canonical name for
//! every type position.

pub mod schema;
pub mod types;

pub use schema::{
    route_path, ConstType, ConstantDef, Deprecation, EnumDef, EnumMember, InlineObject, IrSchema,
    PatternDef, ProcedureDef, RpcDef, StreamDef, TypeDef,
};
pub use types::{EnumType, FieldDef, Primitive, TypeKind, TypeRef};
