//! Go generator.
//!
//! Emits `types.go`, `enums.go`, `constants.go`, `patterns.go`, and
//! `catalog.go` into a single package. The `package` option is required;
//! `gen_consts`, `gen_patterns`, and `gen_catalog` default to `true`.

pub mod emitter;
pub mod type_mapper;

// Re-export main types for convenience
pub use emitter::{GoGenerator, GoOptions};
