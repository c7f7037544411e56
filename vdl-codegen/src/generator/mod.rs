//! Code generator module.
//!
//! This module defines the code generator trait, the registry of built-in
//! generators, and their implementations.

pub mod code;
pub mod golang;
pub mod irjson;
pub mod model;
pub mod options;
pub mod registry;
pub mod traits;
pub mod typescript;

// Re-export main types for convenience
pub use registry::GeneratorRegistry;
pub use traits::{CodeGenerator, GeneratedFile, GenerationContext};
