//! TypeScript generator.
//!
//! # Components
//!
//! - [`TypeScriptGenerator`] - The code generator implementing
//!   [`CodeGenerator`](crate::generator::CodeGenerator)
//! - [`type_mapper`] - Maps IR type references to TypeScript types and converters
//!
//! # Options
//!
//! | Key | Default | Effect |
//! |-----|---------|--------|
//! | `gen_consts` | `true` | emit `constants.ts` |
//! | `gen_patterns` | `true` | emit `patterns.ts` |
//! | `gen_catalog` | `true` | emit `catalog.ts` |
//! | `import_extension` | `""` | suffix for relative imports, e.g. `.js` |

pub mod emitter;
pub mod type_mapper;

// Re-export main types for convenience
pub use emitter::{TypeScriptGenerator, TypeScriptOptions};
