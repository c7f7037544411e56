//! IR JSON generator.
//!
//! Writes the IR itself, for consumers that work from the canonical JSON
//! encoding rather than generated code.

use crate::error::GeneratorError;
use crate::generator::options::Options;
use crate::generator::traits::{CodeGenerator, GeneratedFile, GenerationContext};

const DEFAULT_FILENAME: &str = "ir.json";

/// Emits the IR as one JSON file.
#[derive(Debug, Clone, Default)]
pub struct IrJsonGenerator;

impl IrJsonGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for IrJsonGenerator {
    fn id(&self) -> &'static str {
        "ir"
    }

    fn name(&self) -> &'static str {
        "IR JSON"
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let options = Options::new(ctx.options)?;
        let filename = options.string("filename")?.unwrap_or(DEFAULT_FILENAME);
        let minify = options.bool("minify", false)?;

        let json = if minify {
            ctx.schema.to_json()
        } else {
            ctx.schema.to_json_pretty().map(|mut s| {
                s.push('\n');
                s
            })
        }
        .map_err(|e| GeneratorError::generation(format!("failed to encode IR: {e}")))?;

        Ok(vec![GeneratedFile::new(filename, json)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vdl_ir::IrSchema;

    #[test]
    fn test_default_filename_pretty() {
        let schema = IrSchema::new();
        let options = serde_json::Value::Null;
        let ctx = GenerationContext::new(&schema, "", "0.1.0", &options);

        let files = IrJsonGenerator::new().generate(&ctx).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "ir.json");
        assert!(files[0].content.contains("\n  \"types\": []"));
        assert_eq!(IrSchema::from_json(&files[0].content).unwrap(), schema);
    }

    #[test]
    fn test_minified_custom_filename() {
        let schema = IrSchema::new();
        let options = json!({ "filename": "schema.ir.json", "minify": true });
        let ctx = GenerationContext::new(&schema, "", "0.1.0", &options);

        let files = IrJsonGenerator::new().generate(&ctx).unwrap();
        assert_eq!(files[0].path, "schema.ir.json");
        assert!(!files[0].content.contains('\n'));
    }
}
