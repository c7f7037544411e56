//! Plugin wire protocol.
//!
//! A plugin reads one [`PluginRequest`] document from stdin and writes one
//! [`PluginResponse`] document to stdout:
//!
//! ```json
//! {"version": "0.1.0", "schema": "...", "ir": {...}, "options": {...}}
//! ```
//!
//! ```json
//! {"files": [{"path": "out.txt", "content": "..."}]}
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use vdl_ir::IrSchema;

use crate::error::GeneratorError;
use crate::generator::GeneratedFile;
use crate::writer::relative_path;

/// The document written to a plugin's stdin.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PluginRequest<'a> {
    /// Toolchain version.
    pub version: &'a str,
    /// Merged schema source text, verbatim.
    pub schema: &'a str,
    pub ir: &'a IrSchema,
    /// Target options, passed through untouched.
    pub options: &'a serde_json::Value,
}

impl PluginRequest<'_> {
    /// Compact JSON encoding, without a trailing newline.
    pub fn encode(&self) -> Result<Vec<u8>, GeneratorError> {
        serde_json::to_vec(self).map_err(|e| {
            GeneratorError::generation(format!("failed to encode plugin request: {e}"))
        })
    }
}

/// The document a plugin writes to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginResponse {
    pub files: Vec<PluginFile>,
}

/// One generated file in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginFile {
    /// Path relative to the target's output root.
    pub path: String,
    pub content: String,
}

impl PluginResponse {
    /// Parse a plugin's complete stdout.
    ///
    /// Output that is not JSON is [`GeneratorError::InvalidJson`]; JSON of
    /// the wrong shape is [`GeneratorError::InvalidResponse`]. Every path
    /// is checked before the response is accepted.
    pub fn parse(stdout: &[u8]) -> Result<Self, GeneratorError> {
        let value: serde_json::Value =
            serde_json::from_slice(stdout).map_err(GeneratorError::InvalidJson)?;
        let response: PluginResponse = serde_json::from_value(value)
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;
        response.validate()?;
        Ok(response)
    }

    fn validate(&self) -> Result<(), GeneratorError> {
        let mut seen = BTreeSet::new();
        for file in &self.files {
            let relative = relative_path(&file.path).map_err(|reason| GeneratorError::InvalidPath {
                path: file.path.clone(),
                reason,
            })?;
            if !seen.insert(relative) {
                return Err(GeneratorError::InvalidPath {
                    path: file.path.clone(),
                    reason: "path is generated more than once",
                });
            }
        }
        Ok(())
    }

    /// The response's files as generator output.
    pub fn into_files(self) -> Vec<GeneratedFile> {
        self.files
            .into_iter()
            .map(|f| GeneratedFile::new(f.path, f.content))
            .collect()
    }
}
