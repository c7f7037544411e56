//! File-system source loader.
//!
//! Reads parsed schema documents (`*.vdl.json`) from disk for the IR
//! builder.

use tracing::debug;
use vdl_ir::{CompileError, CompileResult, SourceFile, SourceLoader};

/// Loads parsed sources from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl FsLoader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceLoader for FsLoader {
    fn load(&mut self, path: &str) -> CompileResult<SourceFile> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            debug!(path = %path, error = %err, "failed to read source");
            CompileError::file_not_found(path, None)
        })?;

        let mut file: SourceFile =
            serde_json::from_str(&text).map_err(|err| CompileError::parse(path, err.to_string()))?;
        if file.source.is_none() {
            file.source = Some(text);
        }
        file.path = path.to_string();
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vdl_ir::IrBuilder;

    fn write(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_loads_document_and_defaults_source() {
        let dir = TempDir::new().unwrap();
        let text = r#"{"declarations":[]}"#;
        let path = write(&dir, "main.vdl.json", text);

        let file = FsLoader::new().load(&path).unwrap();
        assert_eq!(file.path, path);
        assert_eq!(file.source.as_deref(), Some(text));
    }

    #[test]
    fn test_keeps_explicit_source() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "main.vdl.json", r#"{"source":"type A {}"}"#);

        let file = FsLoader::new().load(&path).unwrap();
        assert_eq!(file.source.as_deref(), Some("type A {}"));
    }

    #[test]
    fn test_missing_file_is_e001() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.vdl.json");

        let err = FsLoader::new().load(&path.to_string_lossy()).unwrap_err();
        assert_eq!(err.code(), "E001");
    }

    #[test]
    fn test_malformed_document_is_e005() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "main.vdl.json", "{ not json");

        let err = FsLoader::new().load(&path).unwrap_err();
        assert_eq!(err.code(), "E005");
    }

    #[test]
    fn test_follows_relative_includes() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "shared/common.vdl.json",
            r#"{"declarations":[{"kind":"type","name":"Common","fields":[]}]}"#,
        );
        let main = write(
            &dir,
            "main.vdl.json",
            r#"{"includes":["shared/common.vdl.json"],"declarations":[]}"#,
        );

        let compiled = IrBuilder::new(FsLoader::new()).build(&main).unwrap();
        assert_eq!(compiled.files.len(), 2);
        assert_eq!(compiled.ir.types[0].name, "Common");
    }
}
