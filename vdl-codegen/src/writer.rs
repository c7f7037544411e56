//! File writer for generated output.
//!
//! Every path is relative to a target's output root. Paths are validated
//! before anything touches the filesystem, and dry-run mode reports what
//! would be written without writing it.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::OutputError;
use crate::generator::GeneratedFile;

/// Result of a write operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written successfully.
    Written {
        /// Path to the written file.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// Dry run - content was not written.
    DryRun {
        /// Content that would have been written.
        content: String,
        /// Path where content would have been written.
        path: PathBuf,
    },
}

impl WriteResult {
    /// Get the path associated with this result.
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. } => path,
            WriteResult::DryRun { path, .. } => path,
        }
    }

    /// Check if the write was successful (not dry-run).
    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }

    /// Get the number of bytes written (0 for dry-run).
    pub fn bytes(&self) -> usize {
        match self {
            WriteResult::Written { bytes, .. } => *bytes,
            WriteResult::DryRun { .. } => 0,
        }
    }
}

/// Check that `path` stays inside whatever root it is joined onto.
///
/// Returns the normalized relative path with `.` components removed.
pub fn relative_path(path: &str) -> Result<PathBuf, &'static str> {
    if path.trim().is_empty() {
        return Err("path is empty");
    }

    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err("parent directory components are not allowed"),
            Component::RootDir | Component::Prefix(_) => {
                return Err("absolute paths are not allowed")
            }
        }
    }

    if out.as_os_str().is_empty() {
        return Err("path does not name a file");
    }
    Ok(out)
}

/// Writes generated files under one output root.
#[derive(Debug, Clone)]
pub struct FileWriter {
    root: PathBuf,
    /// Whether to run in dry-run mode.
    dry_run: bool,
}

impl FileWriter {
    /// Create a writer for `root`.
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
        }
    }

    /// The output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Validate every path and reject duplicates, without writing.
    pub fn plan(&self, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, OutputError> {
        let mut seen = BTreeSet::new();
        let mut planned = Vec::with_capacity(files.len());

        for file in files {
            let relative = relative_path(&file.path).map_err(|reason| OutputError::InvalidPath {
                path: file.path.clone(),
                reason,
            })?;
            if !seen.insert(relative.clone()) {
                return Err(OutputError::InvalidPath {
                    path: file.path.clone(),
                    reason: "path is generated more than once",
                });
            }
            planned.push(self.root.join(relative));
        }
        Ok(planned)
    }

    /// Remove the output root and everything under it.
    ///
    /// A missing root is not an error. Dry runs never remove anything.
    pub fn clean(&self) -> Result<(), OutputError> {
        if self.dry_run || !self.root.exists() {
            return Ok(());
        }
        debug!(root = %self.root.display(), "cleaning output root");
        std::fs::remove_dir_all(&self.root).map_err(|e| OutputError::Clean {
            path: self.root.clone(),
            source: e,
        })
    }

    /// Write one file at `relative` under the root.
    ///
    /// In dry-run mode, returns the content without writing.
    pub fn write(&self, relative: &str, content: &str) -> Result<WriteResult, OutputError> {
        let relative_path = relative_path(relative).map_err(|reason| OutputError::InvalidPath {
            path: relative.to_string(),
            reason,
        })?;
        self.write_at(self.root.join(relative_path), content)
    }

    /// Validate all files, then write them in order.
    ///
    /// Nothing is written if any path is invalid.
    pub fn write_all(&self, files: &[GeneratedFile]) -> Result<Vec<WriteResult>, OutputError> {
        let planned = self.plan(files)?;
        planned
            .into_iter()
            .zip(files)
            .map(|(path, file)| self.write_at(path, &file.content))
            .collect()
    }

    fn write_at(&self, path: PathBuf, content: &str) -> Result<WriteResult, OutputError> {
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                content: content.to_string(),
                path,
            });
        }

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| OutputError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        std::fs::write(&path, content).map_err(|e| OutputError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        Ok(WriteResult::Written {
            path,
            bytes: content.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_file() {
        let dir = TempDir::new().unwrap();
        let content = "export type Id = string;\n";

        let writer = FileWriter::new(dir.path(), false);
        let result = writer.write("types.ts", content).unwrap();

        assert!(result.was_written());
        assert_eq!(result.bytes(), content.len());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("types.ts")).unwrap(),
            content
        );
    }

    #[test]
    fn test_write_creates_directories_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path().join("gen"), false);

        writer.write("nested/dir/out.go", "old").unwrap();
        writer.write("nested/dir/out.go", "new").unwrap();

        let path = dir.path().join("gen/nested/dir/out.go");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path(), true);
        let result = writer.write("output.ts", "content").unwrap();

        assert!(!dir.path().join("output.ts").exists());
        assert_eq!(
            result,
            WriteResult::DryRun {
                content: "content".to_string(),
                path: dir.path().join("output.ts"),
            }
        );
        assert_eq!(result.bytes(), 0);
    }

    #[test]
    fn test_relative_path_rules() {
        assert_eq!(relative_path("./a/b.ts").unwrap(), PathBuf::from("a/b.ts"));
        assert!(relative_path("/etc/passwd").is_err());
        assert!(relative_path("../escape.ts").is_err());
        assert!(relative_path("a/../../b").is_err());
        assert!(relative_path("").is_err());
        assert!(relative_path(".").is_err());
    }

    #[test]
    fn test_write_all_validates_before_writing() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path(), false);
        let files = vec![
            GeneratedFile::new("ok.ts", "ok"),
            GeneratedFile::new("../bad.ts", "bad"),
        ];

        let err = writer.write_all(&files).unwrap_err();
        assert!(matches!(err, OutputError::InvalidPath { ref path, .. } if path == "../bad.ts"));
        assert!(!dir.path().join("ok.ts").exists());
    }

    #[test]
    fn test_duplicate_paths_rejected() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::new(dir.path(), false);
        let files = vec![
            GeneratedFile::new("a.ts", "1"),
            GeneratedFile::new("./a.ts", "2"),
        ];
        assert!(writer.plan(&files).is_err());
    }

    #[test]
    fn test_clean_removes_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("out");
        let writer = FileWriter::new(&root, false);
        writer.write("stale.ts", "stale").unwrap();

        writer.clean().unwrap();
        assert!(!root.exists());

        // Missing root is fine.
        writer.clean().unwrap();
    }
}
