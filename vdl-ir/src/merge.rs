//! Multi-file merging.
//!
//! Walks the include graph from an entry file, loading each file once, and
//! checks that top-level names are unique across everything loaded.

use std::collections::HashMap;

use tracing::debug;

use crate::ast::{Decl, SourceFile};
use crate::error::{CompileError, CompileResult, Location};

/// Source of parsed schema files.
pub trait SourceLoader {
    /// Load the file at `path`.
    fn load(&mut self, path: &str) -> CompileResult<SourceFile>;

    /// Resolve `include` relative to the file `from`.
    fn resolve(&self, from: &str, include: &str) -> String {
        join_relative(from, include)
    }
}

/// In-memory loader keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<String, SourceFile>,
}

impl MemoryLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file under its own `path`.
    pub fn with_file(mut self, file: SourceFile) -> Self {
        self.insert(file);
        self
    }

    /// Add a file under its own `path`.
    pub fn insert(&mut self, file: SourceFile) {
        self.files.insert(file.path.clone(), file);
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&mut self, path: &str) -> CompileResult<SourceFile> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CompileError::file_not_found(path, None))
    }
}

/// Join `include` onto the directory of `from`, normalizing `.` and `..`.
///
/// Absolute includes are returned unchanged.
pub fn join_relative(from: &str, include: &str) -> String {
    if include.starts_with('/') {
        return include.to_string();
    }

    let mut parts: Vec<&str> = match from.rfind('/') {
        Some(idx) => from[..idx].split('/').collect(),
        None => Vec::new(),
    };
    let absolute = from.starts_with('/');

    for segment in include.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if !last.is_empty() && *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// All files reachable from an entry file, in load order.
#[derive(Debug, Clone, Default)]
pub struct MergedSources {
    /// Files in depth-first pre-order: each file before its includes.
    pub files: Vec<SourceFile>,
}

impl MergedSources {
    /// Every declaration paired with the path of its file, in load order.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &Decl)> {
        self.files
            .iter()
            .flat_map(|f| f.declarations.iter().map(move |d| (f.path.as_str(), d)))
    }

    /// Paths of the loaded files.
    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Verbatim schema text of every file, in load order.
    ///
    /// Files are separated by one blank line.
    pub fn schema_text(&self) -> String {
        let mut out = String::new();
        for source in self.files.iter().filter_map(|f| f.source.as_deref()) {
            if !out.is_empty() {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push('\n');
            }
            out.push_str(source);
        }
        out
    }

    /// Check that every top-level name is declared once across all files.
    ///
    /// Types, enums, constants, patterns, and RPCs share a single namespace.
    /// Names are compared as they appear in the IR, so `userKey` and
    /// `UserKey` patterns collide.
    pub fn check_names(&self) -> Vec<CompileError> {
        let mut errors = Vec::new();
        let mut seen: HashMap<String, (&'static str, Location)> = HashMap::new();

        for (file, decl) in self.declarations() {
            let Some(name) = decl.canonical_name() else {
                continue;
            };
            let location = Location::new(file, decl.span());

            match seen.get(&name) {
                Some((kind, first)) if *kind == decl.kind() => {
                    errors.push(CompileError::DuplicateDeclaration {
                        kind: *kind,
                        name: name.clone(),
                        first: first.clone(),
                        second: location,
                    });
                }
                Some((other_kind, first)) => {
                    errors.push(CompileError::NameCollision {
                        name: name.clone(),
                        kind: decl.kind(),
                        other_kind: *other_kind,
                        first: first.clone(),
                        second: location,
                    });
                }
                None => {
                    seen.insert(name, (decl.kind(), location));
                }
            }
        }

        errors
    }
}

/// Load `entry` and every file it transitively includes.
///
/// A file reached more than once is loaded once. An include chain that
/// loops back on itself is a [`CompileError::CircularInclude`].
pub fn load_all(loader: &mut dyn SourceLoader, entry: &str) -> CompileResult<MergedSources> {
    let mut merged = MergedSources::default();
    let mut stack: Vec<String> = Vec::new();
    visit(loader, entry, None, &mut stack, &mut merged)?;
    debug!(files = merged.files.len(), entry = %entry, "loaded schema sources");
    Ok(merged)
}

fn visit(
    loader: &mut dyn SourceLoader,
    path: &str,
    included_from: Option<&str>,
    stack: &mut Vec<String>,
    merged: &mut MergedSources,
) -> CompileResult<()> {
    if let Some(pos) = stack.iter().position(|p| p == path) {
        let mut chain = stack[pos..].to_vec();
        chain.push(path.to_string());
        return Err(CompileError::CircularInclude { chain });
    }
    if merged.files.iter().any(|f| f.path == path) {
        return Ok(());
    }

    let mut file = loader.load(path).map_err(|err| match err {
        CompileError::FileNotFound { path, .. } => {
            CompileError::file_not_found(path, included_from.map(str::to_string))
        }
        other => other,
    })?;
    file.path = path.to_string();

    let includes: Vec<String> = file
        .includes
        .iter()
        .map(|include| loader.resolve(path, include))
        .collect();
    merged.files.push(file);

    stack.push(path.to_string());
    for include in &includes {
        visit(loader, include, Some(path), stack, merged)?;
    }
    stack.pop();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EnumDecl, Span, TypeDecl};

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("main.vdl", "common.vdl"), "common.vdl");
        assert_eq!(
            join_relative("schema/main.vdl", "shared/common.vdl"),
            "schema/shared/common.vdl"
        );
        assert_eq!(
            join_relative("schema/api/main.vdl", "../common.vdl"),
            "schema/common.vdl"
        );
        assert_eq!(join_relative("main.vdl", "../up.vdl"), "../up.vdl");
        assert_eq!(join_relative("/abs/main.vdl", "./x.vdl"), "/abs/x.vdl");
        assert_eq!(join_relative("a/main.vdl", "/etc/x.vdl"), "/etc/x.vdl");
    }

    #[test]
    fn test_load_order_and_diamond() {
        let mut loader = MemoryLoader::new()
            .with_file(
                SourceFile::new("main.vdl")
                    .with_include("a.vdl")
                    .with_include("b.vdl"),
            )
            .with_file(SourceFile::new("a.vdl").with_include("common.vdl"))
            .with_file(SourceFile::new("b.vdl").with_include("common.vdl"))
            .with_file(SourceFile::new("common.vdl"));

        let merged = load_all(&mut loader, "main.vdl").unwrap();
        assert_eq!(
            merged.paths(),
            vec!["main.vdl", "a.vdl", "common.vdl", "b.vdl"]
        );
    }

    #[test]
    fn test_circular_include() {
        let mut loader = MemoryLoader::new()
            .with_file(SourceFile::new("main.vdl").with_include("a.vdl"))
            .with_file(SourceFile::new("a.vdl").with_include("main.vdl"));

        let err = load_all(&mut loader, "main.vdl").unwrap_err();
        assert_eq!(
            err,
            CompileError::CircularInclude {
                chain: vec!["main.vdl".into(), "a.vdl".into(), "main.vdl".into()]
            }
        );
    }

    #[test]
    fn test_missing_include_names_includer() {
        let mut loader =
            MemoryLoader::new().with_file(SourceFile::new("main.vdl").with_include("gone.vdl"));

        let err = load_all(&mut loader, "main.vdl").unwrap_err();
        assert_eq!(
            err,
            CompileError::file_not_found("gone.vdl", Some("main.vdl".into()))
        );
    }

    #[test]
    fn test_schema_text_concatenation() {
        let merged = MergedSources {
            files: vec![
                SourceFile::new("main.vdl").with_source("type A {}"),
                SourceFile::new("b.vdl").with_source("type B {}\n"),
                SourceFile::new("c.vdl").with_source("type C {}"),
            ],
        };
        assert_eq!(merged.schema_text(), "type A {}\n\ntype B {}\n\ntype C {}");
    }

    #[test]
    fn test_duplicate_names_across_files() {
        let merged = MergedSources {
            files: vec![
                SourceFile::new("main.vdl").with_decl(TypeDecl::new("User").at(1, 1)),
                SourceFile::new("other.vdl")
                    .with_decl(TypeDecl::new("User").at(5, 1))
                    .with_decl(EnumDecl {
                        span: Span::new(9, 1),
                        ..EnumDecl::new("User")
                    }),
            ],
        };

        let errors = merged.check_names();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code(), "E801");
        assert!(errors[0].to_string().contains("main.vdl:1:1"));
        assert!(errors[0].to_string().contains("other.vdl:5:1"));
        assert_eq!(errors[1].code(), "E804");
    }
}
