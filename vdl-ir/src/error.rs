//! Error types for IR construction and value decoding.
//!
//! Every [`CompileError`] is fatal and aborts the compile before any
//! generator runs. Each variant carries a stable diagnostic code (see
//! [`CompileError::code`]) and, where one exists, the source location of
//! the offending declaration.

use std::fmt;

use thiserror::Error;

use crate::ast::Span;

/// Result type alias for IR construction.
pub type CompileResult<T> = Result<T, CompileError>;

/// A position in a named source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Path of the source file, as given to the loader.
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl Location {
    /// Create a location from a file path and a span.
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            line: span.line,
            column: span.column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Fatal error raised while building the IR.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// An included file could not be found.
    #[error("file not found: {path}{}", included_suffix(.included_from))]
    FileNotFound {
        path: String,
        included_from: Option<String>,
    },

    /// Include chain loops back on itself.
    #[error("circular include: {}", .chain.join(" -> "))]
    CircularInclude { chain: Vec<String> },

    /// A parsed source document is malformed.
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A field references a type or enum that is not declared.
    #[error("{location}: field '{field}' references undeclared type '{name}'")]
    UnresolvedType {
        name: String,
        field: String,
        location: Location,
    },

    /// A spread references a type that is not declared.
    #[error("{location}: '{owner}' spreads undeclared type '{name}'")]
    UnknownSpread {
        name: String,
        owner: String,
        location: Location,
    },

    /// Two field sources contribute a field with the same name.
    #[error(
        "{location}: field '{field}' of '{owner}' is provided by both '{first}' and '{second}'"
    )]
    SpreadFieldConflict {
        owner: String,
        field: String,
        first: String,
        second: String,
        location: Location,
    },

    /// Spread relations form a cycle.
    #[error("circular spread dependency: {}", .cycle.join(" -> "))]
    SpreadCycle { cycle: Vec<String> },

    /// Types reference each other only through required fields.
    #[error("circular type dependency: {}", .cycle.join(" -> "))]
    RequiredCycle { cycle: Vec<String> },

    /// An enum mixes string and integer values.
    #[error("{location}: enum '{name}' mixes string and integer values")]
    EnumMixedTypes { name: String, location: Location },

    /// An integer enum member has no explicit value.
    #[error("{location}: member '{member}' of integer enum '{name}' needs an explicit value")]
    EnumMissingValue {
        name: String,
        member: String,
        location: Location,
    },

    /// Two enum members share a value.
    #[error("{location}: enum '{name}' has duplicate value '{value}'")]
    EnumDuplicateValue {
        name: String,
        value: String,
        location: Location,
    },

    /// Two enum members share a name.
    #[error("{location}: enum '{name}' has duplicate member '{member}'")]
    EnumDuplicateMember {
        name: String,
        member: String,
        location: Location,
    },

    /// A constant literal does not match its declared type.
    #[error("{location}: constant '{name}' is declared {declared} but its value is '{literal}'")]
    ConstTypeMismatch {
        name: String,
        declared: String,
        literal: String,
        location: Location,
    },

    /// A pattern template contains a malformed placeholder token.
    #[error("{location}: pattern '{name}' has malformed token '{token}': {reason}")]
    MalformedPattern {
        name: String,
        token: String,
        reason: String,
        location: Location,
    },

    /// A field name appears twice in one declaration.
    #[error("{location}: duplicate field '{field}' in '{owner}'")]
    DuplicateField {
        owner: String,
        field: String,
        location: Location,
    },

    /// Two declarations of the same kind share a name.
    #[error("duplicate {kind} '{name}': declared at {first} and again at {second}")]
    DuplicateDeclaration {
        kind: &'static str,
        name: String,
        first: Location,
        second: Location,
    },

    /// Two declarations of different kinds share a name.
    #[error("{kind} '{name}' at {second} collides with {other_kind} declared at {first}")]
    NameCollision {
        name: String,
        kind: &'static str,
        other_kind: &'static str,
        first: Location,
        second: Location,
    },

    /// A synthesized inline object name collides with another name.
    #[error("{location}: inline object name '{name}' collides with {other}")]
    SynthesizedNameCollision {
        name: String,
        other: String,
        location: Location,
    },

    /// Several errors collected from one compile.
    #[error("{} compile errors:\n{}", .0.len(), format_errors(.0))]
    Multiple(Vec<CompileError>),
}

impl CompileError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::FileNotFound { .. } => "E001",
            CompileError::CircularInclude { .. } => "E002",
            CompileError::Parse { .. } => "E005",
            CompileError::UnresolvedType { .. } => "E201",
            CompileError::UnknownSpread { .. } => "E202",
            CompileError::SpreadFieldConflict { .. } => "E203",
            CompileError::SpreadCycle { .. } => "E204",
            CompileError::EnumMixedTypes { .. } => "E301",
            CompileError::EnumMissingValue { .. } => "E302",
            CompileError::EnumDuplicateValue { .. } => "E303",
            CompileError::EnumDuplicateMember { .. } => "E304",
            CompileError::ConstTypeMismatch { .. } => "E401",
            CompileError::MalformedPattern { .. } => "E501",
            CompileError::RequiredCycle { .. } => "E601",
            CompileError::DuplicateField { .. } => "E701",
            CompileError::DuplicateDeclaration { .. } => "E801",
            CompileError::NameCollision { .. } => "E804",
            CompileError::SynthesizedNameCollision { .. } => "E805",
            CompileError::Multiple(errors) => errors.first().map_or("E000", |e| e.code()),
        }
    }

    /// Fold a list of errors into a single error.
    ///
    /// Returns `None` for an empty list.
    pub fn from_many(mut errors: Vec<CompileError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(CompileError::Multiple(errors)),
        }
    }

    /// Flatten into the individual errors.
    pub fn into_errors(self) -> Vec<CompileError> {
        match self {
            CompileError::Multiple(errors) => errors,
            other => vec![other],
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>, included_from: Option<String>) -> Self {
        Self::FileNotFound {
            path: path.into(),
            included_from,
        }
    }

    /// Create a parse error.
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Error interpolating a pattern template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// No value was supplied for a placeholder.
    #[error("pattern '{pattern}' is missing a value for placeholder '{placeholder}'")]
    MissingValue {
        pattern: String,
        placeholder: String,
    },
}

/// Error decoding a JSON payload against the IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The requested type is not part of the schema.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// A required field is absent.
    #[error("{path}: missing required field '{field}' of '{type_name}'")]
    MissingField {
        path: String,
        type_name: String,
        field: String,
    },

    /// A value has the wrong JSON shape.
    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A datetime string is not valid RFC 3339.
    #[error("{path}: invalid datetime '{value}': {message}")]
    InvalidDatetime {
        path: String,
        value: String,
        message: String,
    },
}

/// Suffix naming the including file, if any.
fn included_suffix(included_from: &Option<String>) -> String {
    match included_from {
        Some(from) => format!(" (included from {from})"),
        None => String::new(),
    }
}

/// Format multiple errors for display.
fn format_errors(errors: &[CompileError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {}. [{}] {}", i + 1, e.code(), e))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32) -> Location {
        Location::new("main.vdl", Span { line, column: 1 })
    }

    #[test]
    fn test_location_display() {
        assert_eq!(loc(3).to_string(), "main.vdl:3:1");
    }

    #[test]
    fn test_codes() {
        let err = CompileError::SpreadCycle {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.code(), "E204");
        assert_eq!(err.to_string(), "circular spread dependency: A -> B -> A");
    }

    #[test]
    fn test_duplicate_names_both_sites() {
        let err = CompileError::DuplicateDeclaration {
            kind: "type",
            name: "User".into(),
            first: loc(1),
            second: Location::new("other.vdl", Span { line: 7, column: 1 }),
        };
        let message = err.to_string();
        assert!(message.contains("main.vdl:1:1"));
        assert!(message.contains("other.vdl:7:1"));
    }

    #[test]
    fn test_from_many() {
        assert!(CompileError::from_many(vec![]).is_none());

        let one = CompileError::from_many(vec![CompileError::parse("a", "bad")]).unwrap();
        assert!(matches!(one, CompileError::Parse { .. }));

        let many = CompileError::from_many(vec![
            CompileError::parse("a", "bad"),
            CompileError::file_not_found("b", None),
        ])
        .unwrap();
        assert_eq!(many.code(), "E005");
        assert_eq!(many.into_errors().len(), 2);
    }

    #[test]
    fn test_file_not_found_message() {
        let err = CompileError::file_not_found("common.vdl", Some("main.vdl".into()));
        assert_eq!(
            err.to_string(),
            "file not found: common.vdl (included from main.vdl)"
        );
    }
}
