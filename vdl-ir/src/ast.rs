//! Parsed-source model.
//!
//! These types are the hand-off point between a VDL front end and the IR
//! builder. A front end produces one [`SourceFile`] per schema file; the
//! builder never sees schema text except as the opaque `source` string it
//! forwards to plugins.
//!
//! All types deserialize from JSON, so a parsed schema can be stored on disk
//! as a `*.vdl.json` document:
//!
//! ```json
//! {
//!   "path": "main.vdl",
//!   "includes": ["common.vdl"],
//!   "declarations": [
//!     {
//!       "kind": "type",
//!       "name": "User",
//!       "span": { "line": 3, "column": 1 },
//!       "spreads": ["BaseEntity"],
//!       "fields": [
//!         { "name": "email", "type": { "named": "string" }, "optional": true }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::ir::Deprecation;

/// A 1-based line/column position inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// One parsed schema file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path of the file. Filled in by the loader when absent.
    #[serde(default)]
    pub path: String,

    /// Verbatim schema text of this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Paths of included files, relative to this file.
    #[serde(default)]
    pub includes: Vec<String>,

    /// Top-level declarations in source order.
    #[serde(default)]
    pub declarations: Vec<Decl>,
}

impl SourceFile {
    /// Create an empty source file at the given path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the verbatim schema text.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add an include.
    pub fn with_include(mut self, path: impl Into<String>) -> Self {
        self.includes.push(path.into());
        self
    }

    /// Add a declaration.
    pub fn with_decl(mut self, decl: impl Into<Decl>) -> Self {
        self.declarations.push(decl.into());
        self
    }
}

// =============================================================================
// Declarations
// =============================================================================

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Decl {
    Type(TypeDecl),
    Enum(EnumDecl),
    Const(ConstDecl),
    Pattern(PatternDecl),
    Rpc(RpcDecl),
    Doc(DocDecl),
}

impl Decl {
    /// Declaration kind as used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Decl::Type(_) => "type",
            Decl::Enum(_) => "enum",
            Decl::Const(_) => "constant",
            Decl::Pattern(_) => "pattern",
            Decl::Rpc(_) => "rpc",
            Decl::Doc(_) => "doc",
        }
    }

    /// Declared name, if the declaration is named.
    pub fn name(&self) -> Option<&str> {
        match self {
            Decl::Type(d) => Some(&d.name),
            Decl::Enum(d) => Some(&d.name),
            Decl::Const(d) => Some(&d.name),
            Decl::Pattern(d) => Some(&d.name),
            Decl::Rpc(d) => Some(&d.name),
            Decl::Doc(_) => None,
        }
    }

    /// Name as it appears in the IR.
    ///
    /// Pattern names are normalized to PascalCase; every other kind keeps
    /// its declared spelling.
    pub fn canonical_name(&self) -> Option<String> {
        match self {
            Decl::Pattern(d) => Some(crate::naming::to_pascal(&d.name)),
            other => other.name().map(str::to_string),
        }
    }

    /// Position of the declaration.
    pub fn span(&self) -> Span {
        match self {
            Decl::Type(d) => d.span,
            Decl::Enum(d) => d.span,
            Decl::Const(d) => d.span,
            Decl::Pattern(d) => d.span,
            Decl::Rpc(d) => d.span,
            Decl::Doc(d) => d.span,
        }
    }
}

/// A `type` declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    /// Names of types whose fields are inlined, in declaration order.
    #[serde(default)]
    pub spreads: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

impl TypeDecl {
    /// Create a type declaration with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a spread.
    pub fn with_spread(mut self, name: impl Into<String>) -> Self {
        self.spreads.push(name.into());
        self
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the position.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.span = Span::new(line, column);
        self
    }
}

impl From<TypeDecl> for Decl {
    fn from(decl: TypeDecl) -> Self {
        Decl::Type(decl)
    }
}

/// A field inside a type, block, or inline object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
}

impl FieldDecl {
    /// Create a required field.
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            span: Span::default(),
            doc: None,
            deprecated: None,
        }
    }

    /// Mark the field optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attach a doc comment.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Set the position.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.span = Span::new(line, column);
        self
    }
}

/// A raw, unresolved type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeExpr {
    /// A primitive, type, or enum name.
    Named(String),
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `map<T>`; keys are always strings.
    Map(Box<TypeExpr>),
    /// An anonymous inline object.
    Object(FieldBlock),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    pub fn array(element: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(element))
    }

    pub fn map(value: TypeExpr) -> Self {
        TypeExpr::Map(Box::new(value))
    }

    pub fn object(fields: Vec<FieldDecl>) -> Self {
        TypeExpr::Object(FieldBlock {
            fields,
            spreads: Vec::new(),
        })
    }
}

/// A list of fields plus spreads: an inline object or an RPC input/output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldBlock {
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub spreads: Vec<String>,
}

/// An `enum` declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    #[serde(default)]
    pub members: Vec<EnumMemberDecl>,
}

impl EnumDecl {
    /// Create an enum declaration with no members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a member without an explicit value.
    pub fn with_member(mut self, name: impl Into<String>) -> Self {
        self.members.push(EnumMemberDecl {
            name: name.into(),
            value: None,
            span: Span::default(),
        });
        self
    }

    /// Add a member with an explicit value.
    pub fn with_valued_member(mut self, name: impl Into<String>, value: EnumLiteral) -> Self {
        self.members.push(EnumMemberDecl {
            name: name.into(),
            value: Some(value),
            span: Span::default(),
        });
        self
    }
}

impl From<EnumDecl> for Decl {
    fn from(decl: EnumDecl) -> Self {
        Decl::Enum(decl)
    }
}

/// One enum member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMemberDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<EnumLiteral>,
    #[serde(default)]
    pub span: Span,
}

/// An explicit enum member value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumLiteral {
    Int(i64),
    Str(String),
}

/// A `const` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub name: String,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    /// Declared type name; inferred from the literal when absent.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    pub value: ConstLiteral,
}

impl ConstDecl {
    /// Create a constant declaration with an inferred type.
    pub fn new(name: impl Into<String>, value: ConstLiteral) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
            doc: None,
            deprecated: None,
            declared_type: None,
            value,
        }
    }

    /// Set the declared type.
    pub fn typed(mut self, ty: impl Into<String>) -> Self {
        self.declared_type = Some(ty.into());
        self
    }
}

impl From<ConstDecl> for Decl {
    fn from(decl: ConstDecl) -> Self {
        Decl::Const(decl)
    }
}

/// A constant literal as written in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstLiteral {
    Bool(bool),
    Number(serde_json::Number),
    Str(String),
}

/// A `pattern` declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternDecl {
    pub name: String,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    pub template: String,
}

impl PatternDecl {
    /// Create a pattern declaration.
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            ..Default::default()
        }
    }
}

impl From<PatternDecl> for Decl {
    fn from(decl: PatternDecl) -> Self {
        Decl::Pattern(decl)
    }
}

/// An `rpc` service declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RpcDecl {
    pub name: String,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    #[serde(default)]
    pub procs: Vec<OperationDecl>,
    #[serde(default)]
    pub streams: Vec<OperationDecl>,
    /// Standalone documentation blocks inside the service.
    #[serde(default)]
    pub docs: Vec<String>,
}

impl RpcDecl {
    /// Create an empty service.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a procedure.
    pub fn with_proc(mut self, op: OperationDecl) -> Self {
        self.procs.push(op);
        self
    }

    /// Add a stream.
    pub fn with_stream(mut self, op: OperationDecl) -> Self {
        self.streams.push(op);
        self
    }
}

impl From<RpcDecl> for Decl {
    fn from(decl: RpcDecl) -> Self {
        Decl::Rpc(decl)
    }
}

/// A procedure or stream inside an RPC.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationDecl {
    pub name: String,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    #[serde(default)]
    pub input: FieldBlock,
    #[serde(default)]
    pub output: FieldBlock,
}

impl OperationDecl {
    /// Create an operation with empty input and output.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an input field.
    pub fn with_input(mut self, field: FieldDecl) -> Self {
        self.input.fields.push(field);
        self
    }

    /// Add an output field.
    pub fn with_output(mut self, field: FieldDecl) -> Self {
        self.output.fields.push(field);
        self
    }
}

/// A standalone documentation block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocDecl {
    pub content: String,
    #[serde(default)]
    pub span: Span,
}

impl From<DocDecl> for Decl {
    fn from(decl: DocDecl) -> Self {
        Decl::Doc(decl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_source_file() {
        let json = r#"{
            "path": "main.vdl",
            "includes": ["common.vdl"],
            "declarations": [
                {
                    "kind": "type",
                    "name": "User",
                    "span": { "line": 3, "column": 1 },
                    "spreads": ["BaseEntity"],
                    "fields": [
                        { "name": "email", "type": { "named": "string" }, "optional": true },
                        { "name": "scores", "type": { "array": { "array": { "named": "int" } } } }
                    ]
                },
                { "kind": "enum", "name": "Role", "members": [
                    { "name": "Admin" },
                    { "name": "Guest", "value": "guest" }
                ] },
                { "kind": "const", "name": "MaxUsers", "value": 3 },
                { "kind": "pattern", "name": "UserPath", "template": "/users/{id}" },
                { "kind": "doc", "content": "Hello" }
            ]
        }"#;

        let file: SourceFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.path, "main.vdl");
        assert_eq!(file.includes, vec!["common.vdl"]);
        assert_eq!(file.declarations.len(), 5);

        let Decl::Type(user) = &file.declarations[0] else {
            panic!("expected type");
        };
        assert_eq!(user.span, Span::new(3, 1));
        assert!(user.fields[0].optional);
        assert_eq!(
            user.fields[1].ty,
            TypeExpr::array(TypeExpr::array(TypeExpr::named("int")))
        );

        let Decl::Enum(role) = &file.declarations[1] else {
            panic!("expected enum");
        };
        assert_eq!(role.members[0].value, None);
        assert_eq!(
            role.members[1].value,
            Some(EnumLiteral::Str("guest".to_string()))
        );

        let Decl::Const(max) = &file.declarations[2] else {
            panic!("expected const");
        };
        assert!(matches!(max.value, ConstLiteral::Number(_)));
    }

    #[test]
    fn test_enum_literal_untagged() {
        let int: EnumLiteral = serde_json::from_str("3").unwrap();
        assert_eq!(int, EnumLiteral::Int(3));
        let s: EnumLiteral = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(s, EnumLiteral::Str("a".to_string()));
    }

    #[test]
    fn test_decl_accessors() {
        let decl: Decl = TypeDecl::new("User").at(2, 1).into();
        assert_eq!(decl.kind(), "type");
        assert_eq!(decl.name(), Some("User"));
        assert_eq!(decl.span(), Span::new(2, 1));
    }
}
