//! Field and type reference definitions.
//!
//! [`TypeRef`] is the unified description of every type position in the
//! IR. Only the members relevant to its [`TypeKind`] are populated; the
//! others are absent from the JSON encoding rather than `null`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::Deprecation;

/// Category of a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Primitive,
    /// Reference to a declared type.
    Type,
    /// Reference to a declared enum.
    Enum,
    Array,
    Map,
    /// Anonymous inline object with a synthesized name.
    Object,
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Int,
    Float,
    Bool,
    /// RFC 3339 timestamp on the wire.
    Datetime,
}

impl Primitive {
    /// All primitives, in declaration order.
    pub const ALL: [Primitive; 5] = [
        Primitive::String,
        Primitive::Int,
        Primitive::Float,
        Primitive::Bool,
        Primitive::Datetime,
    ];

    /// Look up a primitive by its source name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Primitive::String),
            "int" => Some(Primitive::Int),
            "float" => Some(Primitive::Float),
            "bool" => Some(Primitive::Bool),
            "datetime" => Some(Primitive::Datetime),
            _ => None,
        }
    }

    /// Source name of the primitive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Datetime => "datetime",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value kind of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumType {
    #[default]
    String,
    Int,
}

impl EnumType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumType::String => "string",
            EnumType::Int => "int",
        }
    }
}

/// A fully resolved type reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub kind: TypeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive_name: Option<Primitive>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<EnumType>,

    /// Innermost non-array element type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_type: Option<Box<TypeRef>>,

    /// Array nesting depth, at least 1 for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_dims: Option<u32>,

    /// Map value type; keys are always strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_type: Option<Box<TypeRef>>,

    /// Synthesized name of an inline object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_fields: Option<Vec<FieldDef>>,
}

impl TypeRef {
    fn empty(kind: TypeKind) -> Self {
        Self {
            kind,
            primitive_name: None,
            type_name: None,
            enum_name: None,
            enum_type: None,
            array_type: None,
            array_dims: None,
            map_type: None,
            object_name: None,
            object_fields: None,
        }
    }

    /// Reference to a primitive.
    pub fn primitive(primitive: Primitive) -> Self {
        Self {
            primitive_name: Some(primitive),
            ..Self::empty(TypeKind::Primitive)
        }
    }

    /// Reference to a declared type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            type_name: Some(name.into()),
            ..Self::empty(TypeKind::Type)
        }
    }

    /// Reference to a declared enum.
    pub fn enumeration(name: impl Into<String>, enum_type: EnumType) -> Self {
        Self {
            enum_name: Some(name.into()),
            enum_type: Some(enum_type),
            ..Self::empty(TypeKind::Enum)
        }
    }

    /// Array of `element`, flattening nested arrays into `array_dims`.
    pub fn array(element: TypeRef) -> Self {
        let (inner, dims) = match element.kind {
            TypeKind::Array => {
                let dims = element.array_dims.unwrap_or(1) + 1;
                match element.array_type {
                    Some(inner) => (*inner, dims),
                    None => (Self::empty(TypeKind::Array), dims),
                }
            }
            _ => (element, 1),
        };
        Self {
            array_type: Some(Box::new(inner)),
            array_dims: Some(dims),
            ..Self::empty(TypeKind::Array)
        }
    }

    /// Map with string keys and `value` values.
    pub fn map(value: TypeRef) -> Self {
        Self {
            map_type: Some(Box::new(value)),
            ..Self::empty(TypeKind::Map)
        }
    }

    /// Inline object with a synthesized name.
    pub fn object(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            object_name: Some(name.into()),
            object_fields: Some(fields),
            ..Self::empty(TypeKind::Object)
        }
    }

    /// Element type of an array with one dimension peeled off.
    ///
    /// Returns `None` for non-array references.
    pub fn array_element(&self) -> Option<TypeRef> {
        if self.kind != TypeKind::Array {
            return None;
        }
        let inner = self.array_type.as_deref()?.clone();
        match self.array_dims.unwrap_or(1) {
            0 | 1 => Some(inner),
            dims => Some(Self {
                array_type: Some(Box::new(inner)),
                array_dims: Some(dims - 1),
                ..Self::empty(TypeKind::Array)
            }),
        }
    }

    /// Names of declared types referenced directly by this reference,
    /// looking through arrays, maps, and inline objects.
    pub fn referenced_types(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_types(&mut out);
        out
    }

    fn collect_types<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self.kind {
            TypeKind::Type => {
                if let Some(name) = &self.type_name {
                    out.push(name);
                }
            }
            TypeKind::Array => {
                if let Some(inner) = &self.array_type {
                    inner.collect_types(out);
                }
            }
            TypeKind::Map => {
                if let Some(inner) = &self.map_type {
                    inner.collect_types(out);
                }
            }
            TypeKind::Object => {
                for field in self.object_fields.iter().flatten() {
                    field.type_ref.collect_types(out);
                }
            }
            TypeKind::Primitive | TypeKind::Enum => {}
        }
    }
}

/// A field with its type fully resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,

    pub type_ref: TypeRef,

    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
}

impl FieldDef {
    /// Create a required field.
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            optional: false,
            doc: None,
            deprecated: None,
        }
    }

    /// Mark the field optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
