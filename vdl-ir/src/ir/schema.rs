//! Schema-level IR definitions.
//!
//! [`IrSchema`] is the root handed to every generator and plugin. It is
//! built once per compile and never mutated afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::types::{EnumType, FieldDef, TypeKind, TypeRef};
use crate::error::PatternError;
use crate::pattern;

// =============================================================================
// Shared
// =============================================================================

/// Deprecation marker. Presence means the element is deprecated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deprecation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Deprecation {
    /// Deprecation with an explanatory message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// Schema root
// =============================================================================

/// The fully resolved intermediate representation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IrSchema {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub types: Vec<TypeDef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub enums: Vec<EnumDef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub constants: Vec<ConstantDef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub patterns: Vec<PatternDef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rpcs: Vec<RpcDef>,
    /// Every procedure of every RPC, in declaration order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub procedures: Vec<ProcedureDef>,
    /// Every stream of every RPC, in declaration order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub streams: Vec<StreamDef>,
    /// Standalone documentation blocks.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub docs: Vec<String>,
}

impl IrSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode as compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Encode as JSON indented with two spaces.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Decode from JSON. Missing or `null` collections read as empty.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Look up a type by name.
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Look up an enum by name.
    pub fn get_enum(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Look up an RPC by name.
    pub fn get_rpc(&self, name: &str) -> Option<&RpcDef> {
        self.rpcs.iter().find(|r| r.name == name)
    }

    /// Look up a pattern by name.
    pub fn get_pattern(&self, name: &str) -> Option<&PatternDef> {
        self.patterns.iter().find(|p| p.name == name)
    }

    /// True when the schema declares nothing at all.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.enums.is_empty()
            && self.constants.is_empty()
            && self.patterns.is_empty()
            && self.rpcs.is_empty()
            && self.docs.is_empty()
    }

    /// Every inline object in the schema, outermost first.
    ///
    /// Objects are visited through types in declaration order, then
    /// procedure and stream inputs and outputs.
    pub fn inline_objects(&self) -> Vec<InlineObject<'_>> {
        let mut out = Vec::new();
        for ty in &self.types {
            collect_objects(&ty.fields, &mut out);
        }
        for op in &self.procedures {
            collect_objects(&op.input, &mut out);
            collect_objects(&op.output, &mut out);
        }
        for op in &self.streams {
            collect_objects(&op.input, &mut out);
            collect_objects(&op.output, &mut out);
        }
        out
    }

    /// Fields of a named record: a declared type or an inline object.
    pub fn record_fields(&self, name: &str) -> Option<&[FieldDef]> {
        if let Some(ty) = self.get_type(name) {
            return Some(&ty.fields);
        }
        self.inline_objects()
            .into_iter()
            .find(|obj| obj.name == name)
            .map(|obj| obj.fields)
    }
}

/// A synthesized inline object found in the schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InlineObject<'a> {
    pub name: &'a str,
    pub fields: &'a [FieldDef],
}

fn collect_objects<'a>(fields: &'a [FieldDef], out: &mut Vec<InlineObject<'a>>) {
    for field in fields {
        collect_ref_objects(&field.type_ref, out);
    }
}

fn collect_ref_objects<'a>(ty: &'a TypeRef, out: &mut Vec<InlineObject<'a>>) {
    match ty.kind {
        TypeKind::Object => {
            if let (Some(name), Some(fields)) = (&ty.object_name, &ty.object_fields) {
                // Spread-copied fields repeat the inline objects of their source.
                if out.iter().any(|obj| obj.name == name.as_str()) {
                    return;
                }
                out.push(InlineObject { name, fields });
                collect_objects(fields, out);
            }
        }
        TypeKind::Array => {
            if let Some(inner) = &ty.array_type {
                collect_ref_objects(inner, out);
            }
        }
        TypeKind::Map => {
            if let Some(inner) = &ty.map_type {
                collect_ref_objects(inner, out);
            }
        }
        _ => {}
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Types
// =============================================================================

/// A type with all spreads expanded into `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    /// Names of the types that were inlined, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spreads: Vec<String>,
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    /// Create a type with the given fields.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            deprecated: None,
            spreads: Vec::new(),
            fields,
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// An enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    pub enum_type: EnumType,
    pub members: Vec<EnumMember>,
}

impl EnumDef {
    /// Find the member carrying `value`. Unknown values yield `None`.
    pub fn member_by_value(&self, value: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }

    /// Value of the member named `name`.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value.as_str())
    }
}

/// One enum member with its textual literal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: String,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Constants
// =============================================================================

/// Declared type of a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstType {
    String,
    Int,
    Float,
    Bool,
}

impl ConstType {
    /// Look up a constant type by its source name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(ConstType::String),
            "int" => Some(ConstType::Int),
            "float" => Some(ConstType::Float),
            "bool" => Some(ConstType::Bool),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstType::String => "string",
            ConstType::Int => "int",
            ConstType::Float => "float",
            ConstType::Bool => "bool",
        }
    }
}

/// A constant. The value is always its textual literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    pub const_type: ConstType,
    pub value: String,
}

// =============================================================================
// Patterns
// =============================================================================

/// A compiled string template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    pub template: String,
    /// Placeholder names, de-duplicated, in first-occurrence order.
    pub placeholders: Vec<String>,
}

impl PatternDef {
    /// Substitute every placeholder occurrence with its value.
    pub fn interpolate(&self, values: &HashMap<&str, &str>) -> Result<String, PatternError> {
        pattern::interpolate(&self.template, |name| {
            values
                .get(name)
                .map(|v| v.to_string())
                .ok_or_else(|| PatternError::MissingValue {
                    pattern: self.name.clone(),
                    placeholder: name.to_string(),
                })
        })
    }
}

// =============================================================================
// RPC services
// =============================================================================

/// An RPC service with its nested operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    pub procs: Vec<ProcedureDef>,
    pub streams: Vec<StreamDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

/// A request/response operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureDef {
    pub name: String,
    /// Name of the owning RPC.
    pub rpc_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    pub input: Vec<FieldDef>,
    pub output: Vec<FieldDef>,
}

/// A streaming operation. `output` describes each emitted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDef {
    pub name: String,
    /// Name of the owning RPC.
    pub rpc_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
    pub input: Vec<FieldDef>,
    pub output: Vec<FieldDef>,
}

/// Route path of an operation: `/RpcName/OperationName`.
pub fn route_path(rpc_name: &str, operation: &str) -> String {
    format!("/{rpc_name}/{operation}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Primitive;

    #[test]
    fn test_all_collections_always_present() {
        let text = IrSchema::new().to_json().unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        for key in [
            "types",
            "enums",
            "constants",
            "patterns",
            "rpcs",
            "procedures",
            "streams",
            "docs",
        ] {
            assert_eq!(json[key], serde_json::json!([]), "key {key}");
        }
    }

    #[test]
    fn test_null_and_missing_read_as_empty() {
        let schema = IrSchema::from_json(r#"{"types": null, "enums": []}"#).unwrap();
        assert_eq!(schema, IrSchema::new());
    }

    #[test]
    fn test_enum_lookup_both_directions() {
        let role = EnumDef {
            name: "Role".into(),
            doc: None,
            deprecated: None,
            enum_type: EnumType::String,
            members: vec![EnumMember::new("Admin", "admin"), EnumMember::new("Guest", "Guest")],
        };
        assert_eq!(role.member_by_value("admin").map(|m| m.name.as_str()), Some("Admin"));
        assert_eq!(role.value_of("Guest"), Some("Guest"));
        assert!(role.member_by_value("root").is_none());
    }

    #[test]
    fn test_inline_objects_nested() {
        let leaf = TypeRef::object(
            "UserPrefsTheme",
            vec![FieldDef::new("dark", TypeRef::primitive(Primitive::Bool))],
        );
        let prefs = TypeRef::object("UserPrefs", vec![FieldDef::new("theme", leaf)]);
        let mut schema = IrSchema::new();
        schema.types.push(TypeDef::new(
            "User",
            vec![FieldDef::new("prefs", TypeRef::array(prefs))],
        ));

        let names: Vec<_> = schema.inline_objects().iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["UserPrefs", "UserPrefsTheme"]);
        assert_eq!(schema.record_fields("UserPrefsTheme").map(|f| f.len()), Some(1));
        assert!(schema.record_fields("Missing").is_none());
    }

    #[test]
    fn test_route_path() {
        assert_eq!(route_path("UserService", "GetUser"), "/UserService/GetUser");
    }
}
