//! VDL to Go type mappings.

use vdl_ir::naming;
use vdl_ir::{FieldDef, Primitive, TypeKind, TypeRef};

/// Go keywords and predeclared identifiers that would shadow or fail.
const RESERVED: &[&str] = &[
    "any", "bool", "break", "byte", "case", "chan", "const", "continue", "default", "defer",
    "else", "error", "fallthrough", "false", "float64", "for", "func", "go", "goto", "if",
    "import", "int", "int64", "interface", "iota", "map", "nil", "package", "range", "return",
    "select", "string", "struct", "switch", "true", "type", "var",
];

/// Exported field name for a wire name.
pub fn field_name(wire: &str) -> String {
    naming::to_pascal(wire)
}

/// Unexported identifier, suffixed with `_` when it collides with Go.
pub fn local_name(wire: &str) -> String {
    let ident = naming::to_camel(wire);
    if RESERVED.contains(&ident.as_str()) {
        format!("{ident}_")
    } else {
        ident
    }
}

/// Go type of a reference.
pub fn go_type(ty: &TypeRef) -> String {
    match ty.kind {
        TypeKind::Primitive => match ty.primitive_name {
            Some(Primitive::String) => "string".to_string(),
            Some(Primitive::Int) => "int64".to_string(),
            Some(Primitive::Float) => "float64".to_string(),
            Some(Primitive::Bool) => "bool".to_string(),
            Some(Primitive::Datetime) => "time.Time".to_string(),
            None => "any".to_string(),
        },
        TypeKind::Type => ty.type_name.clone().unwrap_or_else(|| "any".to_string()),
        TypeKind::Enum => ty.enum_name.clone().unwrap_or_else(|| "any".to_string()),
        TypeKind::Object => ty.object_name.clone().unwrap_or_else(|| "any".to_string()),
        TypeKind::Array => {
            let inner = ty.array_type.as_deref().map_or_else(|| "any".to_string(), go_type);
            format!("{}{inner}", "[]".repeat(ty.array_dims.unwrap_or(1) as usize))
        }
        TypeKind::Map => {
            let inner = ty.map_type.as_deref().map_or_else(|| "any".to_string(), go_type);
            format!("map[string]{inner}")
        }
    }
}

/// Go type of a struct field: optional fields are pointers.
pub fn field_type(field: &FieldDef) -> String {
    let ty = go_type(&field.type_ref);
    if field.optional {
        format!("*{ty}")
    } else {
        ty
    }
}

/// Struct tag of a field.
pub fn json_tag(field: &FieldDef) -> String {
    if field.optional {
        format!("`json:\"{},omitempty\"`", field.name)
    } else {
        format!("`json:\"{}\"`", field.name)
    }
}

/// Whether the reference needs the `time` package.
pub fn uses_time(ty: &TypeRef) -> bool {
    match ty.kind {
        TypeKind::Primitive => ty.primitive_name == Some(Primitive::Datetime),
        TypeKind::Array => ty.array_type.as_deref().is_some_and(uses_time),
        TypeKind::Map => ty.map_type.as_deref().is_some_and(uses_time),
        TypeKind::Type | TypeKind::Enum | TypeKind::Object => false,
    }
}

/// A Go interpreted string literal.
pub fn string_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

/// Whether `name` is usable as a Go package clause.
pub fn is_package_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED.contains(&name)
}
