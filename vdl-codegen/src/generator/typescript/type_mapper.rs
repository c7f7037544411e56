//! VDL to TypeScript type mappings.
//!
//! # Type Mappings
//!
//! | VDL Type | TypeScript |
//! |----------|------------|
//! | `string` | `string` |
//! | `int`, `float` | `number` |
//! | `bool` | `boolean` |
//! | `datetime` | `Date` (ISO 8601 string on the wire) |
//! | `T[]` | `T[]` |
//! | `map<T>` | `Record<string, T>` |
//! | types, enums, inline objects | their name |

use vdl_ir::naming;
use vdl_ir::{Primitive, TypeKind, TypeRef};

/// Words that cannot be used as TypeScript identifiers.
const RESERVED: &[&str] = &[
    "any", "arguments", "as", "async", "await", "boolean", "break", "case", "catch", "class",
    "const", "constructor", "continue", "debugger", "declare", "default", "delete", "do", "else",
    "enum", "eval", "export", "extends", "false", "finally", "for", "from", "function", "get",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "module", "new", "null",
    "number", "of", "package", "private", "protected", "public", "require", "return", "set",
    "static", "string", "super", "switch", "symbol", "this", "throw", "true", "try", "type",
    "typeof", "undefined", "var", "void", "while", "with", "yield",
];

/// camelCase identifier for a wire name, suffixed with `_` when reserved.
pub fn identifier(wire: &str) -> String {
    let ident = naming::to_camel(wire);
    if RESERVED.contains(&ident.as_str()) {
        format!("{ident}_")
    } else {
        ident
    }
}

/// TypeScript type of a reference.
pub fn ts_type(ty: &TypeRef) -> String {
    match ty.kind {
        TypeKind::Primitive => match ty.primitive_name {
            Some(Primitive::String) => "string".to_string(),
            Some(Primitive::Int) | Some(Primitive::Float) => "number".to_string(),
            Some(Primitive::Bool) => "boolean".to_string(),
            Some(Primitive::Datetime) => "Date".to_string(),
            None => "unknown".to_string(),
        },
        TypeKind::Type => ty.type_name.clone().unwrap_or_else(|| "unknown".to_string()),
        TypeKind::Enum => ty.enum_name.clone().unwrap_or_else(|| "unknown".to_string()),
        TypeKind::Object => ty
            .object_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        TypeKind::Array => {
            let inner = ty.array_type.as_deref().map_or_else(|| "unknown".to_string(), ts_type);
            format!("{inner}{}", "[]".repeat(ty.array_dims.unwrap_or(1) as usize))
        }
        TypeKind::Map => {
            let inner = ty.map_type.as_deref().map_or_else(|| "unknown".to_string(), ts_type);
            format!("Record<string, {inner}>")
        }
    }
}

/// Whether values of `ty` differ between the wire and TypeScript.
fn needs_conversion(ty: &TypeRef) -> bool {
    match ty.kind {
        TypeKind::Primitive => ty.primitive_name == Some(Primitive::Datetime),
        TypeKind::Type | TypeKind::Object => true,
        TypeKind::Enum => false,
        TypeKind::Array => ty.array_type.as_deref().is_some_and(needs_conversion),
        TypeKind::Map => ty.map_type.as_deref().is_some_and(needs_conversion),
    }
}

/// Direction of a value conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Decode,
    Encode,
}

/// Expression converting `expr` of type `ty` in `direction`.
///
/// `depth` keeps lambda parameters unique in nested collections.
pub fn convert(ty: &TypeRef, expr: &str, direction: Direction, depth: usize) -> String {
    if !needs_conversion(ty) {
        return expr.to_string();
    }
    let verb = match direction {
        Direction::Decode => "decode",
        Direction::Encode => "encode",
    };
    match ty.kind {
        TypeKind::Primitive => match direction {
            Direction::Decode => format!("new Date({expr})"),
            Direction::Encode => format!("{expr}.toISOString()"),
        },
        TypeKind::Type | TypeKind::Object => format!("{verb}{}({expr})", ts_type(ty)),
        TypeKind::Array => match ty.array_element() {
            Some(element) => {
                let var = format!("v{depth}");
                let inner = convert(&element, &var, direction, depth + 1);
                format!("{expr}.map(({var}: any) => {inner})")
            }
            None => expr.to_string(),
        },
        TypeKind::Map => match ty.map_type.as_deref() {
            Some(value) => {
                let k = format!("k{depth}");
                let v = format!("v{depth}");
                let inner = convert(value, &v, direction, depth + 1);
                let entry = format!("([{k}, {v}]: [string, any]) => [{k}, {inner}]");
                format!("Object.fromEntries(Object.entries({expr}).map({entry}))")
            }
            None => expr.to_string(),
        },
        TypeKind::Enum => expr.to_string(),
    }
}

/// Escape literal text for a template literal.
pub fn escape_template(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out
}

/// A double-quoted string literal.
pub fn string_literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}
