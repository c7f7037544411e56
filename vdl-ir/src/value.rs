//! Schema-directed JSON values.
//!
//! [`Codec`] decodes JSON payloads into [`Record`]s and encodes them back,
//! using only the IR. Absent fields are never encoded, not even as `null`.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_json::{Map, Number, Value as Json};

use crate::error::DecodeError;
use crate::ir::{EnumType, FieldDef, IrSchema, Primitive, TypeKind, TypeRef};

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Datetime(DateTime<FixedOffset>),
    /// An enum literal and the member it names, if any.
    Enum {
        member: Option<String>,
        literal: String,
    },
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Record),
}

/// The present fields of a declared type or inline object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub type_name: String,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Get a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Decodes and encodes values of one schema.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'a> {
    schema: &'a IrSchema,
}

impl<'a> Codec<'a> {
    pub fn new(schema: &'a IrSchema) -> Self {
        Self { schema }
    }

    /// Decode `json` as an instance of the type or inline object `type_name`.
    pub fn decode(&self, type_name: &str, json: &Json) -> Result<Record, DecodeError> {
        let fields = self
            .schema
            .record_fields(type_name)
            .ok_or_else(|| DecodeError::UnknownType(type_name.to_string()))?;
        self.decode_record(type_name, type_name, fields, json)
    }

    fn decode_record(
        &self,
        path: &str,
        type_name: &str,
        fields: &[FieldDef],
        json: &Json,
    ) -> Result<Record, DecodeError> {
        let Json::Object(object) = json else {
            return Err(mismatch(path, "object", json));
        };

        let mut record = Record::new(type_name);
        for field in fields {
            let field_path = format!("{path}.{}", field.name);
            match object.get(&field.name) {
                None | Some(Json::Null) if field.optional => {}
                None | Some(Json::Null) => {
                    return Err(DecodeError::MissingField {
                        path: path.to_string(),
                        type_name: type_name.to_string(),
                        field: field.name.clone(),
                    });
                }
                Some(value) => {
                    let decoded = self.decode_value(&field_path, &field.type_ref, value)?;
                    record.fields.insert(field.name.clone(), decoded);
                }
            }
        }
        Ok(record)
    }

    fn decode_value(&self, path: &str, ty: &TypeRef, json: &Json) -> Result<Value, DecodeError> {
        match ty.kind {
            TypeKind::Primitive => match ty.primitive_name {
                Some(primitive) => decode_primitive(path, primitive, json),
                None => Err(mismatch(path, "primitive", json)),
            },
            TypeKind::Type => {
                let name = ty.type_name.as_deref().unwrap_or_default();
                let fields = self
                    .schema
                    .record_fields(name)
                    .ok_or_else(|| DecodeError::UnknownType(name.to_string()))?;
                Ok(Value::Object(self.decode_record(path, name, fields, json)?))
            }
            TypeKind::Enum => self.decode_enum(path, ty, json),
            TypeKind::Array => {
                let Json::Array(items) = json else {
                    return Err(mismatch(path, "array", json));
                };
                let element = ty
                    .array_element()
                    .ok_or_else(|| mismatch(path, "array element type", json))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.decode_value(&format!("{path}[{i}]"), &element, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            TypeKind::Map => {
                let Json::Object(entries) = json else {
                    return Err(mismatch(path, "map", json));
                };
                let value_ty = ty
                    .map_type
                    .as_deref()
                    .ok_or_else(|| mismatch(path, "map value type", json))?;
                entries
                    .iter()
                    .map(|(key, item)| {
                        self.decode_value(&format!("{path}.{key}"), value_ty, item)
                            .map(|v| (key.clone(), v))
                    })
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map(Value::Map)
            }
            TypeKind::Object => {
                let name = ty.object_name.as_deref().unwrap_or_default();
                let fields = ty.object_fields.as_deref().unwrap_or_default();
                Ok(Value::Object(self.decode_record(path, name, fields, json)?))
            }
        }
    }

    fn decode_enum(&self, path: &str, ty: &TypeRef, json: &Json) -> Result<Value, DecodeError> {
        let literal = match ty.enum_type.unwrap_or_default() {
            EnumType::Int => whole_number(json)
                .ok_or_else(|| mismatch(path, "integer enum value", json))?
                .to_string(),
            EnumType::String => json
                .as_str()
                .ok_or_else(|| mismatch(path, "string enum value", json))?
                .to_string(),
        };

        let member = ty
            .enum_name
            .as_deref()
            .and_then(|name| self.schema.get_enum(name))
            .and_then(|def| def.member_by_value(&literal))
            .map(|m| m.name.clone());

        Ok(Value::Enum { member, literal })
    }

    /// Encode a record. Object keys come out sorted alphabetically, not in
    /// declaration order.
    pub fn encode(&self, record: &Record) -> Json {
        let fields = self.schema.record_fields(&record.type_name);
        Json::Object(self.encode_record(record, fields))
    }

    fn encode_record(&self, record: &Record, fields: Option<&[FieldDef]>) -> Map<String, Json> {
        let mut out = Map::new();
        for (name, value) in &record.fields {
            let ty = fields
                .and_then(|fs| fs.iter().find(|f| &f.name == name))
                .map(|f| &f.type_ref);
            out.insert(name.clone(), self.encode_value(value, ty));
        }
        out
    }

    fn encode_value(&self, value: &Value, ty: Option<&TypeRef>) -> Json {
        match value {
            Value::String(s) => Json::String(s.clone()),
            Value::Int(i) => Json::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Bool(b) => Json::Bool(*b),
            Value::Datetime(dt) => Json::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Enum { literal, .. } => {
                let int_enum = ty.and_then(|t| t.enum_type) == Some(EnumType::Int);
                match literal.parse::<i64>() {
                    Ok(n) if int_enum => Json::Number(n.into()),
                    _ => Json::String(literal.clone()),
                }
            }
            Value::Array(items) => {
                let element = ty.and_then(TypeRef::array_element);
                Json::Array(
                    items
                        .iter()
                        .map(|item| self.encode_value(item, element.as_ref()))
                        .collect(),
                )
            }
            Value::Map(entries) => {
                let value_ty = ty.and_then(|t| t.map_type.as_deref());
                Json::Object(
                    entries
                        .iter()
                        .map(|(k, v)| (k.clone(), self.encode_value(v, value_ty)))
                        .collect(),
                )
            }
            Value::Object(record) => {
                let fields = match ty {
                    Some(t) if t.kind == TypeKind::Object => t.object_fields.as_deref(),
                    _ => self.schema.record_fields(&record.type_name),
                };
                Json::Object(self.encode_record(record, fields))
            }
        }
    }
}

fn decode_primitive(path: &str, primitive: Primitive, json: &Json) -> Result<Value, DecodeError> {
    match primitive {
        Primitive::String => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| mismatch(path, "string", json)),
        Primitive::Int => whole_number(json)
            .map(Value::Int)
            .ok_or_else(|| mismatch(path, "int", json)),
        Primitive::Float => json
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| mismatch(path, "float", json)),
        Primitive::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| mismatch(path, "bool", json)),
        Primitive::Datetime => {
            let raw = json
                .as_str()
                .ok_or_else(|| mismatch(path, "datetime string", json))?;
            DateTime::parse_from_rfc3339(raw)
                .map(Value::Datetime)
                .map_err(|e| DecodeError::InvalidDatetime {
                    path: path.to_string(),
                    value: raw.to_string(),
                    message: e.to_string(),
                })
        }
    }
}

/// An integer, or a float with no fractional part.
fn whole_number(json: &Json) -> Option<i64> {
    if let Some(i) = json.as_i64() {
        return Some(i);
    }
    let f = json.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

fn mismatch(path: &str, expected: &str, found: &Json) -> DecodeError {
    DecodeError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        found: json_kind(found).to_string(),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
