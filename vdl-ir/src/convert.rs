//! Conversion of enum, constant, and pattern declarations.
//!
//! These declarations do not reference other declarations, so each is
//! converted on its own.

use std::collections::HashSet;

use crate::ast::{ConstDecl, ConstLiteral, EnumDecl, EnumLiteral, PatternDecl};
use crate::doc;
use crate::error::{CompileError, CompileResult, Location};
use crate::ir::{ConstType, ConstantDef, EnumDef, EnumMember, EnumType, PatternDef};
use crate::naming;
use crate::pattern;

/// Build an [`EnumDef`], inferring its value kind.
///
/// The kind follows the first explicit value: an integer literal makes an
/// `int` enum, anything else (or no explicit value) a `string` enum.
pub fn build_enum(file: &str, decl: &EnumDecl) -> CompileResult<EnumDef> {
    let enum_type = decl
        .members
        .iter()
        .find_map(|m| m.value.as_ref())
        .map_or(EnumType::String, |v| match v {
            EnumLiteral::Int(_) => EnumType::Int,
            EnumLiteral::Str(_) => EnumType::String,
        });

    let mut members = Vec::with_capacity(decl.members.len());
    let mut names = HashSet::new();
    let mut values = HashSet::new();

    for member in &decl.members {
        let location = Location::new(file, member.span);
        let name = naming::to_pascal(&member.name);

        let value = match (&member.value, enum_type) {
            (Some(EnumLiteral::Int(v)), EnumType::Int) => v.to_string(),
            (Some(EnumLiteral::Str(v)), EnumType::String) => v.clone(),
            (None, EnumType::String) => name.clone(),
            (None, EnumType::Int) => {
                return Err(CompileError::EnumMissingValue {
                    name: decl.name.clone(),
                    member: member.name.clone(),
                    location,
                });
            }
            (Some(_), _) => {
                return Err(CompileError::EnumMixedTypes {
                    name: decl.name.clone(),
                    location,
                });
            }
        };

        if !names.insert(name.clone()) {
            return Err(CompileError::EnumDuplicateMember {
                name: decl.name.clone(),
                member: name,
                location,
            });
        }
        if !values.insert(value.clone()) {
            return Err(CompileError::EnumDuplicateValue {
                name: decl.name.clone(),
                value,
                location,
            });
        }

        members.push(EnumMember { name, value });
    }

    Ok(EnumDef {
        name: decl.name.clone(),
        doc: doc::normalize_opt(decl.doc.as_deref()),
        deprecated: decl.deprecated.clone(),
        enum_type,
        members,
    })
}

/// Build a [`ConstantDef`], checking the literal against its declared type.
pub fn build_constant(file: &str, decl: &ConstDecl) -> CompileResult<ConstantDef> {
    let (inferred, value) = match &decl.value {
        ConstLiteral::Bool(b) => (ConstType::Bool, b.to_string()),
        ConstLiteral::Number(n) if n.is_i64() || n.is_u64() => (ConstType::Int, n.to_string()),
        ConstLiteral::Number(n) => (ConstType::Float, n.to_string()),
        ConstLiteral::Str(s) => (ConstType::String, s.clone()),
    };

    let const_type = match decl.declared_type.as_deref() {
        None => inferred,
        Some(declared) => match ConstType::from_name(declared) {
            Some(t) if t == inferred => t,
            Some(ConstType::Float) if inferred == ConstType::Int => ConstType::Float,
            _ => {
                return Err(CompileError::ConstTypeMismatch {
                    name: decl.name.clone(),
                    declared: declared.to_string(),
                    literal: value,
                    location: Location::new(file, decl.span),
                });
            }
        },
    };

    Ok(ConstantDef {
        name: decl.name.clone(),
        doc: doc::normalize_opt(decl.doc.as_deref()),
        deprecated: decl.deprecated.clone(),
        const_type,
        value,
    })
}

/// Build a [`PatternDef`], compiling its template.
pub fn build_pattern(file: &str, decl: &PatternDecl) -> CompileResult<PatternDef> {
    let placeholders =
        pattern::compile(&decl.template).map_err(|err| CompileError::MalformedPattern {
            name: decl.name.clone(),
            token: err.token,
            reason: err.reason.to_string(),
            location: Location::new(file, decl.span),
        })?;

    Ok(PatternDef {
        name: naming::to_pascal(&decl.name),
        doc: doc::normalize_opt(decl.doc.as_deref()),
        deprecated: decl.deprecated.clone(),
        template: decl.template.clone(),
        placeholders,
    })
}
