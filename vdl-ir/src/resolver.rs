//! Type reference resolution.
//!
//! Converts raw [`TypeExpr`]s into [`TypeRef`]s against the merged symbol
//! table. Inline objects are resolved like type bodies, including their
//! spreads, and receive a synthesized name of the form
//! `ParentName + PascalCase(field path)`.

use std::collections::{HashMap, HashSet};

use crate::ast::{FieldBlock, FieldDecl, Span, TypeExpr};
use crate::doc;
use crate::error::{CompileError, CompileResult, Location};
use crate::ir::{EnumType, FieldDef, Primitive, TypeRef};
use crate::naming;

/// An inline object name produced during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedName {
    pub name: String,
    pub location: Location,
}

/// Names visible to the resolver.
#[derive(Debug, Clone, Copy)]
pub struct Symbols<'a> {
    /// Every declared type name.
    pub types: &'a HashSet<String>,
    /// Every declared enum with its value kind.
    pub enums: &'a HashMap<String, EnumType>,
    /// Flattened fields of types resolved so far, for spreads.
    pub flattened: &'a HashMap<String, Vec<FieldDef>>,
}

/// Resolves the fields of one declaration in one source file.
#[derive(Debug)]
pub struct Resolver<'a> {
    file: &'a str,
    symbols: Symbols<'a>,
    synthesized: Vec<SynthesizedName>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for declarations of `file`.
    pub fn new(file: &'a str, symbols: Symbols<'a>) -> Self {
        Self {
            file,
            symbols,
            synthesized: Vec::new(),
        }
    }

    /// Inline object names synthesized so far.
    pub fn synthesized(&self) -> &[SynthesizedName] {
        &self.synthesized
    }

    /// Consume the resolver, returning the synthesized names.
    pub fn into_synthesized(self) -> Vec<SynthesizedName> {
        self.synthesized
    }

    fn location(&self, span: Span) -> Location {
        Location::new(self.file, span)
    }

    /// Resolve a field list plus spreads into one flat field list.
    ///
    /// Spread fields come first, in spread order, followed by the local
    /// fields. `owner` names the declaration in diagnostics; `parent` and
    /// `path` seed synthesized names of nested inline objects.
    pub fn flatten(
        &mut self,
        owner: &str,
        parent: &str,
        path: &[&str],
        block: &FieldBlock,
        span: Span,
    ) -> CompileResult<Vec<FieldDef>> {
        let display = qualified(owner, path);
        let mut fields: Vec<FieldDef> = Vec::new();
        // field name -> name of the declaration that contributed it
        let mut provenance: HashMap<String, String> = HashMap::new();

        for spread in &block.spreads {
            let Some(spread_fields) = self.symbols.flattened.get(spread) else {
                return Err(CompileError::UnknownSpread {
                    name: spread.clone(),
                    owner: display.clone(),
                    location: self.location(span),
                });
            };

            for field in spread_fields {
                if let Some(first) = provenance.get(&field.name) {
                    return Err(CompileError::SpreadFieldConflict {
                        owner: display.clone(),
                        field: field.name.clone(),
                        first: first.clone(),
                        second: spread.clone(),
                        location: self.location(span),
                    });
                }
                provenance.insert(field.name.clone(), spread.clone());
                fields.push(field.clone());
            }
        }

        for decl in &block.fields {
            if let Some(first) = provenance.get(&decl.name) {
                if *first == display {
                    return Err(CompileError::DuplicateField {
                        owner: display.clone(),
                        field: decl.name.clone(),
                        location: self.location(decl.span),
                    });
                }
                return Err(CompileError::SpreadFieldConflict {
                    owner: display.clone(),
                    field: decl.name.clone(),
                    first: first.clone(),
                    second: display.clone(),
                    location: self.location(decl.span),
                });
            }
            provenance.insert(decl.name.clone(), display.clone());
            fields.push(self.resolve_field(owner, parent, path, decl)?);
        }

        Ok(fields)
    }

    /// Resolve one field declaration.
    pub fn resolve_field(
        &mut self,
        owner: &str,
        parent: &str,
        path: &[&str],
        decl: &FieldDecl,
    ) -> CompileResult<FieldDef> {
        let mut field_path = path.to_vec();
        field_path.push(&decl.name);

        let type_ref = self.resolve(owner, parent, &field_path, decl, &decl.ty)?;

        Ok(FieldDef {
            name: decl.name.clone(),
            type_ref,
            optional: decl.optional,
            doc: doc::normalize_opt(decl.doc.as_deref()),
            deprecated: decl.deprecated.clone(),
        })
    }

    /// Resolve a type expression appearing in field `decl`.
    fn resolve(
        &mut self,
        owner: &str,
        parent: &str,
        field_path: &[&str],
        decl: &FieldDecl,
        expr: &TypeExpr,
    ) -> CompileResult<TypeRef> {
        match expr {
            TypeExpr::Named(name) => self.resolve_name(owner, field_path, decl, name),
            TypeExpr::Array(element) => Ok(TypeRef::array(self.resolve(
                owner, parent, field_path, decl, element,
            )?)),
            TypeExpr::Map(value) => Ok(TypeRef::map(self.resolve(
                owner, parent, field_path, decl, value,
            )?)),
            TypeExpr::Object(block) => {
                let name = naming::synthesized_name(parent, field_path.iter().copied());
                self.synthesized.push(SynthesizedName {
                    name: name.clone(),
                    location: self.location(decl.span),
                });
                let fields = self.flatten(owner, parent, field_path, block, decl.span)?;
                Ok(TypeRef::object(name, fields))
            }
        }
    }

    fn resolve_name(
        &self,
        owner: &str,
        field_path: &[&str],
        decl: &FieldDecl,
        name: &str,
    ) -> CompileResult<TypeRef> {
        if let Some(primitive) = Primitive::from_name(name) {
            return Ok(TypeRef::primitive(primitive));
        }
        if let Some(&enum_type) = self.symbols.enums.get(name) {
            return Ok(TypeRef::enumeration(name, enum_type));
        }
        if self.symbols.types.contains(name) {
            return Ok(TypeRef::named(name));
        }
        Err(CompileError::UnresolvedType {
            name: name.to_string(),
            field: qualified(owner, field_path),
            location: self.location(decl.span),
        })
    }
}

/// `owner.a.b` for a non-empty path, `owner` otherwise.
fn qualified(owner: &str, path: &[&str]) -> String {
    if path.is_empty() {
        owner.to_string()
    } else {
        format!("{owner}.{}", path.join("."))
    }
}
