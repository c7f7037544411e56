//! Go code emitter.

use vdl_ir::pattern::{self, Segment};
use vdl_ir::{ConstType, Deprecation, EnumDef, EnumType, IrSchema};

use crate::error::GeneratorError;
use crate::generator::code::CodeWriter;
use crate::generator::golang::type_mapper::{
    field_name, field_type, is_package_name, json_tag, local_name, string_literal, uses_time,
};
use crate::generator::model::{self, OperationKind, RecordView};
use crate::generator::options::Options;
use crate::generator::traits::{CodeGenerator, GeneratedFile, GenerationContext};

const INDENT: &str = "\t";

/// Settings read from the target's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoOptions {
    pub package: String,
    pub gen_consts: bool,
    pub gen_patterns: bool,
    pub gen_catalog: bool,
}

impl GoOptions {
    /// Read the options table. `package` is required.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, GeneratorError> {
        let options = Options::new(value)?;
        let package = options.required_string("package")?;
        if !is_package_name(package) {
            return Err(GeneratorError::invalid_option(
                "package",
                format!("'{package}' is not a valid Go package name"),
            ));
        }
        Ok(Self {
            package: package.to_string(),
            gen_consts: options.bool("gen_consts", true)?,
            gen_patterns: options.bool("gen_patterns", true)?,
            gen_catalog: options.bool("gen_catalog", true)?,
        })
    }
}

/// Go code generator.
#[derive(Debug, Clone, Default)]
pub struct GoGenerator;

impl GoGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for GoGenerator {
    fn id(&self) -> &'static str {
        "go"
    }

    fn name(&self) -> &'static str {
        "Go"
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let options = GoOptions::from_value(ctx.options)?;
        let schema = ctx.schema;
        let file = FileHeader {
            version: ctx.version,
            package: &options.package,
        };

        let mut files = Vec::new();
        if let Some(content) = emit_types(schema, &file) {
            files.push(GeneratedFile::new("types.go", content));
        }
        if let Some(content) = emit_enums(schema, &file) {
            files.push(GeneratedFile::new("enums.go", content));
        }
        if options.gen_consts {
            if let Some(content) = emit_constants(schema, &file) {
                files.push(GeneratedFile::new("constants.go", content));
            }
        }
        if options.gen_patterns {
            if let Some(content) = emit_patterns(schema, &file) {
                files.push(GeneratedFile::new("patterns.go", content));
            }
        }
        if options.gen_catalog {
            if let Some(content) = emit_catalog(schema, &file) {
                files.push(GeneratedFile::new("catalog.go", content));
            }
        }
        Ok(files)
    }
}

// =============================================================================
// Shared
// =============================================================================

struct FileHeader<'a> {
    version: &'a str,
    package: &'a str,
}

impl FileHeader<'_> {
    fn write(&self, w: &mut CodeWriter, imports: &[&str]) {
        w.line(format!("// Code generated by vdl {}. DO NOT EDIT.", self.version));
        w.blank();
        w.line(format!("package {}", self.package));
        w.blank();
        match imports {
            [] => {}
            [single] => {
                w.line(format!("import \"{single}\""));
                w.blank();
            }
            many => {
                w.block("import (", ")", |w| {
                    for import in many {
                        w.line(format!("\"{import}\""));
                    }
                });
                w.blank();
            }
        }
    }
}

fn banner(w: &mut CodeWriter, title: &str) {
    let rule = format!("// {}", "-".repeat(77));
    w.line(&rule);
    w.line(format!("// {title}"));
    w.line(&rule);
    w.blank();
}

fn doc_comment(w: &mut CodeWriter, doc: Option<&str>, deprecated: Option<&Deprecation>) {
    if let Some(doc) = doc {
        w.prefixed("// ", doc);
    }
    if let Some(deprecated) = deprecated {
        if doc.is_some() {
            w.line("//");
        }
        match &deprecated.message {
            Some(message) => w.line(format!("// Deprecated: {message}")),
            None => w.line("// Deprecated: this element is deprecated."),
        }
    }
}

// =============================================================================
// types.go
// =============================================================================

fn emit_types(schema: &IrSchema, file: &FileHeader<'_>) -> Option<String> {
    let records = model::records(schema);
    if records.is_empty() {
        return None;
    }

    let needs_time = records
        .iter()
        .flat_map(|r| r.fields.iter())
        .any(|f| uses_time(&f.type_ref));

    let imports: &[&str] = if needs_time { &["time"] } else { &[] };
    let mut w = CodeWriter::new(INDENT);
    file.write(&mut w, imports);
    banner(&mut w, "Types");

    for record in &records {
        emit_struct(&mut w, record);
    }
    Some(w.finish())
}

fn emit_struct(w: &mut CodeWriter, record: &RecordView<'_>) {
    doc_comment(w, record.doc, record.deprecated);
    if record.fields.is_empty() {
        w.line(format!("type {} struct{{}}", record.name));
        w.blank();
        return;
    }

    let rows: Vec<(String, String, String)> = record
        .fields
        .iter()
        .map(|f| (field_name(&f.name), field_type(f), json_tag(f)))
        .collect();
    let name_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
    let type_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);

    w.block(format!("type {} struct {{", record.name), "}", |w| {
        for (field, (name, ty, tag)) in record.fields.iter().zip(&rows) {
            doc_comment(w, field.doc.as_deref(), field.deprecated.as_ref());
            w.line(format!("{name:<name_width$} {ty:<type_width$} {tag}"));
        }
    });
    w.blank();
}

// =============================================================================
// enums.go
// =============================================================================

fn emit_enums(schema: &IrSchema, file: &FileHeader<'_>) -> Option<String> {
    if schema.enums.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(INDENT);
    file.write(&mut w, &[]);
    banner(&mut w, "Enumerations");

    for def in &schema.enums {
        emit_enum(&mut w, def);
    }
    Some(w.finish())
}

fn emit_enum(w: &mut CodeWriter, def: &EnumDef) {
    let name = &def.name;
    let base = match def.enum_type {
        EnumType::String => "string",
        EnumType::Int => "int64",
    };
    let literal = |value: &str| match def.enum_type {
        EnumType::String => string_literal(value),
        EnumType::Int => value.to_string(),
    };

    if def.doc.is_none() {
        w.line(format!("// {name} is an enumeration of values."));
    }
    doc_comment(w, def.doc.as_deref(), def.deprecated.as_ref());
    w.line(format!("type {name} {base}"));
    w.blank();

    if !def.members.is_empty() {
        let width = def
            .members
            .iter()
            .map(|m| name.len() + m.name.len())
            .max()
            .unwrap_or(0);
        w.block("const (", ")", |w| {
            for member in &def.members {
                let constant = format!("{name}{}", member.name);
                w.line(format!("{constant:<width$} {name} = {}", literal(&member.value)));
            }
        });
        w.blank();
    }

    w.line(format!("// {name}List contains all valid {name} values."));
    w.block(format!("var {name}List = []{name}{{"), "}", |w| {
        for member in &def.members {
            w.line(format!("{name}{},", member.name));
        }
    });
    w.blank();

    w.line(format!("// IsValid reports whether e is a declared {name} member."));
    w.block(format!("func (e {name}) IsValid() bool {{"), "}", |w| {
        if !def.members.is_empty() {
            let cases: Vec<String> = def
                .members
                .iter()
                .map(|m| format!("{name}{}", m.name))
                .collect();
            w.line("switch e {");
            w.block(format!("case {}:", cases.join(", ")), "}", |w| w.line("return true"));
        }
        w.line("return false");
    });
    w.blank();

    w.line(format!("// Parse{name} converts a wire value, reporting whether it is a member."));
    w.block(
        format!("func Parse{name}(value {base}) ({name}, bool) {{"),
        "}",
        |w| {
            w.line(format!("e := {name}(value)"));
            w.line("return e, e.IsValid()");
        },
    );
    w.blank();
}

// =============================================================================
// constants.go
// =============================================================================

fn emit_constants(schema: &IrSchema, file: &FileHeader<'_>) -> Option<String> {
    if schema.constants.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(INDENT);
    file.write(&mut w, &[]);
    banner(&mut w, "Constants");

    for constant in &schema.constants {
        doc_comment(&mut w, constant.doc.as_deref(), constant.deprecated.as_ref());
        let (ty, value) = match constant.const_type {
            ConstType::String => ("string", string_literal(&constant.value)),
            ConstType::Int => ("int64", constant.value.clone()),
            ConstType::Float => ("float64", constant.value.clone()),
            ConstType::Bool => ("bool", constant.value.clone()),
        };
        w.line(format!("const {} {ty} = {value}", constant.name));
        w.blank();
    }
    Some(w.finish())
}

// =============================================================================
// patterns.go
// =============================================================================

fn emit_patterns(schema: &IrSchema, file: &FileHeader<'_>) -> Option<String> {
    if schema.patterns.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(INDENT);
    file.write(&mut w, &[]);
    banner(&mut w, "Patterns");

    for def in &schema.patterns {
        doc_comment(&mut w, def.doc.as_deref(), def.deprecated.as_ref());
        let params: Vec<String> = def.placeholders.iter().map(|p| local_name(p)).collect();
        let signature = if params.is_empty() {
            String::new()
        } else {
            format!("{} string", params.join(", "))
        };

        let parts: Vec<String> = pattern::segments(&def.template)
            .into_iter()
            .map(|segment| match segment {
                Segment::Literal(text) => string_literal(text),
                Segment::Placeholder(name) => local_name(name),
            })
            .collect();
        let body = if parts.is_empty() {
            "\"\"".to_string()
        } else {
            parts.join(" + ")
        };

        w.block(format!("func {}({signature}) string {{", def.name), "}", |w| {
            w.line(format!("return {body}"));
        });
        w.blank();
    }
    Some(w.finish())
}

// =============================================================================
// catalog.go
// =============================================================================

fn emit_catalog(schema: &IrSchema, file: &FileHeader<'_>) -> Option<String> {
    if schema.rpcs.is_empty() {
        return None;
    }

    let operations = model::all_operations(schema);
    let imports: &[&str] = if operations.is_empty() { &[] } else { &["context"] };
    let mut w = CodeWriter::new(INDENT);
    file.write(&mut w, imports);
    banner(&mut w, "RPC Catalog");

    w.line("// OperationType distinguishes procedures from streams.");
    w.line("type OperationType string");
    w.blank();
    w.block("const (", ")", |w| {
        w.line("OperationTypeProc   OperationType = \"proc\"");
        w.line("OperationTypeStream OperationType = \"stream\"");
    });
    w.blank();

    w.line("// OperationDefinition describes one operation of an RPC.");
    w.block("type OperationDefinition struct {", "}", |w| {
        w.line("RPCName string");
        w.line("Name    string");
        w.line("Type    OperationType");
    });
    w.blank();

    for (title, kind, constant) in [
        ("VDLProcedures", OperationKind::Proc, "OperationTypeProc"),
        ("VDLStreams", OperationKind::Stream, "OperationTypeStream"),
    ] {
        let entries: Vec<_> = operations.iter().filter(|op| op.kind == kind).collect();
        if entries.is_empty() {
            w.line(format!("var {title} = []OperationDefinition{{}}"));
        } else {
            w.block(format!("var {title} = []OperationDefinition{{"), "}", |w| {
                for op in entries {
                    w.line(format!(
                        "{{RPCName: {}, Name: {}, Type: {constant}}},",
                        string_literal(op.rpc),
                        string_literal(op.name)
                    ));
                }
            });
        }
        w.blank();
    }

    w.line("// VDLPaths maps RPC and operation names to route paths.");
    w.block("var VDLPaths = map[string]map[string]string{", "}", |w| {
        for rpc in &schema.rpcs {
            let ops = model::operations(schema, &rpc.name);
            if ops.is_empty() {
                w.line(format!("{}: {{}},", string_literal(&rpc.name)));
                continue;
            }
            w.block(format!("{}: {{", string_literal(&rpc.name)), "},", |w| {
                for op in &ops {
                    w.line(format!(
                        "{}: {},",
                        string_literal(op.name),
                        string_literal(&op.path())
                    ));
                }
            });
        }
    });
    w.blank();

    banner(&mut w, "Services");
    for rpc in &schema.rpcs {
        doc_comment(&mut w, rpc.doc.as_deref(), rpc.deprecated.as_ref());
        let ops = model::operations(schema, &rpc.name);
        if ops.is_empty() {
            w.line(format!("type {}Service interface{{}}", rpc.name));
            w.blank();
            continue;
        }
        w.block(format!("type {}Service interface {{", rpc.name), "}", |w| {
            for op in &ops {
                doc_comment(w, op.doc, op.deprecated);
                match op.kind {
                    OperationKind::Proc => w.line(format!(
                        "{}(ctx context.Context, input {}) ({}, error)",
                        op.name,
                        op.input_name(),
                        op.output_name()
                    )),
                    OperationKind::Stream => w.line(format!(
                        "{}(ctx context.Context, input {}, emit func({}) error) error",
                        op.name,
                        op.input_name(),
                        op.output_name()
                    )),
                }
            }
        });
        w.blank();
    }
    Some(w.finish())
}
