//! TypeScript code emitter.
//!
//! # Output
//!
//! - `types.ts`: enums, interfaces, and `decodeX`/`encodeX` converters
//! - `constants.ts`: one `export const` per constant
//! - `patterns.ts`: one template-literal function per pattern
//! - `catalog.ts`: operation lists, route paths, and service interfaces
//! - `index.ts`: re-exports of every file above that was emitted

use vdl_ir::pattern::{self, Segment};
use vdl_ir::{ConstType, Deprecation, EnumDef, EnumType, FieldDef, IrSchema};

use crate::error::GeneratorError;
use crate::generator::code::CodeWriter;
use crate::generator::model::{self, OperationKind, RecordView};
use crate::generator::options::Options;
use crate::generator::traits::{CodeGenerator, GeneratedFile, GenerationContext};
use crate::generator::typescript::type_mapper::{
    convert, escape_template, identifier, string_literal, ts_type, Direction,
};

const INDENT: &str = "  ";

/// Settings read from the target's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeScriptOptions {
    pub gen_consts: bool,
    pub gen_patterns: bool,
    pub gen_catalog: bool,
    /// Appended to relative import specifiers, e.g. `.js`.
    pub import_extension: String,
}

impl Default for TypeScriptOptions {
    fn default() -> Self {
        Self {
            gen_consts: true,
            gen_patterns: true,
            gen_catalog: true,
            import_extension: String::new(),
        }
    }
}

impl TypeScriptOptions {
    /// Read the options table, falling back to defaults.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, GeneratorError> {
        let options = Options::new(value)?;
        Ok(Self {
            gen_consts: options.bool("gen_consts", true)?,
            gen_patterns: options.bool("gen_patterns", true)?,
            gen_catalog: options.bool("gen_catalog", true)?,
            import_extension: options.string("import_extension")?.unwrap_or("").to_string(),
        })
    }
}

/// TypeScript code generator.
#[derive(Debug, Clone, Default)]
pub struct TypeScriptGenerator;

impl TypeScriptGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl CodeGenerator for TypeScriptGenerator {
    fn id(&self) -> &'static str {
        "typescript"
    }

    fn name(&self) -> &'static str {
        "TypeScript"
    }

    fn generate(&self, ctx: &GenerationContext<'_>) -> Result<Vec<GeneratedFile>, GeneratorError> {
        let options = TypeScriptOptions::from_value(ctx.options)?;
        let schema = ctx.schema;
        let mut files = Vec::new();

        if let Some(content) = emit_types(schema, ctx.version) {
            files.push(GeneratedFile::new("types.ts", content));
        }
        if options.gen_consts {
            if let Some(content) = emit_constants(schema, ctx.version) {
                files.push(GeneratedFile::new("constants.ts", content));
            }
        }
        if options.gen_patterns {
            if let Some(content) = emit_patterns(schema, ctx.version) {
                files.push(GeneratedFile::new("patterns.ts", content));
            }
        }
        if options.gen_catalog {
            if let Some(content) = emit_catalog(schema, ctx.version, &options.import_extension) {
                files.push(GeneratedFile::new("catalog.ts", content));
            }
        }
        if !files.is_empty() {
            let index = emit_index(&files, ctx.version, &options.import_extension);
            files.push(GeneratedFile::new("index.ts", index));
        }

        Ok(files)
    }
}

// =============================================================================
// Shared
// =============================================================================

fn header(w: &mut CodeWriter, version: &str) {
    w.line(format!("// Code generated by vdl {version}. DO NOT EDIT."));
    w.blank();
}

fn banner(w: &mut CodeWriter, title: &str) {
    let rule = format!("// {}", "-".repeat(77));
    w.line(&rule);
    w.line(format!("// {title}"));
    w.line(&rule);
    w.blank();
}

fn jsdoc(w: &mut CodeWriter, doc: Option<&str>, deprecated: Option<&Deprecation>) {
    if doc.is_none() && deprecated.is_none() {
        return;
    }
    w.line("/**");
    if let Some(doc) = doc {
        w.prefixed(" * ", doc);
    }
    if let Some(deprecated) = deprecated {
        match &deprecated.message {
            Some(message) => w.line(format!(" * @deprecated {message}")),
            None => w.line(" * @deprecated"),
        }
    }
    w.line(" */");
}

fn enum_literal(def: &EnumDef, value: &str) -> String {
    match def.enum_type {
        EnumType::String => string_literal(value),
        EnumType::Int => value.to_string(),
    }
}

// =============================================================================
// types.ts
// =============================================================================

fn emit_types(schema: &IrSchema, version: &str) -> Option<String> {
    let records = model::records(schema);
    if schema.enums.is_empty() && records.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(INDENT);
    header(&mut w, version);

    if !schema.enums.is_empty() {
        banner(&mut w, "Enums");
        for def in &schema.enums {
            emit_enum(&mut w, def);
        }
    }

    if !records.is_empty() {
        banner(&mut w, "Types");
        for record in &records {
            emit_interface(&mut w, record);
        }

        banner(&mut w, "Converters");
        for record in &records {
            emit_decoder(&mut w, record);
            emit_encoder(&mut w, record);
        }
    }

    Some(w.finish())
}

fn emit_enum(w: &mut CodeWriter, def: &EnumDef) {
    let name = &def.name;
    jsdoc(w, def.doc.as_deref(), def.deprecated.as_ref());

    if def.members.is_empty() {
        w.line(format!("export type {name} = never;"));
    } else {
        let union: Vec<String> = def
            .members
            .iter()
            .map(|m| enum_literal(def, &m.value))
            .collect();
        w.line(format!("export type {name} = {};", union.join(" | ")));
    }
    w.blank();

    w.block(format!("export const {name}Values = {{"), "} as const;", |w| {
        for member in &def.members {
            w.line(format!("{}: {},", member.name, enum_literal(def, &member.value)));
        }
    });
    w.blank();

    w.block(format!("export const {name}List: {name}[] = ["), "];", |w| {
        for member in &def.members {
            w.line(format!("{},", enum_literal(def, &member.value)));
        }
    });
    w.blank();

    w.block(
        format!("export function is{name}(value: unknown): value is {name} {{"),
        "}",
        |w| w.line(format!("return {name}List.includes(value as {name});")),
    );
    w.blank();

    w.block(
        format!("export function parse{name}(value: unknown): {name} | undefined {{"),
        "}",
        |w| w.line(format!("return is{name}(value) ? value : undefined;")),
    );
    w.blank();
}

fn emit_interface(w: &mut CodeWriter, record: &RecordView<'_>) {
    jsdoc(w, record.doc, record.deprecated);
    if record.fields.is_empty() {
        w.line(format!("export interface {} {{}}", record.name));
        w.blank();
        return;
    }
    w.block(format!("export interface {} {{", record.name), "}", |w| {
        for field in record.fields {
            emit_field(w, field);
        }
    });
    w.blank();
}

fn emit_field(w: &mut CodeWriter, field: &FieldDef) {
    jsdoc(w, field.doc.as_deref(), field.deprecated.as_ref());
    let marker = if field.optional { "?" } else { "" };
    w.line(format!(
        "{}{marker}: {};",
        identifier(&field.name),
        ts_type(&field.type_ref)
    ));
}

fn emit_decoder(w: &mut CodeWriter, record: &RecordView<'_>) {
    let name = &record.name;
    w.block(
        format!("export function decode{name}(input: any): {name} {{"),
        "}",
        |w| {
            w.line("const out: any = {};");
            for field in record.fields {
                let source = format!("input[{}]", string_literal(&field.name));
                let target = format!("out.{}", identifier(&field.name));
                let value = convert(&field.type_ref, &source, Direction::Decode, 0);
                if field.optional {
                    w.block(
                        format!("if ({source} !== undefined && {source} !== null) {{"),
                        "}",
                        |w| w.line(format!("{target} = {value};")),
                    );
                } else {
                    w.line(format!("{target} = {value};"));
                }
            }
            w.line(format!("return out as {name};"));
        },
    );
    w.blank();
}

fn emit_encoder(w: &mut CodeWriter, record: &RecordView<'_>) {
    let name = &record.name;
    w.block(
        format!("export function encode{name}(value: {name}): any {{"),
        "}",
        |w| {
            w.line("const out: any = {};");
            for field in record.fields {
                let source = format!("value.{}", identifier(&field.name));
                let target = format!("out[{}]", string_literal(&field.name));
                let converted = convert(&field.type_ref, &source, Direction::Encode, 0);
                if field.optional {
                    w.block(
                        format!("if ({source} !== undefined && {source} !== null) {{"),
                        "}",
                        |w| w.line(format!("{target} = {converted};")),
                    );
                } else {
                    w.line(format!("{target} = {converted};"));
                }
            }
            w.line("return out;");
        },
    );
    w.blank();
}

// =============================================================================
// constants.ts
// =============================================================================

fn emit_constants(schema: &IrSchema, version: &str) -> Option<String> {
    if schema.constants.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(INDENT);
    header(&mut w, version);
    banner(&mut w, "Constants");

    for constant in &schema.constants {
        jsdoc(&mut w, constant.doc.as_deref(), constant.deprecated.as_ref());
        let (ty, value) = match constant.const_type {
            ConstType::String => ("string", string_literal(&constant.value)),
            ConstType::Int | ConstType::Float => ("number", constant.value.clone()),
            ConstType::Bool => ("boolean", constant.value.clone()),
        };
        w.line(format!("export const {}: {ty} = {value};", constant.name));
        w.blank();
    }

    Some(w.finish())
}

// =============================================================================
// patterns.ts
// =============================================================================

fn emit_patterns(schema: &IrSchema, version: &str) -> Option<String> {
    if schema.patterns.is_empty() {
        return None;
    }

    let mut w = CodeWriter::new(INDENT);
    header(&mut w, version);
    banner(&mut w, "Patterns");

    for def in &schema.patterns {
        jsdoc(&mut w, def.doc.as_deref(), def.deprecated.as_ref());
        let params: Vec<String> = def
            .placeholders
            .iter()
            .map(|p| format!("{}: string", identifier(p)))
            .collect();

        let mut body = String::new();
        for segment in pattern::segments(&def.template) {
            match segment {
                Segment::Literal(text) => body.push_str(&escape_template(text)),
                Segment::Placeholder(name) => {
                    body.push_str("${");
                    body.push_str(&identifier(name));
                    body.push('}');
                }
            }
        }

        w.block(
            format!("export function {}({}): string {{", def.name, params.join(", ")),
            "}",
            |w| w.line(format!("return `{body}`;")),
        );
        w.blank();
    }

    Some(w.finish())
}

// =============================================================================
// catalog.ts
// =============================================================================

fn emit_catalog(schema: &IrSchema, version: &str, ext: &str) -> Option<String> {
    if schema.rpcs.is_empty() {
        return None;
    }

    let operations = model::all_operations(schema);
    let mut w = CodeWriter::new(INDENT);
    header(&mut w, version);

    let mut imports: Vec<String> = operations
        .iter()
        .flat_map(|op| [op.input_name(), op.output_name()])
        .collect();
    if !imports.is_empty() {
        imports.sort();
        w.line(format!(
            "import type {{ {} }} from \"./types{ext}\";",
            imports.join(", ")
        ));
        w.blank();
    }

    banner(&mut w, "RPC Catalog");

    w.line("export type OperationType = \"proc\" | \"stream\";");
    w.blank();
    w.block("export interface OperationDefinition {", "}", |w| {
        w.line("rpcName: string;");
        w.line("name: string;");
        w.line("type: OperationType;");
    });
    w.blank();

    for (title, kind) in [
        ("VDLProcedures", OperationKind::Proc),
        ("VDLStreams", OperationKind::Stream),
    ] {
        let entries: Vec<_> = operations.iter().filter(|op| op.kind == kind).collect();
        if entries.is_empty() {
            w.line(format!("export const {title}: OperationDefinition[] = [];"));
        } else {
            w.block(format!("export const {title}: OperationDefinition[] = ["), "];", |w| {
                for op in entries {
                    w.line(format!(
                        "{{ rpcName: {}, name: {}, type: \"{}\" }},",
                        string_literal(op.rpc),
                        string_literal(op.name),
                        kind.as_str()
                    ));
                }
            });
        }
        w.blank();
    }

    w.block("export const VDLPaths = {", "} as const;", |w| {
        for rpc in &schema.rpcs {
            let ops = model::operations(schema, &rpc.name);
            if ops.is_empty() {
                w.line(format!("{}: {{}},", rpc.name));
                continue;
            }
            w.block(format!("{}: {{", rpc.name), "},", |w| {
                for op in &ops {
                    w.line(format!("{}: {},", op.name, string_literal(&op.path())));
                }
            });
        }
    });
    w.blank();

    banner(&mut w, "Services");
    for rpc in &schema.rpcs {
        jsdoc(&mut w, rpc.doc.as_deref(), rpc.deprecated.as_ref());
        let ops = model::operations(schema, &rpc.name);
        if ops.is_empty() {
            w.line(format!("export interface {}Service {{}}", rpc.name));
            w.blank();
            continue;
        }
        w.block(format!("export interface {}Service {{", rpc.name), "}", |w| {
            for op in &ops {
                jsdoc(w, op.doc, op.deprecated);
                let result = match op.kind {
                    OperationKind::Proc => format!("Promise<{}>", op.output_name()),
                    OperationKind::Stream => format!("AsyncIterable<{}>", op.output_name()),
                };
                w.line(format!(
                    "{}(input: {}): {result};",
                    identifier(op.name),
                    op.input_name()
                ));
            }
        });
        w.blank();
    }

    Some(w.finish())
}

// =============================================================================
// index.ts
// =============================================================================

fn emit_index(files: &[GeneratedFile], version: &str, ext: &str) -> String {
    let mut w = CodeWriter::new(INDENT);
    header(&mut w, version);
    for file in files {
        let module = file.path.trim_end_matches(".ts");
        w.line(format!("export * from \"./{module}{ext}\";"));
    }
    w.finish()
}
