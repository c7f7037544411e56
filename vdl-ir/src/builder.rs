//! IR construction.
//!
//! [`IrBuilder`] turns the merged parsed sources into an immutable
//! [`IrSchema`]. Every stage collects its errors so a single compile reports
//! as many problems as it can; the IR is only returned when none occurred.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::ast::{Decl, FieldBlock, OperationDecl, RpcDecl, TypeDecl, TypeExpr};
use crate::convert;
use crate::doc;
use crate::error::{CompileError, CompileResult, Location};
use crate::graph::DependencyGraph;
use crate::ir::{
    EnumType, FieldDef, IrSchema, ProcedureDef, RpcDef, StreamDef, TypeDef, TypeKind, TypeRef,
};
use crate::merge::{self, MergedSources, SourceLoader};
use crate::resolver::{Resolver, Symbols, SynthesizedName};

/// The result of a successful compile.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    /// The resolved IR.
    pub ir: IrSchema,
    /// Verbatim schema text of every loaded file, in load order.
    pub schema_source: String,
    /// Paths of the loaded files, in load order.
    pub files: Vec<String>,
}

/// Builds an [`IrSchema`] from schema files provided by a [`SourceLoader`].
pub struct IrBuilder<L> {
    loader: L,
}

impl<L: SourceLoader> IrBuilder<L> {
    /// Create a builder reading files through `loader`.
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Compile the schema rooted at `entry`.
    #[instrument(skip(self))]
    pub fn build(&mut self, entry: &str) -> CompileResult<Compilation> {
        let merged = merge::load_all(&mut self.loader, entry)?;
        build_merged(&merged)
    }

    /// Consume the builder, returning the loader.
    pub fn into_loader(self) -> L {
        self.loader
    }
}

/// Compile already-merged sources.
pub fn build_merged(merged: &MergedSources) -> CompileResult<Compilation> {
    let mut state = BuildState::new(merged);
    state.run();

    if let Some(err) = CompileError::from_many(state.errors) {
        return Err(err);
    }

    debug!(
        types = state.ir.types.len(),
        enums = state.ir.enums.len(),
        rpcs = state.ir.rpcs.len(),
        "built IR"
    );

    Ok(Compilation {
        ir: state.ir,
        schema_source: merged.schema_text(),
        files: merged.paths(),
    })
}

// =============================================================================
// Build state
// =============================================================================

struct BuildState<'m> {
    merged: &'m MergedSources,
    ir: IrSchema,
    errors: Vec<CompileError>,

    /// Type declarations in declaration order, first declaration wins.
    type_decls: Vec<(&'m str, &'m TypeDecl)>,
    type_names: HashSet<String>,
    enum_types: HashMap<String, EnumType>,
    flattened: HashMap<String, Vec<FieldDef>>,
    synthesized: Vec<SynthesizedName>,
}

impl<'m> BuildState<'m> {
    fn new(merged: &'m MergedSources) -> Self {
        let mut type_decls = Vec::new();
        let mut type_names = HashSet::new();
        for (file, decl) in merged.declarations() {
            if let Decl::Type(ty) = decl {
                if type_names.insert(ty.name.clone()) {
                    type_decls.push((file, ty));
                }
            }
        }

        Self {
            merged,
            ir: IrSchema::new(),
            errors: Vec::new(),
            type_decls,
            type_names,
            enum_types: HashMap::new(),
            flattened: HashMap::new(),
            synthesized: Vec::new(),
        }
    }

    fn run(&mut self) {
        self.errors.extend(self.merged.check_names());

        self.build_leaf_declarations();

        let Some(order) = self.spread_order() else {
            return;
        };
        self.resolve_types(&order);
        self.check_required_cycles();
        self.build_rpcs();
        self.check_synthesized_names();
    }

    /// Enums, constants, patterns, and standalone docs.
    fn build_leaf_declarations(&mut self) {
        let merged = self.merged;
        for (file, decl) in merged.declarations() {
            match decl {
                Decl::Enum(e) => {
                    // Keep the name resolvable even when the body is invalid.
                    let kind = match convert::build_enum(file, e) {
                        Ok(def) => {
                            let kind = def.enum_type;
                            self.ir.enums.push(def);
                            kind
                        }
                        Err(err) => {
                            self.errors.push(err);
                            EnumType::String
                        }
                    };
                    self.enum_types.entry(e.name.clone()).or_insert(kind);
                }
                Decl::Const(c) => match convert::build_constant(file, c) {
                    Ok(def) => self.ir.constants.push(def),
                    Err(err) => self.errors.push(err),
                },
                Decl::Pattern(p) => match convert::build_pattern(file, p) {
                    Ok(def) => self.ir.patterns.push(def),
                    Err(err) => self.errors.push(err),
                },
                Decl::Doc(d) => {
                    if let Some(content) = doc::normalize(&d.content) {
                        self.ir.docs.push(content);
                    }
                }
                Decl::Type(_) | Decl::Rpc(_) => {}
            }
        }
        debug!(
            enums = self.ir.enums.len(),
            constants = self.ir.constants.len(),
            patterns = self.ir.patterns.len(),
            "converted leaf declarations"
        );
    }

    /// Topological order of types over the spread relation.
    ///
    /// Returns `None` after recording one error per cycle.
    fn spread_order(&mut self) -> Option<Vec<String>> {
        let mut graph = DependencyGraph::new();
        for (_, ty) in &self.type_decls {
            graph.add_node(ty.name.clone());
        }
        for (_, ty) in &self.type_decls {
            let mut targets = ty.spreads.clone();
            for field in &ty.fields {
                nested_spreads(&field.ty, &mut targets);
            }
            // Unknown targets are reported by the resolver.
            for target in targets.into_iter().filter(|t| self.type_names.contains(t)) {
                graph.add_edge(ty.name.clone(), target);
            }
        }

        match graph.topological_order() {
            Ok(order) => Some(order),
            Err(err) => {
                self.errors.extend(
                    err.cycles
                        .into_iter()
                        .map(|cycle| CompileError::SpreadCycle { cycle }),
                );
                None
            }
        }
    }

    fn symbols(&self) -> Symbols<'_> {
        Symbols {
            types: &self.type_names,
            enums: &self.enum_types,
            flattened: &self.flattened,
        }
    }

    /// Resolve every type body, dependencies first.
    fn resolve_types(&mut self, order: &[String]) {
        let by_name: HashMap<&str, (&'m str, &'m TypeDecl)> = self
            .type_decls
            .iter()
            .map(|&(file, ty)| (ty.name.as_str(), (file, ty)))
            .collect();

        for name in order {
            let Some(&(file, ty)) = by_name.get(name.as_str()) else {
                continue;
            };
            let block = FieldBlock {
                fields: ty.fields.clone(),
                spreads: ty.spreads.clone(),
            };

            let (result, synthesized) = {
                let mut resolver = Resolver::new(file, self.symbols());
                let result = resolver.flatten(&ty.name, &ty.name, &[], &block, ty.span);
                (result, resolver.into_synthesized())
            };
            self.synthesized.extend(synthesized);

            // Dependents still resolve against an empty body after a failure.
            let fields = result.unwrap_or_else(|err| {
                self.errors.push(err);
                Vec::new()
            });
            self.flattened.insert(name.clone(), fields);
        }

        for &(_, ty) in &self.type_decls {
            let fields = self.flattened.get(&ty.name).cloned().unwrap_or_default();
            self.ir.types.push(TypeDef {
                name: ty.name.clone(),
                doc: doc::normalize_opt(ty.doc.as_deref()),
                deprecated: ty.deprecated.clone(),
                spreads: ty.spreads.clone(),
                fields,
            });
        }
        debug!(types = self.ir.types.len(), "resolved types");
    }

    /// Reject types that can only be instantiated through themselves.
    fn check_required_cycles(&mut self) {
        let mut graph = DependencyGraph::new();
        for ty in &self.ir.types {
            graph.add_node(ty.name.clone());
            let mut targets = Vec::new();
            required_references(&ty.fields, &mut targets);
            for target in targets {
                graph.add_edge(ty.name.clone(), target);
            }
        }

        if let Err(err) = graph.topological_order() {
            self.errors.extend(
                err.cycles
                    .into_iter()
                    .map(|cycle| CompileError::RequiredCycle { cycle }),
            );
        }
    }

    fn build_rpcs(&mut self) {
        let merged = self.merged;
        for (file, decl) in merged.declarations() {
            let Decl::Rpc(rpc) = decl else {
                continue;
            };
            let def = self.build_rpc(file, rpc);
            self.ir.procedures.extend(def.procs.iter().cloned());
            self.ir.streams.extend(def.streams.iter().cloned());
            self.ir.rpcs.push(def);
        }
        debug!(
            procedures = self.ir.procedures.len(),
            streams = self.ir.streams.len(),
            "flattened rpcs"
        );
    }

    fn build_rpc(&mut self, file: &str, rpc: &RpcDecl) -> RpcDef {
        let procs = rpc
            .procs
            .iter()
            .map(|op| {
                let (input, output) = self.resolve_operation(file, &rpc.name, op);
                ProcedureDef {
                    name: op.name.clone(),
                    rpc_name: rpc.name.clone(),
                    doc: doc::normalize_opt(op.doc.as_deref()),
                    deprecated: op.deprecated.clone(),
                    input,
                    output,
                }
            })
            .collect();

        let streams = rpc
            .streams
            .iter()
            .map(|op| {
                let (input, output) = self.resolve_operation(file, &rpc.name, op);
                StreamDef {
                    name: op.name.clone(),
                    rpc_name: rpc.name.clone(),
                    doc: doc::normalize_opt(op.doc.as_deref()),
                    deprecated: op.deprecated.clone(),
                    input,
                    output,
                }
            })
            .collect();

        RpcDef {
            name: rpc.name.clone(),
            doc: doc::normalize_opt(rpc.doc.as_deref()),
            deprecated: rpc.deprecated.clone(),
            procs,
            streams,
            docs: rpc.docs.iter().filter_map(|d| doc::normalize(d)).collect(),
        }
    }

    fn resolve_operation(
        &mut self,
        file: &str,
        rpc: &str,
        op: &OperationDecl,
    ) -> (Vec<FieldDef>, Vec<FieldDef>) {
        let owner = format!("{rpc}.{}", op.name);
        let input_name = format!("{rpc}{}Input", op.name);
        let output_name = format!("{rpc}{}Output", op.name);
        let input = self.resolve_block(file, &owner, &input_name, &op.input, op);
        let output = self.resolve_block(file, &owner, &output_name, &op.output, op);
        (input, output)
    }

    fn resolve_block(
        &mut self,
        file: &str,
        owner: &str,
        parent: &str,
        block: &FieldBlock,
        op: &OperationDecl,
    ) -> Vec<FieldDef> {
        // The block itself is emitted as a record named `parent`.
        self.synthesized.push(SynthesizedName {
            name: parent.to_string(),
            location: Location::new(file, op.span),
        });
        let (result, synthesized) = {
            let mut resolver = Resolver::new(file, self.symbols());
            let result = resolver.flatten(owner, parent, &[], block, op.span);
            (result, resolver.into_synthesized())
        };
        self.synthesized.extend(synthesized);
        result.unwrap_or_else(|err| {
            self.errors.push(err);
            Vec::new()
        })
    }

    /// Synthesized names must not shadow declared names or each other.
    ///
    /// Covers inline objects as well as operation input and output records.
    fn check_synthesized_names(&mut self) {
        let declared: HashMap<String, Location> = self
            .merged
            .declarations()
            .filter_map(|(file, decl)| {
                decl.canonical_name()
                    .map(|n| (n, Location::new(file, decl.span())))
            })
            .collect();
        let mut seen: HashMap<&str, &Location> = HashMap::new();

        for synth in &self.synthesized {
            if let Some(at) = declared.get(synth.name.as_str()) {
                self.errors.push(CompileError::SynthesizedNameCollision {
                    name: synth.name.clone(),
                    other: format!("the declaration at {at}"),
                    location: synth.location.clone(),
                });
            } else if let Some(first) = seen.get(synth.name.as_str()) {
                self.errors.push(CompileError::SynthesizedNameCollision {
                    name: synth.name.clone(),
                    other: format!("the synthesized record at {first}"),
                    location: synth.location.clone(),
                });
            } else {
                seen.insert(&synth.name, &synth.location);
            }
        }
    }
}

/// Spread targets of inline objects nested anywhere in `expr`.
fn nested_spreads(expr: &TypeExpr, out: &mut Vec<String>) {
    match expr {
        TypeExpr::Named(_) => {}
        TypeExpr::Array(inner) | TypeExpr::Map(inner) => nested_spreads(inner, out),
        TypeExpr::Object(block) => {
            out.extend(block.spreads.iter().cloned());
            for field in &block.fields {
                nested_spreads(&field.ty, out);
            }
        }
    }
}

/// Types reachable through required fields only, looking inside inline
/// objects. Arrays and maps can be empty, so they end the walk.
fn required_references(fields: &[FieldDef], out: &mut Vec<String>) {
    for field in fields.iter().filter(|f| !f.optional) {
        match field.type_ref.kind {
            TypeKind::Type => out.extend(field.type_ref.type_name.iter().cloned()),
            TypeKind::Object => {
                if let Some(inner) = &field.type_ref.object_fields {
                    required_references(inner, out);
                }
            }
            _ => {}
        }
    }
}

/// Type reference of the field called `name`.
pub fn field_type<'a>(fields: &'a [FieldDef], name: &str) -> Option<&'a TypeRef> {
    fields.iter().find(|f| f.name == name).map(|f| &f.type_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        ConstDecl, ConstLiteral, DocDecl, EnumDecl, FieldDecl, PatternDecl, SourceFile, Span,
    };
    use crate::ir::{EnumMember, Primitive};
    use crate::merge::MemoryLoader;

    fn f(name: &str, ty: &str) -> FieldDecl {
        FieldDecl::new(name, TypeExpr::named(ty))
    }

    fn build(files: Vec<SourceFile>) -> CompileResult<Compilation> {
        let entry = files[0].path.clone();
        let mut loader = MemoryLoader::new();
        for file in files {
            loader.insert(file);
        }
        IrBuilder::new(loader).build(&entry)
    }

    fn field_names(ty: &TypeDef) -> Vec<&str> {
        ty.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_transitive_spreads_in_order() {
        let main = SourceFile::new("main.vdl")
            .with_decl(
                TypeDecl::new("Admin")
                    .with_spread("User")
                    .with_field(f("level", "int")),
            )
            .with_decl(
                TypeDecl::new("User")
                    .with_spread("Base")
                    .with_field(f("email", "string")),
            )
            .with_decl(
                TypeDecl::new("Base")
                    .with_field(f("id", "string"))
                    .with_field(f("createdAt", "datetime")),
            );

        let ir = build(vec![main]).unwrap().ir;
        let names: Vec<_> = ir.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Admin", "User", "Base"]);
        assert_eq!(
            field_names(ir.get_type("Admin").unwrap()),
            vec!["id", "createdAt", "email", "level"]
        );
        assert_eq!(ir.get_type("Admin").unwrap().spreads, vec!["User"]);
    }

    #[test]
    fn test_spread_cycle() {
        let main = SourceFile::new("main.vdl")
            .with_decl(TypeDecl::new("A").with_spread("B"))
            .with_decl(TypeDecl::new("B").with_spread("A"));

        let err = build(vec![main]).unwrap_err();
        assert_eq!(err.code(), "E204");
        assert_eq!(err.to_string(), "circular spread dependency: A -> B -> A");
    }

    #[test]
    fn test_unknown_spread_and_unresolved_type() {
        let main = SourceFile::new("main.vdl")
            .with_decl(TypeDecl::new("A").with_spread("Missing"))
            .with_decl(TypeDecl::new("B").with_field(f("team", "Team").at(3, 5)));

        let errors = build(vec![main]).unwrap_err().into_errors();
        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec!["E202", "E201"]);
        assert!(errors[1].to_string().contains("main.vdl:3:5"));
        assert!(errors[1].to_string().contains("B.team"));
    }

    #[test]
    fn test_required_cycle_rejected() {
        let main = SourceFile::new("main.vdl")
            .with_decl(TypeDecl::new("A").with_field(f("b", "B")))
            .with_decl(TypeDecl::new("B").with_field(f("a", "A")));

        let err = build(vec![main]).unwrap_err();
        assert_eq!(err.code(), "E601");
    }

    #[test]
    fn test_optional_or_array_breaks_required_cycle() {
        let main = SourceFile::new("main.vdl")
            .with_decl(TypeDecl::new("Node").with_field(f("parent", "Node").optional()))
            .with_decl(TypeDecl::new("Tree").with_field(FieldDecl::new(
                "children",
                TypeExpr::array(TypeExpr::named("Tree")),
            )))
            .with_decl(TypeDecl::new("Graph").with_field(FieldDecl::new(
                "edges",
                TypeExpr::map(TypeExpr::named("Graph")),
            )));

        assert!(build(vec![main]).is_ok());
    }

    #[test]
    fn test_required_cycle_through_inline_object() {
        let main = SourceFile::new("main.vdl").with_decl(TypeDecl::new("A").with_field(
            FieldDecl::new("inner", TypeExpr::object(vec![f("again", "A")])),
        ));

        let err = build(vec![main]).unwrap_err();
        assert_eq!(err.code(), "E601");
    }

    #[test]
    fn test_rpc_flattening_preserves_order() {
        let rpc = RpcDecl::new("Users")
            .with_proc(
                OperationDecl::new("GetUser")
                    .with_input(f("id", "string"))
                    .with_output(f("name", "string")),
            )
            .with_proc(OperationDecl::new("DeleteUser").with_input(f("id", "string")))
            .with_stream(OperationDecl::new("Watch").with_output(f("event", "string")));
        let main = SourceFile::new("main.vdl")
            .with_decl(rpc)
            .with_decl(RpcDecl::new("Health").with_proc(OperationDecl::new("Ping")));

        let ir = build(vec![main]).unwrap().ir;
        let procs: Vec<_> = ir
            .procedures
            .iter()
            .map(|p| (p.rpc_name.as_str(), p.name.as_str()))
            .collect();
        assert_eq!(
            procs,
            vec![("Users", "GetUser"), ("Users", "DeleteUser"), ("Health", "Ping")]
        );
        assert_eq!(ir.streams.len(), 1);
        assert_eq!(ir.streams[0].rpc_name, "Users");
        assert_eq!(ir.streams[0].output[0].name, "event");
        assert_eq!(ir.get_rpc("Users").unwrap().procs.len(), 2);
    }

    #[test]
    fn test_operation_inline_object_names() {
        let rpc = RpcDecl::new("Users").with_proc(OperationDecl::new("Create").with_input(
            FieldDecl::new("profile", TypeExpr::object(vec![f("bio", "string")])),
        ));
        let main = SourceFile::new("main.vdl").with_decl(rpc);

        let ir = build(vec![main]).unwrap().ir;
        let profile = field_type(&ir.procedures[0].input, "profile").unwrap();
        assert_eq!(profile.object_name.as_deref(), Some("UsersCreateInputProfile"));
    }

    #[test]
    fn test_synthesized_name_collision() {
        let main = SourceFile::new("main.vdl")
            .with_decl(TypeDecl::new("User").with_field(FieldDecl::new(
                "prefs",
                TypeExpr::object(vec![f("theme", "string")]),
            )))
            .with_decl(TypeDecl::new("UserPrefs").with_field(f("x", "int")));

        let err = build(vec![main]).unwrap_err();
        assert_eq!(err.code(), "E805");
    }

    #[test]
    fn test_operation_record_collides_with_declared_type() {
        let main = SourceFile::new("main.vdl")
            .with_decl(TypeDecl::new("UsersGetInput").with_field(f("id", "string")))
            .with_decl(
                RpcDecl::new("Users")
                    .with_proc(OperationDecl::new("Get").with_input(f("id", "string"))),
            );

        let errors = build(vec![main]).unwrap_err().into_errors();
        assert_eq!(errors.len(), 1);
        let CompileError::SynthesizedNameCollision { name, other, .. } = &errors[0] else {
            panic!("expected E805, got {:?}", errors[0]);
        };
        assert_eq!(name, "UsersGetInput");
        assert!(other.starts_with("the declaration at main.vdl"));
    }

    #[test]
    fn test_operation_records_collide_across_rpcs() {
        // `A.BcGet` and `ABc.Get` flatten to the same record names.
        let main = SourceFile::new("main.vdl")
            .with_decl(RpcDecl::new("A").with_proc(OperationDecl::new("BcGet")))
            .with_decl(RpcDecl::new("ABc").with_proc(OperationDecl::new("Get")));

        let errors = build(vec![main]).unwrap_err().into_errors();
        let names: Vec<&str> = errors
            .iter()
            .map(|e| match e {
                CompileError::SynthesizedNameCollision { name, .. } => name.as_str(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["ABcGetInput", "ABcGetOutput"]);
    }

    #[test]
    fn test_pattern_names_compared_after_normalization() {
        let main = SourceFile::new("main.vdl")
            .with_decl(PatternDecl::new("userKey", "u:{id}"))
            .with_decl(PatternDecl::new("UserKey", "v:{id}"));

        let errors = build(vec![main]).unwrap_err().into_errors();
        assert_eq!(errors.len(), 1);
        let CompileError::DuplicateDeclaration { name, first, second, .. } = &errors[0] else {
            panic!("expected E801, got {:?}", errors[0]);
        };
        assert_eq!(name, "UserKey");
        assert_eq!(first.file, "main.vdl");
        assert_eq!(second.file, "main.vdl");
    }

    #[test]
    fn test_normalized_pattern_collides_with_type() {
        let main = SourceFile::new("main.vdl")
            .with_decl(TypeDecl::new("UserKey").with_field(f("id", "string")))
            .with_decl(PatternDecl::new("userKey", "u:{id}"));

        let err = build(vec![main]).unwrap_err();
        assert_eq!(err.code(), "E804");
    }

    #[test]
    fn test_enum_references_carry_value_kind() {
        let main = SourceFile::new("main.vdl")
            .with_decl(
                EnumDecl::new("Priority")
                    .with_valued_member("Low", crate::ast::EnumLiteral::Int(1))
                    .with_valued_member("High", crate::ast::EnumLiteral::Int(2)),
            )
            .with_decl(TypeDecl::new("Task").with_field(f("priority", "Priority")));

        let ir = build(vec![main]).unwrap().ir;
        let priority = field_type(&ir.get_type("Task").unwrap().fields, "priority").unwrap();
        assert_eq!(priority.enum_type, Some(EnumType::Int));
        assert_eq!(ir.enums[0].members[1], EnumMember::new("High", "2"));
    }

    #[test]
    fn test_invalid_enum_still_resolvable() {
        let main = SourceFile::new("main.vdl")
            .with_decl(
                EnumDecl::new("Bad")
                    .with_valued_member("A", crate::ast::EnumLiteral::Int(1))
                    .with_member("B"),
            )
            .with_decl(TypeDecl::new("T").with_field(f("bad", "Bad")));

        let errors = build(vec![main]).unwrap_err().into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "E302");
    }

    #[test]
    fn test_leaf_declarations_and_docs() {
        let main = SourceFile::new("main.vdl")
            .with_source("const MaxUsers = 3")
            .with_decl(ConstDecl::new("MaxUsers", serde_json::from_str("3").unwrap()))
            .with_decl(ConstDecl::new("Name", ConstLiteral::Str("vdl".into())))
            .with_decl(PatternDecl::new("userKey", "user:{id}:{id}"))
            .with_decl(DocDecl {
                content: "\n    # Title\n\n    Body\n".into(),
                span: Span::default(),
            });

        let compiled = build(vec![main]).unwrap();
        let ir = compiled.ir;
        assert_eq!(ir.constants[0].value, "3");
        assert_eq!(ir.patterns[0].name, "UserKey");
        assert_eq!(ir.patterns[0].placeholders, vec!["id"]);
        assert_eq!(ir.docs, vec!["# Title\n\nBody"]);
        assert_eq!(compiled.schema_source, "const MaxUsers = 3");
        assert_eq!(compiled.files, vec!["main.vdl"]);
    }

    #[test]
    fn test_multiple_errors_collected() {
        let main = SourceFile::new("main.vdl")
            .with_decl(PatternDecl::new("Bad", "{}"))
            .with_decl(ConstDecl::new("C", ConstLiteral::Bool(true)).typed("int"))
            .with_decl(TypeDecl::new("T").with_field(f("x", "Nope")));

        let err = build(vec![main]).unwrap_err();
        let codes: Vec<_> = err.clone().into_errors().iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec!["E501", "E401", "E201"]);
        assert!(err.to_string().starts_with("3 compile errors:"));
    }

    #[test]
    fn test_spread_copies_inline_objects_once() {
        let main = SourceFile::new("main.vdl")
            .with_decl(TypeDecl::new("Base").with_field(FieldDecl::new(
                "meta",
                TypeExpr::object(vec![f("tag", "string")]),
            )))
            .with_decl(TypeDecl::new("Child").with_spread("Base"));

        let ir = build(vec![main]).unwrap().ir;
        let child = ir.get_type("Child").unwrap();
        assert_eq!(
            child.fields[0].type_ref.object_name.as_deref(),
            Some("BaseMeta")
        );
        let names: Vec<_> = ir.inline_objects().iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["BaseMeta"]);
        assert_eq!(
            field_type(&child.fields, "meta").map(|t| t.kind),
            Some(TypeKind::Object)
        );
        assert_eq!(
            field_type(child.fields[0].type_ref.object_fields.as_deref().unwrap(), "tag"),
            Some(&TypeRef::primitive(Primitive::String))
        );
    }
}
