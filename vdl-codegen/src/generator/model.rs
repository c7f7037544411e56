//! Flattened views of the IR shared by the emitters.

use vdl_ir::{Deprecation, FieldDef, IrSchema};

/// A named record with fields: a declared type, an inline object, or the
/// input or output of an operation.
#[derive(Debug, Clone)]
pub struct RecordView<'a> {
    pub name: String,
    pub doc: Option<&'a str>,
    pub deprecated: Option<&'a Deprecation>,
    pub fields: &'a [FieldDef],
}

/// Whether an operation is a procedure or a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Proc,
    Stream,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Proc => "proc",
            OperationKind::Stream => "stream",
        }
    }
}

/// A procedure or stream with its owning RPC.
#[derive(Debug, Clone)]
pub struct OperationView<'a> {
    pub rpc: &'a str,
    pub name: &'a str,
    pub kind: OperationKind,
    pub doc: Option<&'a str>,
    pub deprecated: Option<&'a Deprecation>,
}

impl OperationView<'_> {
    pub fn input_name(&self) -> String {
        format!("{}{}Input", self.rpc, self.name)
    }

    pub fn output_name(&self) -> String {
        format!("{}{}Output", self.rpc, self.name)
    }

    pub fn path(&self) -> String {
        vdl_ir::route_path(self.rpc, self.name)
    }
}

/// Every record in emission order: declared types, inline objects, then
/// procedure and stream inputs and outputs.
pub fn records(schema: &IrSchema) -> Vec<RecordView<'_>> {
    let mut out: Vec<RecordView<'_>> = schema
        .types
        .iter()
        .map(|ty| RecordView {
            name: ty.name.clone(),
            doc: ty.doc.as_deref(),
            deprecated: ty.deprecated.as_ref(),
            fields: &ty.fields,
        })
        .collect();

    out.extend(schema.inline_objects().into_iter().map(|obj| RecordView {
        name: obj.name.to_string(),
        doc: None,
        deprecated: None,
        fields: obj.fields,
    }));

    let io = schema
        .procedures
        .iter()
        .map(|p| (&p.rpc_name, &p.name, &p.input, &p.output))
        .chain(
            schema
                .streams
                .iter()
                .map(|s| (&s.rpc_name, &s.name, &s.input, &s.output)),
        );
    for (rpc, name, input, output) in io {
        out.push(RecordView {
            name: format!("{rpc}{name}Input"),
            doc: None,
            deprecated: None,
            fields: input,
        });
        out.push(RecordView {
            name: format!("{rpc}{name}Output"),
            doc: None,
            deprecated: None,
            fields: output,
        });
    }
    out
}

/// Operations of one RPC, procedures first.
pub fn operations<'a>(schema: &'a IrSchema, rpc: &str) -> Vec<OperationView<'a>> {
    let procs = schema
        .procedures
        .iter()
        .filter(|p| p.rpc_name == rpc)
        .map(|p| OperationView {
            rpc: &p.rpc_name,
            name: &p.name,
            kind: OperationKind::Proc,
            doc: p.doc.as_deref(),
            deprecated: p.deprecated.as_ref(),
        });
    let streams = schema
        .streams
        .iter()
        .filter(|s| s.rpc_name == rpc)
        .map(|s| OperationView {
            rpc: &s.rpc_name,
            name: &s.name,
            kind: OperationKind::Stream,
            doc: s.doc.as_deref(),
            deprecated: s.deprecated.as_ref(),
        });
    procs.chain(streams).collect()
}

/// Every operation, grouped by RPC in declaration order.
pub fn all_operations(schema: &IrSchema) -> Vec<OperationView<'_>> {
    schema
        .rpcs
        .iter()
        .flat_map(|rpc| operations(schema, &rpc.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdl_ir::{Primitive, ProcedureDef, RpcDef, StreamDef, TypeDef, TypeRef};

    fn schema() -> IrSchema {
        let mut schema = IrSchema::new();
        schema.types.push(TypeDef::new(
            "User",
            vec![FieldDef::new(
                "address",
                TypeRef::object(
                    "UserAddress",
                    vec![FieldDef::new("city", TypeRef::primitive(Primitive::String))],
                ),
            )],
        ));
        schema.rpcs.push(RpcDef {
            name: "Users".into(),
            doc: None,
            deprecated: None,
            procs: Vec::new(),
            streams: Vec::new(),
            docs: Vec::new(),
        });
        schema.procedures.push(ProcedureDef {
            name: "Get".into(),
            rpc_name: "Users".into(),
            doc: None,
            deprecated: None,
            input: Vec::new(),
            output: Vec::new(),
        });
        schema.streams.push(StreamDef {
            name: "Watch".into(),
            rpc_name: "Users".into(),
            doc: None,
            deprecated: None,
            input: Vec::new(),
            output: Vec::new(),
        });
        schema
    }

    #[test]
    fn test_record_order() {
        let schema = schema();
        let names: Vec<String> = records(&schema).into_iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "User",
                "UserAddress",
                "UsersGetInput",
                "UsersGetOutput",
                "UsersWatchInput",
                "UsersWatchOutput"
            ]
        );
    }

    #[test]
    fn test_operations_procs_first() {
        let schema = schema();
        let ops = all_operations(&schema);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].kind, OperationKind::Proc);
        assert_eq!(ops[1].path(), "/Users/Watch");
        assert_eq!(ops[1].output_name(), "UsersWatchOutput");
    }
}
