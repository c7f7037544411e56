//! Property-based tests for vdl-ir.
//!
//! Properties tested:
//! - Pattern placeholders are unique and ordered by first occurrence
//! - Interpolation replaces every occurrence
//! - Spread chains inline ancestors before local fields
//! - Topological order places dependencies first
//! - Encoding then decoding a record preserves it, across enums, maps,
//!   datetimes, nested and inline records, and multi-dimensional arrays

use std::collections::{BTreeMap, HashMap};

use chrono::{FixedOffset, TimeZone, Utc};
use proptest::prelude::*;

use vdl_ir::ast::{FieldDecl, SourceFile, TypeDecl, TypeExpr};
use vdl_ir::pattern;
use vdl_ir::{
    Codec, DependencyGraph, EnumDef, EnumMember, EnumType, FieldDef, IrBuilder, IrSchema,
    MemoryLoader, Primitive, Record, TypeDef, TypeRef, Value,
};

// =============================================================================
// Generators for property tests
// =============================================================================

fn arb_identifier() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,8}"
}

fn arb_literal() -> impl Strategy<Value = String> {
    "[a-z0-9/:. -]{0,6}"
}

/// A template along with the placeholder names it uses, in order of use.
fn arb_template() -> impl Strategy<Value = (String, Vec<String>)> {
    let names = prop::sample::select(vec!["a", "b", "id", "userId"]);
    prop::collection::vec((arb_literal(), names), 0..8)
        .prop_map(|parts| {
            let mut template = String::new();
            let mut used = Vec::new();
            for (literal, name) in parts {
                template.push_str(&literal);
                template.push('{');
                template.push_str(name);
                template.push('}');
                used.push(name.to_string());
            }
            (template, used)
        })
}

fn arb_int_enum() -> impl Strategy<Value = Value> {
    prop_oneof![Just(1i64), Just(10), -50i64..50].prop_map(|n| {
        let member = match n {
            1 => Some("Low"),
            10 => Some("High"),
            _ => None,
        };
        Value::Enum {
            member: member.map(str::to_string),
            literal: n.to_string(),
        }
    })
}

fn arb_string_enum() -> impl Strategy<Value = Value> {
    prop_oneof![Just("admin".to_string()), Just("guest".to_string()), "[a-z]{0,6}"].prop_map(
        |literal| {
            let member = match literal.as_str() {
                "admin" => Some("Admin"),
                "guest" => Some("Guest"),
                _ => None,
            };
            Value::Enum {
                member: member.map(str::to_string),
                literal,
            }
        },
    )
}

fn arb_datetime() -> impl Strategy<Value = Value> {
    (0i64..4_000_000_000, 0u32..1_000_000_000, -720i32..840).prop_filter_map(
        "representable datetime",
        |(secs, nanos, offset_minutes)| {
            let offset = FixedOffset::east_opt(offset_minutes * 60)?;
            let instant = Utc.timestamp_opt(secs, nanos).single()?;
            Some(Value::Datetime(instant.with_timezone(&offset)))
        },
    )
}

fn arb_owner() -> impl Strategy<Value = Value> {
    ("[a-zA-Z ]{0,8}", prop::option::of(arb_string_enum())).prop_map(|(name, role)| {
        let mut owner = Record::new("Owner").with("name", Value::String(name));
        if let Some(role) = role {
            owner = owner.with("role", role);
        }
        Value::Object(owner)
    })
}

fn arb_meta() -> impl Strategy<Value = Value> {
    (
        ".{0,8}",
        prop::option::of(prop::collection::btree_map("[a-z]{1,4}", any::<bool>(), 0..4)),
    )
        .prop_map(|(note, flags)| {
            let mut meta = Record::new("SampleMeta").with("note", Value::String(note));
            if let Some(flags) = flags {
                let flags = flags.into_iter().map(|(k, v)| (k, Value::Bool(v))).collect();
                meta = meta.with("flags", Value::Map(flags));
            }
            Value::Object(meta)
        })
}

fn arb_grid() -> impl Strategy<Value = Value> {
    prop::collection::vec(prop::collection::vec(any::<i64>(), 0..3), 0..3).prop_map(|rows| {
        Value::Array(
            rows.into_iter()
                .map(|row| Value::Array(row.into_iter().map(Value::Int).collect()))
                .collect(),
        )
    })
}

fn arb_record() -> impl Strategy<Value = Record> {
    let scalars = (
        any::<i64>(),
        -1.0e9f64..1.0e9f64,
        ".{0,12}",
        any::<bool>(),
        prop::option::of(prop::collection::vec(any::<i32>(), 0..4)),
        arb_int_enum(),
    );
    let nested = (
        prop::option::of(arb_owner()),
        prop::option::of(arb_datetime()),
        prop::option::of(prop::collection::btree_map("[a-z]{1,4}", any::<i64>(), 0..4)),
        prop::option::of(arb_meta()),
        prop::option::of(arb_grid()),
    );
    (scalars, nested).prop_map(
        |((count, ratio, label, active, tags, priority), (owner, seen_at, scores, meta, grid))| {
            let mut record = Record::new("Sample")
                .with("count", Value::Int(count))
                .with("ratio", Value::Float(ratio))
                .with("label", Value::String(label))
                .with("active", Value::Bool(active))
                .with("priority", priority);
            if let Some(tags) = tags {
                record = record.with(
                    "tags",
                    Value::Array(tags.into_iter().map(|t| Value::Int(t.into())).collect()),
                );
            }
            if let Some(scores) = scores {
                let scores = scores.into_iter().map(|(k, v)| (k, Value::Int(v))).collect();
                record = record.with("scores", Value::Map(scores));
            }
            let nested = [("owner", owner), ("seen_at", seen_at), ("meta", meta), ("grid", grid)];
            for (name, value) in nested {
                if let Some(value) = value {
                    record = record.with(name, value);
                }
            }
            record
        },
    )
}

fn sample_schema() -> IrSchema {
    let mut schema = IrSchema::new();
    schema.enums.push(EnumDef {
        name: "Priority".into(),
        doc: None,
        deprecated: None,
        enum_type: EnumType::Int,
        members: vec![EnumMember::new("Low", "1"), EnumMember::new("High", "10")],
    });
    schema.enums.push(EnumDef {
        name: "Role".into(),
        doc: None,
        deprecated: None,
        enum_type: EnumType::String,
        members: vec![EnumMember::new("Admin", "admin"), EnumMember::new("Guest", "guest")],
    });
    schema.types.push(TypeDef::new(
        "Owner",
        vec![
            FieldDef::new("name", TypeRef::primitive(Primitive::String)),
            FieldDef::new("role", TypeRef::enumeration("Role", EnumType::String)).optional(),
        ],
    ));
    let meta = vec![
        FieldDef::new("note", TypeRef::primitive(Primitive::String)),
        FieldDef::new("flags", TypeRef::map(TypeRef::primitive(Primitive::Bool))).optional(),
    ];
    schema.types.push(TypeDef::new(
        "Sample",
        vec![
            FieldDef::new("count", TypeRef::primitive(Primitive::Int)),
            FieldDef::new("ratio", TypeRef::primitive(Primitive::Float)),
            FieldDef::new("label", TypeRef::primitive(Primitive::String)),
            FieldDef::new("active", TypeRef::primitive(Primitive::Bool)),
            FieldDef::new("tags", TypeRef::array(TypeRef::primitive(Primitive::Int))).optional(),
            FieldDef::new("priority", TypeRef::enumeration("Priority", EnumType::Int)),
            FieldDef::new("owner", TypeRef::named("Owner")).optional(),
            FieldDef::new("seen_at", TypeRef::primitive(Primitive::Datetime)).optional(),
            FieldDef::new("scores", TypeRef::map(TypeRef::primitive(Primitive::Int))).optional(),
            FieldDef::new("meta", TypeRef::object("SampleMeta", meta)).optional(),
            FieldDef::new(
                "grid",
                TypeRef::array(TypeRef::array(TypeRef::primitive(Primitive::Int))),
            )
            .optional(),
        ],
    ));
    schema
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_placeholders_first_occurrence((template, used) in arb_template()) {
        let placeholders = pattern::compile(&template).unwrap();

        let mut expected: Vec<String> = Vec::new();
        for name in used {
            if !expected.contains(&name) {
                expected.push(name);
            }
        }
        prop_assert_eq!(placeholders, expected);
    }

    #[test]
    fn prop_interpolation_replaces_all((template, used) in arb_template()) {
        let values: HashMap<&str, String> =
            used.iter().map(|n| (n.as_str(), format!("<{n}>"))).collect();
        let out = pattern::interpolate::<()>(&template, |name| {
            values.get(name).cloned().ok_or(())
        })
        .unwrap();

        prop_assert!(!out.contains('{'), "output still contains '{{': {}", out);
        prop_assert_eq!(out.matches('<').count(), used.len());
    }

    #[test]
    fn prop_spread_chain_order(names in prop::collection::hash_set(arb_identifier(), 1..6)) {
        let fields: Vec<String> = names.into_iter().collect();
        let mut file = SourceFile::new("main.vdl");
        // T0 <- T1 <- ... each type spreads the previous one, declared in reverse.
        for (i, field) in fields.iter().enumerate().rev() {
            let mut ty = TypeDecl::new(format!("T{i}"))
                .with_field(FieldDecl::new(field.clone(), TypeExpr::named("string")));
            if i > 0 {
                ty = ty.with_spread(format!("T{}", i - 1));
            }
            file = file.with_decl(ty);
        }

        let ir = IrBuilder::new(MemoryLoader::new().with_file(file))
            .build("main.vdl")
            .unwrap()
            .ir;
        let last = ir.get_type(&format!("T{}", fields.len() - 1)).unwrap();
        let got: Vec<_> = last.fields.iter().map(|f| f.name.clone()).collect();
        prop_assert_eq!(got, fields);
    }

    #[test]
    fn prop_topological_order_respects_edges(
        edges in prop::collection::vec((1usize..12, 0usize..12), 0..30)
    ) {
        let mut graph = DependencyGraph::new();
        for i in 0..12 {
            graph.add_node(format!("N{i}"));
        }
        // Only edges to lower-numbered nodes, so the graph stays acyclic.
        let edges: Vec<_> = edges.into_iter().filter(|(a, b)| b < a).collect();
        for (a, b) in &edges {
            graph.add_edge(format!("N{a}"), format!("N{b}"));
        }

        let order = graph.topological_order().unwrap();
        let pos: BTreeMap<&str, usize> =
            order.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
        for (a, b) in &edges {
            prop_assert!(pos[format!("N{b}").as_str()] < pos[format!("N{a}").as_str()], "N{} must precede N{}", b, a);
        }
    }

    #[test]
    fn prop_codec_round_trip(record in arb_record()) {
        let schema = sample_schema();
        let codec = Codec::new(&schema);

        let json = codec.encode(&record);
        let decoded = codec.decode("Sample", &json).unwrap();
        prop_assert_eq!(&decoded, &record);
        prop_assert_eq!(codec.encode(&decoded), json);
    }
}
