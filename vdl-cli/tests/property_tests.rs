//! Property-based tests for vdl-cli.
//!
//! Properties tested:
//! - Target options in the manifest reach the generator unchanged
//! - Target selection keeps configuration order and never invents targets

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use serde_json::Value;

use vdl_cli::ConfigManager;
use vdl_codegen::{TargetKind, TargetSpec};

// =============================================================================
// Generators for property tests
// =============================================================================

#[derive(Debug, Clone)]
enum Scalar {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Scalar {
    fn toml(&self) -> String {
        match self {
            Scalar::Int(i) => i.to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Str(s) => format!("\"{s}\""),
        }
    }

    fn json(&self) -> Value {
        match self {
            Scalar::Int(i) => Value::from(*i),
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Str(s) => Value::String(s.clone()),
        }
    }
}

fn arb_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        (-1_000_000_000i64..1_000_000_000).prop_map(Scalar::Int),
        any::<bool>().prop_map(Scalar::Bool),
        "[a-zA-Z0-9 _./-]{0,12}".prop_map(Scalar::Str),
    ]
}

fn arb_options() -> impl Strategy<Value = BTreeMap<String, Vec<Scalar>>> {
    prop::collection::btree_map("[a-z][a-z_]{0,7}", prop::collection::vec(arb_scalar(), 1..4), 0..6)
}

fn arb_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{1,6}", 1..6).prop_map(|set| set.into_iter().collect())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Single-element lists become scalars; longer ones stay arrays.
    #[test]
    fn prop_options_pass_through(options in arb_options()) {
        let mut manifest = String::from(concat!(
            "schema = \"main.vdl.json\"\n\n",
            "[[targets]]\noutput = \"out\"\n\n",
            "[targets.plugin]\ncommand = [\"gen\"]\n\n",
            "[targets.options]\n",
        ));
        let mut expected = serde_json::Map::new();
        for (key, values) in &options {
            if let [single] = values.as_slice() {
                manifest.push_str(&format!("{key} = {}\n", single.toml()));
                expected.insert(key.clone(), single.json());
            } else {
                let items: Vec<String> = values.iter().map(Scalar::toml).collect();
                manifest.push_str(&format!("{key} = [{}]\n", items.join(", ")));
                let items = values.iter().map(Scalar::json).collect();
                expected.insert(key.clone(), Value::Array(items));
            }
        }

        let config =
            ConfigManager::parse(&manifest, Path::new("vdl.toml"), PathBuf::from(".")).unwrap();
        let specs = config.target_specs().unwrap();
        let TargetKind::Plugin { options: actual, .. } = &specs[0].kind else {
            panic!("expected plugin target");
        };
        prop_assert_eq!(actual, &Value::Object(expected));
    }

    #[test]
    fn prop_selection_preserves_order(
        names in arb_names(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..6)
    ) {
        let specs: Vec<TargetSpec> = names
            .iter()
            .map(|n| TargetSpec::builtin(n.clone(), n.clone(), "ir"))
            .collect();
        let wanted: Vec<String> =
            picks.iter().map(|i| names[i.index(names.len())].clone()).collect();

        let selected = ConfigManager::select_targets(specs, &wanted).unwrap();
        let selected: Vec<&str> = selected.iter().map(|s| s.name.as_str()).collect();

        let expected: Vec<&str> = if wanted.is_empty() {
            names.iter().map(String::as_str).collect()
        } else {
            names.iter().filter(|n| wanted.contains(n)).map(String::as_str).collect()
        };
        prop_assert_eq!(selected, expected);
    }
}
