//! Configuration management for the CLI.
//!
//! This module loads the project manifest (`vdl.toml`) and turns its
//! `[[targets]]` entries into validated [`TargetSpec`]s.

use crate::error::{CliError, CliResult, ConfigError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vdl_codegen::plugin::DEFAULT_TIMEOUT;
use vdl_codegen::{TargetKind, TargetSpec};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "vdl.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path of the main parsed source, relative to the manifest.
    pub schema: PathBuf,

    /// Values shared by every target.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Configured targets, in run order.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,

    /// Directory containing the manifest. Filled in by [`ConfigManager::load`].
    #[serde(skip)]
    pub root: PathBuf,
}

/// Defaults applied to targets that do not override them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Plugin timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// One `[[targets]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Name shown in logs and the failure summary.
    pub name: Option<String>,

    /// Output root, relative to the manifest.
    pub output: PathBuf,

    /// Remove the output root before writing.
    #[serde(default)]
    pub clean: bool,

    /// Built-in generator id.
    pub generator: Option<String>,

    /// External plugin.
    pub plugin: Option<PluginConfig>,

    /// Options passed verbatim to the generator or plugin.
    pub options: Option<toml::Table>,
}

/// `[targets.plugin]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Program followed by its leading arguments.
    pub command: Vec<String>,

    /// Extra literal arguments.
    #[serde(default)]
    pub args: Vec<String>,

    /// Overrides `defaults.timeout_secs`.
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Absolute or manifest-relative path of the main schema.
    pub fn schema_path(&self) -> PathBuf {
        self.root.join(&self.schema)
    }

    /// Validate every target and convert it into a [`TargetSpec`].
    pub fn target_specs(&self) -> Result<Vec<TargetSpec>, ConfigError> {
        if self.defaults.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "defaults.timeout_secs",
                "must be greater than zero",
            ));
        }

        let mut names = BTreeSet::new();
        let mut specs = Vec::with_capacity(self.targets.len());

        for (index, target) in self.targets.iter().enumerate() {
            let spec = self.target_spec(index, target)?;
            if !names.insert(spec.name.clone()) {
                return Err(ConfigError::invalid_value(
                    format!("targets[{index}].name"),
                    format!("duplicate target name '{}'", spec.name),
                ));
            }
            specs.push(spec);
        }

        Ok(specs)
    }

    fn target_spec(&self, index: usize, target: &TargetConfig) -> Result<TargetSpec, ConfigError> {
        let key = format!("targets[{index}]");
        let output = self.root.join(&target.output);

        let spec = match (&target.generator, &target.plugin) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::invalid_value(
                    key,
                    "set either 'generator' or 'plugin', not both",
                ))
            }
            (None, None) => {
                return Err(ConfigError::invalid_value(
                    key,
                    "one of 'generator' or 'plugin' is required",
                ))
            }
            (Some(generator), None) => {
                if generator.is_empty() {
                    return Err(ConfigError::invalid_value(
                        format!("{key}.generator"),
                        "must not be empty",
                    ));
                }
                let name = target.name.clone().unwrap_or_else(|| generator.clone());
                let options = match &target.options {
                    Some(table) => table_to_json(&format!("{key}.options"), table)?,
                    None => Value::Null,
                };
                TargetSpec::builtin(name, output, generator.clone()).with_options(options)
            }
            (None, Some(plugin)) => {
                let command = self.plugin_command(&key, plugin)?;
                let name = match &target.name {
                    Some(name) => name.clone(),
                    None => default_plugin_name(&plugin.command[0]),
                };
                let timeout_secs = plugin.timeout_secs.unwrap_or(self.defaults.timeout_secs);
                if timeout_secs == 0 {
                    return Err(ConfigError::invalid_value(
                        format!("{key}.plugin.timeout_secs"),
                        "must be greater than zero",
                    ));
                }
                let options = match &target.options {
                    Some(table) => table_to_json(&format!("{key}.options"), table)?,
                    None => Value::Object(Default::default()),
                };
                TargetSpec {
                    name,
                    output,
                    clean: false,
                    kind: TargetKind::Plugin {
                        command,
                        args: plugin.args.clone(),
                        options,
                        timeout: Duration::from_secs(timeout_secs),
                    },
                }
            }
        };

        if spec.name.is_empty() {
            return Err(ConfigError::invalid_value(format!("{key}.name"), "must not be empty"));
        }

        Ok(spec.with_clean(target.clean))
    }

    /// Relative program paths such as `./plugins/gen.sh` resolve against
    /// the manifest directory; bare names are looked up on `PATH`.
    fn plugin_command(&self, key: &str, plugin: &PluginConfig) -> Result<Vec<String>, ConfigError> {
        let Some(program) = plugin.command.first() else {
            return Err(ConfigError::invalid_value(
                format!("{key}.plugin.command"),
                "must not be empty",
            ));
        };
        if program.is_empty() {
            return Err(ConfigError::invalid_value(
                format!("{key}.plugin.command"),
                "program must not be empty",
            ));
        }

        let mut command = plugin.command.clone();
        let path = Path::new(program);
        if program.contains('/') && path.is_relative() {
            command[0] = self.root.join(path).to_string_lossy().into_owned();
        }
        Ok(command)
    }
}

fn default_plugin_name(program: &str) -> String {
    Path::new(program)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

// =============================================================================
// TOML to JSON
// =============================================================================

fn table_to_json(key: &str, table: &toml::Table) -> Result<Value, ConfigError> {
    let mut map = serde_json::Map::new();
    for (name, value) in table {
        map.insert(name.clone(), toml_to_json(&format!("{key}.{name}"), value)?);
    }
    Ok(Value::Object(map))
}

fn toml_to_json(key: &str, value: &toml::Value) -> Result<Value, ConfigError> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| {
                ConfigError::invalid_value(key, "non-finite numbers are not valid JSON")
            })?,
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| toml_to_json(&format!("{key}[{i}]"), item))
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => table_to_json(key, table)?,
    })
}

// =============================================================================
// Loading
// =============================================================================

/// Configuration manager for loading manifests.
pub struct ConfigManager;

impl ConfigManager {
    /// Load and validate the manifest at `path`.
    ///
    /// If the path is None, loads `vdl.toml` from the current directory.
    /// Unlike generator options, a missing manifest is an error.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            return Err(ConfigError::not_found(config_path).into());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let root = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::parse(&content, &config_path, root)
    }

    /// Parse manifest text, resolving paths against `root`.
    pub fn parse(content: &str, path: &Path, root: PathBuf) -> CliResult<Config> {
        let mut config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::invalid_toml(path, e.to_string()))?;
        config.root = root;
        config.target_specs()?;
        Ok(config)
    }

    /// Keep only the targets named in `names`, in configuration order.
    ///
    /// An empty selection keeps every target.
    pub fn select_targets(specs: Vec<TargetSpec>, names: &[String]) -> CliResult<Vec<TargetSpec>> {
        if names.is_empty() {
            return Ok(specs);
        }

        if let Some(unknown) = names.iter().find(|n| !specs.iter().any(|s| &s.name == *n)) {
            let available: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
            return Err(CliError::usage(format!(
                "unknown target '{unknown}' (available: {})",
                available.join(", ")
            )));
        }

        Ok(specs.into_iter().filter(|s| names.contains(&s.name)).collect())
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# vdl project manifest

# Parsed schema entry point. Includes are resolved relative to this file.
schema = "schema/main.vdl.json"

[defaults]
# Seconds a plugin may run before it is killed
timeout_secs = 30

# Built-in TypeScript generator
[[targets]]
name = "typescript"
generator = "typescript"
output = "gen/ts"
# Remove the output directory before writing
clean = false

[targets.options]
gen_consts = true
gen_patterns = true
gen_catalog = true
import_extension = ""

# Built-in Go generator
[[targets]]
name = "go"
generator = "go"
output = "gen/go"

[targets.options]
package = "schema"

# Raw IR as JSON
[[targets]]
name = "ir"
generator = "ir"
output = "gen/ir"

# External plugin: reads a JSON request on stdin, writes {"files": [...]} to stdout
# [[targets]]
# name = "docs"
# output = "gen/docs"
#
# [targets.plugin]
# command = ["./plugins/docs.sh"]
# args = []
# timeout_secs = 60
#
# [targets.options]
# title = "API"
"#
    }
}
