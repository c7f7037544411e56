//! Typed access to a target's JSON options.

use serde_json::{Map, Value};

use crate::error::GeneratorError;

/// Read-only view of a target's options.
///
/// `null` reads as an empty table; any other non-object value is rejected.
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    table: Option<&'a Map<String, Value>>,
}

impl<'a> Options<'a> {
    /// Wrap an options value.
    pub fn new(value: &'a Value) -> Result<Self, GeneratorError> {
        match value {
            Value::Null => Ok(Self { table: None }),
            Value::Object(table) => Ok(Self { table: Some(table) }),
            _ => Err(GeneratorError::invalid_option(
                "options",
                "expected a table of options",
            )),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.table.and_then(|t| t.get(key))
    }

    /// A boolean option, `default` when absent.
    pub fn bool(&self, key: &str, default: bool) -> Result<bool, GeneratorError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(GeneratorError::invalid_option(key, "expected a boolean")),
        }
    }

    /// A string option.
    pub fn string(&self, key: &str) -> Result<Option<&'a str>, GeneratorError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(GeneratorError::invalid_option(key, "expected a string")),
        }
    }

    /// A string option that must be present and non-empty.
    pub fn required_string(&self, key: &str) -> Result<&'a str, GeneratorError> {
        match self.string(key)? {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(GeneratorError::invalid_option(key, "is required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_and_values() {
        let value = json!({ "gen_consts": false, "package": "api" });
        let options = Options::new(&value).unwrap();

        assert!(!options.bool("gen_consts", true).unwrap());
        assert!(options.bool("gen_patterns", true).unwrap());
        assert_eq!(options.string("package").unwrap(), Some("api"));
        assert_eq!(options.required_string("package").unwrap(), "api");
    }

    #[test]
    fn test_null_is_empty() {
        let options = Options::new(&Value::Null).unwrap();
        assert!(options.bool("minify", false).is_ok());
        assert!(options.required_string("package").is_err());
    }

    #[test]
    fn test_wrong_shapes_rejected() {
        assert!(Options::new(&json!([1, 2])).is_err());

        let value = json!({ "minify": "yes", "package": 3 });
        let options = Options::new(&value).unwrap();
        assert!(matches!(
            options.bool("minify", false),
            Err(GeneratorError::InvalidOptions { key, .. }) if key == "minify"
        ));
        assert!(options.string("package").is_err());
    }
}
