//! Argument bag helpers and declared-parameter validation.
//!
//! ```rust
//! use ptooling::{ToolArgs, parse_arguments};
//!
//! let args = ToolArgs::from(parse_arguments(r#"{"coffee_type":"latte"}"#).expect("object should parse"));
//! assert_eq!(args.required_str("coffee_type").expect("present"), "latte");
//! assert_eq!(args.string_or("size", "medium"), "medium");
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ParameterKind, ToolError, ToolParameter};

pub type ArgumentMap = Map<String, Value>;

pub fn parse_arguments(args_json: &str) -> Result<ArgumentMap, ToolError> {
    let value: Value = serde_json::from_str(args_json)
        .map_err(|err| ToolError::bad_arguments(format!("invalid JSON arguments: {err}")))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ArgumentMap::new()),
        _ => Err(ToolError::bad_arguments("expected JSON object arguments")),
    }
}

/// Named arguments handed to a tool handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: ArgumentMap,
}

impl ToolArgs {
    pub fn new(values: ArgumentMap) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|value| !value.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn required_str(&self, key: &str) -> Result<&str, ToolError> {
        self.get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::bad_arguments(format!("missing required string: '{key}'")))
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    pub fn required_i64(&self, key: &str) -> Result<i64, ToolError> {
        self.get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| ToolError::bad_arguments(format!("missing required integer: '{key}'")))
    }

    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Deserializes the whole bag into a typed argument struct.
    pub fn deserialize<T>(&self) -> Result<T, ToolError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|err| ToolError::bad_arguments(err.to_string()))
    }

    pub fn as_map(&self) -> &ArgumentMap {
        &self.values
    }

    pub fn into_map(self) -> ArgumentMap {
        self.values
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

impl From<ArgumentMap> for ToolArgs {
    fn from(values: ArgumentMap) -> Self {
        Self::new(values)
    }
}

/// Checks `args` against declared parameters and fills in defaults.
///
/// Tools without declared parameters accept any bag unchanged. Undeclared
/// extra keys are passed through.
pub fn validate_arguments(
    parameters: &[ToolParameter],
    mut args: ArgumentMap,
) -> Result<ArgumentMap, ToolError> {
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for parameter in parameters {
        let accepted = match args.get(&parameter.name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(parameter.kind.accepts(value)),
        };

        match accepted {
            None if parameter.required => missing.push(parameter.name.as_str()),
            None => {
                if let Some(default) = &parameter.default {
                    args.insert(parameter.name.clone(), default.clone());
                }
            }
            Some(false) => mismatched.push(format!(
                "'{}' expected {}",
                parameter.name, parameter.kind
            )),
            Some(true) => {}
        }
    }

    if !missing.is_empty() {
        return Err(ToolError::bad_arguments(format!(
            "missing required parameters: {}",
            missing.join(", ")
        )));
    }

    if !mismatched.is_empty() {
        return Err(ToolError::bad_arguments(format!(
            "invalid parameter types: {}",
            mismatched.join(", ")
        )));
    }

    Ok(args)
}

impl ParameterKind {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Any => true,
        }
    }
}
