//! Typed access to tool call arguments

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::NormalizeError;

/// Call arguments known to be a JSON object
pub(crate) struct Args<'a> {
    tool: &'a str,
    map: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    pub fn new(tool: &'a str, args: &'a Value) -> Result<Self, NormalizeError> {
        match args {
            Value::Object(map) => Ok(Self { tool, map }),
            other => Err(NormalizeError::ArgsNotObject {
                tool: tool.to_string(),
                found: json_kind(other),
            }),
        }
    }

    /// Raw value of a field; null counts as absent
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// Typed copy of an optional field
    pub fn opt<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, NormalizeError> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| self.invalid(field, e.to_string())),
        }
    }

    /// String field, empty when absent
    pub fn string_or_empty(&self, field: &str) -> Result<String, NormalizeError> {
        Ok(self.opt::<String>(field)?.unwrap_or_default())
    }

    /// Integer field that may also arrive as a decimal string
    pub fn integer(&self, field: &str) -> Result<Option<i64>, NormalizeError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(field, format!("{} is not an integer", n))),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|e| self.invalid(field, e.to_string())),
            Some(other) => Err(self.invalid(field, format!("expected an integer, got {}", json_kind(other)))),
        }
    }

    fn invalid(&self, field: &str, reason: String) -> NormalizeError {
        NormalizeError::InvalidArgument {
            tool: self.tool.to_string(),
            field: field.to_string(),
            reason,
        }
    }
}

/// JSON type name for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
