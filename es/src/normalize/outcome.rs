//! Tool outcome boundary type
//!
//! Tools hand back either a structured [`ToolResult`] or an arbitrary JSON
//! value. Everything downstream inspects results through [`ToolOutcome`]
//! rather than probing for fields.

use std::fmt;

use serde_json::Value;

use super::NormalizeError;
use crate::events::ToolResult;

/// What a tool returned
#[derive(Clone, Debug, PartialEq)]
pub enum ToolOutcome {
    /// Result with output/error/system/base64_image/url fields
    Structured(ToolResult),
    /// Any other value (plain text, a map, a list...)
    Raw(Value),
}

impl ToolOutcome {
    pub fn as_structured(&self) -> Option<&ToolResult> {
        match self {
            ToolOutcome::Structured(result) => Some(result),
            ToolOutcome::Raw(_) => None,
        }
    }

    /// The structured result, or an error naming the tool that required it
    pub fn structured(&self, tool: &str) -> Result<&ToolResult, NormalizeError> {
        self.as_structured().ok_or_else(|| NormalizeError::UnstructuredResult {
            tool: tool.to_string(),
        })
    }

    /// Output text of a structured result, else the display form
    pub fn text(&self) -> String {
        match self {
            ToolOutcome::Structured(result) => result.output.clone().unwrap_or_default(),
            ToolOutcome::Raw(value) => value_text(value),
        }
    }

    /// Output of a code execution: `output` when structured, the
    /// `observation` entry of a map, else the display form
    pub fn observation(&self) -> String {
        match self {
            ToolOutcome::Structured(result) => result.output.clone().unwrap_or_default(),
            ToolOutcome::Raw(Value::Object(map)) => map.get("observation").map(value_text).unwrap_or_default(),
            ToolOutcome::Raw(value) => value_text(value),
        }
    }

    /// Structured view of any outcome; raw values become the output text
    pub fn to_tool_result(&self) -> ToolResult {
        match self {
            ToolOutcome::Structured(result) => result.clone(),
            ToolOutcome::Raw(value) => ToolResult {
                output: Some(value_text(value)),
                ..Default::default()
            },
        }
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutcome::Structured(result) => fmt::Display::fmt(result, f),
            ToolOutcome::Raw(value) => f.write_str(&value_text(value)),
        }
    }
}

impl From<ToolResult> for ToolOutcome {
    fn from(result: ToolResult) -> Self {
        ToolOutcome::Structured(result)
    }
}

impl From<Value> for ToolOutcome {
    fn from(value: Value) -> Self {
        ToolOutcome::Raw(value)
    }
}

impl From<&str> for ToolOutcome {
    fn from(text: &str) -> Self {
        ToolOutcome::Raw(Value::String(text.to_string()))
    }
}

impl From<String> for ToolOutcome {
    fn from(text: String) -> Self {
        ToolOutcome::Raw(Value::String(text))
    }
}

/// Text form of a JSON value: strings verbatim, null empty, everything else as JSON
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
