//! Tool detail payloads
//!
//! [`ToolDetail`] is the tagged payload describing which tool produced an
//! event and that tool's structured input/output. It serializes as a
//! single-key object, `{"<tool kind>": <payload>}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw outcome surfaced by a tool, echoed into the relevant detail payload
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            ..Default::default()
        }
    }

    /// Create an error result
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_base64_image(mut self, image: impl Into<String>) -> Self {
        self.base64_image = Some(image.into());
        self
    }

    /// Untyped echo of the result (output, base64_image, error, system)
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let fields = [
            ("output", &self.output),
            ("base64_image", &self.base64_image),
            ("error", &self.error),
            ("system", &self.system),
        ];
        for (key, value) in fields {
            if let Some(v) = value {
                map.insert(key.to_string(), Value::String(v.clone()));
            }
        }
        map
    }
}

impl fmt::Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, &self.output) {
            (Some(error), _) => write!(f, "Error: {}", error),
            (None, Some(output)) => f.write_str(output),
            (None, None) => Ok(()),
        }
    }
}

/// Chat completion echoed by a `think` event
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateChatCompletion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Planning {
    pub command: String,
    pub result: ToolResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_status: Option<String>,
    /// Raw step titles as supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bash {
    pub command: String,
    pub result: String,
}

/// Browser action parameters plus the full tool result
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserUse {
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub result: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrReplaceEditor {
    pub command: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_line: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_range: Option<Vec<i64>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminateStatus {
    Success,
    Failure,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Terminate {
    pub result: String,
    pub status: TerminateStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PythonExecute {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CosUpload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
}

/// Upload details; the result is kept as a plain map
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct R2Upload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployWebsite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
}

/// Fields derived from a website verification report
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyWebsite {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_count: Option<i64>,
}

/// Detail for a tool with no dedicated payload: `{<tool name>: <args>}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtherDetail(Map<String, Value>);

impl OtherDetail {
    pub fn new(tool: impl Into<String>, args: Value) -> Self {
        let mut map = Map::new();
        map.insert(tool.into(), args);
        Self(map)
    }

    /// Name of the tool this detail is keyed by
    pub fn tool(&self) -> Option<&str> {
        self.0.keys().next().map(String::as_str)
    }

    /// The raw call arguments
    pub fn args(&self) -> Option<&Value> {
        self.0.values().next()
    }
}

/// Tagged tool payload: exactly one kind per event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolDetail {
    CreateChatCompletion(CreateChatCompletion),
    Planning(Planning),
    Bash(Bash),
    BrowserUse(BrowserUse),
    WebSearch(WebSearch),
    StrReplaceEditor(StrReplaceEditor),
    Terminate(Terminate),
    PythonExecute(PythonExecute),
    CosUpload(CosUpload),
    #[serde(rename = "r2_upload")]
    R2Upload(R2Upload),
    DeployWebsite(DeployWebsite),
    VerifyWebsite(VerifyWebsite),
    /// Final answer text
    Finish(String),
    #[serde(untagged)]
    Other(OtherDetail),
}

impl ToolDetail {
    /// Key under which this payload is serialized
    pub fn kind(&self) -> &str {
        match self {
            ToolDetail::CreateChatCompletion(_) => "create_chat_completion",
            ToolDetail::Planning(_) => "planning",
            ToolDetail::Bash(_) => "bash",
            ToolDetail::BrowserUse(_) => "browser_use",
            ToolDetail::WebSearch(_) => "web_search",
            ToolDetail::StrReplaceEditor(_) => "str_replace_editor",
            ToolDetail::Terminate(_) => "terminate",
            ToolDetail::PythonExecute(_) => "python_execute",
            ToolDetail::CosUpload(_) => "cos_upload",
            ToolDetail::R2Upload(_) => "r2_upload",
            ToolDetail::DeployWebsite(_) => "deploy_website",
            ToolDetail::VerifyWebsite(_) => "verify_website",
            ToolDetail::Finish(_) => "finish",
            ToolDetail::Other(other) => other.tool().unwrap_or_default(),
        }
    }
}
