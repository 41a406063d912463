//! JSONL feed of agent activity
//!
//! Each line is one [`FeedRecord`], tagged by `kind`:
//!
//! ```text
//! {"kind":"tool_result","tool":"bash","args":{"command":"ls"},"raw":"a.txt"}
//! {"kind":"plan_update","args":{"command":"create","steps":["a","b"]},"raw":"ok"}
//! {"kind":"think","content":"list files first"}
//! {"kind":"complete","result":"done"}
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::events::{Event, EventEmitter, ToolResult};
use crate::normalize::{NormalizeError, ToolOutcome};

fn empty_args() -> Value {
    Value::Object(Map::new())
}

fn default_success() -> bool {
    true
}

/// A tool call as recorded by the agent loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,

    #[serde(default = "empty_args")]
    pub args: Value,

    /// Structured result; takes precedence over `raw`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,

    /// Any other returned value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,

    #[serde(default = "default_success")]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
}

impl ToolCall {
    pub fn outcome(&self) -> ToolOutcome {
        outcome_of(&self.result, &self.raw)
    }
}

/// A planning tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCall {
    #[serde(default = "empty_args")]
    pub args: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl PlanCall {
    pub fn outcome(&self) -> ToolOutcome {
        outcome_of(&self.result, &self.raw)
    }
}

fn outcome_of(result: &Option<ToolResult>, raw: &Option<Value>) -> ToolOutcome {
    match (result, raw) {
        (Some(result), _) => ToolOutcome::Structured(result.clone()),
        (None, Some(raw)) => ToolOutcome::Raw(raw.clone()),
        (None, None) => ToolOutcome::Raw(Value::Null),
    }
}

/// One line of a feed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedRecord {
    ToolResult(ToolCall),
    ToolUsed(ToolCall),
    PlanUpdate(PlanCall),
    Think {
        content: String,
    },
    Error {
        message: String,
    },
    Complete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<String>,
    },
}

impl FeedRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedRecord::ToolResult(_) => "tool_result",
            FeedRecord::ToolUsed(_) => "tool_used",
            FeedRecord::PlanUpdate(_) => "plan_update",
            FeedRecord::Think { .. } => "think",
            FeedRecord::Error { .. } => "error",
            FeedRecord::Complete { .. } => "complete",
        }
    }
}

/// Run a record through the emitter, appending its event(s) to the bus
///
/// Returns the primary event. A record the normalizer rejects appends nothing.
pub fn apply(record: &FeedRecord, emitter: &EventEmitter) -> Result<Arc<Event>, NormalizeError> {
    debug!(kind = record.kind(), "feed::apply: called");
    match record {
        FeedRecord::ToolResult(call) => {
            let outcome = call.outcome();
            match &call.plan_id {
                Some(plan_id) => emitter
                    .for_plan(plan_id.clone())
                    .tool_result(&call.tool, &call.args, &outcome, call.success),
                None => emitter.tool_result(&call.tool, &call.args, &outcome, call.success),
            }
        }
        FeedRecord::ToolUsed(call) => emitter.tool_used(&call.tool, &call.args, &call.outcome(), call.success),
        FeedRecord::PlanUpdate(call) => emitter.plan_update(&call.args, &call.outcome()),
        FeedRecord::Think { content } => Ok(emitter.think(content)),
        FeedRecord::Error { message } => Ok(emitter.error(message)),
        FeedRecord::Complete { result } => Ok(emitter.complete(result.as_deref())),
    }
}

/// Parse feed records from JSONL text; blank lines are skipped, bad lines logged and skipped
pub fn parse_feed(content: &str) -> Vec<FeedRecord> {
    let mut records = Vec::new();

    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<FeedRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(line = number + 1, error = %e, "parse_feed: failed to parse record");
            }
        }
    }

    debug!(count = records.len(), "parse_feed: loaded records");
    records
}

/// Read a feed file
pub fn read_feed(path: impl AsRef<Path>) -> Result<Vec<FeedRecord>> {
    let path = path.as_ref();
    debug!(?path, "read_feed: reading feed file");

    let content = fs::read_to_string(path).context(format!("Failed to read feed {}", path.display()))?;
    Ok(parse_feed(&content))
}
