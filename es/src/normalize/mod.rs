//! Tool-result normalization
//!
//! Converts heterogeneous tool call data (tool name, JSON arguments, raw
//! outcome, success flag) into one canonical [`Event`]. Every entry point is a
//! pure function; appending to the bus is the caller's job (see
//! [`crate::events::EventEmitter`]).
//!
//! Unknown tool names are not an error: they produce a detail keyed by the
//! tool name holding the raw arguments. Argument or result shapes that do not
//! fit a known tool kind fail with [`NormalizeError`] and produce no event.

mod args;
mod error;
mod extract;
mod kinds;
mod outcome;
mod plan;

use serde_json::Value;
use tracing::debug;

use crate::events::{CreateChatCompletion, Event, EventType, Sender, ToolDetail};

pub use error::NormalizeError;
pub use extract::{VerifyReport, uploaded_file_count};
pub use outcome::{ToolOutcome, value_text};

/// Normalize a tool call into a `toolUsed` event
///
/// `plan_id` is attached to `web_search` events as their plan step.
pub fn tool_result(
    tool_name: &str,
    args: &Value,
    outcome: &ToolOutcome,
    success: bool,
    plan_id: &str,
) -> Result<Event, NormalizeError> {
    debug!(%tool_name, success, "normalize::tool_result: called");
    match tool_name {
        "web_search" => kinds::web_search(tool_name, args, outcome, success, plan_id),
        "browser_use" => kinds::browser_use(tool_name, args, outcome, success),
        "str_replace_editor" => kinds::str_replace_editor(tool_name, args, outcome, success),
        "bash" => kinds::bash(tool_name, args, outcome, success),
        "terminate" => Ok(kinds::terminate(tool_name, outcome, success)),
        "cos_upload" => kinds::cos_upload(tool_name, args, outcome, success),
        "r2_upload" => kinds::r2_upload(tool_name, args, outcome, success),
        "deploy_website" => kinds::deploy_website(tool_name, args, outcome, success),
        plan::PLANNING_TOOL => kinds::planning(tool_name, args, outcome, success),
        "python_execute" => kinds::python_execute(tool_name, args, outcome, success),
        "finish" => kinds::finish(tool_name, args, outcome),
        "verify_website" => kinds::verify_website(tool_name, outcome),
        _ => {
            debug!(%tool_name, "normalize::tool_result: no dedicated payload, using raw args");
            Ok(kinds::other(tool_name, args))
        }
    }
}

/// Like [`tool_result`], also naming the selected tool on the event
pub fn tool_used(tool_name: &str, args: &Value, outcome: &ToolOutcome, success: bool) -> Result<Event, NormalizeError> {
    let mut event = tool_result(tool_name, args, outcome, success, "")?;
    event.tool_selected = Some(vec![tool_name.to_string()]);
    Ok(event)
}

/// Normalize a planning tool call into a `planUpdate` event
pub fn plan_update(args: &Value, outcome: &ToolOutcome) -> Result<Event, NormalizeError> {
    debug!("normalize::plan_update: called");
    plan::plan_update(args, outcome)
}

/// Assistant thought, echoed as a chat completion
pub fn think(content: &str) -> Event {
    let mut event = Event::new(EventType::Think);
    event.content = Some(content.to_string());
    event.sender = Some(Sender::Assistant);
    event.tool_detail = Some(ToolDetail::CreateChatCompletion(CreateChatCompletion {
        result: Some(Value::String(content.to_string())),
        response: Some(Value::String(content.to_string())),
    }));
    event
}
