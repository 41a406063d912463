//! One normalizer per tool kind
//!
//! Each function maps a tool call's arguments and outcome onto a `toolUsed`
//! event carrying that kind's detail payload.

use serde_json::Value;

use super::args::Args;
use super::extract::{self, VerifyReport};
use super::outcome::{ToolOutcome, value_text};
use super::plan;
use super::NormalizeError;
use crate::events::{
    Bash, BrowserUse, CosUpload, DeployWebsite, Event, EventType, OtherDetail, PythonExecute, R2Upload,
    StrReplaceEditor, Terminate, TerminateStatus, ToolDetail, ToolStatus, VerifyWebsite, WebSearch,
};

/// Base `toolUsed` event: tool name, status from the success flag, display form as content
fn tool_used_event(tool: &str, outcome: &ToolOutcome, success: bool, detail: ToolDetail) -> Event {
    let mut event = Event::new(EventType::ToolUsed);
    event.tool = Some(tool.to_string());
    event.tool_status = Some(ToolStatus::from_success(success));
    event.content = Some(outcome.to_string());
    event.tool_detail = Some(detail);
    event
}

pub(crate) fn web_search(
    tool: &str,
    args: &Value,
    outcome: &ToolOutcome,
    success: bool,
    plan_id: &str,
) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;
    let result = outcome.structured(tool)?;

    let detail = WebSearch {
        query: args.opt("query")?,
        result: result.output.iter().cloned().collect(),
    };
    let mut event = tool_used_event(tool, outcome, success, ToolDetail::WebSearch(detail));
    event.plan_step_id = Some(plan_id.to_string());
    Ok(event)
}

pub(crate) fn browser_use(tool: &str, args: &Value, outcome: &ToolOutcome, success: bool) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;
    let result = outcome.structured(tool)?;

    let detail = BrowserUse {
        action: args.string_or_empty("action")?,
        url: args.opt("url")?,
        index: args.integer("index")?,
        text: args.opt("text")?,
        scroll_amount: args.integer("scroll_amount")?,
        tab_id: args.integer("tab_id")?,
        query: args.opt("query")?,
        goal: args.opt("goal")?,
        keys: args.opt("keys")?,
        seconds: args.integer("seconds")?,
        result: Some(result.clone()),
    };
    Ok(tool_used_event(tool, outcome, success, ToolDetail::BrowserUse(detail)))
}

pub(crate) fn str_replace_editor(
    tool: &str,
    args: &Value,
    outcome: &ToolOutcome,
    success: bool,
) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;
    let result = outcome.structured(tool)?;

    let detail = StrReplaceEditor {
        command: args.string_or_empty("command")?,
        path: args.string_or_empty("path")?,
        result: Some(result.clone()),
        file_text: args.opt("file_text")?,
        insert_line: args.integer("insert_line")?,
        new_str: args.opt("new_str")?,
        old_str: args.opt("old_str")?,
        view_range: args.opt("view_range")?,
    };
    Ok(tool_used_event(tool, outcome, success, ToolDetail::StrReplaceEditor(detail)))
}

pub(crate) fn bash(tool: &str, args: &Value, outcome: &ToolOutcome, success: bool) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;

    let detail = Bash {
        command: args.string_or_empty("command")?,
        result: outcome.text(),
    };
    Ok(tool_used_event(tool, outcome, success, ToolDetail::Bash(detail)))
}

pub(crate) fn terminate(tool: &str, outcome: &ToolOutcome, success: bool) -> Event {
    let detail = Terminate {
        result: outcome.text(),
        status: if success {
            TerminateStatus::Success
        } else {
            TerminateStatus::Failure
        },
    };
    tool_used_event(tool, outcome, success, ToolDetail::Terminate(detail))
}

pub(crate) fn cos_upload(tool: &str, args: &Value, outcome: &ToolOutcome, success: bool) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;
    let result = outcome.structured(tool)?;

    let detail = CosUpload {
        file_path: args.opt("file_path")?,
        content: args.opt("content")?,
        file_name: args.opt("file_name")?,
        directory: args.opt("directory")?,
        url: args.opt("url")?,
        result: Some(result.clone()),
    };
    Ok(tool_used_event(tool, outcome, success, ToolDetail::CosUpload(detail)))
}

pub(crate) fn r2_upload(tool: &str, args: &Value, outcome: &ToolOutcome, success: bool) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;
    let result = outcome.structured(tool)?;

    let detail = R2Upload {
        file_path: args.opt("file_path")?,
        content: args.opt("content")?,
        file_name: args.opt("file_name")?,
        directory: args.opt("directory")?,
        result: Some(result.to_map()),
    };
    Ok(tool_used_event(tool, outcome, success, ToolDetail::R2Upload(detail)))
}

pub(crate) fn deploy_website(
    tool: &str,
    args: &Value,
    outcome: &ToolOutcome,
    success: bool,
) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;
    let result = outcome.structured(tool)?;

    let detail = DeployWebsite {
        folder_path: args.opt("folder_path")?,
        site_name: args.opt("site_name")?,
        file_count: result.output.as_deref().and_then(extract::uploaded_file_count),
        entry_url: result.url.clone(),
        result: Some(result.to_map()),
    };
    Ok(tool_used_event(tool, outcome, success, ToolDetail::DeployWebsite(detail)))
}

pub(crate) fn planning(tool: &str, args: &Value, outcome: &ToolOutcome, success: bool) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;
    let result = outcome.structured(tool)?;

    let steps = plan::materialize_steps(&args)?;
    let mut detail = plan::planning_detail(&args, result.clone())?;
    detail.title = args.opt("title")?;
    detail.plan_id = args.opt("plan_id")?;

    let mut event = tool_used_event(tool, outcome, success, ToolDetail::Planning(detail));
    event.steps = steps;
    Ok(event)
}

pub(crate) fn python_execute(
    tool: &str,
    args: &Value,
    outcome: &ToolOutcome,
    success: bool,
) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;

    let detail = PythonExecute {
        code: args.string_or_empty("code")?,
        result: Some(crate::events::ToolResult {
            output: Some(outcome.observation()),
            ..Default::default()
        }),
    };
    Ok(tool_used_event(tool, outcome, success, ToolDetail::PythonExecute(detail)))
}

pub(crate) fn finish(tool: &str, args: &Value, outcome: &ToolOutcome) -> Result<Event, NormalizeError> {
    let args = Args::new(tool, args)?;

    let mut text = args.get("result").map(value_text).unwrap_or_default();
    if text.is_empty()
        && let Some(output) = outcome.as_structured().and_then(|r| r.output.as_ref())
    {
        text = output.clone();
    }

    let mut event = Event::new(EventType::ToolUsed);
    event.tool = Some(tool.to_string());
    event.tool_status = Some(ToolStatus::Success);
    event.content = Some(text.clone());
    event.tool_detail = Some(ToolDetail::Finish(text));
    Ok(event)
}

pub(crate) fn verify_website(tool: &str, outcome: &ToolOutcome) -> Result<Event, NormalizeError> {
    let result = outcome.structured(tool)?;
    let output = result.output.as_deref().unwrap_or_default();
    let report = VerifyReport::parse(output, result.error.as_deref());

    let detail = VerifyWebsite {
        url: result.url.clone().unwrap_or_default(),
        title: report.title,
        status_code: report.status_code,
        success: report.success,
        issue_count: Some(report.issue_count),
        success_count: Some(report.success_count),
        resource_count: report.resource_count,
    };

    let mut event = Event::new(EventType::ToolUsed);
    event.tool = Some(tool.to_string());
    event.tool_status = Some(ToolStatus::from_success(detail.success));
    event.content = Some(format!(
        "Website verification {}: {}",
        if detail.success { "succeeded" } else { "failed" },
        detail.url
    ));
    event.tool_detail = Some(ToolDetail::VerifyWebsite(detail));
    Ok(event)
}

/// Any tool without a dedicated payload: raw args keyed by the tool name, if there are any
pub(crate) fn other(tool: &str, args: &Value) -> Event {
    let mut event = Event::new(EventType::ToolUsed);
    event.tool = Some(tool.to_string());
    if !is_empty_value(args) {
        event.tool_detail = Some(ToolDetail::Other(OtherDetail::new(tool, args.clone())));
    }
    event
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
