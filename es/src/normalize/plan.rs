//! Plan tracking: step materialization and plan update events

use serde_json::Value;
use tracing::debug;

use super::NormalizeError;
use super::args::Args;
use super::outcome::ToolOutcome;
use crate::events::{Event, EventType, Planning, Step, StepStatus, ToolDetail, ToolResult};

/// Planning command that changes one step's status
const MARK_STEP: &str = "mark_step";

/// Name of the planning tool
pub(crate) const PLANNING_TOOL: &str = "planning";

/// Build the step list from `args.steps`, all `not_started`
///
/// For `mark_step`, the step at `step_index` takes `step_status` (default
/// `not_started`); an index outside the list is ignored. Returns `None` when
/// no titles were given.
pub(crate) fn materialize_steps(args: &Args<'_>) -> Result<Option<Vec<Step>>, NormalizeError> {
    let titles: Vec<String> = match args.opt("steps")? {
        Some(titles) => titles,
        None => return Ok(None),
    };
    if titles.is_empty() {
        return Ok(None);
    }

    let mut steps: Vec<Step> = titles
        .into_iter()
        .enumerate()
        .map(|(i, title)| Step::not_started(i, title))
        .collect();

    let command: Option<String> = args.opt("command")?;
    if command.as_deref() == Some(MARK_STEP)
        && let Some(index) = args.integer("step_index")?
    {
        let status: Option<String> = args.opt("step_status")?;
        match usize::try_from(index).ok().and_then(|i| steps.get_mut(i)) {
            Some(step) => {
                step.status = status.as_deref().map(StepStatus::from).unwrap_or(StepStatus::NotStarted);
            }
            None => {
                debug!(index, count = steps.len(), "materialize_steps: step_index out of range, ignoring");
            }
        }
    }

    Ok(Some(steps))
}

/// Planning payload shared by both planning call sites (without plan id and title)
pub(crate) fn planning_detail(args: &Args<'_>, result: ToolResult) -> Result<Planning, NormalizeError> {
    Ok(Planning {
        command: args.string_or_empty("command")?,
        result,
        plan_id: None,
        step_index: args.integer("step_index")?,
        step_notes: args.opt("step_notes")?,
        step_status: args.opt("step_status")?,
        steps: args.opt("steps")?,
        title: None,
    })
}

/// `planUpdate` event for a planning tool call
pub(crate) fn plan_update(args: &Value, outcome: &ToolOutcome) -> Result<Event, NormalizeError> {
    let args = Args::new(PLANNING_TOOL, args)?;

    let steps = materialize_steps(&args)?;
    let plan_id = args.string_or_empty("plan_id")?;

    let mut detail = planning_detail(&args, outcome.to_tool_result())?;
    detail.plan_id = Some(plan_id.clone());
    detail.title = Some(args.string_or_empty("title")?);

    let mut event = Event::new(EventType::PlanUpdate);
    event.plan_step_id = Some(plan_id);
    event.steps = steps;
    event.tool = Some(PLANNING_TOOL.to_string());
    event.tool_detail = Some(ToolDetail::Planning(detail));
    Ok(event)
}
