//! Event record for agent activity streaming
//!
//! Every tool invocation, thought, plan update or status change becomes one
//! [`Event`]: a uniquely identified, timestamped record whose optional fields
//! are only populated when relevant to its [`EventType`]. Absent fields are
//! omitted from the JSON form, and enumerations render as their literal
//! string values.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::EventError;
use super::detail::ToolDetail;

/// Semantic category of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    Act,
    Chat,
    Complete,
    LiveStatus,
    Result,
    StatusUpdate,
    Step,
    Think,
    Tool,
    ToolUsed,
    PlanUpdate,
}

impl EventType {
    /// Literal wire name of the event type
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Act => "act",
            EventType::Chat => "chat",
            EventType::Complete => "complete",
            EventType::LiveStatus => "liveStatus",
            EventType::Result => "result",
            EventType::StatusUpdate => "statusUpdate",
            EventType::Step => "step",
            EventType::Think => "think",
            EventType::Tool => "tool",
            EventType::ToolUsed => "toolUsed",
            EventType::PlanUpdate => "planUpdate",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single tool call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Executing,
    Success,
    Fail,
}

impl ToolStatus {
    /// Map a tool's success flag onto a terminal status
    pub fn from_success(success: bool) -> Self {
        if success { ToolStatus::Success } else { ToolStatus::Fail }
    }
}

/// Lifecycle state of the agent itself
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Error,
    Running,
    Stopped,
    Terminated,
}

/// Who produced a conversational event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Assistant,
    User,
}

/// Rendering hint for message events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
}

/// Short tool usage message (action + parameter)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

/// Progress of one plan step
///
/// Callers may mark a step with a status outside the known set; it is kept
/// verbatim as [`StepStatus::Custom`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Completed,
    #[serde(untagged)]
    Custom(String),
}

impl StepStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::NotStarted => "not_started",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Custom(s) => s,
        }
    }
}

impl From<&str> for StepStatus {
    fn from(s: &str) -> Self {
        match s {
            "not_started" => StepStatus::NotStarted,
            "in_progress" => StepStatus::InProgress,
            "completed" => StepStatus::Completed,
            other => StepStatus::Custom(other.to_string()),
        }
    }
}

/// One entry of a tracked plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Position of the step in the plan, as a string
    pub id: String,
    pub title: String,
    pub status: StepStatus,
}

impl Step {
    /// Create a step that has not started yet
    pub fn not_started(index: usize, title: impl Into<String>) -> Self {
        Self {
            id: index.to_string(),
            title: title.into(),
            status: StepStatus::NotStarted,
        }
    }
}

/// A single observable occurrence in the agent's execution
///
/// Immutable once appended to the bus; the bus hands out shared references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Unique event identifier
    pub id: String,

    /// Creation time in Unix milliseconds
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_selected: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_status: Option<AgentStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Map<String, Value>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_render: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_step_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Sender>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_detail: Option<ToolDetail>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_status: Option<ToolStatus>,
}

impl Event {
    /// Create an empty event of the given type, stamped with a fresh id and the current time
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            error: None,
            tool_selected: None,
            action_id: None,
            agent_status: None,
            attachments: None,
            content: None,
            message: None,
            message_type: None,
            no_render: None,
            plan_step_id: None,
            sender: None,
            step: None,
            steps: None,
            text: None,
            tool: None,
            tool_detail: None,
            tool_status: None,
        }
    }

    /// Agent-level failure report
    pub fn status_error(message: impl Into<String>) -> Self {
        let mut event = Self::new(EventType::StatusUpdate);
        event.agent_status = Some(AgentStatus::Error);
        event.error = Some(message.into());
        event
    }

    /// Task completion marker carrying the final result, if any
    pub fn completion(final_result: Option<&str>) -> Self {
        let mut event = Self::new(EventType::Complete);
        event.agent_status = Some(AgentStatus::Stopped);
        event.content = final_result.map(str::to_string);
        event
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        self.event_type.as_str()
    }

    /// Serialize to a single-line JSON object
    pub fn to_json(&self) -> Result<String, EventError> {
        serde_json::to_string(self).map_err(|source| EventError::Serialize {
            id: self.id.clone(),
            source,
        })
    }
}
