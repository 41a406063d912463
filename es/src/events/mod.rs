//! Event Bus Architecture for Live Observability
//!
//! This module provides the event system for real-time visibility into an
//! agent's execution. Every tool call, thought, plan update and status change
//! becomes an [`Event`]. The bus keeps a bounded history and fans events out
//! to every connected stream.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  tool call data   ┌─────────────┐   Event   ┌──────────────────────┐
//! │ Agent loop │ ────────────────▶ │ Normalizer  │ ────────▶ │      EVENT BUS        │
//! └────────────┘                   └─────────────┘           │ history (ring buffer) │
//!                                                            │ subscriber channels   │
//!                                                            └──────────────────────┘
//!                                                              │        │        │
//!                                                              ▼        ▼        ▼
//!                                                         EventStream (replay + live, JSON)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use eventstream::events::{EventBus, EventStream};
//! use eventstream::normalize::ToolOutcome;
//!
//! let bus = EventBus::with_default_capacity().shared();
//! let emitter = bus.emitter();
//!
//! emitter.tool_result("bash", &json!({"command": "ls"}), &ToolOutcome::from("a.txt"), true)?;
//!
//! let mut stream = EventStream::open(bus.clone(), true);
//! while let Some(line) = stream.next_json().await {
//!     println!("{}", line?);
//! }
//! ```

mod bus;
mod detail;
mod stream;
mod types;

use thiserror::Error;

pub use bus::{
    DEFAULT_HISTORY_CAPACITY, EventBus, EventEmitter, EventReceiver, EventSender, SubscriberId,
};
pub use detail::{
    Bash, BrowserUse, CosUpload, CreateChatCompletion, DeployWebsite, OtherDetail, Planning, PythonExecute,
    R2Upload, StrReplaceEditor, Terminate, TerminateStatus, ToolDetail, ToolResult, VerifyWebsite, WebSearch,
};
pub use stream::EventStream;
pub use types::{AgentStatus, Event, EventType, Message, MessageType, Sender, Step, StepStatus, ToolStatus};

/// Errors produced while turning events into transport text
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Failed to serialize event {id}: {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}
