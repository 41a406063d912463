//! EventStream - Agent Telemetry Bus
//!
//! EventStream turns the raw activity of an autonomous agent (tool calls,
//! thoughts, plan changes, errors, completion) into one canonical event
//! shape, keeps a bounded history of those events, and fans each one out to
//! any number of concurrent stream sessions.
//!
//! # Core Concepts
//!
//! - **One event shape**: every tool kind is normalized into an [`Event`] with a tagged [`ToolDetail`]
//! - **Replay then live**: a new session sees retained history, then live events, with no gap
//! - **Never block the producer**: appends do not wait on slow or vanished consumers
//!
//! # Modules
//!
//! - [`events`] - Event schema, bus, emitter and stream sessions
//! - [`normalize`] - Tool-result normalization
//! - [`feed`] - JSONL feed of recorded agent activity
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod events;
pub mod feed;
pub mod normalize;

// Re-export commonly used types
pub use config::Config;
pub use events::{
    DEFAULT_HISTORY_CAPACITY, Event, EventBus, EventEmitter, EventError, EventStream, EventType, Step, StepStatus,
    SubscriberId, ToolDetail, ToolResult, ToolStatus,
};
pub use feed::{FeedRecord, read_feed};
pub use normalize::{NormalizeError, ToolOutcome};
