//! Event Bus - bounded history plus multicast delivery
//!
//! The EventBus keeps the most recent events in a ring buffer and pushes every
//! appended event to all registered subscriber channels. Subscribers may ask
//! for a replay of the retained history; replay and registration happen in the
//! same critical section as `append`, so a subscriber sees an ordered prefix of
//! history followed by live events with no gap and no duplicate.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::EventError;
use super::detail::ToolDetail;
use super::types::Event;
use crate::normalize::{self, NormalizeError, ToolOutcome};

/// Default number of events retained for replay
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Identifies one registered subscriber channel
pub type SubscriberId = u64;

/// Sending half of a subscriber channel
pub type EventSender = mpsc::UnboundedSender<Arc<Event>>;

/// Receiving half of a subscriber channel
pub type EventReceiver = mpsc::UnboundedReceiver<Arc<Event>>;

/// Internal state protected by mutex
struct BusInner {
    /// Retained events, oldest first
    history: VecDeque<Arc<Event>>,

    /// Active subscriber channels
    subscribers: HashMap<SubscriberId, EventSender>,

    /// Next subscriber id to hand out
    next_id: SubscriberId,

    /// Timestamp of the most recently appended event
    last_timestamp: i64,
}

impl BusInner {
    /// Push an event to every subscriber, dropping the ones whose receiver is gone
    fn broadcast(&mut self, event: &Arc<Event>) {
        self.subscribers.retain(|id, tx| match tx.send(Arc::clone(event)) {
            Ok(()) => true,
            Err(_) => {
                warn!(subscriber = id, event_id = %event.id, "EventBus: subscriber channel closed, removing");
                false
            }
        });
    }
}

/// Central event bus for agent activity streaming
///
/// Every tool call, thought and status change is appended here. All consumers
/// (UI streams, loggers) subscribe to receive events.
pub struct EventBus {
    inner: Mutex<BusInner>,
    capacity: usize,
}

impl EventBus {
    /// Create a new event bus retaining at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            warn!("EventBus::new: capacity 0 is not usable, retaining 1 event");
            1
        } else {
            capacity
        };
        debug!(capacity, "EventBus::new: creating event bus");
        Self {
            inner: Mutex::new(BusInner {
                history: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
                subscribers: HashMap::new(),
                next_id: 0,
                last_timestamp: i64::MIN,
            }),
            capacity,
        }
    }

    /// Create a new event bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an event bus wrapped in an Arc for shared ownership
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    // Critical sections never panic midway, so a poisoned lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, BusInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event to history and deliver it to every active subscriber
    ///
    /// Evicts the oldest event when the history is full. Delivery never
    /// blocks; a subscriber whose channel is closed is removed. The event's
    /// timestamp is raised to the previous event's if it would otherwise go
    /// backwards.
    pub fn append(&self, mut event: Event) -> Arc<Event> {
        let mut inner = self.lock();

        if event.timestamp < inner.last_timestamp {
            event.timestamp = inner.last_timestamp;
        }
        inner.last_timestamp = event.timestamp;

        let event = Arc::new(event);
        if inner.history.len() >= self.capacity {
            inner.history.pop_front();
        }
        inner.history.push_back(Arc::clone(&event));
        inner.broadcast(&event);

        debug!(
            event_type = event.event_type(),
            event_id = %event.id,
            subscribers = inner.subscribers.len(),
            "EventBus::append"
        );
        event
    }

    /// Register a caller-supplied channel, optionally replaying history into it first
    ///
    /// Replay and registration are one atomic step with respect to `append`.
    pub fn subscribe_channel(&self, tx: EventSender, replay: bool) -> SubscriberId {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        if replay {
            debug!(subscriber = id, count = inner.history.len(), "EventBus::subscribe_channel: replaying history");
            for event in &inner.history {
                if tx.send(Arc::clone(event)).is_err() {
                    warn!(subscriber = id, "EventBus::subscribe_channel: channel closed during replay");
                    return id;
                }
            }
        }

        inner.subscribers.insert(id, tx);
        debug!(subscriber = id, replay, "EventBus::subscribe_channel: registered");
        id
    }

    /// Subscribe with a new channel owned by the caller
    ///
    /// The caller is responsible for calling [`EventBus::unsubscribe`]; use
    /// [`super::EventStream`] for automatic cleanup.
    pub fn subscribe(&self, replay: bool) -> (SubscriberId, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.subscribe_channel(tx, replay);
        (id, rx)
    }

    /// Remove a subscriber; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.lock().subscribers.remove(&id).is_some();
        debug!(subscriber = id, removed, "EventBus::unsubscribe");
        removed
    }

    /// Drop every subscriber channel, ending all live streams
    pub fn disconnect_all(&self) -> usize {
        let mut inner = self.lock();
        let count = inner.subscribers.len();
        inner.subscribers.clear();
        debug!(count, "EventBus::disconnect_all");
        count
    }

    /// Retained events, oldest first
    pub fn history(&self) -> Vec<Arc<Event>> {
        self.lock().history.iter().cloned().collect()
    }

    /// Retained events serialized as JSON, oldest first
    pub fn snapshot(&self) -> Result<Vec<String>, EventError> {
        let history = self.history();
        debug!(count = history.len(), "EventBus::snapshot");
        history.iter().map(|event| event.to_json()).collect()
    }

    /// Record an agent-level error
    pub fn record_error(&self, message: &str) -> Arc<Event> {
        debug!(%message, "EventBus::record_error");
        self.append(Event::status_error(message))
    }

    /// Record task completion
    pub fn record_complete(&self, final_result: Option<&str>) -> Arc<Event> {
        debug!(?final_result, "EventBus::record_complete");
        self.append(Event::completion(final_result))
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.lock().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().history.is_empty()
    }

    /// Maximum number of retained events
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Create an emitter handle that appends normalized events to this bus
    pub fn emitter(self: &Arc<Self>) -> EventEmitter {
        EventEmitter {
            bus: Arc::clone(self),
            plan_id: None,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Handle for the agent loop to record activity without owning the bus
///
/// EventEmitter is cheap to clone. It runs tool call data through the
/// normalizer and appends the resulting events.
#[derive(Clone)]
pub struct EventEmitter {
    bus: Arc<EventBus>,
    plan_id: Option<String>,
}

impl EventEmitter {
    /// Same emitter, attributing tool results to the given plan
    pub fn for_plan(&self, plan_id: impl Into<String>) -> Self {
        Self {
            bus: Arc::clone(&self.bus),
            plan_id: Some(plan_id.into()),
        }
    }

    /// Get the plan ID this emitter is bound to
    pub fn plan_id(&self) -> Option<&str> {
        self.plan_id.as_deref()
    }

    /// Record the result of a tool call
    ///
    /// A `finish` call also records a completion event carrying the final answer.
    pub fn tool_result(
        &self,
        tool_name: &str,
        args: &Value,
        outcome: &ToolOutcome,
        success: bool,
    ) -> Result<Arc<Event>, NormalizeError> {
        let plan_id = self.plan_id.as_deref().unwrap_or_default();
        let event = normalize::tool_result(tool_name, args, outcome, success, plan_id)?;
        Ok(self.append_tool_event(event))
    }

    /// Record a tool call, naming the selected tool on the event
    pub fn tool_used(
        &self,
        tool_name: &str,
        args: &Value,
        outcome: &ToolOutcome,
        success: bool,
    ) -> Result<Arc<Event>, NormalizeError> {
        let event = normalize::tool_used(tool_name, args, outcome, success)?;
        Ok(self.append_tool_event(event))
    }

    /// Record a plan update from the planning tool
    pub fn plan_update(&self, args: &Value, outcome: &ToolOutcome) -> Result<Arc<Event>, NormalizeError> {
        let event = normalize::plan_update(args, outcome)?;
        Ok(self.bus.append(event))
    }

    /// Record an assistant thought
    pub fn think(&self, content: &str) -> Arc<Event> {
        self.bus.append(normalize::think(content))
    }

    /// Record an agent-level error
    pub fn error(&self, message: &str) -> Arc<Event> {
        self.bus.record_error(message)
    }

    /// Record task completion
    pub fn complete(&self, final_result: Option<&str>) -> Arc<Event> {
        self.bus.record_complete(final_result)
    }

    fn append_tool_event(&self, event: Event) -> Arc<Event> {
        let finish_text = match &event.tool_detail {
            Some(ToolDetail::Finish(text)) => Some(text.clone()),
            _ => None,
        };
        let event = self.bus.append(event);
        if let Some(text) = finish_text {
            debug!("EventEmitter: finish recorded, emitting completion");
            self.bus.record_complete(Some(&text));
        }
        event
    }
}
