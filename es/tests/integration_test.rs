//! Integration tests for EventStream
//!
//! These tests exercise the bus, emitter and stream sessions together through
//! the public API.

use std::sync::Arc;
use std::time::Duration;

use eventstream::events::{Event, EventBus, EventStream, EventType, ToolDetail};
use eventstream::normalize::ToolOutcome;
use futures::StreamExt;
use proptest::prelude::*;
use serde_json::{Value, json};
use tokio::sync::Barrier;

fn numbered(n: usize) -> Event {
    let mut event = Event::new(EventType::Chat);
    event.content = Some(n.to_string());
    event
}

fn number_of(event: &Event) -> usize {
    event.content.as_deref().and_then(|c| c.parse().ok()).unwrap()
}

// =============================================================================
// Replay and live delivery
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_subscribe_during_concurrent_appends_sees_contiguous_sequence() {
    const PREFIX: usize = 500;
    const TOTAL: usize = 5000;

    for _ in 0..20 {
        let bus = EventBus::new(TOTAL).shared();
        for n in 0..PREFIX {
            bus.append(numbered(n));
        }

        let start = Arc::new(Barrier::new(2));
        let producer = {
            let bus = bus.clone();
            let start = start.clone();
            tokio::spawn(async move {
                start.wait().await;
                for n in PREFIX..TOTAL {
                    bus.append(numbered(n));
                }
            })
        };

        // Producer and subscriber are released together
        start.wait().await;
        let mut stream = EventStream::open(bus.clone(), true);

        producer.await.unwrap();
        bus.disconnect_all();

        let mut seen = Vec::new();
        while let Some(event) = stream.next_event().await {
            seen.push(number_of(&event));
        }

        // Whatever the split between replayed and live events: exactly 0..TOTAL, in order
        assert_eq!(seen, (0..TOTAL).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn test_replayed_prefix_then_live_events() {
    let bus = EventBus::new(100).shared();
    for n in 0..3 {
        bus.append(numbered(n));
    }

    let mut stream = EventStream::open(bus.clone(), true);
    for n in 3..5 {
        bus.append(numbered(n));
    }
    bus.disconnect_all();

    let mut seen = Vec::new();
    while let Some(event) = stream.next_event().await {
        seen.push(number_of(&event));
    }
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_subscribers_see_same_order() {
    let bus = EventBus::new(100).shared();
    let mut first = EventStream::open(bus.clone(), false);
    let mut second = EventStream::open(bus.clone(), false);

    for n in 0..10 {
        bus.append(numbered(n));
    }
    bus.disconnect_all();

    let mut a = Vec::new();
    while let Some(event) = first.next_event().await {
        a.push(event);
    }
    let mut b = Vec::new();
    while let Some(event) = second.next_event().await {
        b.push(event);
    }

    let ids_a: Vec<_> = a.iter().map(|e| e.id.clone()).collect();
    let ids_b: Vec<_> = b.iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids_a, ids_b);
    assert_eq!(ids_a.len(), 10);
}

#[tokio::test]
async fn test_slow_consumer_does_not_block_appends() {
    let bus = EventBus::new(10).shared();
    let _idle = EventStream::open(bus.clone(), false);

    let appends = tokio::time::timeout(Duration::from_secs(5), async {
        for n in 0..10_000 {
            bus.append(numbered(n));
        }
    })
    .await;

    assert!(appends.is_ok());
    assert_eq!(bus.len(), 10);
}

#[tokio::test]
async fn test_stream_yields_json_lines() {
    let bus = EventBus::new(10).shared();
    let emitter = bus.emitter();
    emitter.think("planning the work");

    let mut stream = EventStream::open(bus.clone(), true);
    emitter
        .tool_result("bash", &json!({"command": "pwd"}), &ToolOutcome::from("/work"), true)
        .unwrap();
    bus.disconnect_all();

    let lines: Vec<_> = stream.collect().await;
    assert_eq!(lines.len(), 2);

    let think: Value = serde_json::from_str(lines[0].as_ref().unwrap()).unwrap();
    assert_eq!(think["type"], "think");
    let bash: Value = serde_json::from_str(lines[1].as_ref().unwrap()).unwrap();
    assert_eq!(bash["type"], "toolUsed");
    assert_eq!(bash["tool_detail"]["bash"]["result"], "/work");
}

#[tokio::test]
async fn test_cancelled_consumer_releases_subscription() {
    let bus = EventBus::new(10).shared();
    let stream = EventStream::open(bus.clone(), false);
    assert_eq!(bus.subscriber_count(), 1);

    let consumer = tokio::spawn(async move {
        let mut stream = stream;
        while stream.next_event().await.is_some() {}
    });
    tokio::task::yield_now().await;
    consumer.abort();
    let _ = consumer.await;

    assert_eq!(bus.subscriber_count(), 0);
    bus.append(numbered(0));
    assert_eq!(bus.len(), 1);
}

// =============================================================================
// Emitter behaviour
// =============================================================================

#[test]
fn test_finish_appends_tool_event_then_completion() {
    let bus = EventBus::new(10).shared();
    let emitter = bus.emitter();

    emitter
        .tool_result("finish", &json!({"result": "report ready"}), &ToolOutcome::from(""), true)
        .unwrap();

    let history = bus.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event_type, EventType::ToolUsed);
    assert_eq!(history[0].tool_detail, Some(ToolDetail::Finish("report ready".to_string())));
    assert_eq!(history[1].event_type, EventType::Complete);
    assert_eq!(history[1].content.as_deref(), Some("report ready"));
}

#[test]
fn test_rejected_tool_call_leaves_bus_untouched() {
    let bus = EventBus::new(10).shared();
    let emitter = bus.emitter();

    assert!(
        emitter
            .tool_result("deploy_website", &json!({"folder_path": "dist"}), &ToolOutcome::from("done"), true)
            .is_err()
    );
    assert!(bus.is_empty());
}

#[test]
fn test_unsubscribe_twice() {
    let bus = EventBus::new(10);
    let (id, _rx) = bus.subscribe(false);
    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn test_history_timestamps_never_decrease() {
    let bus = EventBus::new(100);
    for n in 0..50 {
        let mut event = numbered(n);
        if n % 7 == 0 {
            event.timestamp -= 10_000;
        }
        bus.append(event);
    }

    let history = bus.history();
    assert!(history.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

// =============================================================================
// Capacity property
// =============================================================================

proptest! {
    #[test]
    fn prop_history_keeps_most_recent(capacity in 1usize..32, count in 0usize..100) {
        let bus = EventBus::new(capacity);
        for n in 0..count {
            bus.append(numbered(n));
        }

        let retained: Vec<usize> = bus.history().iter().map(|e| number_of(e)).collect();
        let expected: Vec<usize> = (count.saturating_sub(capacity)..count).collect();

        prop_assert_eq!(bus.len(), count.min(capacity));
        prop_assert_eq!(retained, expected);
    }
}
