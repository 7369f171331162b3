use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

use super::Event;
use crate::observability::metrics;

/// Callback invoked for every published event it is subscribed to
pub type EventHandler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Observability counters kept per event name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStats {
    pub publish_count: u64,
    pub last_published_at: Option<DateTime<Utc>>,
    pub error_count: u64,
}

/// Outcome of one publish call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishSummary {
    pub invoked: usize,
    pub failed: usize,
}

/// Named-event publish/subscribe.
///
/// Handlers for one publish run sequentially on the publishing thread. A handler
/// that returns an error or panics is logged and counted; the remaining handlers
/// still run and the publisher never sees the fault. The registry lock is
/// released before handlers run, so handlers may subscribe or publish.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<String, Vec<EventHandler>>>,
    stats: Mutex<HashMap<String, EventStats>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `event_name`. Handlers accumulate; there is no unsubscribe.
    pub fn subscribe<F>(&self, event_name: impl Into<String>, handler: F)
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let event_name = event_name.into();
        debug!(event = %event_name, "Subscribing handler");
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_name)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Invoke every handler currently subscribed to the event's name
    pub fn publish(&self, event: &Event) -> PublishSummary {
        let name = event.name();
        let handlers: Vec<EventHandler> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .unwrap_or_default();

        let mut summary = PublishSummary::default();
        for handler in &handlers {
            summary.invoked += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| (**handler)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    summary.failed += 1;
                    warn!(event = %name, error = %e, "Event handler failed");
                }
                Err(payload) => {
                    summary.failed += 1;
                    warn!(event = %name, panic = %panic_message(&*payload), "Event handler panicked");
                }
            }
        }

        self.record(name, summary.failed);
        debug!(event = %name, invoked = summary.invoked, failed = summary.failed, "Published event");
        summary
    }

    /// Publish a payload-less event
    pub fn publish_signal(&self, event_name: impl Into<String>) -> PublishSummary {
        self.publish(&Event::signal(event_name))
    }

    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_name)
            .map_or(0, Vec::len)
    }

    /// Counters for `event_name`; default (all zero) if it was never published
    pub fn stats(&self, event_name: &str) -> EventStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_name)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, event_name: &str, failures: usize) {
        {
            let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = stats.entry(event_name.to_string()).or_default();
            entry.publish_count += 1;
            entry.last_published_at = Some(Utc::now());
            entry.error_count += failures as u64;
        }

        metrics::events::published(event_name);
        for _ in 0..failures {
            metrics::events::handler_failed(event_name);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events: Vec<String> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("EventBus").field("events", &events).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_handler(counter: &Arc<AtomicUsize>) -> impl Fn(&Event) -> anyhow::Result<()> {
        let counter = counter.clone();
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_publish_invokes_all_handlers() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.subscribe("x", counter_handler(&calls));
        bus.subscribe("x", counter_handler(&calls));

        let summary = bus.publish_signal("x");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(summary, PublishSummary { invoked: 2, failed: 0 });
    }

    #[test]
    fn test_publish_only_reaches_matching_name() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.subscribe("x", counter_handler(&calls));

        bus.publish_signal("y");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failing_handler_does_not_stop_others() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.subscribe("x", |_| Err(anyhow::anyhow!("report generation failed")));
        bus.subscribe("x", counter_handler(&calls));

        let summary = bus.publish_signal("x");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(bus.stats("x").error_count, 1);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.subscribe("x", |_| panic!("handler blew up"));
        bus.subscribe("x", counter_handler(&calls));

        let summary = bus.publish_signal("x");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(summary, PublishSummary { invoked: 2, failed: 1 });
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        let summary = bus.publish_signal("nobody-listens");

        assert_eq!(summary, PublishSummary::default());
        let stats = bus.stats("nobody-listens");
        assert_eq!(stats.publish_count, 1);
        assert_eq!(stats.error_count, 0);
    }

    #[test]
    fn test_stats_track_publishes() {
        let bus = EventBus::new();
        assert_eq!(bus.stats("x"), EventStats::default());

        bus.publish_signal("x");
        bus.publish_signal("x");

        let stats = bus.stats("x");
        assert_eq!(stats.publish_count, 2);
        assert!(stats.last_published_at.is_some());
    }

    #[test]
    fn test_handler_can_subscribe_and_publish() {
        let bus = Arc::new(EventBus::new());
        let followups = Arc::new(AtomicUsize::new(0));

        let inner_bus = bus.clone();
        let inner_followups = followups.clone();
        bus.subscribe("first", move |_| {
            let counter = inner_followups.clone();
            inner_bus.subscribe("second", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            inner_bus.publish_signal("second");
            Ok(())
        });

        bus.publish_signal("first");

        assert_eq!(followups.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count("second"), 1);
    }
}
