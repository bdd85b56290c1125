#![cfg(test)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use super::{MetricsEvent, SpanHandle, TraceSink};

/// What the recording sink saw, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Started { id: u64, name: String },
    Metrics { id: u64, event: MetricsEvent },
    Ended { id: u64 },
}

impl SinkEvent {
    fn span_id(&self) -> u64 {
        match self {
            Self::Started { id, .. } | Self::Metrics { id, .. } | Self::Ended { id } => *id,
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    next_id: AtomicU64,
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events belonging to spans started under `name`. The sink is shared
    /// process-wide, so tests use unique span names to stay disjoint.
    pub fn events_for(&self, name: &str) -> Vec<SinkEvent> {
        let events = self.events();
        let ids: HashSet<u64> = events
            .iter()
            .filter_map(|ev| match ev {
                SinkEvent::Started { id, name: n } if n == name => Some(*id),
                _ => None,
            })
            .collect();
        events
            .into_iter()
            .filter(|ev| ids.contains(&ev.span_id()))
            .collect()
    }
}

impl TraceSink for RecordingSink {
    fn start_span(&self, name: &str) -> SpanHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(SinkEvent::Started {
            id,
            name: name.to_string(),
        });
        SpanHandle::from_id(id)
    }

    fn record_metrics(&self, span: &SpanHandle, event: MetricsEvent) {
        self.events.lock().unwrap().push(SinkEvent::Metrics {
            id: span.id(),
            event,
        });
    }

    fn end_span(&self, span: SpanHandle) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Ended { id: span.id() });
    }
}

static SINK: Lazy<Arc<RecordingSink>> = Lazy::new(|| Arc::new(RecordingSink::default()));

/// Install the shared recording sink (first caller wins, later calls are
/// no-ops against the write-once global) and enable capture for the current
/// test thread. Returns the sink for assertions.
pub fn install_recording() -> Arc<RecordingSink> {
    let _ = super::set_trace_sink(SINK.clone());
    super::test_set_capture_enabled(true);
    SINK.clone()
}
