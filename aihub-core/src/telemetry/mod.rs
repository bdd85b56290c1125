//! Telemetry primitives for span-based observability.
//! By default, nothing is emitted unless a sink is installed via `set_trace_sink`.

pub mod keys;
mod observe;
#[cfg(test)]
pub mod test_sink;
pub mod types;

pub use keys::*;
pub use observe::observe;
pub use types::*;

use std::sync::Arc;

use once_cell::sync::OnceCell;

/// Opaque handle for one traced execution.
///
/// Handles are minted by the installed [`TraceSink`] and are deliberately not
/// `Clone`: ending a span consumes its handle, so a span can be closed at
/// most once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SpanHandle(u64);

impl SpanHandle {
    pub fn from_id(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Implement this to receive span lifecycle events.
///
/// Requirements:
/// - Implementations must be thread-safe (`Send + Sync`) and `'static`.
/// - Any method **may** be called from any thread; implementations should avoid panicking.
/// - Keep overhead minimal; this may be on hot paths.
pub trait TraceSink: Send + Sync + 'static {
    /// Open a span tagged with `name` and return its handle.
    fn start_span(&self, name: &str) -> SpanHandle;

    /// Attach a terminal status annotation to an open span.
    fn record_metrics(&self, span: &SpanHandle, event: MetricsEvent);

    /// Close a span.
    fn end_span(&self, span: SpanHandle);
}

static TRACE_SINK: OnceCell<Arc<dyn TraceSink>> = OnceCell::new();

// In tests, gate emission to only the calling test thread to avoid cross-test interference.
#[cfg(test)]
thread_local! {
    static TEST_CAPTURE: std::cell::Cell<bool> = std::cell::Cell::new(false);
}

/// Install a global trace sink. Returns `false` if a sink is already installed.
///
/// Notes:
/// - This is a write-once global for the process lifetime (backed by `OnceCell`).
/// - If you need to clear captured data in tests, clear it in your sink implementation.
pub fn set_trace_sink(sink: Arc<dyn TraceSink>) -> bool {
    TRACE_SINK.set(sink).is_ok()
}

/// Open a span if a sink is installed. `None` means tracing is off and the
/// matching record/end calls are skipped.
///
/// In tests, spans are suppressed unless explicitly enabled via `test_set_capture_enabled`.
#[inline]
pub(crate) fn start_span(name: &str) -> Option<SpanHandle> {
    #[cfg(test)]
    {
        if !TEST_CAPTURE.with(|c| c.get()) {
            return None;
        }
    }
    TRACE_SINK.get().map(|sink| sink.start_span(name))
}

#[inline]
pub(crate) fn record_metrics(span: &SpanHandle, event: MetricsEvent) {
    if let Some(sink) = TRACE_SINK.get() {
        sink.record_metrics(span, event);
    }
}

#[inline]
pub(crate) fn end_span(span: SpanHandle) {
    if let Some(sink) = TRACE_SINK.get() {
        sink.end_span(span);
    }
}

#[cfg(test)]
/// Test-only helper: enable or disable capture for the current test thread.
///
/// Spawned threads in a test must call this as well if they should emit.
pub fn test_set_capture_enabled(enabled: bool) {
    TEST_CAPTURE.with(|c| c.set(enabled));
}
