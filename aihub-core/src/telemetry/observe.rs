use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use super::{MetricsEvent, SpanHandle};

/// Run one asynchronous operation inside a named span.
///
/// The operation is attempted exactly once and its result is returned
/// unchanged: `Ok(v)` passes through after a `success` metrics record,
/// `Err(e)` passes through after an `error` record carrying `e`'s stringified
/// form. No retries, no timeout, no fallback value.
///
/// The span is closed exactly once on every exit path: success, error, panic
/// unwind, or the future being dropped mid-flight.
pub async fn observe<T, E, F, Fut>(name: &str, op: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let guard = SpanGuard::start(name);
    let started = Instant::now();
    let result = op().await;
    let latency = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => guard.record(MetricsEvent::success().latency_ms(latency)),
        Err(e) => guard.record(MetricsEvent::error(e.to_string()).latency_ms(latency)),
    }
    result
}

/// Owns the span handle for one `observe` call. Closing happens in `drop`,
/// which is what makes the close-exactly-once guarantee hold on unwind and
/// cancellation, not just on the two normal exits.
struct SpanGuard {
    span: Option<SpanHandle>,
}

impl SpanGuard {
    fn start(name: &str) -> Self {
        Self {
            span: super::start_span(name),
        }
    }

    fn record(&self, event: MetricsEvent) {
        if let Some(span) = &self.span {
            super::record_metrics(span, event);
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(span) = self.span.take() {
            super::end_span(span);
        }
    }
}
