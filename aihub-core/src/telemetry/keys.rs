/// Span/Log attribute keys for traced executions.
/// Keep these stable; changing them is a breaking change for dashboards.
pub const KEY_SPAN_NAME: &str = "span.name";
pub const KEY_STATUS: &str = "span.status";
pub const KEY_LATENCY_MS: &str = "latency.ms";

/// Error-related (if applicable)
pub const KEY_ERROR_MESSAGE: &str = "error.message";
