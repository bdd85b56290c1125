use serde::{Deserialize, Serialize};

use super::keys;

/// Terminal status of one traced execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    Success,
    Error,
}

impl SpanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Canonical terminal annotation for a span: the outcome, the stringified
/// operation error when the outcome is `Error`, and the measured wall-clock
/// latency when the wrapper got far enough to measure one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsEvent {
    pub status: SpanStatus,
    pub error_message: Option<String>,
    pub latency_ms: Option<u64>,
}

impl MetricsEvent {
    pub fn success() -> Self {
        Self {
            status: SpanStatus::Success,
            error_message: None,
            latency_ms: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SpanStatus::Error,
            error_message: Some(message.into()),
            latency_ms: None,
        }
    }

    // Shorthand fluent setters used by instrumentation
    pub fn latency_ms(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }

    /// Stable `(key, value)` attribute pairs for log/dashboard sinks.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![(keys::KEY_STATUS, self.status.as_str().to_string())];
        if let Some(msg) = &self.error_message {
            attrs.push((keys::KEY_ERROR_MESSAGE, msg.clone()));
        }
        if let Some(ms) = self.latency_ms {
            attrs.push((keys::KEY_LATENCY_MS, ms.to_string()));
        }
        attrs
    }
}
