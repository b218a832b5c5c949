//! Metric instruments, built from the globally registered `MeterProvider`.
//!
//! With no provider registered these are no-ops.

use opentelemetry::metrics::{Counter, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("gather-rs")
}

/// Counter: divergence warnings emitted at config load.
/// Labels: `pair` ("posthog_key" | "posthog_host").
pub fn config_divergence_warnings() -> Counter<u64> {
    meter()
        .u64_counter("gather.config.divergence_warnings")
        .with_description("Server/client config divergence warnings")
        .build()
}

/// Counter: events created.
/// Labels: `visibility`.
pub fn events_created() -> Counter<u64> {
    meter()
        .u64_counter("gather.events.created")
        .with_description("Number of events created")
        .build()
}

/// Counter: analytics captures buffered.
pub fn analytics_captured() -> Counter<u64> {
    meter()
        .u64_counter("gather.analytics.captured")
        .with_description("Analytics events buffered for delivery")
        .build()
}

/// Counter: analytics batch flushes.
/// Labels: `result` ("ok" | "error").
pub fn analytics_flushes() -> Counter<u64> {
    meter()
        .u64_counter("gather.analytics.flushes")
        .with_description("Analytics batch flush attempts")
        .build()
}
