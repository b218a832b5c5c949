//! Server/client divergence warnings.
//!
//! Some server-only variables have a client-exposed twin that must carry the
//! same value. Outside production a mismatch is logged; it never fails
//! startup and never changes the loaded values.

use super::mode::RuntimeMode;
use crate::telemetry::metrics;
use opentelemetry::KeyValue;

/// A server/client pair that disagrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    AnalyticsKey,
    AnalyticsHost,
}

impl Divergence {
    pub fn message(self) -> &'static str {
        match self {
            Divergence::AnalyticsKey => {
                "[env] POSTHOG_KEY and NEXT_PUBLIC_POSTHOG_KEY differ; ensure they point to the same project."
            }
            Divergence::AnalyticsHost => {
                "[env] POSTHOG_HOST and NEXT_PUBLIC_POSTHOG_HOST differ; ensure they target the same ingestion host."
            }
        }
    }

    fn label(self) -> &'static str {
        match self {
            Divergence::AnalyticsKey => "posthog_key",
            Divergence::AnalyticsHost => "posthog_host",
        }
    }
}

/// One server value and its client counterpart.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pair<'a> {
    pub server: Option<&'a str>,
    pub client: Option<&'a str>,
}

impl<'a> Pair<'a> {
    pub fn new(server: Option<&'a str>, client: Option<&'a str>) -> Self {
        Self { server, client }
    }

    /// Both sides present and non-empty, and unequal.
    fn differs(self) -> bool {
        match (
            self.server.filter(|s| !s.is_empty()),
            self.client.filter(|c| !c.is_empty()),
        ) {
            (Some(s), Some(c)) => s != c,
            _ => false,
        }
    }
}

/// Compute divergences, key pair first then host pair.
pub fn check(mode: RuntimeMode, key: Pair<'_>, host: Pair<'_>) -> Vec<Divergence> {
    if !mode.warns_on_divergence() {
        return Vec::new();
    }
    let mut found = Vec::new();
    if key.differs() {
        found.push(Divergence::AnalyticsKey);
    }
    if host.differs() {
        found.push(Divergence::AnalyticsHost);
    }
    found
}

/// Log each divergence as a warning, in order.
pub fn report(divergences: &[Divergence]) {
    for d in divergences {
        tracing::warn!("{}", d.message());
        metrics::config_divergence_warnings().add(1, &[KeyValue::new("pair", d.label())]);
    }
}
