//! Telemetry initialization. This is the only test in this binary that
//! installs a global subscriber, so initialization must succeed.

use gather_rs::config::EnvSource;
use gather_rs::telemetry::{TelemetryConfig, init_telemetry};

#[test]
fn telemetry_initializes_without_endpoint() {
    let env = EnvSource::from_pairs([("LOG_LEVEL", "debug")]);
    let config = TelemetryConfig::from_source(&env, "gather-test");
    assert!(config.endpoint.is_none());
    assert_eq!(config.default_filter, "debug");

    let guard = init_telemetry(config).expect("first init succeeds");
    guard.force_flush();

    // A second global subscriber is refused.
    let again = init_telemetry(TelemetryConfig::from_source(&EnvSource::default(), "gather-test"));
    assert!(again.is_err());
}
