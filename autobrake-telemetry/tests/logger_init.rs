//! Runs in its own process: `EventLogger::init` installs the process-global
//! subscriber, which would collide with `#[traced_test]` in the unit tests.

use autobrake_telemetry::EventLogger;

#[test]
fn repeated_init_is_harmless() {
    assert!(EventLogger::init("info", false).is_ok());
    assert!(EventLogger::init("debug", true).is_ok());
}
