use cisprobe_config::{TelemetryError, init_tracing};

#[test]
fn subscriber_installs_only_once() {
    init_tracing("cisprobe=debug").expect("first install");

    let second = init_tracing("info");

    assert!(matches!(second, Err(TelemetryError::AlreadyInitialised(_))));
}
