use pnode_monitor::settings::{Settings, environment};
use std::{io::Write, time::Duration};
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn env(vars: &[(&str, &str)]) -> config::Environment {
    let mut map = config::Map::new();
    for (key, value) in vars {
        map.insert(key.to_string(), value.to_string());
    }
    environment().source(Some(map))
}

#[test]
fn defaults_without_file_or_env() {
    let settings = Settings::load(None::<&str>, env(&[])).unwrap();
    assert_eq!(settings.log_level, "info");
    assert_eq!(settings.rpc.endpoints.len(), 9);
    assert_eq!(settings.rpc.endpoints[0], "http://173.212.203.145:6000/rpc");
    assert_eq!(settings.rpc.timeout_ms, 15_000);
    assert_eq!(settings.rpc.health_check_timeout_ms, 5_000);
    assert_eq!(settings.cache.ttl_ms, 30_000);
    assert_eq!(settings.cache.stale_ms, 10_000);
    assert_eq!(settings.poll_interval(), Duration::from_secs(30));
    assert!(settings.metrics_addr.is_none());
}

#[test]
fn file_values_override_defaults() {
    let file = config_file(
        r#"
log_level = "debug"
metrics_addr = "127.0.0.1:9102"

[rpc]
endpoints = ["http://10.1.0.1:6000/rpc", "https://relay.example.org/rpc"]
timeout_ms = 2500

[poller]
interval_secs = 120
"#,
    );

    let settings = Settings::load(Some(file.path()), env(&[])).unwrap();
    assert_eq!(settings.log_level, "debug");
    assert_eq!(settings.rpc.endpoints.len(), 2);
    assert_eq!(settings.rpc.timeout_ms, 2_500);
    // untouched keys keep their defaults
    assert_eq!(settings.rpc.health_check_timeout_ms, 5_000);
    assert_eq!(settings.poll_interval(), Duration::from_secs(120));
    assert_eq!(
        settings.metrics_addr.map(|a| a.to_string()).as_deref(),
        Some("127.0.0.1:9102")
    );

    let registry = settings.registry().unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.timeouts().default, Duration::from_millis(2_500));
    assert_eq!(registry.timeouts().health_check, Duration::from_secs(5));
    assert_eq!(registry.cache_windows().ttl, Duration::from_secs(30));
}

#[test]
fn environment_overrides_file() {
    let file = config_file(
        r#"
[rpc]
timeout_ms = 2500
"#,
    );

    let settings = Settings::load(
        Some(file.path()),
        env(&[
            ("PNODE__RPC__TIMEOUT_MS", "4000"),
            (
                "PNODE__RPC__ENDPOINTS",
                "http://10.2.0.1:6000/rpc,http://10.2.0.2:6000/rpc",
            ),
            ("PNODE__POLLER__INTERVAL_SECS", "300"),
        ]),
    )
    .unwrap();

    assert_eq!(settings.rpc.timeout_ms, 4_000);
    assert_eq!(
        settings.rpc.endpoints,
        vec!["http://10.2.0.1:6000/rpc", "http://10.2.0.2:6000/rpc"]
    );
    assert_eq!(settings.poller.interval_secs, 300);
}

#[test]
fn invalid_values_are_rejected() {
    let file = config_file(
        r#"
[poller]
interval_secs = 45
"#,
    );
    let err = Settings::load(Some(file.path()), env(&[])).unwrap_err();
    assert!(err.to_string().contains("interval_secs"), "{err}");

    let file = config_file(
        r#"
[rpc]
endpoints = []
"#,
    );
    assert!(Settings::load(Some(file.path()), env(&[])).is_err());

    let file = config_file(
        r#"
[rpc]
endpoints = ["ftp://10.1.0.1/rpc"]
"#,
    );
    assert!(Settings::load(Some(file.path()), env(&[])).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(Settings::load(Some(&path), env(&[])).is_err());
}
