use sr_domain::config::{Config, ConfigSeverity};

#[test]
fn default_server_binds_all_interfaces() {
    let config = Config::default();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
}

#[test]
fn default_redis_url() {
    let config = Config::default();
    assert_eq!(config.redis.url(), "redis://redis:6379/");
}

#[test]
fn default_ttls_match_segment_policy() {
    let config = Config::default();
    assert_eq!(config.ingest.dedup_ttl_secs, 300);
    assert_eq!(config.ingest.partial_ttl_secs, 1800);
    assert_eq!(config.orchestrator.lock_ttl_secs, 600);
}

#[test]
fn explicit_overrides_parse() {
    let toml_str = r#"
[server]
host = "127.0.0.1"
port = 9000

[containers]
image = "bot:dev"
network = "meetings"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.containers.image, "bot:dev");
    assert_eq!(config.containers.network, "meetings");
    // Unspecified sections keep their defaults.
    assert_eq!(config.redis.port, 6379);
}

#[test]
fn missing_database_url_is_an_error() {
    let config = Config::default();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.severity == ConfigSeverity::Error && i.message.contains("DATABASE_URL")));
}

#[test]
fn configured_store_passes_validation() {
    let mut config = Config::default();
    config.database.url = "postgres://sr:sr@localhost:5432/sr".into();
    let errors: Vec<_> = config
        .validate()
        .into_iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .collect();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}
