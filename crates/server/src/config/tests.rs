use super::*;

#[test]
fn empty_file_uses_defaults() {
    let config: SignetConfig = toml::from_str("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.shutdown_timeout_seconds, 30);
    assert!(config.server.external_url.is_none());
    assert_eq!(config.store.backend, "memory");
    assert_eq!(config.blob.backend, "memory");
    assert_eq!(config.blob.root, "media");
    assert!(config.auth.jwt_secret.is_none());
    assert_eq!(config.auth.jwt_expiry_seconds, 3600);
    assert!(config.workflow.allow_redecision);
    assert_eq!(config.uploads.max_body_bytes, 20 * 1024 * 1024);
}

#[test]
fn store_postgres_section() {
    let toml = r#"
        backend = "postgres"
        url = "postgres://signet:pw@db:5432/signet"
        pool_size = 12
        table_prefix = "sg_"
        ssl_mode = "require"
    "#;

    let config: StoreConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.backend, "postgres");
    assert_eq!(
        config.url.as_deref(),
        Some("postgres://signet:pw@db:5432/signet")
    );
    assert_eq!(config.pool_size, 12);
    assert_eq!(config.schema, "public");
    assert_eq!(config.table_prefix, "sg_");
    assert_eq!(config.ssl_mode.as_deref(), Some("require"));
    assert!(config.ssl_root_cert.is_none());
}

#[test]
fn full_config() {
    let toml = r#"
        [server]
        host = "0.0.0.0"
        port = 9000
        external_url = "https://sign.example.com"

        [blob]
        backend = "filesystem"
        root = "/var/lib/signet"
        max_size_bytes = 1048576

        [auth]
        jwt_secret = "s3cret"
        jwt_expiry_seconds = 600

        [workflow]
        allow_redecision = false

        [uploads]
        max_body_bytes = 4096
    "#;

    let config: SignetConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(
        config.server.external_url.as_deref(),
        Some("https://sign.example.com")
    );
    assert_eq!(config.blob.backend, "filesystem");
    assert_eq!(config.blob.root, "/var/lib/signet");
    assert_eq!(config.blob.max_size_bytes, Some(1_048_576));
    assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
    assert_eq!(config.auth.jwt_expiry_seconds, 600);
    assert!(!config.workflow.allow_redecision);
    assert_eq!(config.uploads.max_body_bytes, 4096);
    assert_eq!(config.store.backend, "memory");
}
