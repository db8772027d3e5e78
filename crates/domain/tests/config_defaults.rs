use bc_domain::config::Config;

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn default_port_is_8080() {
    let config = Config::default();
    assert_eq!(config.server.port, 8080);
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 8080
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
}

#[test]
fn default_cors_accepts_every_origin() {
    let config = Config::default();
    assert_eq!(config.server.cors.allowed_origins, vec!["*".to_string()]);
}

#[test]
fn cors_config_parses_custom_origins() {
    let toml_str = r#"
[server.cors]
allowed_origins = ["https://myapp.com", "http://localhost:3000"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.cors.allowed_origins.len(), 2);
    assert!(config.server.cors.allowed_origins.contains(&"https://myapp.com".to_string()));
}

#[test]
fn chat_section_overrides_texts() {
    let toml_str = r#"
[chat]
greeting = "type -help"
fallback = "unknown keyword"
answers_path = "data/answers.json"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.chat.greeting, "type -help");
    assert_eq!(config.chat.fallback, "unknown keyword");
    assert_eq!(
        config.chat.answers_path.as_deref(),
        Some(std::path::Path::new("data/answers.json"))
    );
    // Untouched sections keep their defaults.
    assert_eq!(config.server.port, 8080);
}

#[test]
fn config_show_roundtrips_through_toml() {
    let config = Config::default();
    let rendered = toml::to_string_pretty(&config).unwrap();
    let parsed: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed.server.port, config.server.port);
    assert_eq!(parsed.chat.greeting, config.chat.greeting);
}
