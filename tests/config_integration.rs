use mind_soothe::config::AppConfig;
use serial_test::serial;
use std::env;
use std::fs;

// Variables that would otherwise leak into the layered config
const MANAGED_VARS: [&str; 8] = [
    "CONFIG_FILE",
    "HOST",
    "PORT",
    "ASK_UPSTREAM",
    "STATIC_DIR",
    "LOG_JSON",
    "MIND_SOOTHE__SERVER__PORT",
    "MIND_SOOTHE__WIDGET__ASK_UPSTREAM",
];

fn clear_env_vars() {
    for var in MANAGED_VARS {
        // SAFETY: every test touching the environment is #[serial].
        unsafe { env::remove_var(var) };
    }
}

// Parse without the test harness arguments
fn load() -> AppConfig {
    AppConfig::load_from_args(["mind-soothe"]).expect("Failed to load config")
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = load();
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.widget.static_dir, "static");
    assert_eq!(config.widget.ask_upstream, None);
    assert_eq!(config.widget.request_timeout_secs, 60);
    assert!(!config.log.json);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    // SAFETY: serialized.
    unsafe {
        env::set_var("MIND_SOOTHE__SERVER__PORT", "9090");
        env::set_var("MIND_SOOTHE__WIDGET__ASK_UPSTREAM", "http://10.0.0.5:8000/ask");
    }

    let config = load();
    assert_eq!(config.server.port, 9090);
    assert_eq!(
        config.widget.ask_upstream.as_deref(),
        Some("http://10.0.0.5:8000/ask")
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_plain_env_vars_map_onto_flags() {
    clear_env_vars();
    // SAFETY: serialized.
    unsafe {
        env::set_var("PORT", "8181");
        env::set_var("LOG_JSON", "true");
    }

    let config = load();
    assert_eq!(config.server.port, 8181);
    assert!(config.log.json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_blank_upstream_flag_is_ignored() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["mind-soothe", "--ask-upstream", "  "])
        .expect("Failed to load config");
    assert_eq!(config.widget.ask_upstream, None);
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("settings.yaml");
    fs::write(
        &file_path,
        r#"
server:
  port: 7070
widget:
  ask_upstream: "http://127.0.0.1:5000/ask"
  request_timeout_secs: 15
"#,
    )
    .expect("Failed to write temp config");

    // SAFETY: serialized.
    unsafe { env::set_var("CONFIG_FILE", &file_path) };

    let config = load();
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.widget.request_timeout_secs, 15);
    assert_eq!(
        config.widget.ask_upstream.as_deref(),
        Some("http://127.0.0.1:5000/ask")
    );
    // Keys the file leaves out keep their defaults
    assert_eq!(config.widget.static_dir, "static");

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_file() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("settings.yaml");
    fs::write(&file_path, "server:\n  port: 7070\n").expect("Failed to write temp config");
    let file_arg = file_path.to_str().expect("utf-8 temp path").to_string();

    let config = AppConfig::load_from_args(["mind-soothe", "--config", &file_arg, "--port", "7171"])
        .expect("Failed to load config");
    assert_eq!(config.server.port, 7171);
}

#[test]
#[serial]
fn test_missing_config_file_is_an_error() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["mind-soothe", "--config", "/nonexistent/mind-soothe.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cwd_config_fallback() {
    clear_env_vars();

    let original_dir = env::current_dir().expect("Failed to read cwd");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("config.yaml"), "server:\n  port: 6060\n")
        .expect("Failed to write ./config.yaml");
    env::set_current_dir(dir.path()).expect("Failed to enter temp dir");

    let result = AppConfig::load_from_args(["mind-soothe"]);

    env::set_current_dir(original_dir).expect("Failed to restore cwd");
    assert_eq!(result.expect("Failed to load config").server.port, 6060);
}
