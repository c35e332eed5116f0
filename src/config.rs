use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Environment prefix for layered settings, e.g. `MIND_SOOTHE__SERVER__PORT=8000`.
pub const ENV_PREFIX: &str = "MIND_SOOTHE";

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Service that answers relayed `/ask` requests
    #[arg(long, env = "ASK_UPSTREAM")]
    pub ask_upstream: Option<String>,

    /// Directory served under `/static`
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    pub log_json: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub widget: WidgetConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    /// Directory holding `app.css` and the wasm bundle under `pkg/`.
    pub static_dir: String,
    /// Absolute URL `/ask` is relayed to. Unset means the relay answers 503.
    #[serde(default)]
    pub ask_upstream: Option<String>,
    /// Upper bound for a relayed request.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        // 1. Defaults
        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("widget.static_dir", "static")?
            .set_default("widget.request_timeout_secs", 60)?
            .set_default("log.json", false)?;

        // 2. Config file: explicit path, else ./config.yaml when present
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
        }

        // 3. Prefixed environment, e.g. MIND_SOOTHE__WIDGET__ASK_UPSTREAM
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and the env vars clap maps onto them) override everything
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(upstream) = cli.ask_upstream.filter(|u| !u.trim().is_empty()) {
            builder = builder.set_override("widget.ask_upstream", upstream)?;
        }
        if let Some(dir) = cli.static_dir {
            builder = builder.set_override("widget.static_dir", dir)?;
        }
        if let Some(json) = cli.log_json {
            builder = builder.set_override("log.json", json)?;
        }

        builder.build()?.try_deserialize()
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_defaults() {
        let config = AppConfig::load_from_args([
            "mind-soothe",
            "--port",
            "8123",
            "--ask-upstream",
            "http://127.0.0.1:5000/ask",
        ])
        .unwrap();
        assert_eq!(config.server.port, 8123);
        assert_eq!(
            config.widget.ask_upstream.as_deref(),
            Some("http://127.0.0.1:5000/ask")
        );
        assert_eq!(config.bind_address(), format!("{}:8123", config.server.host));
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        assert!(AppConfig::load_from_args(["mind-soothe", "--bogus"]).is_err());
    }
}
