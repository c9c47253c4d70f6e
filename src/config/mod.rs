use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

/// Values parsed from `{data_dir}/config.toml`. Every field is optional —
/// anything absent falls through to env vars and built-in defaults.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    /// HTTP server port (default: 8000).
    port: Option<u16>,
    /// Bind address for the HTTP server (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,taskd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" | "json".
    log_format: Option<String>,
    /// SQLite connection pool cap (default: 5).
    max_connections: Option<u32>,
    /// Base URL client subcommands target (default: http://127.0.0.1:8000).
    api_url: Option<String>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub log: String,
    /// Bind address for the HTTP server (TASKD_BIND env var, default: "127.0.0.1").
    pub bind_address: String,
    /// Log output format: "pretty" (default) | "json" (structured for log aggregators).
    pub log_format: String,
    /// Upper bound on pooled SQLite connections. Requests past the cap wait
    /// for a free connection instead of opening new handles without limit.
    pub max_connections: u32,
    /// Base URL the client subcommands target (TASKD_URL env var).
    pub api_url: String,
}

impl Config {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(std::env::var("TASKD_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("TASKD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let max_connections = std::env::var("TASKD_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(toml.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let api_url = std::env::var("TASKD_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            port,
            data_dir,
            log,
            bind_address,
            log_format,
            max_connections,
            api_url,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/taskd
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("taskd");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/taskd or ~/.local/share/taskd
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("taskd");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("taskd");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\taskd
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("taskd");
        }
    }
    // Fallback
    PathBuf::from(".taskd")
}
