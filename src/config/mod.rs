use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CONFIG_FILE: &str = "taskd.toml";

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

// ─── ObservabilityConfig ──────────────────────────────────────────────────────

/// Observability configuration (`[observability]` in taskd.toml).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log SQLite queries that exceed this threshold (milliseconds). Default: 100.
    /// Set to 0 to disable slow query logging.
    pub slow_query_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: 100,
        }
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `taskd.toml`: all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP listen port (default: 3000).
    port: Option<u16>,
    /// Bind address (default: "0.0.0.0").
    bind_address: Option<String>,
    /// Store connection URL, e.g. "sqlite://tasks.db?mode=rwc".
    /// Absent means the server starts disconnected and /health reports it.
    db_url: Option<String>,
    /// Log level filter string, e.g. "debug", "info,taskd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Include store error detail in 500 response bodies (default: false).
    /// Development aid only; production responses stay generic.
    debug_errors: Option<bool>,
    /// Observability configuration (`[observability]`).
    observability: Option<ObservabilityConfig>,
}

fn load_toml(path: &Path) -> Option<TomlConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config file, using defaults");
            None
        }
    }
}

// ─── Config ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Bind address for the HTTP server (TASKD_BIND env var, default: "0.0.0.0").
    pub bind_address: String,
    /// Store connection URL (TASKD_DB_URL env var).
    /// None means the server runs in the disconnected state.
    pub db_url: Option<String>,
    /// Log level filter string.
    pub log: String,
    /// Log output format: "pretty" (default) | "json".
    pub log_format: String,
    /// Include store error detail in 500 bodies (TASKD_DEBUG_ERRORS env var).
    pub debug_errors: bool,
    /// Observability: slow query threshold.
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env, passed as `Some(value)` from clap
    ///   2. TOML file (default: ./taskd.toml)
    ///   3. Built-in defaults
    pub fn new(
        config_path: Option<PathBuf>,
        port: Option<u16>,
        bind_address: Option<String>,
        db_url: Option<String>,
        log: Option<String>,
        debug_errors: bool,
    ) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&config_path).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);

        let bind_address = bind_address
            .filter(|s| !s.is_empty())
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let db_url = db_url.filter(|s| !s.is_empty()).or(toml.db_url);

        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = std::env::var("TASKD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let debug_errors = debug_errors || toml.debug_errors.unwrap_or(false);

        let observability = toml.observability.unwrap_or_default();

        Self {
            port,
            bind_address,
            db_url,
            log,
            log_format,
            debug_errors,
            observability,
        }
    }
}
