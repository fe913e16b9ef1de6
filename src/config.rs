//! Environment-driven configuration
//!
//! Everything is read once at startup from the process environment (with
//! `.env` support via dotenvy in `main`). Handlers receive a cloned
//! `AppConfig` through actix `web::Data`.

use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "bbredirect=debug,info"
    pub level: String,
    /// Log file path; empty or unset means stdout
    pub file: Option<String>,
    /// "json" or "plain"
    pub format: String,
    pub enable_rotation: bool,
    pub max_backups: u32,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    /// Public base URL used to build `short_url` in API responses
    pub base_url: String,
    /// Bearer token for /api; empty disables the API surface
    pub api_token: String,
    /// Bearer token for /health; empty leaves health probes open
    pub health_token: String,
    pub storage_backend: String,
    pub db_file_name: String,
    pub random_key_length: usize,
    pub click_flush_interval: Duration,
    pub click_queue_capacity: usize,
    pub retention_sweep_interval: Duration,
    pub logging: LoggingConfig,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let server_host = env_or("SERVER_HOST", "127.0.0.1");
        let server_port: u16 = env_parse("SERVER_PORT", 8080);
        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));

        AppConfig {
            base_url,
            api_token: env_or("API_TOKEN", ""),
            health_token: env_or("HEALTH_TOKEN", ""),
            storage_backend: env_or("STORAGE_BACKEND", "memory"),
            db_file_name: env_or("DB_FILE_NAME", "bbredirect.json"),
            random_key_length: env_parse("RANDOM_KEY_LENGTH", 6),
            click_flush_interval: Duration::from_secs(env_parse("CLICK_FLUSH_INTERVAL_SECS", 2)),
            click_queue_capacity: env_parse("CLICK_QUEUE_CAPACITY", 4096),
            retention_sweep_interval: Duration::from_secs(env_parse(
                "RETENTION_SWEEP_INTERVAL_SECS",
                6 * 3600,
            )),
            logging: LoggingConfig {
                level: env_or("LOG_LEVEL", "info"),
                file: env::var("LOG_FILE").ok().filter(|f| !f.is_empty()),
                format: env_or("LOG_FORMAT", "plain"),
                enable_rotation: env_parse("LOG_ROTATION", true),
                max_backups: env_parse("LOG_MAX_BACKUPS", 7),
            },
            server_host,
            server_port,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server_host: "127.0.0.1".into(),
            server_port: 8080,
            base_url: "http://127.0.0.1:8080".into(),
            api_token: String::new(),
            health_token: String::new(),
            storage_backend: "memory".into(),
            db_file_name: "bbredirect.json".into(),
            random_key_length: 6,
            click_flush_interval: Duration::from_secs(2),
            click_queue_capacity: 4096,
            retention_sweep_interval: Duration::from_secs(6 * 3600),
            logging: LoggingConfig {
                level: "info".into(),
                file: None,
                format: "plain".into(),
                enable_rotation: true,
                max_backups: 7,
            },
        }
    }
}
