// src/config/mod.rs
// Loads settings from .env / environment, falling back to defaults.

use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-001";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("DATABASE_URL is empty")]
    MissingDatabaseUrl,
}

#[derive(Debug, Clone)]
pub struct AskConfig {
    // ── Gemini
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,

    // ── Database
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_schema: String,
    pub statement_timeout_ms: u64,

    // ── Server
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,

    // ── Pipeline
    pub max_result_chars: usize,

    // ── Logging
    pub log_filter: String,
}

// Handles values with trailing comments and extra whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl AskConfig {
    /// Read `.env` (if present) and the process environment.
    pub fn from_env() -> Self {
        // Missing .env is normal in containers
        let _ = dotenvy::dotenv();
        Self::from_current_env()
    }

    /// Read only the process environment, skipping `.env`.
    pub fn from_current_env() -> Self {
        Self {
            gemini_api_key: env_var_or("GEMINI_API_KEY", String::new()),
            gemini_model: env_var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: env_var_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_timeout_secs: env_var_or("GEMINI_TIMEOUT_SECS", 60),
            database_url: env_var_or("DATABASE_URL", "postgres://localhost/asksql".to_string()),
            db_max_connections: env_var_or("DB_MAX_CONNECTIONS", 5),
            db_schema: env_var_or("DB_SCHEMA", "public".to_string()),
            statement_timeout_ms: env_var_or("DB_STATEMENT_TIMEOUT_MS", 15_000),
            host: env_var_or("ASKSQL_HOST", "0.0.0.0".to_string()),
            port: env_var_or("ASKSQL_PORT", 3000),
            request_timeout_secs: env_var_or("ASKSQL_REQUEST_TIMEOUT_SECS", 120),
            max_result_chars: env_var_or("ASKSQL_MAX_RESULT_CHARS", 3000),
            log_filter: env_var_or("ASKSQL_LOG", "info".to_string()),
        }
    }

    /// Check the settings every command needs before touching the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn gemini_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AskConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_timeout_secs: 60,
            database_url: "postgres://localhost/asksql".to_string(),
            db_max_connections: 5,
            db_schema: "public".to_string(),
            statement_timeout_ms: 15_000,
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 120,
            max_result_chars: 3000,
            log_filter: "info".to_string(),
        }
    }
}
