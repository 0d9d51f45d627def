use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Optional hardening extension: when set, jobs stuck `pending` longer
    /// than this many seconds are marked failed by a background reaper.
    /// The pipeline itself defines no timeout; unset means a job whose
    /// request message was lost stays `pending` indefinitely.
    pub pending_job_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            pending_job_timeout_secs: match std::env::var("PENDING_JOB_TIMEOUT_SECS") {
                Ok(v) => Some(
                    v.parse::<u64>()
                        .context("PENDING_JOB_TIMEOUT_SECS must be a number of seconds")?,
                ),
                Err(_) => None,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
