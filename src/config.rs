use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Base URL of the storefront REST API, including any path prefix
    #[arg(long, env = "STOREFRONT_API_URL", default_value = "http://localhost:5000/api")]
    pub api_url: String,

    #[command(flatten)]
    pub session: SessionConfig,

    #[command(flatten)]
    pub notifications: NotificationConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct SessionConfig {
    /// File the session tokens and cached identity are persisted to
    #[arg(long, env = "STOREFRONT_SESSION_FILE", default_value = ".storefront/session.json")]
    pub session_file: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct NotificationConfig {
    /// How long a toast stays up before auto-dismissing, in milliseconds
    #[arg(long, env = "STOREFRONT_NOTIFICATION_DURATION_MS", default_value_t = 5000)]
    pub default_duration_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "STOREFRONT_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }
}
