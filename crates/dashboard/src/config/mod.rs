use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub upload_max_bytes: u64,
    pub health_interval_ms: u64,
    pub page_size: u32,
    pub log_file: String,
    pub log_level: String,
    pub route: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081/customer-loader-backend/api".to_string(),
            timeout_ms: 60_000,
            upload_max_bytes: 52_428_800,
            health_interval_ms: 10_000,
            page_size: 10,
            log_file: "logs/dashboard.log".to_string(),
            log_level: "info".to_string(),
            route: "/dashboard".to_string(),
        }
    }
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    fn validate(self) -> Result<Self> {
        if self.timeout_ms == 0 {
            return Err(AppError::Setting("timeout_ms must be > 0".to_string()));
        }
        if self.health_interval_ms == 0 {
            return Err(AppError::Setting("health_interval_ms must be > 0".to_string()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(AppError::Setting(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.upload_max_bytes == 0 {
            return Err(AppError::Setting("upload_max_bytes must be > 0".to_string()));
        }
        Ok(self)
    }
}

#[derive(Debug, Parser)]
#[command(name = "loader_dashboard", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://localhost:8081/customer-loader-backend/api).
    #[arg(long)]
    base_url: Option<String>,
    /// Override request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Override initial route (e.g. /dashboard/clients/<processId>).
    #[arg(long)]
    route: Option<String>,
    /// Override log file path.
    #[arg(long)]
    log_file: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("LOADER_DASHBOARD"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    if let Some(route) = args.route {
        settings.route = route;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    settings.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default().validate().unwrap();
        assert_eq!(config.upload_max_bytes, 50 * 1024 * 1024);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn rejects_zero_page_size() {
        let config = AppConfig {
            page_size: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Setting(_))));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = AppConfig {
            timeout_ms: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
