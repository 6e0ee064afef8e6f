use std::{fs::OpenOptions, path::Path, sync::Mutex};

use loader_dashboard::{
    app::App,
    client::Client,
    config::{self, AppConfig},
    error::{AppError, Result},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_logging(&config)?;
    tracing::info!(base_url = %config.base_url, "starting dashboard");

    let client = Client::new(&config.base_url, config.timeout())?;
    let mut app = App::new(config, client);
    app.run().await
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(config: &AppConfig) -> Result<()> {
    let path = Path::new(&config.log_file);
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "loader_dashboard={level},api_types={level}",
            level = config.log_level
        )))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}
