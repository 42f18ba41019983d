pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::stage::Stage;

pub async fn run() -> Result<()> {
    let stage = config::config_loader::get_stage();
    let max_level = match stage {
        Stage::Local => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(max_level).init();

    let dotenvy_env = config::config_loader::load()?;
    info!("ENV has been loaded (stage: {})", stage);

    infrastructure::axum_http::http_serve::start(Arc::new(dotenvy_env)).await?;

    Ok(())
}
