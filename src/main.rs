use anyhow::Context;
use tokio::net::TcpListener;

use study_srs::{config::AppConfig, db, ItemService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Database configuration
    let pool = db::build_pool(&config).context("Failed to create DB pool")?;
    db::run_migrations(&pool).context("Failed to prepare database schema")?;

    let app = study_srs::app(ItemService::new(pool), config.session_inactivity_days);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", config.bind_addr))?;

    log::info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
