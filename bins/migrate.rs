use anyhow::Context;
use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use tracing::{info, warn};

fn init_logging(cfg: &AppConfig) {
    match cfg.logging.format {
        LogFormat::Compact => common::utils::logging::init_logging_compact(&cfg.logging.filter),
        LogFormat::Json => common::utils::logging::init_logging_json(&cfg.logging.filter),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so DATABASE_URL and RUST_LOG are visible to config and logging
    dotenv().ok();

    let (cfg, file_error) = match AppConfig::load_and_validate() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::from_env().context("no usable configuration")?, Some(e)),
    };
    init_logging(&cfg);
    if let Some(e) = file_error {
        warn!(service = "migrate", error = %e, "config file unusable, using environment");
    }

    let down = std::env::args().nth(1).as_deref() == Some("down");
    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from(&cfg.database))
        .await
        .context("connect database")?;

    if down {
        info!(service = "migrate", event = "down", "reverting last migration");
        Migrator::down(&db, Some(1)).await.context("migrate down")?;
    } else {
        info!(service = "migrate", event = "up", "applying pending migrations");
        Migrator::up(&db, None).await.context("migrate up")?;
    }
    info!(service = "migrate", event = "done", "migrations finished");
    Ok(())
}
