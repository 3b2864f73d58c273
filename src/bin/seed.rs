//! Seed the master data catalog
//!
//! Connects with the same configuration as the server, runs migrations and
//! inserts the static reference data. Safe to run repeatedly.

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobdesk::{
    config::Config,
    db::{self, repositories::SqlxMasterDataRepository, seed},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_with_env(Path::new("config.yml"))?;

    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;

    let repo = SqlxMasterDataRepository::new(pool.clone());
    let inserted = seed::seed_master_data(&repo).await?;

    tracing::info!("Seed complete: {} item(s) inserted", inserted);
    pool.close().await;

    Ok(())
}
