use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{config::Config, web::storage::FileStore};

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    config: Arc<Config>,
    files: FileStore,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("failed to connect to Postgres")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run database migrations")?;

        let files = FileStore::new(&config.storage_root);
        files.ensure_root().await?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            files,
        })
    }

    pub fn pool_ref(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }
}
