use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::accounts::PgAccountStore;
use crate::config::AppConfig;
use crate::storage::{Storage, StorageClient};

/// Connected collaborators for one process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: PgAccountStore,
    pub storage: Option<Arc<dyn StorageClient>>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let db = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        let storage = match &config.storage {
            Some(cfg) => Some(Arc::new(Storage::new(cfg).await?) as Arc<dyn StorageClient>),
            None => None,
        };

        Ok(Self {
            config,
            accounts: PgAccountStore::new(db),
            storage,
        })
    }

    pub fn storage(&self) -> anyhow::Result<&dyn StorageClient> {
        self.storage
            .as_deref()
            .context("object storage is not configured (set S3_ENDPOINT)")
    }
}
