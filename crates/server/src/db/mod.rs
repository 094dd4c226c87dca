mod memory;
mod postgres;
mod store;

pub use memory::MemoryPatientStore;
pub use postgres::PgPatientStore;
pub use store::{PatientStore, SharedStore, StoreError};

use std::sync::Arc;

use deadpool_postgres::{Config as PgConfig, Pool, Runtime};
use tokio_postgres::NoTls;

use crate::config::{Config, StoreBackend};

/// Create a connection pool from a database URL
pub async fn create_pool(database_url: &str) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = PgConfig::new();
    cfg.url = Some(database_url.to_string());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}

/// Open the configured store. For PostgreSQL the schema is created if missing.
pub async fn open_store(config: &Config) -> Result<SharedStore, StoreError> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            let store = PgPatientStore::new(pool);
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryPatientStore::new())),
    }
}
