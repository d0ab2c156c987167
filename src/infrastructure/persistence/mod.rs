//! World record persistence adapters
//!
//! Two backends implement `WorldRecordPort`: SQLite for real use and an
//! in-memory store for tests and throwaway sessions.

mod memory_store;
mod sqlite_store;

pub use memory_store::InMemoryWorldStore;
pub use sqlite_store::SqliteWorldStore;

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::application::ports::outbound::WorldRecordPort;
use crate::infrastructure::config::StoreConfig;

/// Build the configured store backend
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn WorldRecordPort>> {
    match config.backend.as_str() {
        "memory" => {
            tracing::info!("Using in-memory world store");
            Ok(Arc::new(InMemoryWorldStore::new()))
        }
        "sqlite" => {
            // Ensure data directory exists
            if let Some(parent) = std::path::Path::new(&config.sqlite_path).parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create world database directory")?;
            }

            let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.sqlite_path))
                .await
                .context("Failed to connect to SQLite world database")?;
            let store = SqliteWorldStore::new(pool)
                .await
                .context("Failed to initialize world database schema")?;
            tracing::info!("Connected to SQLite world database: {}", config.sqlite_path);
            Ok(Arc::new(store))
        }
        backend => anyhow::bail!("Unsupported store backend: {}", backend),
    }
}
