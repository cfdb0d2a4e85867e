use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::{EnrollmentDeskConfig, StorageBackend};
use crate::store::{MemoryStore, Stores};

/// The store the CLI runs against, chosen by configuration.
pub enum Backend {
    Memory {
        store: Arc<MemoryStore>,
        snapshot_path: PathBuf,
    },
    #[cfg(feature = "database")]
    Sqlite(Arc<crate::store::SqliteStore>),
}

impl Backend {
    pub async fn open(config: &EnrollmentDeskConfig) -> Result<Self> {
        match config.storage.backend {
            StorageBackend::Memory => {
                let snapshot_path = config.storage.snapshot_path.clone();
                let store = MemoryStore::load_snapshot(&snapshot_path)
                    .await
                    .with_context(|| {
                        format!("Failed to load snapshot {}", snapshot_path.display())
                    })?;
                Ok(Backend::Memory {
                    store: Arc::new(store),
                    snapshot_path,
                })
            }
            #[cfg(feature = "database")]
            StorageBackend::Sqlite => {
                let db = config
                    .database
                    .as_ref()
                    .context("storage.backend is sqlite but no [database] section is configured")?;
                let store = crate::store::SqliteStore::connect(
                    &db.url,
                    db.max_connections,
                    db.auto_migrate,
                )
                .await
                .with_context(|| format!("Failed to open database {}", db.url))?;
                Ok(Backend::Sqlite(Arc::new(store)))
            }
            #[cfg(not(feature = "database"))]
            StorageBackend::Sqlite => Err(anyhow::anyhow!(
                "SQLite storage requested but this build lacks the `database` feature"
            )),
        }
    }

    pub fn stores(&self) -> Stores {
        match self {
            Backend::Memory { store, .. } => Stores::shared(store.clone()),
            #[cfg(feature = "database")]
            Backend::Sqlite(store) => Stores::shared(store.clone()),
        }
    }

    /// Flush pending changes. Only the snapshot backend needs this.
    pub async fn persist(&self) -> Result<()> {
        match self {
            Backend::Memory {
                store,
                snapshot_path,
            } => {
                store
                    .save_snapshot(snapshot_path)
                    .await
                    .with_context(|| {
                        format!("Failed to write snapshot {}", snapshot_path.display())
                    })?;
                info!("Saved snapshot to {}", snapshot_path.display());
                Ok(())
            }
            #[cfg(feature = "database")]
            Backend::Sqlite(_) => Ok(()),
        }
    }

    pub async fn shutdown(&self) {
        #[cfg(feature = "database")]
        if let Backend::Sqlite(store) = self {
            store.shutdown().await;
        }
    }
}
