//! Store loading, configuration and persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use larder::{Larder, LarderConfig, MigrationMode, backend::database::InMemory};

use crate::cli::{Migration, StoreArgs};

/// File name of the persisted store inside the data directory
pub const STORE_FILE: &str = "larder.json";

/// Build the larder configuration from command-line arguments.
pub fn config(args: &StoreArgs) -> LarderConfig {
    let mut config = LarderConfig::default();
    if let Some(ms) = args.deadline_ms {
        config.deadline = (ms > 0).then(|| Duration::from_millis(ms));
    }
    if let Some(retries) = args.max_retries {
        config.retry.max_conflict_retries = retries;
    }
    config.migration_mode = match args.migration {
        Migration::Atomic => MigrationMode::Atomic,
        Migration::PerItem => MigrationMode::PerItem,
    };
    config
}

/// Load the store from the data directory, creating the directory if needed.
pub async fn open(args: &StoreArgs) -> Result<(Larder, PathBuf), Box<dyn std::error::Error>> {
    let data_dir = args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    tokio::fs::create_dir_all(&data_dir).await?;

    let path = data_dir.join(STORE_FILE);
    let store = InMemory::load_from_file(&path).await?;
    tracing::debug!(
        path = %path.display(),
        sequence = store.sequence().await,
        "Loaded store"
    );

    Ok((Larder::open_with_config(Box::new(store), config(args)), path))
}

/// Write the store back to `path`.
pub async fn save(larder: &Larder, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = larder
        .store()
        .as_any()
        .downcast_ref::<InMemory>()
        .ok_or("store is not an in-memory store")?;
    store.save_to_file(path).await?;
    tracing::debug!(path = %path.display(), "Saved store");
    Ok(())
}
