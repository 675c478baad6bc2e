mod config;
pub mod database;
mod memory;
pub mod persistence;

pub use config::{CanvasConfig, Config, ImportConfig, ResetConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use persistence::{ExportDocument, Persistence, EXPORT_VERSION, LAST_OPENED_KEY, SNAPSHOT_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Durable string key-value store.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Apply several writes as one unit. `None` removes the key.
    ///
    /// Either every entry is applied or the store is left as it was. The
    /// default implementation restores earlier entries when a later one
    /// fails; stores with real transactions should override it.
    fn write_batch(&mut self, entries: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        let mut applied: Vec<(&str, Option<String>)> = Vec::with_capacity(entries.len());
        for &(key, value) in entries {
            let previous = self.get(key)?;
            let result = match value {
                Some(value) => self.set(key, value),
                None => self.remove(key),
            };
            if let Err(e) = result {
                for (key, previous) in applied.into_iter().rev() {
                    let restored = match previous {
                        Some(previous) => self.set(key, &previous),
                        None => self.remove(key),
                    };
                    if let Err(restore) = restored {
                        tracing::error!(%key, error = %restore, "failed to roll back batch write");
                    }
                }
                return Err(e);
            }
            applied.push((key, previous));
        }
        Ok(())
    }
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn write_batch(&mut self, entries: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        (**self).write_batch(entries)
    }
}

/// Returns `~/.config/habitgraph[-dev]/` based on HABITGRAPH_ENV.
///
/// Set HABITGRAPH_ENV=dev to use the development data directory, or
/// HABITGRAPH_DATA_DIR to use an explicit path.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("HABITGRAPH_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("HABITGRAPH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitgraph-dev")
            } else {
                base_dir.join("habitgraph")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
