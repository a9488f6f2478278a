use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One store master record.
///
/// The on-disk store master file is a JSON array of objects with
/// `StoreID` / `StoreName` / `AreaCode` field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "StoreID")]
    pub store_id: String,
    #[serde(rename = "StoreName")]
    pub store_name: String,
    #[serde(rename = "AreaCode")]
    pub area_code: String,
}

/// Immutable lookup from store id to its master record.
///
/// Built once at startup; lookups need no locking because the directory is
/// never mutated after load.
#[derive(Debug, Clone)]
pub struct StoreDirectory {
    stores: HashMap<String, Store>,
}

impl StoreDirectory {
    /// Build a directory from parsed store records, validating as the
    /// records are indexed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` on an empty store id or a
    /// duplicate store id.
    pub fn from_stores(stores: Vec<Store>) -> Result<Self, ConfigError> {
        let mut indexed = HashMap::with_capacity(stores.len());

        for store in stores {
            if store.store_id.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "store '{}' has an empty StoreID",
                    store.store_name
                )));
            }
            if let Some(previous) = indexed.insert(store.store_id.clone(), store) {
                return Err(ConfigError::Validation(format!(
                    "duplicate StoreID: '{}'",
                    previous.store_id
                )));
            }
        }

        Ok(Self { stores: indexed })
    }

    #[must_use]
    pub fn lookup(&self, store_id: &str) -> Option<&Store> {
        self.stores.get(store_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

/// Load and validate the store master file.
///
/// Called once, synchronously, before the server accepts any request;
/// every error here aborts process startup.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_store_directory(path: &Path) -> Result<StoreDirectory, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoreFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores: Vec<Store> = serde_json::from_str(&content)?;

    StoreDirectory::from_stores(stores)
}
