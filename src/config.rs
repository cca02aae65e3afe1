use std::sync::{Arc, RwLock};

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::store::{StoragePort, CONFIG_KEY};

/// Persisted app configuration.
///
/// The engine only reads `server_url`; the remaining fields ride along for
/// the host's about screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub server_url: String,
    pub version: String,
    pub build_by: String,
    pub contact: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://192.168.1.2:3000".into(),
            version: "1.0.0".into(),
            build_by: "wrongbook".into(),
            contact: String::new(),
        }
    }
}

/// Configuration store over the injected storage port.
pub struct ConfigStore {
    store: Arc<dyn StoragePort>,
    data: RwLock<AppConfig>,
}

impl ConfigStore {
    /// Loads the persisted config. A missing key persists the defaults; a
    /// corrupt blob falls back to them with a logged warning.
    pub fn open(store: Arc<dyn StoragePort>) -> Result<Self> {
        let data = match store.get(CONFIG_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("Ignoring corrupt {CONFIG_KEY}: {err}");
                AppConfig::default()
            }),
            None => {
                let config = AppConfig::default();
                store.set(CONFIG_KEY, &serde_json::to_string(&config)?)?;
                config
            }
        };

        Ok(Self {
            store,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> AppConfig {
        self.data.read().unwrap().clone()
    }

    pub fn server_url(&self) -> String {
        self.data.read().unwrap().server_url.clone()
    }

    /// Applies the host settings form's new remote address and persists.
    pub fn set_server_url(&self, url: &str) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.server_url = url.to_string();
        self.persist(&guard)
    }

    pub fn update(&self, config: AppConfig) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        *guard = config;
        self.persist(&guard)
    }

    fn persist(&self, data: &AppConfig) -> Result<()> {
        self.store.set(CONFIG_KEY, &serde_json::to_string(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn first_open_persists_the_defaults() {
        let store = Arc::new(MemoryStore::new());
        let config = ConfigStore::open(store.clone()).expect("open");

        assert_eq!(config.get(), AppConfig::default());
        assert!(store.get(CONFIG_KEY).is_some());
    }

    #[test]
    fn server_url_updates_survive_a_reopen() {
        let store = Arc::new(MemoryStore::new());
        let config = ConfigStore::open(store.clone()).expect("open");
        config
            .set_server_url("http://nas.local:3000")
            .expect("set url");

        let reopened = ConfigStore::open(store).expect("reopen");
        assert_eq!(reopened.server_url(), "http://nas.local:3000");
    }

    #[test]
    fn full_updates_are_persisted() {
        let store = Arc::new(MemoryStore::new());
        let config = ConfigStore::open(store.clone()).expect("open");

        let updated = AppConfig {
            server_url: "http://10.0.0.5:3000".into(),
            ..AppConfig::default()
        };
        config.update(updated.clone()).expect("update");

        let reopened = ConfigStore::open(store).expect("reopen");
        assert_eq!(reopened.get(), updated);
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let store = Arc::new(MemoryStore::new());
        store.set(CONFIG_KEY, "{not json").expect("set");

        let config = ConfigStore::open(store).expect("open");
        assert_eq!(config.get(), AppConfig::default());
    }
}
