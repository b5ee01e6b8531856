/// Key-value access to chrome.storage.local and the typed settings on top of it
use std::rc::Rc;

use log::warn;
use serde_json::Value;

use crate::config::{DEFAULT_ENABLED, STORAGE_KEY_ENABLED, STORAGE_KEY_FILTER_SECONDS};
use crate::error::StoreError;
use crate::settings::{FilterSeconds, Settings};

/// Raw key-value store. Writes are last-write-wins; there is no locking.
#[allow(async_fn_in_trait)]
pub trait Store {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

impl<T: Store> Store for Rc<T> {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }
}

/// What `seed_defaults` wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Seeded {
    pub filter_seconds: bool,
    pub enabled: bool,
}

/// Typed view of the two persisted fields
#[derive(Debug, Clone)]
pub struct SettingsStore<S> {
    store: S,
}

impl<S: Store> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        SettingsStore { store }
    }

    /// Stored filter value; malformed values count as absent
    pub async fn stored_filter_seconds(&self) -> Result<Option<FilterSeconds>, StoreError> {
        let Some(raw) = self.store.get(STORAGE_KEY_FILTER_SECONDS).await? else {
            return Ok(None);
        };

        match serde_json::from_value::<FilterSeconds>(raw.clone()) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring malformed stored filter value {}: {}", raw, e);
                Ok(None)
            }
        }
    }

    pub async fn filter_seconds(&self) -> Result<FilterSeconds, StoreError> {
        Ok(self.stored_filter_seconds().await?.unwrap_or_default())
    }

    /// Anything other than a stored `false` reads as enabled
    pub async fn enabled(&self) -> Result<bool, StoreError> {
        let raw = self.store.get(STORAGE_KEY_ENABLED).await?;
        Ok(!matches!(raw, Some(Value::Bool(false))))
    }

    pub async fn set_filter_seconds(&self, value: FilterSeconds) -> Result<(), StoreError> {
        self.store
            .set(STORAGE_KEY_FILTER_SECONDS, Value::String(value.to_string()))
            .await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.store.set(STORAGE_KEY_ENABLED, Value::Bool(enabled)).await
    }

    pub async fn load(&self) -> Result<Settings, StoreError> {
        Ok(Settings {
            filter_seconds: self.filter_seconds().await?,
            enabled: self.enabled().await?,
        })
    }

    /// Write each default whose key is absent. Never overwrites.
    pub async fn seed_defaults(&self) -> Result<Seeded, StoreError> {
        let mut seeded = Seeded::default();

        if self.store.get(STORAGE_KEY_FILTER_SECONDS).await?.is_none() {
            self.set_filter_seconds(FilterSeconds::DEFAULT).await?;
            seeded.filter_seconds = true;
        }

        if self.store.get(STORAGE_KEY_ENABLED).await?.is_none() {
            self.set_enabled(DEFAULT_ENABLED).await?;
            seeded.enabled = true;
        }

        Ok(seeded)
    }
}
