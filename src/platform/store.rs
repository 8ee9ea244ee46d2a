//! `localStorage` / `sessionStorage` backed key-value store

use web_sys::Storage;

use crate::error::ShowcaseError;
use crate::storage::KeyValueStore;

/// Missing storage (private mode, disabled cookies) degrades to a no-op store
pub struct WebStore {
    storage: Option<Storage>,
}

impl WebStore {
    pub fn local() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("localStorage unavailable, preferences will not persist");
        }
        Self { storage }
    }

    pub fn session() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.session_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("sessionStorage unavailable");
        }
        Self { storage }
    }
}

impl KeyValueStore for WebStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.set_item(key, value) {
                log::debug!("{}", ShowcaseError::Storage(format!("{:?}", e)));
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}
