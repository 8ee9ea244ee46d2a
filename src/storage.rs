//! Key/value storage seam
//!
//! The browser exposes local and session storage as string maps. Core modules
//! only see [`KeyValueStore`]; the wasm layer wraps `web_sys::Storage` and tests
//! use [`MemoryStore`].

use std::cell::RefCell;
use std::collections::HashMap;

/// String key/value store with interior mutability (browser storage semantics)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value; failures (quota, private mode) are logged and dropped
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// In-memory store used natively and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1.5");
        assert_eq!(store.get_f64("a"), Some(1.5));
        store.remove("a");
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_f64_rejects_garbage() {
        let store = MemoryStore::new();
        store.set("pos", "NaN");
        assert_eq!(store.get_f64("pos"), None);
        store.set("pos", "abc");
        assert_eq!(store.get_f64("pos"), None);
    }
}
