//! # Browser `localStorage` store — web platform persistence
//!
//! [`LocalStorageStore`] is the [`KeyValueStore`] used when the client runs in
//! a browser. It talks to `window.localStorage` through `web-sys`, the same
//! storage area the identity provider's JavaScript SDK writes its `sb-*` keys
//! into, which is what makes prefix cleanup meaningful on this platform.
//!
//! The handle is re-acquired on every call; `web_sys::Storage` is a cheap
//! JS reference and the window can change storage availability at runtime
//! (private browsing, quota errors).

use wasm_bindgen::JsValue;

use crate::storage::{KeyValueStore, StorageError};

/// `window.localStorage`-backed KeyValueStore.
#[derive(Clone, Debug, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))
    }
}

fn js_error(value: JsValue) -> StorageError {
    StorageError::Backend(format!("{value:?}"))
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(js_error)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let storage = self.storage()?;
        let len = storage.length().map_err(js_error)?;
        let mut keys = Vec::with_capacity(len as usize);
        for index in 0..len {
            if let Some(key) = storage.key(index).map_err(js_error)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
