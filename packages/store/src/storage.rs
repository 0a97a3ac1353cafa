//! # Durable key/value storage — the seam between session logic and the platform
//!
//! The session layer persists exactly one value of its own (the refresh token)
//! and is responsible for wiping the identity provider's leftovers. Both concerns
//! go through [`KeyValueStore`] so that the cleanup policy can be exercised
//! against [`crate::MemoryStore`] in tests, [`crate::FileStore`] on native
//! targets, and the browser's `localStorage` on the web.
//!
//! ## [`KeyValueStore`] trait
//!
//! Four synchronous methods mirroring the Web Storage API: `get`, `set`,
//! `remove` and `keys`. Implementations take `&self` and use interior
//! mutability, so a single store can be shared between the session manager and
//! whoever inspects it.
//!
//! ## Cleanup policy
//!
//! [`remove_prefixed`] deletes every key that starts with a prefix. Keys are
//! collected first and removed afterwards so that index-based backends (like
//! `localStorage`) do not skip entries while mutating.

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be reached (no `window`, storage disabled, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected an operation.
    #[error("storage operation failed: {0}")]
    Backend(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// String key/value storage with Web Storage semantics.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

/// Remove every key starting with `prefix`. Returns how many keys were removed.
pub fn remove_prefixed<S: KeyValueStore + ?Sized>(
    store: &S,
    prefix: &str,
) -> Result<usize, StorageError> {
    let doomed: Vec<String> = store
        .keys()?
        .into_iter()
        .filter(|key| key.starts_with(prefix))
        .collect();

    for key in &doomed {
        store.remove(key)?;
    }

    if !doomed.is_empty() {
        tracing::debug!(prefix, removed = doomed.len(), "removed prefixed storage keys");
    }
    Ok(doomed.len())
}
