//! # Owned auth state
//!
//! [`SessionStore`] is the single owner of the client's [`AuthState`]. It
//! changes only through the named transitions below and publishes every
//! change on a `tokio::sync::watch` channel, so views read consistent
//! snapshots instead of sharing mutable globals.
//!
//! | Transition | Effect |
//! |------------|--------|
//! | [`set_loading`](SessionStore::set_loading) | toggles `loading` |
//! | [`set_credentials`](SessionStore::set_credentials) | replaces the session, clears `error` and `loading` |
//! | [`clear_credentials`](SessionStore::clear_credentials) | drops the session, clears `loading` |
//! | [`set_initialized`](SessionStore::set_initialized) | `initialized = true`; notifies only on the first call |
//! | [`set_error`](SessionStore::set_error) | records a human-readable error, clears `loading` |
//! | [`clear_error`](SessionStore::clear_error) | drops a previous error, clears `loading` |

use std::sync::Arc;

use tokio::sync::watch;

use crate::session::Session;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub session: Option<Session>,
    /// Set once the start-up restore has finished, whatever its outcome.
    pub initialized: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Cheap to clone; clones share the same state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<AuthState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(watch::Sender::new(AuthState::default())),
        }
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    pub fn set_credentials(&self, session: Session) {
        self.state.send_modify(|state| {
            state.session = Some(session);
            state.error = None;
            state.loading = false;
        });
    }

    pub fn clear_credentials(&self) {
        self.state.send_modify(|state| {
            state.session = None;
            state.loading = false;
        });
    }

    pub fn set_initialized(&self) {
        self.state.send_if_modified(|state| {
            if state.initialized {
                return false;
            }
            state.initialized = true;
            true
        });
    }

    pub fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|state| {
            state.error = Some(message);
            state.loading = false;
        });
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| {
            let changed = state.error.is_some() || state.loading;
            state.error = None;
            state.loading = false;
            changed
        });
    }
}
