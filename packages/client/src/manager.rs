//! # Session manager
//!
//! Owns the client's session lifecycle: restoring it at start-up from the
//! persisted refresh token, reacting to provider notifications, and the
//! user-driven login / registration / logout flows. All state goes through
//! the [`SessionStore`]; all durable side effects go through a
//! [`KeyValueStore`].
//!
//! ## Storage layout
//!
//! | Key | Owner | Written on | Removed on |
//! |-----|-------|-----------|-----------|
//! | `refresh_token_key` (`rallyhq_refresh_token`) | application | every new session | logout, failed restore, sign-out event |
//! | `provider_key_prefix*` (`sb-...`) | identity provider | every new session (session mirror) | whenever the application token is absent |
//!
//! ## Restore
//!
//! 1. No stored refresh token: purge provider keys. No network call.
//! 2. Stored token: exchange it. Success persists the rotated token and
//!    signs in; failure deletes the token, purges provider keys and stays
//!    signed out.
//! 3. Either way, mark the state initialized.
//!
//! Storage failures are logged and never abort a flow; the in-memory state
//! stays authoritative for the running client.

use api::identity::{ProviderSession, ProviderUser};
use serde::{Deserialize, Serialize};
use store::{remove_prefixed, ClientConfig, KeyValueStore, StorageError, StorageKeys};
use tracing::{debug, info, warn};

use crate::notify::{Toast, ToastQueue};
use crate::provider::{AuthEvent, IdentityProvider, ProviderError, SignUpResponse, UserUpdate};
use crate::session::{Session, SessionUser};
use crate::state::{AuthState, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Outcome of [`SessionManager::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    SignedIn(Session),
    /// The provider wants the email confirmed first; no tokens were issued.
    ConfirmationRequired(SessionUser),
}

pub struct SessionManager<S, P> {
    storage: S,
    provider: P,
    keys: StorageKeys,
    provider_session_key: String,
    site_url: Option<String>,
    state: SessionStore,
    toasts: ToastQueue,
}

impl<S: KeyValueStore, P: IdentityProvider> SessionManager<S, P> {
    pub fn new(config: &ClientConfig, storage: S, provider: P) -> Self {
        Self {
            storage,
            provider,
            keys: config.storage.clone(),
            provider_session_key: config.provider_session_key(),
            site_url: None,
            state: SessionStore::new(),
            toasts: ToastQueue::new(),
        }
    }

    /// Origin used for the confirmation and password-reset links.
    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = Some(site_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn state(&self) -> &SessionStore {
        &self.state
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.snapshot()
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.access_token()
    }

    /// The current access token, after the provider confirmed it still
    /// belongs to a user. A rejected token forces a local logout; the
    /// refreshed user (e.g. a newly confirmed email) replaces the stored one.
    pub async fn validated_access_token(&self) -> Result<String, SessionError> {
        let mut session = self
            .state
            .snapshot()
            .session
            .ok_or(SessionError::NotAuthenticated)?;

        match self.provider.get_user(&session.access_token).await {
            Ok(user) => {
                let role = session.user.role;
                let refreshed = SessionUser {
                    role,
                    ..SessionUser::from(&user)
                };
                if refreshed != session.user {
                    session.user = refreshed;
                    self.state.set_credentials(session.clone());
                }
                Ok(session.access_token)
            }
            Err(e @ ProviderError::Api { .. }) => {
                warn!(error = %e, "identity provider rejected the session");
                self.force_logout();
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn restore_session(&self) {
        let stored = match self.storage.get(&self.keys.refresh_token_key) {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(e) => {
                warn!(error = %e, "could not read refresh token");
                None
            }
        };

        match stored {
            None => {
                debug!("no stored refresh token");
                self.purge_provider_keys();
            }
            Some(token) => match self.provider.refresh_session(&token).await {
                Ok(session) => {
                    info!(user_id = %session.user.id, "session restored");
                    self.apply_session(&session);
                }
                Err(e) => {
                    warn!(error = %e, "refresh token exchange failed");
                    self.clear_local();
                }
            },
        }

        self.state.set_initialized();
    }

    pub fn on_session_change(&self, event: AuthEvent, session: Option<&ProviderSession>) {
        debug!(?event, has_session = session.is_some(), "session change");
        match (event, session) {
            (AuthEvent::SignedOut, _) => self.clear_local(),
            (_, Some(session)) => self.apply_session(session),
            (_, None) => {}
        }
        self.state.set_initialized();
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, SessionError> {
        self.state.set_loading(true);
        match self
            .provider
            .sign_in_with_password(&credentials.email, &credentials.password)
            .await
        {
            Ok(session) => {
                info!(user_id = %session.user.id, "signed in");
                self.on_session_change(AuthEvent::SignedIn, Some(&session));
                Ok(Session::from(&session))
            }
            Err(e) => {
                self.state.set_error(e.to_string());
                Err(e.into())
            }
        }
    }

    pub async fn register(&self, data: &RegisterData) -> Result<Registration, SessionError> {
        self.state.set_loading(true);
        let redirect_to = self.link("/auth/callback");
        let response = self
            .provider
            .sign_up(
                &data.email,
                &data.password,
                serde_json::json!({ "name": data.name }),
                redirect_to.as_deref(),
            )
            .await;

        match response {
            Ok(SignUpResponse::Session(session)) => {
                info!(user_id = %session.user.id, "registered and signed in");
                self.on_session_change(AuthEvent::SignedIn, Some(&session));
                Ok(Registration::SignedIn(Session::from(&session)))
            }
            Ok(SignUpResponse::User(user)) => {
                info!(user_id = %user.id, "registered, email confirmation pending");
                self.state.clear_error();
                Ok(Registration::ConfirmationRequired(unconfirmed(&user)))
            }
            Err(e) => {
                self.state.set_error(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Signs out remotely, then tears down local state whatever the outcome.
    /// Without a session only the local cleanup runs.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let Some(token) = self.state.access_token() else {
            self.clear_local();
            return Ok(());
        };

        let remote = self.provider.sign_out(&token).await;
        self.clear_local();

        match remote {
            Ok(()) => {
                info!("signed out");
                self.toasts.push(Toast::success("Logged out successfully"));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "remote sign-out failed");
                self.toasts.push(Toast::error("Logout failed"));
                Err(e.into())
            }
        }
    }

    /// Local teardown after the server rejected our token.
    pub fn force_logout(&self) {
        if self.state.snapshot().is_authenticated() {
            warn!("session rejected by server, signing out");
            self.toasts
                .push(Toast::error("Your session has expired, please sign in again"));
        }
        self.clear_local();
    }

    pub async fn update_display_name(&self, name: &str) -> Result<SessionUser, SessionError> {
        let mut session = self
            .state
            .snapshot()
            .session
            .ok_or(SessionError::NotAuthenticated)?;

        let update = UserUpdate {
            data: Some(serde_json::json!({ "name": name })),
            ..UserUpdate::default()
        };
        let user = self
            .provider
            .update_user(&session.access_token, &update)
            .await
            .inspect_err(|_| self.toasts.push(Toast::error("Could not update profile")))?;

        let role = session.user.role;
        session.user = SessionUser {
            role,
            ..SessionUser::from(&user)
        };
        self.state.set_credentials(session.clone());
        self.toasts.push(Toast::success("Profile updated"));
        Ok(session.user)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), SessionError> {
        let redirect_to = self.link("/login");
        match self.provider.recover(email, redirect_to.as_deref()).await {
            Ok(()) => {
                self.toasts
                    .push(Toast::success("Password reset link sent, check your inbox"));
                Ok(())
            }
            Err(e) => {
                self.toasts.push(Toast::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Second half of the reset flow: the recovery link has signed the user
    /// in, and the new password is set on that session.
    pub async fn reset_password(&self, new_password: &str) -> Result<(), SessionError> {
        let Some(token) = self.state.access_token() else {
            self.toasts
                .push(Toast::error("The reset link is invalid or has expired"));
            return Err(SessionError::NotAuthenticated);
        };

        let update = UserUpdate {
            password: Some(new_password.to_string()),
            ..UserUpdate::default()
        };
        match self.provider.update_user(&token, &update).await {
            Ok(user) => {
                info!(user_id = %user.id, "password changed");
                self.toasts.push(Toast::success("Password changed"));
                Ok(())
            }
            Err(e) => {
                self.toasts.push(Toast::error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Landing step of the email confirmation link. By the time it runs the
    /// provider has already signed the user in, or has not.
    pub fn complete_email_verification(&self) -> bool {
        if self.state.snapshot().is_authenticated() {
            self.toasts.push(Toast::success("Email confirmed"));
            true
        } else {
            self.toasts
                .push(Toast::error("Email confirmation failed, please sign in"));
            false
        }
    }

    fn link(&self, path: &str) -> Option<String> {
        self.site_url.as_ref().map(|site| format!("{site}{path}"))
    }

    fn apply_session(&self, session: &ProviderSession) {
        if let Err(e) = self
            .storage
            .set(&self.keys.refresh_token_key, &session.refresh_token)
        {
            warn!(error = %e, "could not persist refresh token");
        }
        match serde_json::to_string(session) {
            Ok(mirror) => {
                if let Err(e) = self.storage.set(&self.provider_session_key, &mirror) {
                    warn!(error = %e, "could not mirror provider session");
                }
            }
            Err(e) => warn!(error = %e, "could not encode provider session"),
        }
        self.state.set_credentials(Session::from(session));
    }

    fn clear_local(&self) {
        if let Err(e) = self.storage.remove(&self.keys.refresh_token_key) {
            warn!(error = %e, "could not remove refresh token");
        }
        self.purge_provider_keys();
        self.state.clear_credentials();
    }

    fn purge_provider_keys(&self) {
        if let Err(e) = remove_prefixed(&self.storage, &self.keys.provider_key_prefix) {
            warn!(error = %e, "could not purge provider storage");
        }
    }
}

fn unconfirmed(user: &ProviderUser) -> SessionUser {
    SessionUser {
        email_confirmed: false,
        ..SessionUser::from(user)
    }
}
