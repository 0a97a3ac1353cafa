//! # Client crate — session and data access for the RallyHQ front end
//!
//! Everything here is UI-agnostic: views read [`AuthState`] snapshots and
//! [`Toast`]s, and call into [`SessionManager`] and [`FunctionsClient`].
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`manager`] | restore, login, registration, logout and provider session events |
//! | [`state`] | the owned [`AuthState`] and its named transitions |
//! | [`session`] | the application's session and user records |
//! | [`provider`] | [`IdentityProvider`] trait and the GoTrue REST client |
//! | [`functions`] | typed calls to the rally functions, forced logout on 401 |
//! | [`guard`] | private-route and create-rally access decisions |
//! | [`notify`] | toast queue |
//! | [`events`] | listing cards and their search/category filter |
//!
//! Durable storage comes from the `store` crate; pick
//! `store::LocalStorageStore` in the browser (feature `web`),
//! `store::FileStore` natively.

pub mod events;
pub mod functions;
pub mod guard;
pub mod manager;
pub mod notify;
pub mod provider;
pub mod session;
pub mod state;

pub use functions::{ClientError, FunctionsClient};
pub use guard::{CreateRallyAccess, RouteAccess};
pub use manager::{Credentials, RegisterData, Registration, SessionError, SessionManager};
pub use notify::{Toast, ToastKind, ToastQueue};
pub use provider::{AuthEvent, GoTrueClient, IdentityProvider, ProviderError};
pub use session::{Role, Session, SessionUser};
pub use state::{AuthState, SessionStore};
