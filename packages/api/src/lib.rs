//! # API crate — shared contract and server side of the RallyHQ functions
//!
//! The client and the server both depend on this crate. Without features it
//! only carries the wire contract; the `server` feature (on by default) adds
//! everything needed to serve it.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`models`] | — | camelCase records (profile, codriver, car, rally, permission grant) and their request validators |
//! | [`envelope`] | — | `{"data": ...}` / `{"error": ...}` bodies and the delete acknowledgement |
//! | [`error`] | — | [`ApiError`], the status-carrying error every function returns |
//! | [`identity`] | — | identity-provider (GoTrue) user and session payloads |
//! | `settings` | `server` | `config`-based server settings |
//! | `db` | `server` | [`Repository`](db::Repository) trait, Postgres and in-memory backends, migrations |
//! | `auth` | `server` | bearer-token gate, identity verifier, permission check |
//! | `routes` | `server` | axum router and handlers mounted under `/functions/v1` |
//!
//! ## Request flow
//!
//! 1. CORS layer answers `OPTIONS` immediately.
//! 2. [`AuthUser`](auth::AuthUser) pulls the bearer token (`x-access-token`
//!    first, then `Authorization`) and resolves it through the identity
//!    provider. Missing or rejected tokens end the request with 401.
//! 3. The JSON body is parsed into a permissive `*Input` type and validated.
//! 4. One repository call, scoped to the caller's user id.
//! 5. The result is wrapped in an [`Envelope`].

pub mod envelope;
pub mod error;
pub mod identity;
pub mod models;

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod db;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod settings;

pub use envelope::{Deleted, Envelope, ErrorBody};
pub use error::ApiError;

#[cfg(feature = "server")]
pub use routes::{router, AppState};
#[cfg(feature = "server")]
pub use settings::Settings;
