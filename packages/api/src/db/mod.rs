//! # Database module — repository trait and its backends
//!
//! Handlers never talk to SQLx directly. They go through [`Repository`], an
//! object-safe async trait held as `Arc<dyn Repository>` in the router state.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`PgRepository`] | production, over a [`sqlx::PgPool`] opened by [`connect`] |
//! | [`MemoryRepository`] | handler tests and local runs; counts every call |
//!
//! Ownership is enforced inside the repository: update and delete take the
//! caller's user id and treat another user's row as missing
//! ([`RepositoryError::NotFound`]).

mod memory;
mod pool;
mod postgres;
mod repository;

pub use memory::MemoryRepository;
pub use pool::connect;
pub use postgres::PgRepository;
pub use repository::{Repository, RepositoryError, RepositoryResult};
