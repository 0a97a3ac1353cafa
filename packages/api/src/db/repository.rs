use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Car, Codriver, NewCar, NewCodriver, NewRally, Permission, PermissionGrant, Profile, Rally,
};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No row matched, or the row belongs to another user.
    #[error("row not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Row-level access to the rally tables.
///
/// Every per-user operation is scoped to `user_id`: a row owned by somebody
/// else behaves exactly like a missing one.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> RepositoryResult<Option<Profile>>;

    /// Insert or replace the caller's profile.
    async fn upsert_profile(&self, user_id: Uuid, profile: &Profile) -> RepositoryResult<Profile>;

    /// Newest first.
    async fn list_codrivers(&self, user_id: Uuid) -> RepositoryResult<Vec<Codriver>>;

    async fn add_codriver(&self, user_id: Uuid, codriver: &NewCodriver)
        -> RepositoryResult<Codriver>;

    async fn update_codriver(
        &self,
        user_id: Uuid,
        id: Uuid,
        codriver: &NewCodriver,
    ) -> RepositoryResult<Codriver>;

    async fn delete_codriver(&self, user_id: Uuid, id: Uuid) -> RepositoryResult<()>;

    /// Newest first.
    async fn list_cars(&self, user_id: Uuid) -> RepositoryResult<Vec<Car>>;

    async fn add_car(&self, user_id: Uuid, car: &NewCar) -> RepositoryResult<Car>;

    async fn update_car(&self, user_id: Uuid, id: Uuid, car: &NewCar) -> RepositoryResult<Car>;

    async fn delete_car(&self, user_id: Uuid, id: Uuid) -> RepositoryResult<()>;

    /// Sorted by permission name.
    async fn list_permissions(&self, user_id: Uuid) -> RepositoryResult<Vec<PermissionGrant>>;

    async fn has_permission(&self, user_id: Uuid, permission: &Permission)
        -> RepositoryResult<bool>;

    async fn create_rally(&self, created_by: Uuid, rally: &NewRally) -> RepositoryResult<Rally>;

    /// All rallies ordered by date.
    async fn list_rallies(&self) -> RepositoryResult<Vec<Rally>>;
}
