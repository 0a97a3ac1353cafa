//! Connection pool built from [`Database`](crate::settings::Database) settings.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::settings::Database;

/// Open a pool and apply the embedded migrations.
pub async fn connect(settings: &Database) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!(max_connections = settings.max_connections, "database ready");

    Ok(pool)
}
