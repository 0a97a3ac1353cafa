use std::sync::Arc;

use anyhow::Context;
use api::auth::GoTrueVerifier;
use api::db::{self, PgRepository};
use api::{AppState, Settings};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,web=debug,api=debug")),
        )
        .init();

    let settings = Settings::new().context("failed to load settings")?;

    let pool = db::connect(&settings.database)
        .await
        .context("failed to prepare database")?;
    let verifier = GoTrueVerifier::new(&settings.identity)
        .context("failed to build identity verifier")?;

    let state = AppState::new(Arc::new(PgRepository::new(pool)), Arc::new(verifier));
    let app = api::router(state).layer(TraceLayer::new_for_http());

    let addr = settings
        .server
        .address()
        .context("invalid server.host / server.port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "rally functions listening");

    axum::serve(listener, app)
        .await
        .context("server error")?;
    Ok(())
}
