pub mod actions;
pub mod error;
pub mod meta;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

pub use state::{AppState, GateSettings};

/// Largest delivery body accepted. GitHub caps webhook payloads at 25 MB.
pub const MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the axum Router for the gate.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(routes::hook::health).post(routes::hook::receive),
        )
        .layer(DefaultBodyLimit::max(MAX_PAYLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the gate on `addr` and serve until `shutdown` resolves.
pub async fn serve(
    settings: GateSettings,
    addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(settings, listener, shutdown).await
}

/// Start the gate on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when port 0 lets
/// the OS pick a free port).
pub async fn serve_on(
    settings: GateSettings,
    listener: tokio::net::TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    let repos_path = settings.repos_path.display().to_string();
    let origin = settings
        .origin_override
        .clone()
        .unwrap_or_else(|| settings.meta_url.clone());
    let app = build_router(AppState::new(settings)?);

    tracing::info!(%local, repos = %repos_path, trusted = %origin, "hookgate listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}
