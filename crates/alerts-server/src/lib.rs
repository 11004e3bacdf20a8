//! Customer alerts service: create, list, and mark-read over a key-value
//! store, plus a health probe.

pub mod alert;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;

use axum::routing::{get, patch};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/alerts",
            get(routes::alerts::list_alerts).post(routes::alerts::create_alert),
        )
        .route("/alerts/{id}", patch(routes::alerts::update_alert))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the alerts service on `0.0.0.0:<port>` with an in-memory store.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(AppState::in_memory(), listener).await
}

/// Start the alerts service on a pre-bound listener.
///
/// The caller can read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("alerts service listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
