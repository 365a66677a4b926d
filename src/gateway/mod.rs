pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::info;

// OpenAPI / Swagger UI
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::wallet::Wallet;
use middleware::caller_identity_middleware;
use state::AppState;

/// Build the complete router
pub fn router(wallet: Arc<Wallet>) -> Router {
    let state = Arc::new(AppState::new(wallet));

    // ==========================================================================
    // Public Routes (no caller identity)
    // ==========================================================================
    let public_routes = Router::new().route("/card/{number}", get(handlers::resolve_card));

    // ==========================================================================
    // Private Routes (caller identity required)
    // ==========================================================================
    let private_routes = Router::new()
        .route("/account", get(handlers::get_account))
        .route("/transfer", post(handlers::create_transfer))
        .route("/history", get(handlers::get_history))
        .route("/cards", post(handlers::issue_card))
        .layer(from_fn(caller_identity_middleware));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/accounts", post(handlers::open_account))
        .nest("/api/v1/public", public_routes)
        .nest("/api/v1/private", private_routes)
        .with_state(state)
        // stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start HTTP Gateway server; returns on Ctrl-C
pub async fn run_server(config: &GatewayConfig, wallet: Arc<Wallet>) -> anyhow::Result<()> {
    let app = router(wallet);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    info!(addr = %addr, "Gateway listening");
    info!(docs = %format!("http://{}/docs", addr), "API docs");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
