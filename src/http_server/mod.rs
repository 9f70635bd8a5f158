//! Admin HTTP server.
//!
//! Exposes the registry surface: listing, registering and removing watches
//! and binding a shared alert channel, plus a health endpoint. The sweep
//! itself never goes through this API; it reads the same repository
//! directly.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{delete, get, put},
    Router,
};

mod error;
mod status;
mod watches;

pub use error::ApiError;

use crate::{config::AppConfig, persistence::traits::WatchRepository};

/// Shared state available to all API handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Shared application configuration.
    pub config: Arc<AppConfig>,
    /// The repository watches are registered in.
    pub repo: Arc<dyn WatchRepository>,
}

/// Builds the admin API router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(status::health))
        .route("/watches", get(watches::list_watches).post(watches::create_watch))
        .route("/watches/:owner_id/:entity_id/:guild_id", delete(watches::delete_watch))
        .route(
            "/watches/:owner_id/:entity_id/:guild_id/channel",
            put(watches::set_channel_binding),
        )
        .with_state(state)
}

/// Runs the admin API server based on the provided application
/// configuration.
pub async fn run_server_from_config(config: Arc<AppConfig>, repo: Arc<dyn WatchRepository>) {
    let addr: SocketAddr = config
        .server
        .listen_address
        .parse()
        .expect("Invalid server.listen_address format");

    let app = router(ApiState { config, repo });

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind address");
    tracing::info!(%addr, "Admin API server listening.");

    axum::serve(listener, app.into_make_service()).await.expect("Server failed");
}
