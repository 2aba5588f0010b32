use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::handlers::{chat, health_check, widget_config};
use crate::state::AppState;

pub const CHAT_PATH: &str = "/api/chat";
pub const CHATKIT_PATH: &str = "/api/chatkit";

/// Both front ends share the same chat contract
pub fn create_routes(state: AppState) -> Router {
    let static_dir = state.config.system_config.static_dir.clone();

    let router: Router<AppState> = Router::new()
        .route("/api/health", get(health_check))
        .route(CHAT_PATH, post(chat))
        .route(CHATKIT_PATH, post(chat))
        .route("/api/widget-config", get(widget_config));

    let router = if Path::new(&static_dir).is_dir() {
        info!("Serving static files from {}", static_dir);
        router.fallback_service(ServeDir::new(&static_dir))
    } else {
        warn!("Static directory {} not found, serving API only", static_dir);
        router
    };

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}
