pub mod health;
pub mod sessions;

use axum::routing::get;
use axum::Router;

use crate::cors::build_cors_layer;
use crate::session::ws::chat_ws;
use crate::state::AppState;

/// Build the API router. Every route is public.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/v1/sessions", get(sessions::list_sessions))
        .route(bc_protocol::CHAT_WS_PATH, get(chat_ws))
}

/// The full application: router plus CORS, request tracing and a
/// concurrency limit.
pub fn app(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config.server.cors);

    let max_concurrent = std::env::var("BOTCHAT_MAX_CONCURRENT_REQUESTS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(256);
    tracing::info!(max_concurrent, "concurrency limit set");

    router()
        .layer(cors_layer)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent))
        .with_state(state)
}
