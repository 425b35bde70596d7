use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::require_token;
use crate::handlers::{
    dashboard_page, get_callback, healthz, ingest_callback, list_callbacks, readyz,
    MAX_BODY_BYTES,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/suno/callback",
            post(ingest_callback).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route("/callbacks", get(list_callbacks))
        .route("/callbacks/:id", get(get_callback))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/", get(dashboard_page))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
