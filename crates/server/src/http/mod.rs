use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppState, routes};

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::boards::router(&state))
        .merge(routes::columns::router(&state))
        .merge(routes::tasks::router(&state))
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/", get(routes::frontend::serve_frontend_root))
        .route("/{*path}", get(routes::frontend::serve_frontend))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
