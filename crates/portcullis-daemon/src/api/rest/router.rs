//! API router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, max_body_size: usize, enable_cors: bool) -> Router {
    let api_routes = Router::new()
        // Access pipeline
        .route("/access/scan", post(handlers::scan_image))
        .route("/access/attempts", get(handlers::list_attempts))
        // Visitors
        .route("/visitors", get(handlers::list_visitors))
        .route("/visitors", post(handlers::create_invitation))
        .route("/visitors/verify", post(handlers::verify_visitor))
        // Vehicles
        .route("/vehicles", get(handlers::list_vehicles))
        .route("/vehicles", post(handlers::create_vehicle))
        .route("/vehicles/:id", delete(handlers::delete_vehicle))
        // Manual gate control
        .route("/gate/open", post(handlers::open_gate))
        .route("/gate/close", post(handlers::close_gate))
        .route("/gate/capture", post(handlers::request_capture))
        // Recognition service health proxy
        .route("/recognition/health", get(handlers::recognition_health));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
