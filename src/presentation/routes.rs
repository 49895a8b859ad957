//! Route table and middleware stack

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::presentation::controllers::{admin, health, lookup};
use crate::presentation::middleware::{
    AdminGuardState, AdmissionState, admin_guard, admission_middleware, logging_middleware,
    timeout_envelope_middleware,
};

pub fn create_router(
    state: AppState,
    admission: Arc<AdmissionState>,
    admin_guard_state: Arc<AdminGuardState>,
) -> Router {
    // Lookup routes sit behind admission control; every request is charged
    // against the caller's window before a handler runs.
    let lookup_routes = Router::new()
        .route("/api/v1/names/{name}", get(lookup::get_name))
        .route("/api/v1/names/batch", post(lookup::lookup_batch))
        .layer(middleware::from_fn_with_state(
            admission,
            admission_middleware,
        ));

    let admin_routes = Router::new()
        .route("/api/v1/admin/api-keys", post(admin::create_api_key))
        .route("/api/v1/admin/api-keys", delete(admin::deactivate_api_key))
        .route("/api/v1/admin/cache/warm", post(admin::warm_cache))
        .route("/api/v1/admin/cache/clear", post(admin::clear_cache))
        .route("/api/v1/admin/cache/stats", get(admin::cache_stats))
        .route(
            "/api/v1/admin/rate-limit/reset",
            post(admin::reset_rate_limit),
        )
        .layer(middleware::from_fn_with_state(
            admin_guard_state,
            admin_guard,
        ));

    let cors = build_cors_layer(&state.config.server.allowed_origins);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .route("/health", get(health::health))
        .merge(lookup_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(logging_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                // Dresses the timeout layer's bare 408 in the error envelope.
                .layer(middleware::from_fn(timeout_envelope_middleware))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
