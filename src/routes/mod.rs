use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppResult;
use crate::handlers::{health, predict};
use crate::middleware::rate_limit::{create_global_governor, log_request};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/predict", post(predict::predict))
        .route("/predict/features", post(predict::predict_features))
        .route("/health", get(health::health));

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Router plus the served middleware stack. Request logging sits outermost
/// so rate-limited responses are logged too. Needs connect info.
pub fn create_app(state: AppState) -> AppResult<Router> {
    let governor = create_global_governor(&state.config)?;

    Ok(create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(governor)
        .layer(middleware::from_fn(log_request)))
}
