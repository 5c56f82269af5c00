use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Type alias for the per-IP governor layer
pub type GlobalGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Create a GovernorLayer limiting each client IP to
/// `rate_limit_per_minute` requests with bursts of `rate_limit_burst`
pub fn create_global_governor(config: &Config) -> AppResult<GlobalGovernorLayer> {
    let governor_config = GovernorConfigBuilder::default()
        .per_millisecond(config.rate_limit_period_ms())
        .burst_size(config.rate_limit_burst.max(1))
        .finish()
        .ok_or_else(|| AppError::Internal("Invalid rate limit configuration".to_string()))?;

    Ok(GovernorLayer::new(Arc::new(governor_config)))
}

/// Middleware to log request outcomes, rate limiting included
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!(
        client_ip = %addr.ip(),
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            "Rate limited"
        );
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request failed"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_governor_from_config() {
        let config = Config {
            model_path: "fixtures/xgb_fare_model.json".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            rate_limit_per_minute: 600,
            rate_limit_burst: 0,
        };
        assert!(create_global_governor(&config).is_ok());
    }
}
