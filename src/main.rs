use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ride_fare_estimator::{config::Config, model, routes, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ride_fare_estimator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Starting server at {}", config.server_addr());

    // The service cannot answer anything without a model
    let model = model::load(&config.model_path).unwrap_or_else(|e| {
        tracing::error!(path = %config.model_path, error = %e, "Failed to load fare model");
        std::process::exit(1);
    });
    let info = model.info();
    tracing::info!(
        booster = %info.booster,
        objective = %info.objective,
        trees = info.num_trees,
        "Loaded fare model from {}",
        config.model_path
    );

    let state = AppState {
        model,
        config: config.clone(),
    };

    let app = routes::create_app(state).expect("Failed to build middleware stack");

    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
