use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradeprep_api::config::ServerConfig;
use tradeprep_api::payments::stripe::StripeGateway;
use tradeprep_api::router::build_app_router;
use tradeprep_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Configuration loaded");

    // The database must be reachable and migrated before we accept traffic;
    // serving requests against a stale schema helps nobody.
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = tradeprep_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tradeprep_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tradeprep_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    let payments = Arc::new(StripeGateway::new(&config.payment));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        payments,
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Shutdown complete");
}

/// Install the tracing subscriber. `RUST_LOG` wins when set; otherwise log
/// this crate and tower-http at debug.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tradeprep_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolve when the process is asked to stop.
///
/// Listens for SIGINT and, on Unix, SIGTERM, so both an interactive Ctrl-C
/// and a process manager's stop request drain in-flight requests instead
/// of cutting them off.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, draining"),
        () = terminate => tracing::info!("SIGTERM received, draining"),
    }
}
