//! ticketing-gateway server entry point.
//!
//! Connects to PostgreSQL, applies migrations, and starts the Axum HTTP
//! server.

use std::sync::Arc;

use anyhow::Context;
use axum::http::StatusCode;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use ticketing_gateway::api;
use ticketing_gateway::app_state::AppState;
use ticketing_gateway::config::{GatewayConfig, LogFormat};
use ticketing_gateway::persistence::PgReservationStore;
use ticketing_gateway::service::ReservationService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting ticketing-gateway");

    // Build persistence layer
    let mut connect_options: PgConnectOptions = config
        .database_url
        .parse()
        .context("invalid DATABASE_URL")?;
    if config.database_statement_timeout_ms > 0 {
        connect_options = connect_options.options([(
            "statement_timeout",
            config.database_statement_timeout_ms.to_string(),
        )]);
    }
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(config.connect_timeout())
        .connect_with(connect_options)
        .await
        .context("failed to connect to PostgreSQL")?;

    let store = PgReservationStore::new(pool);
    if config.run_migrations {
        store.migrate().await.context("migrations failed")?;
        tracing::info!("migrations applied");
    }

    // Build service layer
    let reservation_service = Arc::new(ReservationService::new(Arc::new(store)));

    // Build application state
    let app_state = AppState {
        reservation_service,
        max_seats_per_request: config.max_seats_per_request,
    };

    // Build router
    let app = api::build_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    config.request_timeout(),
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
