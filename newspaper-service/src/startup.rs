//! Application startup and lifecycle management.

use crate::config::NewspaperConfig;
use crate::handlers;
use crate::services::{seed_if_empty, MongoConnection};
use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, metrics_middleware, request_id_middleware, security_headers_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<MongoConnection>,
    /// `http://host:port`, the prefix of every record self-link.
    pub base_uri: String,
}

/// Build the HTTP router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/newspaper",
            get(handlers::list_newspapers).post(handlers::create_newspapers),
        )
        .route(
            "/newspaper/:id",
            get(handlers::get_newspaper)
                .put(handlers::update_newspaper)
                .delete(handlers::delete_newspaper),
        )
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .with_state(state)
}

/// Connect, select the collection and seed it.
///
/// Failures are logged, not returned: the service still starts, and every
/// data request then fails on the unconnected store.
async fn prepare_store(config: &NewspaperConfig) -> MongoConnection {
    let mut connection = MongoConnection::new(&config.mongodb.database, &config.mongodb.uri);
    connection.set_collection(&config.mongodb.collection);

    let connected = match connection.connect().await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            false
        }
    };

    if connected && config.seed.enabled {
        match seed_if_empty(&connection).await {
            Ok(0) => {}
            Ok(inserted) => tracing::info!(inserted, "Seeded circulation fixture"),
            Err(e) => tracing::error!("Failed to insert the data due to {:#}", e),
        }
    }

    connection
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: NewspaperConfig) -> Result<Self, AppError> {
        let connection = prepare_store(&config).await;

        // Bind HTTP listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let state = AppState {
            db: Arc::new(connection),
            base_uri: format!("http://{}:{}", config.public_host, port),
        };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a handle to the shared connection.
    pub fn db(&self) -> Arc<MongoConnection> {
        self.state.db.clone()
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!(
            "Newspaper service started and available at {}",
            self.port
        );

        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
