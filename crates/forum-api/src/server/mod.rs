//! Server setup
//!
//! Wires the configured store into a [`ServiceContext`](forum_service::ServiceContext) and
//! serves the router.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use forum_common::{AppConfig, AppError, StoreBackend};
use forum_core::KeyValueStore;
use forum_service::ServiceContextBuilder;
use forum_store::{MemoryStore, RedisPool, RedisPoolConfig, RedisStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    apply_middleware(create_router()).with_state(state)
}

/// Open the configured store and build the state every handler shares
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let store: Arc<dyn KeyValueStore> = match config.store.backend {
        StoreBackend::Redis => {
            info!("Connecting to Redis...");
            let pool = RedisPool::new(RedisPoolConfig::from(&config.redis))
                .map_err(|e| AppError::Store(e.to_string()))?;
            if let Err(e) = pool.health_check().await {
                warn!(error = %e, "Redis not reachable yet; readiness will report it");
            } else {
                info!("Redis connection established");
            }
            Arc::new(RedisStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; accounts are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let service_context = ServiceContextBuilder::new()
        .store(store)
        .registration(config.registration.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context))
}

/// Serve `app` on an already bound listener until the process stops
pub async fn run_server(app: Router, listener: TcpListener) -> Result<(), AppError> {
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::Config(format!("Failed to read local address: {e}")))?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    run_server(app, listener).await
}
