//! HTTP server exposing a family tree over REST.
//!
//! Endpoints:
//! - GET|POST / - tree and researcher name as plain text
//! - GET /api/metadata - tree and researcher details as JSON
//!
//! Every request runs inside the database lifecycle layer (see [`lifecycle`]).

mod lifecycle;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{http::HeaderValue, middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{AppConfig, ConfigError, API_PREFIX};
use crate::db::{DbManager, WebDbManager};

pub use lifecycle::{db_lifecycle, RequestDb};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    manager: Arc<dyn DbManager>,
}

impl AppState {
    pub fn new(config: AppConfig, manager: Arc<dyn DbManager>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, manager }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn manager(&self) -> Arc<dyn DbManager> {
        Arc::clone(&self.inner.manager)
    }
}

/// Build the CORS layer for the API prefix.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidOrigin(o.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(values)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Application factory: the router for `config`, backed by `manager`.
pub fn create_app(config: &AppConfig, manager: Arc<dyn DbManager>) -> Result<Router, ConfigError> {
    let mut api = routes::api_router();
    if let Some(origins) = config.cors_origins() {
        info!("CORS enabled for {} on {:?}", API_PREFIX, origins);
        api = api.layer(cors_layer(&origins)?);
    }

    let state = AppState::new(config.clone(), manager);

    Ok(Router::new()
        .route("/", get(routes::dummy_root).post(routes::dummy_root))
        .nest(API_PREFIX, api)
        .layer(middleware::from_fn_with_state(state.clone(), db_lifecycle))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server for `config` and run until shutdown.
pub async fn serve(config: AppConfig, host: &str, port: u16, open_browser: bool) -> Result<()> {
    let db_dir = config.database_dir()?;
    let manager = Arc::new(
        WebDbManager::open(&db_dir, &config.tree)
            .with_context(|| format!("Failed to open tree '{}'", config.tree))?,
    );
    let app = create_app(&config, manager.clone())?;

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Serving tree '{}' on http://{}", config.tree, addr);
    info!("Database directory: {}", db_dir.display());

    if open_browser {
        if let Err(e) = open::that(format!("http://{addr}")) {
            warn!("Failed to open browser: {}", e);
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let stats = manager.stats();
    info!(
        opened = stats.opened(),
        open_handles = stats.open_handles(),
        "Server shutdown complete"
    );
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => warn!("Received Ctrl+C, shutting down"),
        () = terminate => warn!("Received SIGTERM, shutting down"),
    }
}
