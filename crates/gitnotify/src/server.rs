use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info};

use crate::config_api;
use crate::notification::Notify;
use crate::settings::ServerSettings;
use crate::store::ConfigStore;
use crate::webhook;

#[derive(Clone)]
pub struct AppState {
    pub(crate) store: Arc<ConfigStore>,
    pub(crate) notifier: Arc<dyn Notify>,
    pub(crate) config_token: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<ConfigStore>, notifier: Arc<dyn Notify>, settings: ServerSettings) -> Self {
        Self {
            store,
            notifier,
            config_token: settings.config_token,
        }
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    service: &'static str,
}

/// Builds the router: `POST /webhook`, `GET /health` and
/// `GET`/`PUT /api/config`. Other methods on these paths get 405 before any
/// handler runs, so the config API token check does not apply to them.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/webhook",
            post(webhook::handle_webhook)
                .layer(DefaultBodyLimit::max(webhook::MAX_PAYLOAD_BYTES)),
        )
        .route("/health", get(handle_health))
        .route(
            "/api/config",
            get(config_api::get_config).put(config_api::put_config),
        )
        .with_state(state)
}

async fn handle_health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        service: "gitnotify",
    })
}

/// Serves gitnotify on `0.0.0.0:{port}` until SIGINT or SIGTERM.
///
/// The port is bound once. A config update that changes `port` takes effect
/// on the next restart.
pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "GitNotify server listening");
    info!("Webhook endpoint: http://localhost:{port}/webhook");
    info!("Health check: http://localhost:{port}/health");
    info!("Config API: http://localhost:{port}/api/config");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("GitNotify server stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm => {}
    }

    info!("Shutdown signal received");
}
