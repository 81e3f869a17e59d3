//! Application startup and lifecycle management.

use crate::config::RelayConfig;
use crate::handlers::{chat::chat, health::ping, metrics::metrics};
use crate::models::Catalog;
use crate::services::providers::{HuggingFaceProvider, InferenceProvider};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, RequestIdSpan};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub provider: Arc<dyn InferenceProvider>,
}

impl AppState {
    pub fn new(catalog: Catalog, provider: Arc<dyn InferenceProvider>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            provider,
        }
    }
}

/// Build the HTTP router. Paths outside `/api` and `/metrics` serve the client
/// bundle from `static_dir` when that directory exists.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let mut router = Router::new()
        .route("/api/ping", get(ping))
        .route("/api/chat", post(chat))
        .route("/metrics", get(metrics));

    if static_dir.is_dir() {
        let index = static_dir.join("index.html");
        router = router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)));
    } else {
        tracing::warn!(
            dir = %static_dir.display(),
            "Static client bundle not found; only the API is served"
        );
    }

    router
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(RequestIdSpan))
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Load the catalog, create the inference provider and bind the listener.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let provider = HuggingFaceProvider::new(config.inference.clone())
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        tracing::info!(
            endpoint = %provider.endpoint(),
            timeout_secs = config.inference.timeout_secs,
            authenticated = config.inference.api_token.is_some(),
            "Initialized inference provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Same as [`Application::build`] with an explicit provider.
    pub async fn build_with_provider(
        config: RelayConfig,
        provider: Arc<dyn InferenceProvider>,
    ) -> Result<Self, AppError> {
        let catalog = Catalog::load(&config.catalog.path).map_err(|e| {
            tracing::error!("Failed to load movie catalog: {}", e);
            e
        })?;

        let state = AppState::new(catalog, provider);
        let router = build_router(state, &config.static_assets.dir);

        // Port 0 picks a random port
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Relay service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
