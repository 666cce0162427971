//! Application startup and lifecycle management.

use crate::config::CardConfig;
use crate::handlers;
use crate::prompts::EXTRACTION_PROMPT;
use crate::services::providers::gemini::{GeminiConfig, GeminiVisionProvider};
use crate::services::VisionProvider;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::{http_request_span, request_id_middleware},
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Slack on top of the upload ceiling for multipart boundaries and headers,
/// so a file of exactly the ceiling still fits in the request body.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CardConfig>,
    pub prompt: &'static str,
    pub provider: Arc<dyn VisionProvider>,
}

impl AppState {
    pub fn new(config: CardConfig, provider: Arc<dyn VisionProvider>) -> Self {
        Self {
            config: Arc::new(config),
            prompt: EXTRACTION_PROMPT,
            provider,
        }
    }
}

/// Build the HTTP router for the given state.
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .config
        .upload
        .max_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/extract-card",
            post(handlers::extract_card).layer(DefaultBodyLimit::max(body_limit)),
        )
        .fallback(handlers::not_found)
        .with_state(state)
        // Add metrics middleware
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(TraceLayer::new_for_http().make_span_with(http_request_span::<axum::body::Body>))
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        // Add CORS layer
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build the application with the Gemini provider.
    pub async fn build(config: CardConfig) -> Result<Self, AppError> {
        if !config.has_credential() {
            tracing::warn!(
                "GEMINI_API_KEY is not set; /extract-card will answer 500 until it is configured"
            );
        }

        let provider = GeminiVisionProvider::new(GeminiConfig::from(&config.gemini)).map_err(|e| {
            tracing::error!("Failed to create Gemini HTTP client: {}", e);
            AppError::InternalError(anyhow::Error::new(e))
        })?;

        tracing::info!(
            model = %config.gemini.model,
            "Initialized Gemini vision provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around an explicit provider.
    pub async fn build_with_provider(
        config: CardConfig,
        provider: Arc<dyn VisionProvider>,
    ) -> Result<Self, AppError> {
        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Card service listening on port {}", port);

        let app = router(AppState::new(config, provider));
        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
