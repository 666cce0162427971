use card_service::config::CardConfig;
use card_service::startup::Application;
use service_core::observability::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Loading first also pulls in .env, so OTLP_ENDPOINT may come from there
    let config = CardConfig::load();
    let log_level = config
        .as_ref()
        .map(|c| c.common.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Spans are exported only when an OTLP collector is configured
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("card-service", &log_level, otlp_endpoint.as_deref());

    let config = config.map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        std::io::Error::other(format!("Metrics error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
