//! Vision model provider abstractions and implementations.
//!
//! The extraction handler only sees the [`VisionProvider`] trait, so the
//! Gemini backend can be swapped for the mock in tests.

pub mod gemini;
pub mod mock;

use crate::services::upload::UploadedImage;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Model returned no text")]
    EmptyOutput,
}

impl ProviderError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::EmptyOutput => "empty_output",
        }
    }
}

/// Trait for image-to-text models.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Send one image with the instruction text and return the model's raw
    /// reply. A single attempt is made; failures are returned as-is.
    async fn extract(&self, prompt: &str, image: &UploadedImage) -> Result<String, ProviderError>;
}
